//! Snapshots handed to the collector. Each one embeds a deep copy of the
//! owning ad unit record, so later mutation of the live records cannot
//! retroactively alter an already-emitted report.

use {
    super::{
        auction::{AdUnit, AdUnitCode, BidderCode, ResponseId, Size},
        event::{BidAdjustment, BidWon},
    },
    serde::Serialize,
};

/// A winning bid, reported when the host renders the ad.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Impression {
    /// State of the owning ad unit at the time the win was observed.
    pub auction: AdUnit,
    pub ad_unit: AdUnitCode,
    pub ad_unit_path: String,
    pub bidder: BidderCode,
    pub cpm: f64,
    pub size: Size,
    pub media_type: String,
}

impl Impression {
    /// The recorded bidder (matched by code and response id) holds the
    /// authoritative bid value; the event's own value is the fallback when
    /// the bidder is unknown or recorded an explicit no-bid.
    pub fn new(ad_unit: &AdUnit, event: &BidWon) -> Self {
        let auction = ad_unit.clone();
        let bidder = BidderCode::from(event.bidder.as_str());
        let cpm = auction
            .find_bidder(&bidder, &ResponseId::from(event.ad_id.as_str()))
            .filter(|recorded| recorded.cpm != 0.0)
            .map_or(event.cpm, |recorded| recorded.cpm);
        Self {
            ad_unit: auction.code.clone(),
            ad_unit_path: auction.ad_unit_path.clone(),
            bidder,
            cpm,
            size: event.size(),
            media_type: event.media_type(),
            auction,
        }
    }
}

/// A bid that arrived for an ad unit that was already finalized. Emitted as
/// a correction to the earlier auction report.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BidAfterTimeout {
    /// State of the owning ad unit before any late-bid reconciliation.
    pub auction: AdUnit,
    pub ad_unit: AdUnitCode,
    pub ad_unit_path: String,
    pub bidder: BidderCode,
    pub cpm: f64,
    pub size: Size,
    pub media_type: String,
    pub start: i64,
    pub finish: i64,
}

impl BidAfterTimeout {
    pub fn new(ad_unit: &AdUnit, event: &BidAdjustment) -> Self {
        let auction = ad_unit.clone();
        Self {
            ad_unit: auction.code.clone(),
            ad_unit_path: auction.ad_unit_path.clone(),
            bidder: BidderCode::from(event.bidder.as_str()),
            cpm: event.cpm,
            size: event.size(),
            media_type: event.media_type(),
            start: event.request_timestamp.unwrap_or(0),
            finish: event.response_timestamp.unwrap_or(0),
            auction,
        }
    }
}
