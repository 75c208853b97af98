use {
    super::{
        auction::{Size, SizeList, UNKNOWN_MEDIA_TYPE},
        consent::ConsentPayload,
    },
    std::sync::Arc,
};

/// Converts a bid value into the named reporting currency. Supplied by the
/// host on response events when the bid was placed in another currency.
pub type CpmConverter = Arc<dyn Fn(&str) -> anyhow::Result<f64> + Send + Sync>;

/// Lifecycle events emitted by the host auction framework. For one auction
/// id the host delivers them in the order they logically occurred; the only
/// tolerated exception is a bid adjustment arriving after the auction ended.
#[derive(Clone, Debug)]
pub enum Event {
    AuctionInit(AuctionInit),
    BidRequested(BidRequested),
    BidAdjustment(BidAdjustment),
    BidResponse(BidResponse),
    BidderDone(BidderDone),
    AuctionEnd(AuctionEnd),
    BidWon(BidWon),
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AuctionInit(_) => "auctionInit",
            Self::BidRequested(_) => "bidRequested",
            Self::BidAdjustment(_) => "bidAdjustment",
            Self::BidResponse(_) => "bidResponse",
            Self::BidderDone(_) => "bidderDone",
            Self::AuctionEnd(_) => "auctionEnd",
            Self::BidWon(_) => "bidWon",
        }
    }
}

#[derive(Clone, Debug)]
pub struct AuctionInit {
    pub auction_id: String,
    pub timestamp: i64,
    pub timeout: i64,
}

#[derive(Clone, Debug)]
pub struct BidRequested {
    pub auction_id: String,
    pub gdpr_consent: Option<ConsentPayload>,
    pub bids: Vec<BidRequest>,
}

/// One requested bid within a bid-requested event.
#[derive(Clone, Debug)]
pub struct BidRequest {
    pub ad_unit_code: String,
    pub bidder: String,
    pub sizes: Option<SizeList>,
    pub start_time: Option<i64>,
    pub source: Option<String>,
}

#[derive(Clone, Debug)]
pub struct BidAdjustment {
    pub auction_id: String,
    pub ad_unit_code: String,
    pub bidder: String,
    /// Response identifier, present when the adjustment derives from a
    /// concrete bid response. Required to reconcile late bids.
    pub ad_id: Option<String>,
    pub cpm: f64,
    pub width: Option<u64>,
    pub height: Option<u64>,
    pub media_type: Option<String>,
    pub request_timestamp: Option<i64>,
    pub response_timestamp: Option<i64>,
}

impl BidAdjustment {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn media_type(&self) -> String {
        self.media_type
            .clone()
            .unwrap_or_else(|| UNKNOWN_MEDIA_TYPE.to_owned())
    }
}

#[derive(Clone, derive_more::Debug)]
pub struct BidResponse {
    pub auction_id: String,
    pub ad_unit_code: String,
    pub bidder: String,
    pub ad_id: String,
    #[debug(ignore)]
    pub cpm_in_currency: Option<CpmConverter>,
}

#[derive(Clone, Debug)]
pub struct BidderDone {
    pub auction_id: String,
    pub bids: Vec<BidDone>,
}

#[derive(Clone, Debug)]
pub struct BidDone {
    pub ad_unit_code: String,
    pub bidder: String,
}

#[derive(Clone, Debug)]
pub struct AuctionEnd {
    pub auction_id: String,
}

#[derive(Clone, Debug)]
pub struct BidWon {
    pub auction_id: String,
    pub ad_unit_code: String,
    pub ad_id: String,
    pub bidder: String,
    pub cpm: f64,
    pub width: Option<u64>,
    pub height: Option<u64>,
    pub media_type: Option<String>,
}

impl BidWon {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn media_type(&self) -> String {
        self.media_type
            .clone()
            .unwrap_or_else(|| UNKNOWN_MEDIA_TYPE.to_owned())
    }
}
