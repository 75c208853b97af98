use {
    super::consent::ConsentState,
    serde::Serialize,
    std::collections::HashMap,
};

/// Media type reported when a bid never declared one.
pub const UNKNOWN_MEDIA_TYPE: &str = "-";

/// Origin assumed for bid requests that do not state one.
pub const DEFAULT_SOURCE: &str = "client";

/// Opaque auction identifier assigned by the host framework.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, derive_more::Display)]
#[display("{_0}")]
pub struct AuctionId(pub String);

impl From<&str> for AuctionId {
    fn from(inner: &str) -> Self {
        Self(inner.to_owned())
    }
}

impl From<String> for AuctionId {
    fn from(inner: String) -> Self {
        Self(inner)
    }
}

/// Canonical, lower-cased form of an ad unit code. Every store lookup uses
/// this form, so case variants of the same code never split into separate
/// records.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, derive_more::Display)]
#[display("{_0}")]
pub struct AdUnitCode(String);

impl AdUnitCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AdUnitCode {
    fn from(raw: &str) -> Self {
        Self(raw.to_lowercase())
    }
}

/// Canonical, lower-cased bidder code.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, derive_more::Display)]
#[display("{_0}")]
pub struct BidderCode(String);

impl BidderCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BidderCode {
    fn from(raw: &str) -> Self {
        Self(raw.to_lowercase())
    }
}

/// Identifier the host assigns to one bid response. Disambiguates bidders
/// that respond more than once within the same ad unit.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, derive_more::Display)]
#[display("{_0}")]
pub struct ResponseId(String);

impl From<&str> for ResponseId {
    fn from(raw: &str) -> Self {
        Self(raw.to_lowercase())
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Size {
    pub width: u64,
    pub height: u64,
}

impl Size {
    pub fn new(width: Option<u64>, height: Option<u64>) -> Self {
        Self {
            width: width.unwrap_or(0),
            height: height.unwrap_or(0),
        }
    }
}

/// Ad unit size declarations arrive either as a single flat `[w, h]` pair or
/// as a list of such pairs.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SizeList {
    Single([u64; 2]),
    Many(Vec<[u64; 2]>),
}

impl SizeList {
    /// Flattens to `"WxH"` labels in declaration order.
    pub fn labels(&self) -> Vec<String> {
        match self {
            Self::Single([width, height]) => vec![format!("{width}x{height}")],
            Self::Many(sizes) => sizes
                .iter()
                .map(|[width, height]| format!("{width}x{height}"))
                .collect(),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AdUnitStatus {
    Running,
    Finished,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BidderStatus {
    Requested,
    Bid,
    NoBid,
    Timeout,
}

impl BidderStatus {
    /// A bid value of exactly 0 is the explicit no-bid marker.
    pub fn from_cpm(cpm: f64) -> Self {
        if cpm == 0.0 { Self::NoBid } else { Self::Bid }
    }
}

/// One auction run, aggregated from lifecycle events until reported or
/// evicted.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Auction {
    pub id: AuctionId,
    pub start: i64,
    pub timeout: i64,
    /// 0 until the auction-end event is processed.
    pub finish: i64,
    /// Computed on the first bid-request event and frozen thereafter.
    #[serde(rename = "gdpr_consent", skip_serializing_if = "Option::is_none")]
    pub consent: Option<ConsentState>,
    pub ad_units: HashMap<AdUnitCode, AdUnit>,
}

impl Auction {
    pub fn new(id: AuctionId, start: i64, timeout: i64) -> Self {
        Self {
            id,
            start,
            timeout,
            finish: 0,
            consent: None,
            ad_units: HashMap::new(),
        }
    }

    pub fn finished(&self) -> bool {
        self.finish != 0
    }
}

/// One ad slot competed for within an auction. Never deleted individually;
/// it only goes away with the whole auction record.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdUnit {
    #[serde(rename = "adUnit")]
    pub code: AdUnitCode,
    pub ad_unit_path: String,
    pub ad_unit_sizes: Vec<String>,
    pub start: i64,
    pub timeout: i64,
    pub finish: i64,
    pub status: AdUnitStatus,
    pub bidders: HashMap<BidderCode, Bidder>,
    /// Owning auction id, re-stamped whenever a reporting event touches this
    /// record.
    #[serde(rename = "id", skip_serializing_if = "Option::is_none")]
    pub auction_id: Option<AuctionId>,
    #[serde(rename = "gdpr_consent", skip_serializing_if = "Option::is_none")]
    pub consent: Option<ConsentState>,
}

impl AdUnit {
    pub fn new(auction: &Auction, code: AdUnitCode, path: String, sizes: Vec<String>) -> Self {
        Self {
            code,
            ad_unit_path: path,
            ad_unit_sizes: sizes,
            start: auction.start,
            timeout: auction.timeout,
            finish: 0,
            status: AdUnitStatus::Running,
            bidders: HashMap::new(),
            auction_id: Some(auction.id.clone()),
            consent: auction.consent,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.status == AdUnitStatus::Finished
    }

    /// Finalizes the ad unit: stamps the finish time and times out every
    /// bidder that never left REQUESTED. Transitions to FINISHED exactly
    /// once; the caller guards against repeats.
    pub fn mark_finished(&mut self, at: i64) {
        self.finish = at;
        self.status = AdUnitStatus::Finished;
        for bidder in self.bidders.values_mut() {
            if bidder.status == BidderStatus::Requested {
                bidder.status = BidderStatus::Timeout;
            }
        }
    }

    /// Finds the bidder matching both the bidder code and the response id.
    /// Timing races can reference a bidder that was never fully recorded, so
    /// absence is expected and not an error.
    pub fn find_bidder(&self, code: &BidderCode, response_id: &ResponseId) -> Option<&Bidder> {
        self.bidders
            .values()
            .find(|bidder| bidder.code == *code && bidder.response_id.as_ref() == Some(response_id))
    }

    pub fn find_bidder_mut(
        &mut self,
        code: &BidderCode,
        response_id: &ResponseId,
    ) -> Option<&mut Bidder> {
        self.bidders
            .values_mut()
            .find(|bidder| bidder.code == *code && bidder.response_id.as_ref() == Some(response_id))
    }
}

/// One bidder's participation in one ad unit's auction.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bidder {
    #[serde(rename = "bidder")]
    pub code: BidderCode,
    /// Assigned once a response is observed.
    #[serde(rename = "adId", skip_serializing_if = "Option::is_none")]
    pub response_id: Option<ResponseId>,
    /// Whether the winning value was established after the ad unit finished.
    pub is_after_timeout: bool,
    pub start: i64,
    pub finish: i64,
    pub status: BidderStatus,
    /// -1 until a bid adjustment sets a value; 0 is an explicit no-bid.
    pub cpm: f64,
    pub size: Size,
    pub media_type: String,
    pub source: String,
}

impl Bidder {
    pub fn new(code: BidderCode, start: i64, source: Option<String>) -> Self {
        Self {
            code,
            response_id: None,
            is_after_timeout: false,
            start,
            finish: 0,
            status: BidderStatus::Requested,
            cpm: -1.0,
            size: Size::default(),
            media_type: UNKNOWN_MEDIA_TYPE.to_owned(),
            source: source.unwrap_or_else(|| DEFAULT_SOURCE.to_owned()),
        }
    }

    /// Applies a bid value that beats the current one. The caller checks the
    /// last-highest-wins condition; this only writes the fields.
    pub fn record_bid(&mut self, cpm: f64, size: Size, media_type: String, finish: i64) {
        self.cpm = cpm;
        self.finish = finish;
        self.size = size;
        self.media_type = media_type;
        self.status = BidderStatus::from_cpm(cpm);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_canonicalized_to_lower_case() {
        assert_eq!(
            AdUnitCode::from("Banner-300x250"),
            AdUnitCode::from("banner-300x250")
        );
        assert_eq!(BidderCode::from("AppNexus").as_str(), "appnexus");
        assert_eq!(ResponseId::from("AD-1"), ResponseId::from("ad-1"));
    }

    #[test]
    fn size_list_flattens_both_shapes() {
        assert_eq!(SizeList::Single([300, 250]).labels(), vec!["300x250"]);
        assert_eq!(
            SizeList::Many(vec![[300, 250], [728, 90]]).labels(),
            vec!["300x250", "728x90"]
        );
        assert_eq!(SizeList::Many(vec![]).labels(), Vec::<String>::new());
    }

    #[test]
    fn bidder_status_from_cpm() {
        assert_eq!(BidderStatus::from_cpm(0.0), BidderStatus::NoBid);
        assert_eq!(BidderStatus::from_cpm(0.01), BidderStatus::Bid);
    }

    #[test]
    fn find_bidder_requires_both_code_and_response_id() {
        let auction = Auction::new(AuctionId::from("a-1"), 1_000, 2_000);
        let mut ad_unit = AdUnit::new(
            &auction,
            AdUnitCode::from("div1"),
            "/1234/div1".to_owned(),
            vec!["300x250".to_owned()],
        );
        let mut bidder = Bidder::new(BidderCode::from("x"), 1_000, None);
        bidder.response_id = Some(ResponseId::from("ad-1"));
        ad_unit.bidders.insert(bidder.code.clone(), bidder);

        let code = BidderCode::from("x");
        assert!(
            ad_unit
                .find_bidder(&code, &ResponseId::from("ad-1"))
                .is_some()
        );
        assert!(
            ad_unit
                .find_bidder(&code, &ResponseId::from("ad-2"))
                .is_none()
        );
        assert!(
            ad_unit
                .find_bidder(&BidderCode::from("y"), &ResponseId::from("ad-1"))
                .is_none()
        );
    }

    #[test]
    fn mark_finished_times_out_only_requested_bidders() {
        let auction = Auction::new(AuctionId::from("a-1"), 1_000, 2_000);
        let mut ad_unit = AdUnit::new(
            &auction,
            AdUnitCode::from("div1"),
            String::new(),
            Vec::new(),
        );
        let mut answered = Bidder::new(BidderCode::from("x"), 1_000, None);
        answered.record_bid(1.5, Size::new(Some(300), Some(250)), "banner".to_owned(), 1_500);
        ad_unit.bidders.insert(answered.code.clone(), answered);
        let silent = Bidder::new(BidderCode::from("y"), 1_000, None);
        ad_unit.bidders.insert(silent.code.clone(), silent);

        ad_unit.mark_finished(3_000);

        assert!(ad_unit.is_finished());
        assert_eq!(ad_unit.finish, 3_000);
        assert_eq!(
            ad_unit.bidders[&BidderCode::from("x")].status,
            BidderStatus::Bid
        );
        assert_eq!(
            ad_unit.bidders[&BidderCode::from("y")].status,
            BidderStatus::Timeout
        );
    }

    #[test]
    fn records_serialize_with_collector_field_names() {
        let mut auction = Auction::new(AuctionId::from("a-1"), 1_000, 2_000);
        auction.consent = Some(ConsentState::Consent);
        let mut ad_unit = AdUnit::new(
            &auction,
            AdUnitCode::from("div1"),
            "/1234/div1".to_owned(),
            vec!["300x250".to_owned()],
        );
        let mut bidder = Bidder::new(BidderCode::from("x"), 1_000, None);
        bidder.record_bid(1.5, Size::new(Some(300), Some(250)), "banner".to_owned(), 1_500);
        ad_unit.bidders.insert(bidder.code.clone(), bidder);
        auction.ad_units.insert(ad_unit.code.clone(), ad_unit);

        let json = serde_json::to_value(&auction).unwrap();
        assert_eq!(json["gdpr_consent"], 1);
        let ad_unit = &json["adUnits"]["div1"];
        assert_eq!(ad_unit["adUnit"], "div1");
        assert_eq!(ad_unit["adUnitPath"], "/1234/div1");
        assert_eq!(ad_unit["adUnitSizes"][0], "300x250");
        assert_eq!(ad_unit["status"], "running");
        let bidder = &ad_unit["bidders"]["x"];
        assert_eq!(bidder["bidder"], "x");
        assert_eq!(bidder["status"], "bid");
        assert_eq!(bidder["isAfterTimeout"], false);
        assert_eq!(bidder["mediaType"], "banner");
        assert_eq!(bidder["size"]["width"], 300);
        assert_eq!(bidder["source"], "client");
    }
}
