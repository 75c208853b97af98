use {
    crate::{
        config::EnabledEvents,
        domain::{
            auction::Auction,
            report::{BidAfterTimeout, Impression},
        },
        infra::observe,
    },
    anyhow::Result,
    std::sync::Arc,
};

/// The external analytics collector. Implementations own transport and wire
/// format; the aggregator only hands over finished snapshots.
#[cfg_attr(test, mockall::automock)]
pub trait Collector: Send + Sync {
    fn add_tags(&self, tags: &[String]) -> Result<()>;
    fn set_key(&self, key: &str) -> Result<()>;
    fn auction(&self, auction: &Auction) -> Result<()>;
    fn impression(&self, impression: &Impression) -> Result<()>;
    fn bid_after_timeout(&self, bid: &BidAfterTimeout) -> Result<()>;
}

/// Outbound event kinds, each independently gated by configuration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Kind {
    Auction,
    Impression,
    BidAfterTimeout,
}

/// Best-effort emission to the collector. A failed delivery is logged and
/// dropped; the in-memory records are unaffected and processing continues.
pub struct Emitter {
    collector: Arc<dyn Collector>,
    enabled: EnabledEvents,
}

impl Emitter {
    pub fn new(collector: Arc<dyn Collector>, enabled: EnabledEvents) -> Self {
        Self { collector, enabled }
    }

    pub fn auction(&self, auction: &Auction) {
        if !self.enabled.auction {
            return;
        }
        self.report(Kind::Auction, self.collector.auction(auction));
    }

    pub fn impression(&self, impression: &Impression) {
        if !self.enabled.impression {
            return;
        }
        self.report(Kind::Impression, self.collector.impression(impression));
    }

    pub fn bid_after_timeout(&self, bid: &BidAfterTimeout) {
        if !self.enabled.bid_after_timeout {
            return;
        }
        self.report(Kind::BidAfterTimeout, self.collector.bid_after_timeout(bid));
    }

    fn report(&self, kind: Kind, result: Result<()>) {
        match result {
            Ok(()) => observe::emitted(kind),
            Err(err) => observe::collector_unavailable(kind, &err),
        }
    }
}
