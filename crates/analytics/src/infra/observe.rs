//! Logging for the events that are meaningful to the aggregator. These
//! functions are called where the corresponding events occur; they only log.

use {
    super::collector::Kind,
    crate::{
        adapter,
        config::Config,
        domain::{
            auction::{AdUnitCode, AuctionId, Bidder, BidderCode},
            event::Event,
        },
    },
};

/// Observe an adapter coming up with its effective configuration.
pub fn adapter_enabled(config: &Config) {
    tracing::info!(?config, "analytics adapter enabled");
}

/// Observe that forwarding tags and key to the collector failed. The
/// adapter still starts; snapshots are simply attributed without them.
pub fn collector_configuration_failed(err: &anyhow::Error) {
    tracing::error!(?err, "failed to forward tags and key to the collector");
}

/// Observe an inbound lifecycle event.
pub fn event(event: &Event) {
    tracing::trace!(kind = event.kind(), "received event");
}

/// Observe an event that was dropped because a record it references is not
/// in memory. Expected after eviction or out-of-order delivery.
pub fn skipped_event(err: &adapter::Error) {
    tracing::warn!(%err, "skipping event");
}

/// Observe a new bidder participation record.
pub fn bidder_requested(bidder: &Bidder) {
    tracing::debug!(?bidder, "bidder requested");
}

/// Observe a bid adjustment that targets an already-finished ad unit.
pub fn late_bid(id: &AuctionId, code: &AdUnitCode, bidder: &BidderCode) {
    tracing::debug!(%id, %code, %bidder, "bid arrived after ad unit finished");
}

/// Observe a repeated auction-end for an auction that is already terminal.
pub fn duplicate_auction_end(id: &AuctionId) {
    tracing::debug!(%id, "auction already finished, ignoring repeated end event");
}

/// Observe an auction reaching its end with reportable ad units.
pub fn auction_finished(id: &AuctionId) {
    tracing::debug!(%id, "auction finished");
}

/// Observe a failed conversion into the reporting currency. The previously
/// recorded bid value stays in place.
pub fn currency_conversion_failed(err: &anyhow::Error) {
    tracing::warn!(?err, "failed to convert bid value to the reporting currency");
}

/// Observe a snapshot handed to the collector.
pub fn emitted(kind: Kind) {
    tracing::debug!(?kind, "snapshot delivered to collector");
}

/// Observe a collector delivery failure. The snapshot is dropped; nothing
/// is retried.
pub fn collector_unavailable(kind: Kind, err: &anyhow::Error) {
    tracing::error!(?kind, ?err, "failed to deliver snapshot to collector");
}
