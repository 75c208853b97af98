use {
    crate::{
        config::Config,
        domain::{
            auction::{
                AdUnit, AdUnitCode, Auction, AuctionId, Bidder, BidderCode, BidderStatus,
                ResponseId, SizeList,
            },
            consent,
            event::{
                AuctionEnd, AuctionInit, BidAdjustment, BidRequested, BidResponse, BidWon,
                BidderDone, Event,
            },
            report::{BidAfterTimeout, Impression},
        },
        infra::{
            catalog::AdUnitCatalog,
            collector::{Collector, Emitter},
            observe,
        },
        store::AuctionStore,
        time::now_millis,
    },
    std::sync::Arc,
    thiserror::Error,
};

/// The currency every reported bid value is normalized to.
pub const REPORTING_CURRENCY: &str = "USD";

/// Recoverable per-event failures. None of these disrupt processing of
/// subsequent events.
#[derive(Debug, Error)]
pub enum Error {
    #[error("no auction in memory for id {0}")]
    MissingAuction(AuctionId),
    #[error("no ad unit record {1} in auction {0}")]
    MissingAdUnit(AuctionId, AdUnitCode),
    #[error("no bidder record {2} for ad unit {1} in auction {0}")]
    MissingBidder(AuctionId, AdUnitCode, BidderCode),
}

/// Consumes host lifecycle events and incrementally builds normalized
/// auction records, reporting finished snapshots to the collector.
///
/// Event handling is synchronous and takes `&mut self`: hosts that can
/// deliver events concurrently must serialize their calls.
pub struct AnalyticsAdapter {
    config: Config,
    store: AuctionStore,
    catalog: Arc<dyn AdUnitCatalog>,
    emitter: Emitter,
}

impl AnalyticsAdapter {
    pub fn new(
        config: Config,
        catalog: Arc<dyn AdUnitCatalog>,
        collector: Arc<dyn Collector>,
    ) -> Self {
        let config = config.normalized();
        if let Err(err) = configure_collector(&config, collector.as_ref()) {
            observe::collector_configuration_failed(&err);
        }
        observe::adapter_enabled(&config);
        Self {
            store: AuctionStore::new(config.auction_ttl),
            emitter: Emitter::new(collector, config.events),
            catalog,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Applies one lifecycle event. Recoverable failures are logged and the
    /// event is skipped; nothing propagates to the caller.
    pub fn track(&mut self, event: Event) {
        observe::event(&event);
        let result = match event {
            Event::AuctionInit(event) => {
                self.handle_auction_init(event);
                Ok(())
            }
            Event::BidRequested(event) => self.handle_bid_requested(event),
            Event::BidAdjustment(event) => self.handle_bid_adjustment(event),
            Event::BidResponse(event) => self.handle_bid_response(event),
            Event::BidderDone(event) => self.handle_bidder_done(event),
            Event::AuctionEnd(event) => self.handle_auction_end(event),
            Event::BidWon(event) => self.handle_bid_won(event),
        };
        if let Err(err) = result {
            observe::skipped_event(&err);
        }
    }

    fn handle_auction_init(&mut self, event: AuctionInit) {
        self.store.insert(Auction::new(
            AuctionId::from(event.auction_id),
            event.timestamp,
            event.timeout,
        ));
        self.store.evict_expired(now_millis());
    }

    fn handle_bid_requested(&mut self, event: BidRequested) -> Result<(), Error> {
        let id = AuctionId::from(event.auction_id);
        let auction = self
            .store
            .get_mut(&id)
            .ok_or_else(|| Error::MissingAuction(id.clone()))?;

        // Computed on the first bid request and frozen for the rest of the
        // auction.
        if auction.consent.is_none() {
            auction.consent = Some(consent::classify(event.gdpr_consent.as_ref()));
        }

        let now = now_millis();
        for request in &event.bids {
            let code = AdUnitCode::from(request.ad_unit_code.as_str());
            if !self.config.allows(&code) {
                continue;
            }

            if !auction.ad_units.contains_key(&code) {
                let path = self.catalog.ad_unit_path(&code).unwrap_or_default();
                let sizes = request
                    .sizes
                    .as_ref()
                    .map(SizeList::labels)
                    .unwrap_or_default();
                let ad_unit = AdUnit::new(auction, code.clone(), path, sizes);
                auction.ad_units.insert(code.clone(), ad_unit);
            }
            let Some(ad_unit) = auction.ad_units.get_mut(&code) else {
                continue;
            };

            // First writer wins: a repeated request for the same pair never
            // resets an initialized record.
            let bidder_code = BidderCode::from(request.bidder.as_str());
            if !ad_unit.bidders.contains_key(&bidder_code) {
                let bidder = Bidder::new(
                    bidder_code.clone(),
                    request.start_time.unwrap_or(now),
                    request.source.clone(),
                );
                observe::bidder_requested(&bidder);
                ad_unit.bidders.insert(bidder_code, bidder);
            }
        }
        Ok(())
    }

    fn handle_bid_adjustment(&mut self, event: BidAdjustment) -> Result<(), Error> {
        let code = AdUnitCode::from(event.ad_unit_code.as_str());
        if !self.config.allows(&code) {
            return Ok(());
        }

        let id = AuctionId::from(event.auction_id.as_str());
        let auction = self
            .store
            .get_mut(&id)
            .ok_or_else(|| Error::MissingAuction(id.clone()))?;
        let auction_id = auction.id.clone();
        let consent = auction.consent;

        let ad_unit = auction
            .ad_units
            .get_mut(&code)
            .ok_or_else(|| Error::MissingAdUnit(id.clone(), code.clone()))?;
        // Reporting events re-stamp ownership on the ad unit record.
        ad_unit.auction_id = Some(auction_id);
        ad_unit.consent = consent;

        let bidder_code = BidderCode::from(event.bidder.as_str());
        if ad_unit.is_finished() {
            observe::late_bid(&id, &code, &bidder_code);
            let snapshot = BidAfterTimeout::new(ad_unit, &event);
            reconcile_late_bid(ad_unit, &event);
            self.emitter.bid_after_timeout(&snapshot);
            return Ok(());
        }

        let bidder = ad_unit
            .bidders
            .get_mut(&bidder_code)
            .ok_or_else(|| Error::MissingBidder(id, code, bidder_code))?;
        // Last-highest-wins: only a strictly higher value changes the
        // record.
        if event.cpm > bidder.cpm {
            bidder.record_bid(
                event.cpm,
                event.size(),
                event.media_type(),
                event.response_timestamp.unwrap_or_else(now_millis),
            );
        }
        Ok(())
    }

    fn handle_bid_response(&mut self, event: BidResponse) -> Result<(), Error> {
        let id = AuctionId::from(event.auction_id.as_str());
        let code = AdUnitCode::from(event.ad_unit_code.as_str());
        let bidder_code = BidderCode::from(event.bidder.as_str());

        let bidder = self
            .store
            .get_mut(&id)
            .ok_or_else(|| Error::MissingAuction(id.clone()))?
            .ad_units
            .get_mut(&code)
            .ok_or_else(|| Error::MissingAdUnit(id.clone(), code.clone()))?
            .bidders
            .get_mut(&bidder_code)
            .ok_or_else(|| Error::MissingBidder(id, code, bidder_code))?;

        bidder.response_id = Some(ResponseId::from(event.ad_id.as_str()));

        if let Some(convert) = &event.cpm_in_currency {
            match convert(REPORTING_CURRENCY) {
                Ok(cpm) => bidder.cpm = cpm,
                Err(err) => observe::currency_conversion_failed(&err),
            }
        }
        Ok(())
    }

    fn handle_bidder_done(&mut self, event: BidderDone) -> Result<(), Error> {
        let id = AuctionId::from(event.auction_id);
        let auction = self
            .store
            .get_mut(&id)
            .ok_or_else(|| Error::MissingAuction(id))?;
        let now = now_millis();

        for done in &event.bids {
            let code = AdUnitCode::from(done.ad_unit_code.as_str());
            if !self.config.allows(&code) {
                continue;
            }
            let Some(ad_unit) = auction.ad_units.get_mut(&code) else {
                continue;
            };
            if ad_unit.is_finished() {
                continue;
            }
            let bidder_code = BidderCode::from(done.bidder.as_str());
            let Some(bidder) = ad_unit.bidders.get_mut(&bidder_code) else {
                continue;
            };
            // Only a bidder that never answered counts as an explicit
            // no-bid here.
            if bidder.status != BidderStatus::Requested {
                continue;
            }
            bidder.finish = now;
            bidder.status = BidderStatus::NoBid;
            bidder.cpm = 0.0;
        }
        Ok(())
    }

    fn handle_auction_end(&mut self, event: AuctionEnd) -> Result<(), Error> {
        let id = AuctionId::from(event.auction_id);
        let auction = self
            .store
            .get_mut(&id)
            .ok_or_else(|| Error::MissingAuction(id.clone()))?;

        if auction.ad_units.is_empty() {
            // Nothing worth reporting ever joined this auction.
            self.store.remove(&id);
            return Ok(());
        }

        if auction.finished() {
            observe::duplicate_auction_end(&id);
            return Ok(());
        }

        let finish = now_millis();
        auction.finish = finish;
        for ad_unit in auction.ad_units.values_mut() {
            ad_unit.mark_finished(finish);
        }
        observe::auction_finished(&id);

        self.emitter.auction(auction);
        Ok(())
    }

    fn handle_bid_won(&mut self, event: BidWon) -> Result<(), Error> {
        let code = AdUnitCode::from(event.ad_unit_code.as_str());
        if !self.config.allows(&code) {
            return Ok(());
        }

        let id = AuctionId::from(event.auction_id.as_str());
        let auction = self
            .store
            .get_mut(&id)
            .ok_or_else(|| Error::MissingAuction(id.clone()))?;
        let auction_id = auction.id.clone();
        let consent = auction.consent;

        let ad_unit = auction
            .ad_units
            .get_mut(&code)
            .ok_or_else(|| Error::MissingAdUnit(id, code))?;
        ad_unit.auction_id = Some(auction_id);
        ad_unit.consent = consent;

        let impression = Impression::new(ad_unit, &event);
        self.emitter.impression(&impression);
        Ok(())
    }
}

fn configure_collector(config: &Config, collector: &dyn Collector) -> anyhow::Result<()> {
    collector.add_tags(&config.tags())?;
    if let Some(key) = &config.key {
        collector.set_key(key)?;
    }
    Ok(())
}

/// Retroactively upgrades the live bidder record when a late bid beats its
/// recorded value. The emitted snapshot is built beforehand, so it is not
/// affected by this. The bidder is matched by code and response id; an
/// unknown bidder leaves the live records untouched.
fn reconcile_late_bid(ad_unit: &mut AdUnit, event: &BidAdjustment) {
    let bidder_code = BidderCode::from(event.bidder.as_str());
    let Some(response_id) = event.ad_id.as_deref().map(ResponseId::from) else {
        return;
    };
    let Some(bidder) = ad_unit.find_bidder_mut(&bidder_code, &response_id) else {
        return;
    };
    if event.cpm > bidder.cpm {
        bidder.record_bid(
            event.cpm,
            event.size(),
            event.media_type(),
            event.response_timestamp.unwrap_or_else(now_millis),
        );
        bidder.is_after_timeout = true;
    }
}
