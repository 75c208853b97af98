use {
    crate::domain::auction::{Auction, AuctionId},
    std::{collections::HashMap, time::Duration},
};

/// Auctions are dropped this long after their start regardless of
/// completion state, bounding memory on pages whose auctions never finish.
pub const DEFAULT_AUCTION_TTL: Duration = Duration::from_secs(60 * 60);

/// Owns every live auction record. One store per adapter instance; all
/// mutation goes through the owning adapter, which the host drives from a
/// single thread.
#[derive(Debug)]
pub struct AuctionStore {
    auctions: HashMap<AuctionId, Auction>,
    ttl: Duration,
}

impl AuctionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            auctions: HashMap::new(),
            ttl,
        }
    }

    pub fn insert(&mut self, auction: Auction) {
        self.auctions.insert(auction.id.clone(), auction);
    }

    pub fn get(&self, id: &AuctionId) -> Option<&Auction> {
        self.auctions.get(id)
    }

    pub fn get_mut(&mut self, id: &AuctionId) -> Option<&mut Auction> {
        self.auctions.get_mut(id)
    }

    pub fn remove(&mut self, id: &AuctionId) -> Option<Auction> {
        self.auctions.remove(id)
    }

    /// Drops every auction older than the TTL. Linear in live auctions,
    /// whose count is bounded by the concurrent auctions on a page.
    pub fn evict_expired(&mut self, now: i64) {
        let ttl = i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX);
        self.auctions.retain(|id, auction| {
            let live = now - auction.start <= ttl;
            if !live {
                tracing::debug!(%id, "evicting expired auction");
            }
            live
        });
    }

    pub fn len(&self) -> usize {
        self.auctions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.auctions.is_empty()
    }
}

impl Default for AuctionStore {
    fn default() -> Self {
        Self::new(DEFAULT_AUCTION_TTL)
    }
}
