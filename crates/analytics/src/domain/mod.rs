pub mod auction;
pub mod consent;
pub mod event;
pub mod report;

pub use {
    auction::{AdUnit, Auction, Bidder},
    event::Event,
};
