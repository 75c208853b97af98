pub mod catalog;
pub mod collector;
pub mod observe;

pub use {catalog::AdUnitCatalog, collector::Collector};
