use {crate::domain::auction::AdUnitCode, std::collections::HashMap};

/// The host's catalog of configured ad units. Injected so the aggregator
/// can resolve slot paths without reaching into host globals.
#[cfg_attr(test, mockall::automock)]
pub trait AdUnitCatalog: Send + Sync {
    /// The publisher-configured path for an ad unit, if the host knows it.
    fn ad_unit_path(&self, code: &AdUnitCode) -> Option<String>;
}

/// Fixed in-memory catalog for hosts that configure their ad units up
/// front.
#[derive(Clone, Debug, Default)]
pub struct StaticCatalog(HashMap<AdUnitCode, String>);

impl StaticCatalog {
    pub fn new(paths: HashMap<AdUnitCode, String>) -> Self {
        Self(paths)
    }
}

impl AdUnitCatalog for StaticCatalog {
    fn ad_unit_path(&self, code: &AdUnitCode) -> Option<String> {
        self.0.get(code).cloned()
    }
}
