use {
    crate::domain::auction::AdUnitCode,
    serde::{Deserialize, Serialize},
    std::time::Duration,
};

fn default_auction_ttl() -> Duration {
    crate::store::DEFAULT_AUCTION_TTL
}

fn default_enabled() -> bool {
    true
}

/// Adapter configuration, supplied once at initialization.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Ad unit codes to aggregate. Case-insensitive; empty aggregates every
    /// ad unit.
    #[serde(default)]
    pub ad_units: Vec<String>,

    /// Extra tags forwarded to the collector next to the version tag.
    #[serde(default)]
    pub tags: Vec<String>,

    /// API key forwarded to the collector.
    #[serde(default)]
    pub key: Option<String>,

    /// Host framework version reported in the tag set.
    #[serde(default)]
    pub version: Option<String>,

    /// How long auction records are kept from their start time.
    #[serde(with = "humantime_serde", default = "default_auction_ttl")]
    pub auction_ttl: Duration,

    /// Per-kind emission gates.
    #[serde(default)]
    pub events: EnabledEvents,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ad_units: Vec::new(),
            tags: Vec::new(),
            key: None,
            version: None,
            auction_ttl: default_auction_ttl(),
            events: EnabledEvents::default(),
        }
    }
}

impl Config {
    /// Lower-cases the allow-list so it matches the canonical code form.
    pub(crate) fn normalized(mut self) -> Self {
        for code in &mut self.ad_units {
            *code = code.to_lowercase();
        }
        self
    }

    /// Whether events for this ad unit should be aggregated.
    pub fn allows(&self, code: &AdUnitCode) -> bool {
        self.ad_units.is_empty()
            || self
                .ad_units
                .iter()
                .any(|allowed| allowed == code.as_str())
    }

    /// The tag set forwarded to the collector on startup.
    pub fn tags(&self) -> Vec<String> {
        let version = self
            .version
            .clone()
            .unwrap_or_else(|| "unknown".to_owned());
        ["version".to_owned(), version]
            .into_iter()
            .chain(self.tags.iter().cloned())
            .collect()
    }
}

/// One flag per outbound event kind; everything is reported by default.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct EnabledEvents {
    #[serde(default = "default_enabled")]
    pub auction: bool,
    #[serde(default = "default_enabled")]
    pub impression: bool,
    #[serde(default = "default_enabled")]
    pub bid_after_timeout: bool,
}

impl Default for EnabledEvents {
    fn default() -> Self {
        Self {
            auction: true,
            impression: true,
            bid_after_timeout: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_full_configuration() {
        let toml = r#"
        ad-units = ["Div1", "div2"]
        tags = ["site:news"]
        key = "k-123"
        version = "9.7.0"
        auction-ttl = "30m"

        [events]
        impression = false
        "#;

        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.ad_units, vec!["Div1", "div2"]);
        assert_eq!(config.key.as_deref(), Some("k-123"));
        assert_eq!(config.auction_ttl, Duration::from_secs(30 * 60));
        assert!(config.events.auction);
        assert!(!config.events.impression);
        assert!(config.events.bid_after_timeout);
    }

    #[test]
    fn every_field_has_a_default() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.ad_units.is_empty());
        assert_eq!(config.auction_ttl, Duration::from_secs(60 * 60));
        assert!(config.events.auction);
        assert!(config.events.impression);
        assert!(config.events.bid_after_timeout);
    }

    #[test]
    fn empty_allow_list_allows_everything() {
        let config = Config::default();
        assert!(config.allows(&AdUnitCode::from("anything")));
    }

    #[test]
    fn allow_list_is_case_insensitive() {
        let config = Config {
            ad_units: vec!["Banner-300x250".to_owned()],
            ..Default::default()
        }
        .normalized();
        assert!(config.allows(&AdUnitCode::from("BANNER-300x250")));
        assert!(!config.allows(&AdUnitCode::from("other")));
    }

    #[test]
    fn tag_set_starts_with_the_version() {
        let config = Config {
            tags: vec!["site:news".to_owned()],
            version: Some("9.7.0".to_owned()),
            ..Default::default()
        };
        assert_eq!(config.tags(), vec!["version", "9.7.0", "site:news"]);

        let unversioned = Config::default();
        assert_eq!(unversioned.tags(), vec!["version", "unknown"]);
    }
}
