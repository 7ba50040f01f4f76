//! Router configuration.

use std::collections::HashMap;

use serde::Deserialize;

/// Initial configuration for a [`MappingRouter`](crate::MappingRouter).
///
/// Every field can be changed later through the router's mutators.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RouterConfig {
    /// Prepended to every destination name before resolution.
    pub prefix: Option<String>,
    /// Appended to every destination name before resolution.
    pub suffix: Option<String>,
    /// Whether an unresolvable destination name fails the routing call.
    pub resolution_required: bool,
    /// Routing key -> destination name.
    pub channel_mappings: HashMap<String, String>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            prefix: None,
            suffix: None,
            resolution_required: true,
            channel_mappings: HashMap::new(),
        }
    }
}

impl RouterConfig {
    /// Parses a configuration from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is not a valid configuration document.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let config: RouterConfig = serde_json::from_str(json)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn router_config_defaults() {
        let config = RouterConfig::default();
        assert!(config.prefix.is_none());
        assert!(config.suffix.is_none());
        assert!(config.resolution_required);
        assert!(config.channel_mappings.is_empty());
    }

    #[test]
    fn parse_full_config() {
        let json = r#"{
            "prefix": "app.",
            "suffix": ".in",
            "resolutionRequired": false,
            "channelMappings": { "us": "orders-us", "eu": "orders-eu" }
        }"#;
        let config = RouterConfig::from_json(json).unwrap();
        assert_eq!(config.prefix.as_deref(), Some("app."));
        assert_eq!(config.suffix.as_deref(), Some(".in"));
        assert!(!config.resolution_required);
        assert_eq!(config.channel_mappings.len(), 2);
        assert_eq!(config.channel_mappings["eu"], "orders-eu");
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config = RouterConfig::from_json(r#"{ "prefix": "p-" }"#).unwrap();
        assert_eq!(config.prefix.as_deref(), Some("p-"));
        assert!(config.resolution_required);
        assert!(config.channel_mappings.is_empty());
    }

    #[test]
    fn parse_invalid_json() {
        assert!(RouterConfig::from_json("not: json").is_err());
        assert!(RouterConfig::from_json(r#"{ "channelMappings": [1, 2] }"#).is_err());
    }
}
