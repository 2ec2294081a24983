//! Destination descriptors and the ordered registry
//!
//! Descriptors are pure data: which destinations exist, whether they need a
//! browser session, and a free-form parameter bag (entry URLs, group names,
//! locator overrides). Locator strings live here and not in code because the
//! third-party pages change without notice.

use serde::Deserialize;
use toml::Table;

/// Configuration of a single publishing destination.
#[derive(Debug, Clone, Deserialize)]
pub struct DestinationDescriptor {
    /// Stable identifier; selects the handler and the profile directory
    pub key: String,
    /// Display name for logs and the UI layer
    pub display_name: String,
    /// Whether uploading drives a real browser session
    #[serde(default)]
    pub requires_browser_session: bool,
    /// Disabled destinations are skipped without producing an outcome
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Destination-specific parameters
    #[serde(default)]
    pub parameters: Table,
}

fn default_enabled() -> bool {
    true
}

impl DestinationDescriptor {
    /// String parameter lookup.
    pub fn param_str(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).and_then(|v| v.as_str())
    }

    /// String parameter with a fallback default.
    pub fn param_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.param_str(name).unwrap_or(default)
    }

    /// Browser profile name for this destination. Each destination gets its
    /// own isolated profile unless the descriptor says otherwise.
    pub fn profile_name(&self) -> &str {
        self.param_or("profile", &self.key)
    }
}

/// Ordered, read-only list of destination descriptors.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DestinationRegistry {
    #[serde(rename = "destination", default)]
    pub destinations: Vec<DestinationDescriptor>,
}

impl DestinationRegistry {
    pub fn get(&self, key: &str) -> Option<&DestinationDescriptor> {
        self.destinations.iter().find(|d| d.key == key)
    }

    /// Keys of all enabled destinations, in registry order.
    pub fn enabled_keys(&self) -> Vec<&str> {
        self.destinations
            .iter()
            .filter(|d| d.enabled)
            .map(|d| d.key.as_str())
            .collect()
    }

    /// The built-in destination list, used when no TOML override is given.
    pub fn builtin() -> Self {
        let mut destinations = Vec::new();

        let mut rutube = Table::new();
        rutube.insert(
            "entry_url".to_string(),
            toml::Value::String("https://studio.rutube.ru/uploader/".to_string()),
        );
        destinations.push(DestinationDescriptor {
            key: "rutube".to_string(),
            display_name: "Rutube".to_string(),
            requires_browser_session: true,
            enabled: true,
            parameters: rutube,
        });

        let mut vk = Table::new();
        vk.insert(
            "group".to_string(),
            toml::Value::String("club0".to_string()),
        );
        destinations.push(DestinationDescriptor {
            key: "vk".to_string(),
            display_name: "VK".to_string(),
            requires_browser_session: true,
            enabled: true,
            parameters: vk,
        });

        destinations.push(DestinationDescriptor {
            key: "telegram".to_string(),
            display_name: "Telegram".to_string(),
            requires_browser_session: false,
            enabled: true,
            parameters: Table::new(),
        });

        // Present but disabled until their handlers land.
        for (key, name) in [
            ("youtube", "YouTube"),
            ("pinterest", "Pinterest"),
            ("tiktok", "TikTok"),
        ] {
            destinations.push(DestinationDescriptor {
                key: key.to_string(),
                display_name: name.to_string(),
                requires_browser_session: key == "youtube",
                enabled: false,
                parameters: Table::new(),
            });
        }

        Self { destinations }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_order_is_stable() {
        let registry = DestinationRegistry::builtin();
        assert_eq!(registry.enabled_keys(), vec!["rutube", "vk", "telegram"]);
        assert!(registry.get("tiktok").is_some_and(|d| !d.enabled));
        assert!(registry.get("nope").is_none());
    }

    #[test]
    fn profile_name_defaults_to_key() {
        let registry = DestinationRegistry::builtin();
        let rutube = registry.get("rutube").unwrap();
        assert_eq!(rutube.profile_name(), "rutube");
        assert_eq!(
            rutube.param_str("entry_url"),
            Some("https://studio.rutube.ru/uploader/")
        );
    }
}
