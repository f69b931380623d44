//! Tracing / logging initialisation helpers.
//!
//! The library itself only emits `tracing` events; binaries call
//! [`init_tracing`] once to install a subscriber.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log level per component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Global default level: "trace" | "debug" | "info" | "warn" | "error"
    #[serde(default = "default_level")]
    pub level: String,
    /// Override per component: crate name → level
    #[serde(default)]
    pub components: HashMap<String, String>,
    /// Emit JSON structured logs (true) or human-readable text (false)
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            components: HashMap::new(),
            json: false,
        }
    }
}

impl LogConfig {
    /// Set the level for one component, e.g. `("chaincall-rpc", "debug")`.
    pub fn with_component(mut self, component: impl Into<String>, level: impl Into<String>) -> Self {
        self.components.insert(component.into(), level.into());
        self
    }

    /// The `EnvFilter` directive string: `"info,chaincall_rpc=debug"` etc.
    pub fn directives(&self) -> String {
        let mut names: Vec<_> = self.components.keys().collect();
        names.sort();
        let mut directives = self.level.clone();
        for component in names {
            directives.push_str(&format!(
                ",{}={}",
                component.replace('-', "_"),
                self.components[component]
            ));
        }
        directives
    }
}

/// Initialise tracing with the given log config.
///
/// Invalid directives fall back to `info`. Does nothing if a global
/// subscriber is already installed.
pub fn init_tracing(config: &LogConfig) {
    let filter = EnvFilter::try_new(config.directives()).unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .try_init()
    };
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_include_sorted_components() {
        let cfg = LogConfig::default()
            .with_component("chaincall-rpc", "debug")
            .with_component("chaincall", "trace");
        assert_eq!(cfg.directives(), "info,chaincall=trace,chaincall_rpc=debug");
    }

    #[test]
    fn deserialises_with_defaults() {
        let cfg: LogConfig = serde_json::from_str(r#"{"json": true}"#).unwrap();
        assert_eq!(cfg.level, "info");
        assert!(cfg.json);
        assert!(cfg.components.is_empty());
    }

    #[test]
    fn init_twice_is_harmless() {
        init_tracing(&LogConfig::default());
        init_tracing(&LogConfig::default());
    }
}
