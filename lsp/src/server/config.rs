use ms_core::RuntimeConfig;
use serde_json::Value;
use tower_lsp::lsp_types::ConfigurationItem;
use tracing::{debug, warn};

use super::state::MsLanguageServer;

pub(crate) const CONFIG_SECTION: &str = "ms";

impl MsLanguageServer {
    /// Pulls the `ms` section from the client; keeps the current settings when unavailable.
    pub(crate) async fn load_config(&self) {
        let items = vec![ConfigurationItem {
            scope_uri: None,
            section: Some(CONFIG_SECTION.to_string()),
        }];

        match self.client.configuration(items).await {
            Ok(values) => {
                if let Some(val) = values.into_iter().next() {
                    self.apply_config_value(val);
                }
            }
            Err(err) => debug!("workspace/configuration unavailable: {err}"),
        }
    }

    /// Settings pushed with `didChangeConfiguration`, either bare or nested under `ms`.
    pub(crate) fn apply_pushed_settings(&self, settings: Value) -> bool {
        let section = match settings {
            Value::Object(mut map) if map.contains_key(CONFIG_SECTION) => map.remove(CONFIG_SECTION),
            Value::Null => None,
            other => Some(other),
        };
        match section {
            Some(val) => self.apply_config_value(val),
            None => false,
        }
    }

    fn apply_config_value(&self, val: Value) -> bool {
        if val.is_null() {
            return false;
        }
        match RuntimeConfig::from_json(val) {
            Ok(cfg) => {
                debug!(?cfg, "configuration updated");
                if let Ok(mut guard) = self.config.lock() {
                    *guard = cfg;
                }
                true
            }
            Err(err) => {
                warn!("ignoring invalid ms configuration: {err:#}");
                false
            }
        }
    }
}
