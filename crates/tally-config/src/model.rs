use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Length of the free trial granted at signup.
pub const DEFAULT_TRIAL_DAYS: u32 = 14;

/// Upper bound for configured trial lengths.
pub const MAX_TRIAL_DAYS: u32 = 365;

/// Stores application settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Currency code printed next to amounts.
    #[serde(default = "Config::default_currency")]
    pub currency: String,
    #[serde(default = "Config::default_trial_days")]
    pub trial_days: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional custom root for stored users and budgets. Defaults to `<data dir>/tally`.
    pub data_root: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Tracing filter directives, e.g. `tally=debug`. `RUST_LOG` takes precedence.
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency: Self::default_currency(),
            trial_days: Self::default_trial_days(),
            data_root: None,
            log_filter: None,
        }
    }
}

impl Config {
    pub fn default_currency() -> String {
        "USD".into()
    }

    pub fn default_trial_days() -> u32 {
        DEFAULT_TRIAL_DAYS
    }

    pub fn resolve_data_root(&self) -> PathBuf {
        if let Some(path) = &self.data_root {
            return path.clone();
        }

        let base = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        base.join("tally")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let cfg: Config = serde_json::from_str(r#"{"currency":"GBP"}"#).expect("parse");
        assert_eq!(cfg.currency, "GBP");
        assert_eq!(cfg.trial_days, DEFAULT_TRIAL_DAYS);
        assert_eq!(cfg.data_root, None);
    }

    #[test]
    fn empty_object_falls_back_to_usd() {
        let cfg: Config = serde_json::from_str("{}").expect("parse");
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn explicit_data_root_wins() {
        let cfg = Config {
            data_root: Some(PathBuf::from("/srv/tally")),
            ..Config::default()
        };
        assert_eq!(cfg.resolve_data_root(), PathBuf::from("/srv/tally"));
    }
}
