use std::{
    env,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::{model::MAX_TRIAL_DAYS, Config, ConfigError};

/// Environment variable overriding [`Config::data_root`].
pub const DATA_DIR_ENV: &str = "TALLY_DATA_DIR";
const TMP_SUFFIX: &str = "tmp";

/// Handles persistence for [`Config`].
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        fs::create_dir_all(&base)?;
        Ok(Self::new(base.join("config.json")))
    }

    /// Manager for the per-user config directory, `<config dir>/tally/config.json`.
    pub fn default_location() -> Result<Self, ConfigError> {
        let base = dirs::config_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::with_base_dir(base.join("tally"))
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Loads the stored config, falling back to defaults, then applies
    /// environment overrides.
    pub fn load(&self) -> Result<Config, ConfigError> {
        let mut config = if self.config_path.exists() {
            let data = fs::read_to_string(&self.config_path)?;
            serde_json::from_str(&data).map_err(|err| ConfigError::Serde(err.to_string()))?
        } else {
            Config::default()
        };
        apply_env_overrides(&mut config, |key| env::var(key).ok());
        validate(&config)?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        validate(config)?;
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)
            .map_err(|err| ConfigError::Serde(err.to_string()))?;
        let tmp = tmp_path(&self.config_path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.config_path)?;
        Ok(())
    }
}

pub(crate) fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(dir) = lookup(DATA_DIR_ENV).filter(|value| !value.trim().is_empty()) {
        config.data_root = Some(PathBuf::from(dir));
    }
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.trial_days > MAX_TRIAL_DAYS {
        return Err(ConfigError::Invalid(format!(
            "trial_days must be at most {MAX_TRIAL_DAYS}, got {}",
            config.trial_days
        )));
    }
    if config.currency.trim().is_empty() {
        return Err(ConfigError::Invalid("currency cannot be empty".into()));
    }
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_override_replaces_data_root() {
        let mut config = Config::default();
        apply_env_overrides(&mut config, |key| {
            (key == DATA_DIR_ENV).then(|| "/tmp/tally-data".to_string())
        });
        assert_eq!(config.data_root, Some(PathBuf::from("/tmp/tally-data")));
    }

    #[test]
    fn blank_env_override_is_ignored() {
        let mut config = Config::default();
        apply_env_overrides(&mut config, |_| Some("   ".to_string()));
        assert_eq!(config.data_root, None);
    }

    #[test]
    fn tmp_path_appends_suffix() {
        assert_eq!(
            tmp_path(Path::new("/a/config.json")),
            PathBuf::from("/a/config.json.tmp")
        );
    }
}
