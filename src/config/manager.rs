use crate::config::models::GlobalConfig;
use crate::config::settings::{SettingInfo, SettingKey, SettingValue};
use crate::constants;
use crate::error::Error;
use crate::fs::{FileSystem, OsFileSystem};
use std::path::{Path, PathBuf};

pub struct ConfigManager<F: FileSystem> {
    fs: F,
    config_dir: PathBuf,
}

impl ConfigManager<OsFileSystem> {
    /// Creates a new `ConfigManager` with the default filesystem and config directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, Error> {
        let config_dir = get_config_dir()?;
        Ok(Self {
            fs: OsFileSystem,
            config_dir,
        })
    }
}

impl<F: FileSystem> ConfigManager<F> {
    pub const fn with_fs(fs: F, config_dir: PathBuf) -> Self {
        Self { fs, config_dir }
    }

    /// Get the configuration directory path
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    fn config_path(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILENAME)
    }

    /// Loads the global configuration from `config.toml`, falling back to
    /// defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read or
    /// parsed, or if a setting in it is out of range.
    pub fn load_global_config(&self) -> Result<GlobalConfig, Error> {
        let config_path = self.config_path();
        if !self.fs.exists(&config_path) {
            return Ok(GlobalConfig::default());
        }
        let content = self.fs.read_to_string(&config_path)?;
        let config: GlobalConfig = toml::from_str(&content).map_err(Error::invalid_config)?;
        // Hand-edited files get the same bounds as `config set`.
        SettingValue::parse_for_key(
            SettingKey::ResolverMaxPasses,
            &config.resolver.max_passes.to_string(),
        )?;
        Ok(config)
    }

    /// Sets a single setting, preserving the rest of the file (comments and
    /// formatting included).
    ///
    /// # Errors
    ///
    /// Returns an error if the existing file cannot be parsed, or if the
    /// result cannot be written.
    pub fn set_setting(&self, key: SettingKey, value: &SettingValue) -> Result<(), Error> {
        let config_path = self.config_path();
        let content = if self.fs.exists(&config_path) {
            self.fs.read_to_string(&config_path)?
        } else {
            String::new()
        };

        let mut doc = content
            .parse::<toml_edit::DocumentMut>()
            .map_err(Error::invalid_config)?;

        let (table, field) = key.toml_path();
        if !doc.contains_key(table) {
            doc[table] = toml_edit::table();
        }
        doc[table][field] = match value {
            SettingValue::U64(v) => {
                let v = i64::try_from(*v).map_err(|_| {
                    Error::setting_value_out_of_range(key, &v.to_string(), "value is too large")
                })?;
                toml_edit::value(v)
            }
            SettingValue::Bool(v) => toml_edit::value(*v),
        };

        let updated = doc.to_string();
        // Reject edits that would leave a file we cannot load back.
        toml::from_str::<GlobalConfig>(&updated)?;

        self.fs.create_dir_all(&self.config_dir)?;
        self.fs.write_all(&config_path, updated.as_bytes())?;
        tracing::debug!(key = %key, value = %value, path = %config_path.display(), "setting updated");
        Ok(())
    }

    /// Returns the current value of a setting.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded.
    pub fn get_setting(&self, key: SettingKey) -> Result<SettingValue, Error> {
        let config = self.load_global_config()?;
        Ok(key.value_from_config(&config))
    }

    /// Lists every setting with its current value.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded.
    pub fn list_settings(&self) -> Result<Vec<SettingInfo>, Error> {
        let config = self.load_global_config()?;
        Ok(SettingKey::ALL
            .iter()
            .map(|key| SettingInfo::new(*key, &key.value_from_config(&config)))
            .collect())
    }
}

/// Resolves the configuration directory: `$DOCSYNC_CONFIG_DIR` when set,
/// otherwise `~/.config/docsync`.
///
/// # Errors
///
/// Returns an error if neither is available.
pub fn get_config_dir() -> Result<PathBuf, Error> {
    if let Ok(dir) = std::env::var(constants::ENV_DOCSYNC_CONFIG_DIR) {
        return Ok(PathBuf::from(dir));
    }
    let home_dir = dirs::home_dir().ok_or_else(Error::home_directory_not_found)?;
    Ok(home_dir.join(".config").join(constants::CONFIG_DIR_NAME))
}
