use std::{env, fs, path::Path, str::FromStr, sync::Arc};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{Result, directory::SearchOptions, fs::config_dir};

const CURRENT_CONFIG_VERSION: u16 = 1;
const FILE_NAME: &str = "kenavo.toml";

/// Handle to the core configuration. Built once at startup and handed to whatever needs it.
pub type Cfg = Arc<RwLock<CoreConfig>>;

/// The core configuration, serialized to TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub version: u16,
    pub api: ApiConfig,
    pub gallery: GalleryConfig,
    pub search: SearchOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Root URL of the site, e.g. `https://kenavo.example`
    pub base_url: Option<String>,
    /// Anonymous key for the hosted REST tables
    pub key: Option<String>,
    pub profiles_table: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    /// Path of the paginated album endpoint, relative to `api.base_url`
    pub endpoint: String,
    pub page_size: u32,
    /// Number of pages the viewport trigger may fetch before a manual "load more" is needed
    pub auto_load_ceiling: u32,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            version: CURRENT_CONFIG_VERSION,
            api: ApiConfig::default(),
            gallery: GalleryConfig::default(),
            search: SearchOptions::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            key: None,
            profiles_table: "profiles".to_string(),
        }
    }
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            endpoint: "/api/gallery/albums".to_string(),
            page_size: 12,
            auto_load_ceiling: 3,
        }
    }
}

impl CoreConfig {
    /// Load the configuration from the user's config directory, writing the defaults there
    /// first if no file exists yet. Environment overrides are applied on top.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::load_from(&config_dir()?.join(FILE_NAME))?;
        cfg.apply_overrides(|key| env::var(key).ok());
        Ok(cfg)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)?;
            let cfg: Self = toml::from_str(&contents)?;
            if cfg.version > CURRENT_CONFIG_VERSION {
                warn!(
                    "Config version {} is newer than supported version {CURRENT_CONFIG_VERSION}",
                    cfg.version
                );
            }
            Ok(cfg)
        } else {
            let cfg = Self::default();
            cfg.save_to(path)?;
            debug!("Wrote default configuration to {}", path.display());
            Ok(cfg)
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&config_dir()?.join(FILE_NAME))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let contents = self.to_toml()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, contents)?;

        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Apply `KENAVO_*` overrides. `lookup` resolves a variable name to its value.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("KENAVO_API_URL") {
            self.api.base_url = Some(url);
        }
        if let Some(key) = lookup("KENAVO_API_KEY") {
            self.api.key = Some(key);
        }
        if let Some(size) = lookup("KENAVO_PAGE_SIZE") {
            parse_override("KENAVO_PAGE_SIZE", &size, &mut self.gallery.page_size);
        }
    }

    /// Wrap this configuration in a shareable handle.
    pub fn into_handle(self) -> Cfg {
        Arc::new(RwLock::new(self))
    }
}

fn parse_override<T: FromStr>(key: &str, raw: &str, target: &mut T) {
    match raw.trim().parse() {
        Ok(value) => *target = value,
        Err(_) => warn!("Ignoring invalid {key} value: {raw}"),
    }
}

#[cfg(test)]
mod test {
    use std::{collections::HashMap, fs};

    use super::CoreConfig;
    use crate::directory::SearchField;

    #[test]
    fn test_load_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("kenavo.toml");

        let cfg = CoreConfig::load_from(&path).unwrap();

        assert_eq!(cfg, CoreConfig::default());
        assert!(path.exists());
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kenavo.toml");
        fs::write(
            &path,
            r#"
            [api]
            base_url = "https://kenavo.example"

            [gallery]
            page_size = 6

            [search]
            fields = ["name", "bio"]
            case_sensitive = true
            "#,
        )
        .unwrap();

        let cfg = CoreConfig::load_from(&path).unwrap();

        assert_eq!(cfg.api.base_url.as_deref(), Some("https://kenavo.example"));
        assert_eq!(cfg.api.profiles_table, "profiles");
        assert_eq!(cfg.gallery.page_size, 6);
        assert_eq!(cfg.gallery.auto_load_ceiling, 3);
        assert_eq!(cfg.search.fields, vec![SearchField::Name, SearchField::Bio]);
        assert!(cfg.search.case_sensitive);
    }

    #[test]
    fn test_round_trip_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kenavo.toml");
        let mut cfg = CoreConfig::default();
        cfg.gallery.auto_load_ceiling = 5;

        cfg.save_to(&path).unwrap();

        assert_eq!(CoreConfig::load_from(&path).unwrap(), cfg);
    }

    #[test]
    fn test_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kenavo.toml");
        fs::write(&path, "gallery = 12").unwrap();

        assert!(matches!(
            CoreConfig::load_from(&path),
            Err(crate::Error::ConfigParse(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let vars = HashMap::from([
            ("KENAVO_API_URL", "https://override.example"),
            ("KENAVO_PAGE_SIZE", "24"),
        ]);
        let mut cfg = CoreConfig::default();

        cfg.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(cfg.api.base_url.as_deref(), Some("https://override.example"));
        assert_eq!(cfg.api.key, None);
        assert_eq!(cfg.gallery.page_size, 24);
    }

    #[test]
    fn test_invalid_env_override_is_ignored() {
        let mut cfg = CoreConfig::default();

        cfg.apply_overrides(|key| (key == "KENAVO_PAGE_SIZE").then(|| "lots".to_string()));

        assert_eq!(cfg.gallery.page_size, 12);
    }
}
