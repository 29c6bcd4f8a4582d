use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::presence::Collation;

#[derive(Deserialize, Debug, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    #[serde(default = "default_data_csv")]
    pub data_csv: PathBuf,

    #[serde(default = "default_data_xml")]
    pub data_xml: PathBuf,

    #[serde(default = "default_users_xml_url")]
    pub users_xml_url: String,

    /// Seconds between background directory downloads; 0 disables them.
    #[serde(default)]
    pub directory_refresh_secs: u64,

    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    #[serde(default)]
    pub collation: Collation,

    #[serde(default = "default_page")]
    pub default_page: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,
}

// Partial config for layering
#[derive(Deserialize, Default, Debug)]
struct PartialServerConfig {
    listen_addr: Option<String>,
    data_csv: Option<PathBuf>,
    data_xml: Option<PathBuf>,
    users_xml_url: Option<String>,
    directory_refresh_secs: Option<u64>,
    cache_ttl_secs: Option<u64>,
    collation: Option<String>,
    default_page: Option<String>,
    log_dir: Option<String>,
}

fn default_listen_addr() -> String {
    "0.0.0.0:5000".to_string()
}

fn default_data_csv() -> PathBuf {
    PathBuf::from("runtime/data/sample_data.csv")
}

fn default_data_xml() -> PathBuf {
    PathBuf::from("runtime/data/users.xml")
}

fn default_users_xml_url() -> String {
    "http://sargo.bolt.stxnext.pl/users.xml".to_string()
}

fn default_cache_ttl_secs() -> u64 {
    600
}

fn default_page() -> String {
    "presence_weekday".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            data_csv: default_data_csv(),
            data_xml: default_data_xml(),
            users_xml_url: default_users_xml_url(),
            directory_refresh_secs: 0,
            cache_ttl_secs: default_cache_ttl_secs(),
            collation: Collation::default(),
            default_page: default_page(),
            log_dir: default_log_dir(),
        }
    }
}

impl ServerConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self, String> {
        dotenv::dotenv().ok();

        // 1. Load from file (optional)
        let file_config: PartialServerConfig = match config_path {
            Some(path_str) => {
                let path = Path::new(path_str);
                if path.exists() {
                    let contents = fs::read_to_string(path)
                        .map_err(|e| format!("Failed to read config file at {path:?}: {e}"))?;
                    Self::parse_partial(&contents)
                        .map_err(|e| format!("Failed to parse TOML from config file at {path:?}: {e}"))?
                } else {
                    PartialServerConfig::default()
                }
            }
            None => PartialServerConfig::default(),
        };

        // 2. Load from environment variables
        let env_config: PartialServerConfig = envy::from_env::<PartialServerConfig>()
            .map_err(|e| format!("Failed to load config from environment: {e}"))?;

        // 3. Merge: environment overrides file
        Self::merge(env_config, file_config)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn directory_refresh_interval(&self) -> Option<Duration> {
        (self.directory_refresh_secs > 0).then(|| Duration::from_secs(self.directory_refresh_secs))
    }

    fn parse_partial(contents: &str) -> Result<PartialServerConfig, toml::de::Error> {
        toml::from_str(contents)
    }

    fn merge(primary: PartialServerConfig, fallback: PartialServerConfig) -> Result<Self, String> {
        let collation = match primary.collation.or(fallback.collation) {
            Some(name) => name.parse::<Collation>()?,
            None => Collation::default(),
        };

        Ok(ServerConfig {
            listen_addr: primary.listen_addr.or(fallback.listen_addr)
                .unwrap_or_else(default_listen_addr),
            data_csv: primary.data_csv.or(fallback.data_csv)
                .unwrap_or_else(default_data_csv),
            data_xml: primary.data_xml.or(fallback.data_xml)
                .unwrap_or_else(default_data_xml),
            users_xml_url: primary.users_xml_url.or(fallback.users_xml_url)
                .unwrap_or_else(default_users_xml_url),
            directory_refresh_secs: primary.directory_refresh_secs.or(fallback.directory_refresh_secs)
                .unwrap_or(0),
            cache_ttl_secs: primary.cache_ttl_secs.or(fallback.cache_ttl_secs)
                .unwrap_or_else(default_cache_ttl_secs),
            collation,
            default_page: primary.default_page.or(fallback.default_page)
                .unwrap_or_else(default_page),
            log_dir: primary.log_dir.or(fallback.log_dir)
                .unwrap_or_else(default_log_dir),
        })
    }
}
