//! Configuration management with file persistence

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Default search cluster, overridden by `ELASTIC_HOST`
pub const DEFAULT_ENDPOINT: &str = "http://localhost:9200";

/// MediaWiki API that serves the site matrix
pub const DEFAULT_DIRECTORY_URL: &str = "https://meta.wikimedia.org/w/api.php";

/// Global Search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub search: SearchConfig,
    pub sites: SitesConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub endpoint: String,
    /// Index patterns joined into the `_search` path
    pub indices: Vec<String>,
    /// Client-side timeout; regex scans routinely take minutes
    pub timeout_secs: u64,
    /// Skip TLS certificate verification
    pub insecure: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SitesConfig {
    pub directory_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    File,
    Memory,
}

impl CacheBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Memory => "memory",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    pub results_ttl_secs: u64,
    pub domains_ttl_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search: SearchConfig {
                endpoint: DEFAULT_ENDPOINT.to_string(),
                indices: vec![
                    "*:*_content".to_string(),
                    "*:*_general".to_string(),
                    "*:*_file".to_string(),
                ],
                timeout_secs: 300,
                insecure: false,
            },
            sites: SitesConfig {
                directory_url: DEFAULT_DIRECTORY_URL.to_string(),
                timeout_secs: 30,
            },
            cache: CacheConfig {
                backend: CacheBackend::File,
                results_ttl_secs: 10 * 60,
                domains_ttl_secs: 10 * 60 * 60,
            },
        }
    }
}

impl SearchConfig {
    /// Endpoint after applying the `ELASTIC_HOST` override
    pub fn resolved_endpoint(&self) -> String {
        env::var("ELASTIC_HOST")
            .ok()
            .filter(|host| !host.trim().is_empty())
            .unwrap_or_else(|| self.endpoint.clone())
            .trim_end_matches('/')
            .to_string()
    }

    /// Whether certificate checks are disabled, by config or `ELASTIC_INSECURE`
    pub fn resolved_insecure(&self) -> bool {
        match env::var("ELASTIC_INSECURE") {
            Ok(val) => parse_flag(&val).unwrap_or(self.insecure),
            Err(_) => self.insecure,
        }
    }
}

impl CacheConfig {
    pub fn results_ttl(&self) -> Duration {
        Duration::from_secs(self.results_ttl_secs)
    }

    pub fn domains_ttl(&self) -> Duration {
        Duration::from_secs(self.domains_ttl_secs)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var("GLOBALSEARCH_CONFIG_DIR") {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?
                .join("globalsearch")
        };
        Ok(dir)
    }

    /// Get the cache directory path used by the file cache backend
    pub fn cache_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var("GLOBALSEARCH_CACHE_DIR") {
            PathBuf::from(custom_dir)
        } else {
            dirs::cache_dir()
                .ok_or_else(|| anyhow!("Could not determine cache directory"))?
                .join("globalsearch")
        };
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from file, or fall back to defaults if it doesn't exist
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: Config = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> anyhow::Result<()> {
        self.validate()?;

        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;

        let path = Self::config_path()?;
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        let endpoint = self.search.endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(anyhow!(
                "search.endpoint must be an http(s) URL, got '{}'",
                self.search.endpoint
            ));
        }
        if self.search.indices.is_empty() {
            return Err(anyhow!("search.indices must name at least one index pattern"));
        }
        if self.search.timeout_secs == 0 || self.sites.timeout_secs == 0 {
            return Err(anyhow!("Timeouts must be greater than zero"));
        }
        if self.cache.results_ttl_secs == 0 || self.cache.domains_ttl_secs == 0 {
            return Err(anyhow!("Cache TTLs must be greater than zero"));
        }
        Ok(())
    }

    /// Get a configuration value by key
    pub fn get(&self, key: &str) -> anyhow::Result<String> {
        match key {
            "search.endpoint" => Ok(self.search.endpoint.clone()),
            "search.indices" => Ok(self.search.indices.join(", ")),
            "search.timeout_secs" => Ok(self.search.timeout_secs.to_string()),
            "search.insecure" => Ok(self.search.insecure.to_string()),

            "sites.directory_url" => Ok(self.sites.directory_url.clone()),
            "sites.timeout_secs" => Ok(self.sites.timeout_secs.to_string()),

            "cache.backend" => Ok(self.cache.backend.as_str().to_string()),
            "cache.results_ttl_secs" => Ok(self.cache.results_ttl_secs.to_string()),
            "cache.domains_ttl_secs" => Ok(self.cache.domains_ttl_secs.to_string()),

            _ => Err(anyhow!(
                "Unknown configuration key: {}. Use `globalsearch config list` to see available keys.",
                key
            )),
        }
    }

    /// Set a configuration value by key
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "search.endpoint" => {
                self.search.endpoint = value.trim().trim_end_matches('/').to_string();
            }
            "search.indices" => {
                let indices: Vec<String> = value
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
                if indices.is_empty() {
                    return Err(anyhow!("At least one index pattern is required"));
                }
                self.search.indices = indices;
            }
            "search.timeout_secs" => {
                self.search.timeout_secs = parse_positive(key, value)?;
            }
            "search.insecure" => {
                self.search.insecure = parse_flag(value)
                    .ok_or_else(|| anyhow!("Invalid boolean value: {}", value))?;
            }

            "sites.directory_url" => {
                self.sites.directory_url = value.trim().to_string();
            }
            "sites.timeout_secs" => {
                self.sites.timeout_secs = parse_positive(key, value)?;
            }

            "cache.backend" => {
                self.cache.backend = match value.trim() {
                    "file" => CacheBackend::File,
                    "memory" => CacheBackend::Memory,
                    other => {
                        return Err(anyhow!(
                            "Invalid cache backend: {}. Valid options: file, memory",
                            other
                        ));
                    }
                };
            }
            "cache.results_ttl_secs" => {
                self.cache.results_ttl_secs = parse_positive(key, value)?;
            }
            "cache.domains_ttl_secs" => {
                self.cache.domains_ttl_secs = parse_positive(key, value)?;
            }

            _ => {
                return Err(anyhow!(
                    "Unknown configuration key: {}. Use `globalsearch config list` to see available keys.",
                    key
                ));
            }
        }
        Ok(())
    }

    /// List all configuration keys and their values
    pub fn list(&self) -> anyhow::Result<Vec<(String, String)>> {
        let keys = vec![
            "search.endpoint",
            "search.indices",
            "search.timeout_secs",
            "search.insecure",
            "sites.directory_url",
            "sites.timeout_secs",
            "cache.backend",
            "cache.results_ttl_secs",
            "cache.domains_ttl_secs",
        ];

        keys.into_iter()
            .map(|key| {
                let value = self.get(key)?;
                Ok((key.to_string(), value))
            })
            .collect()
    }

    /// Reset configuration to defaults
    pub fn reset() -> anyhow::Result<()> {
        let path = Self::config_path()?;
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove config file: {}", path.display()))?;
        }
        Ok(())
    }
}

fn parse_positive(key: &str, value: &str) -> anyhow::Result<u64> {
    let parsed: u64 = value
        .trim()
        .parse()
        .with_context(|| format!("Invalid {} value: {}", key, value))?;
    if parsed == 0 {
        return Err(anyhow!("{} must be greater than zero", key));
    }
    Ok(parsed)
}
