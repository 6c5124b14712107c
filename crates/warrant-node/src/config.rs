//! Node configuration loading and management.

use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

pub const ENV_POLICY_URL: &str = "OPA_BASE_URL";
pub const ENV_REGISTRY_URL: &str = "ARIES_CLOUD_AGENT_BASE_URL";
pub const ENV_SERVICE_URL: &str = "SERVICE_ENDPOINT_BASE_URL";
pub const ENV_IDENTITY_SEED: &str = "WARRANT_IDENTITY_SEED";

/// Full configuration for the Warrant node.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WarrantConfig {
    /// HTTP API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Policy engine (OPA).
    #[serde(default)]
    pub policy: UpstreamConfig,

    /// External credential registry.
    #[serde(default)]
    pub registry: UpstreamConfig,

    #[serde(default)]
    pub service: ServiceConfig,

    #[serde(default)]
    pub identity: IdentityConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API listen address.
    #[serde(default = "default_api_addr")]
    pub listen_addr: String,
    /// API port.
    #[serde(default = "default_api_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServiceConfig {
    /// Public base URL stamped into issued ADC service descriptors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// 32-byte hex seed. Without it identifiers change on every start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_hex: Option<String>,
    #[serde(default = "default_company_alias")]
    pub company_alias: String,
    #[serde(default = "default_government_alias")]
    pub government_alias: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_api_addr() -> String {
    "0.0.0.0".into()
}
fn default_api_port() -> u16 {
    3000
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_company_alias() -> String {
    "company".into()
}
fn default_government_alias() -> String {
    "government".into()
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_api_addr(),
            port: default_api_port(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            seed_hex: None,
            company_alias: default_company_alias(),
            government_alias: default_government_alias(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// The three collaborator URLs, validated.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub policy: Url,
    pub registry: Url,
    pub service: Url,
}

impl WarrantConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: WarrantConfig = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Overlay values from the environment. Unset or empty variables are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_POLICY_URL) {
            self.policy.base_url = Some(v);
        }
        if let Some(v) = get(ENV_REGISTRY_URL) {
            self.registry.base_url = Some(v);
        }
        if let Some(v) = get(ENV_SERVICE_URL) {
            self.service.endpoint_base_url = Some(v);
        }
        if let Some(v) = get(ENV_IDENTITY_SEED) {
            self.identity.seed_hex = Some(v);
        }
    }

    /// Validate the required URLs, reporting every missing or invalid one at once.
    pub fn endpoints(&self) -> anyhow::Result<Endpoints> {
        let required = [
            ("policy.base_url", ENV_POLICY_URL, &self.policy.base_url),
            ("registry.base_url", ENV_REGISTRY_URL, &self.registry.base_url),
            (
                "service.endpoint_base_url",
                ENV_SERVICE_URL,
                &self.service.endpoint_base_url,
            ),
        ];

        let mut parsed = Vec::with_capacity(required.len());
        let mut problems = Vec::new();
        for (key, env, value) in required {
            match value.as_deref().map(Url::parse) {
                None => problems.push(format!("{} (or {}) is not set", key, env)),
                Some(Err(e)) => problems.push(format!("{} is not a valid URL: {}", key, e)),
                Some(Ok(url)) => parsed.push(url),
            }
        }

        if !problems.is_empty() {
            anyhow::bail!("invalid configuration: {}", problems.join("; "));
        }

        let mut parsed = parsed.into_iter();
        match (parsed.next(), parsed.next(), parsed.next()) {
            (Some(policy), Some(registry), Some(service)) => Ok(Endpoints {
                policy,
                registry,
                service,
            }),
            _ => anyhow::bail!("invalid configuration"),
        }
    }

    /// Decode the identity seed, if configured.
    pub fn identity_seed(&self) -> anyhow::Result<Option<[u8; 32]>> {
        let Some(seed_hex) = self.identity.seed_hex.as_deref() else {
            return Ok(None);
        };
        let bytes = hex::decode(seed_hex.trim())
            .map_err(|e| anyhow::anyhow!("identity.seed_hex is not hex: {}", e))?;
        let seed: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| {
            anyhow::anyhow!("identity.seed_hex must be 32 bytes, got {}", b.len())
        })?;
        Ok(Some(seed))
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.api.listen_addr, self.api.port)
    }
}
