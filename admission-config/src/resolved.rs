use {
    crate::{Config, ConfigError},
    log::warn,
    std::time::Duration,
};

const DEFAULT_MAX_REQUEST_AGE_MS: u64 = 60_000;
const DEFAULT_HOST: &str = "127.0.0.1";

/// `Config` with defaults applied and developer mode's explicit-marker
/// requirement enforced. This is what the admission pipeline actually
/// reads; it is frozen once built, since the developer-mode flag is not
/// safe to flip at runtime.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub max_request_age: Duration,
    pub port: u16,
    pub host: String,
    developer_mode_enabled: bool,
}

impl ResolvedConfig {
    pub fn resolve(config: &Config) -> Result<Self, ConfigError> {
        let port = config.port.ok_or(ConfigError::MissingPort)?;
        let requested = config.developer_mode_enabled.unwrap_or(false);
        let developer_mode_enabled = match (requested, &config.developer_mode_non_production_marker) {
            (false, _) => false,
            (true, Some(marker)) if !marker.is_empty() => {
                warn!(
                    "developer mode is ENABLED (non-production marker {marker:?}), \
                     transport, application-authentication, and signature checks are skipped. \
                     This configuration MUST NOT be used in production."
                );
                true
            }
            (true, _) => return Err(ConfigError::DeveloperModeRefused),
        };

        Ok(Self {
            max_request_age: Duration::from_millis(config.max_request_age_ms.unwrap_or(DEFAULT_MAX_REQUEST_AGE_MS)),
            port,
            host: config.host.clone().unwrap_or_else(|| DEFAULT_HOST.to_string()),
            developer_mode_enabled,
        })
    }

    pub fn developer_mode_enabled(&self) -> bool {
        self.developer_mode_enabled
    }
}
