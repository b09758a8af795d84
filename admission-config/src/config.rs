use {
    crate::ConfigError,
    serde::Deserialize,
    std::{fs::File, io::Read, path::Path},
};

/// The raw configuration shape, as an embedder might assemble it from TOML,
/// environment variables, or their own process arguments. Loading a
/// configuration file is a caller-side concern; this struct only models the
/// options, and reading one off disk is a convenience, not a responsibility
/// the admission pipeline depends on.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Freshness window and replay-cache TTL, in milliseconds. Defaults to
    /// 60,000.
    #[serde(rename = "max_request_age_ms")]
    pub max_request_age_ms: Option<u64>,

    /// Required; the gateway refuses to start without one.
    pub port: Option<u16>,

    /// Defaults to `127.0.0.1`.
    pub host: Option<String>,

    /// The process-wide developer-mode flag. Requesting this without
    /// `developer_mode_non_production_marker` set is refused at resolution
    /// time rather than silently downgraded.
    #[serde(default)]
    pub developer_mode_enabled: Option<bool>,

    /// An explicit marker proving this process is not a production
    /// deployment. Required whenever `developer_mode_enabled` is `true`.
    pub developer_mode_non_production_marker: Option<String>,
}

impl Config {
    pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut file = File::open(path)?;
        let mut raw = String::new();
        file.read_to_string(&mut raw)?;
        toml::from_str(&raw).map_err(Into::into)
    }
}
