use std::{
    error::Error,
    fmt::{Debug, Display, Formatter, Result as FmtResult},
    io::Error as IOError,
};

#[derive(Debug)]
pub enum ConfigError {
    IO(IOError),
    DeserError(toml::de::Error),
    MissingPort,
    /// Developer mode was requested without the explicit non-production
    /// marker that must accompany it.
    DeveloperModeRefused,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::IO(e) => write!(f, "I/O error: {e}"),
            Self::DeserError(e) => write!(f, "Deserialization error: {e}"),
            Self::MissingPort => write!(f, "Configuration is missing a required port"),
            Self::DeveloperModeRefused => {
                write!(f, "Developer mode requires an explicit non-production marker and cannot be enabled implicitly")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::IO(e) => Some(e),
            Self::DeserError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<IOError> for ConfigError {
    fn from(e: IOError) -> Self {
        Self::IO(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::DeserError(e)
    }
}
