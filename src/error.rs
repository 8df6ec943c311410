use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Transport failure, timeout or non-2xx status from the plugin backend.
    #[error("{operation} call failed: {reason}")]
    Network { operation: String, reason: String },
    /// The backend answered, but not with the JSON we expected.
    #[error("{operation} returned an unreadable body: {source}")]
    Parse {
        operation: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Minipool report anomaly: {0}")]
    ReportAnomaly(String),
    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Internal: {0}")]
    Internal(String),
}

impl AppError {
    pub fn network(operation: &str, reason: impl std::fmt::Display) -> Self {
        Self::Network {
            operation: operation.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn parse(operation: &str, source: serde_json::Error) -> Self {
        Self::Parse {
            operation: operation.to_string(),
            source,
        }
    }

    /// True for failures worth retrying on the next poll tick.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Parse { .. })
    }
}

impl From<figment::Error> for AppError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

// UI consumers receive errors as plain strings
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
