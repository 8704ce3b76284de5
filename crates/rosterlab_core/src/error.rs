use std::fmt;

/// A characteristic outside its legal range on a weapon or target profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Human-readable owner of the field, e.g. `"Intercessors / Bolt rifle"`
    pub profile: String,
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(profile: &str, field: &'static str, message: impl Into<String>) -> Self {
        Self {
            profile: profile.to_string(),
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} {}", self.profile, self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Failures reported by a combat resolution service
#[derive(Debug, Clone)]
pub enum ResolveError {
    /// The service could not be reached (connection refused, timeout, ...)
    Transport(String),
    /// The service answered with a non-success status
    Status { code: u16, message: String },
    /// The response body could not be decoded
    Decode(String),
    /// The request was rejected before it was sent
    InvalidRequest(String),
    /// The request was superseded or cancelled before completion
    Cancelled,
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::Transport(msg) => write!(f, "resolution service unreachable: {msg}"),
            ResolveError::Status { code, message } => {
                write!(f, "resolution service returned {code}: {message}")
            }
            ResolveError::Decode(msg) => write!(f, "invalid resolution response: {msg}"),
            ResolveError::InvalidRequest(msg) => write!(f, "invalid resolution request: {msg}"),
            ResolveError::Cancelled => write!(f, "resolution cancelled"),
        }
    }
}

impl std::error::Error for ResolveError {}
