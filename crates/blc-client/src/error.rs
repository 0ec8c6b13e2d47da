//! Error taxonomy for the collaborator API.
//!
//! 401 is the uniform "not authenticated" signal across the whole surface
//! and gets its own variant so flows can route to a login entry point
//! without string-matching. Everything else keeps the collaborator's
//! message for inline display.

use std::fmt;

#[derive(Debug)]
pub enum ApiError {
    /// 401, no valid session. Route to the appropriate login entry.
    AuthRequired,
    /// Any other 4xx: the collaborator refused the request (403 role gate,
    /// 409 transition conflict, 400 validation) and said why.
    Refused { status: u16, message: String },
    /// 5xx: collaborator failure.
    Api { status: u16, message: String },
    /// Network or transport failure.
    Transport(String),
    /// A response payload could not be decoded.
    Decode(String),
    /// Client construction / configuration failure.
    Config(String),
}

impl ApiError {
    pub fn is_auth_required(&self) -> bool {
        matches!(self, Self::AuthRequired)
    }

    /// HTTP status, where one exists for this variant.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::AuthRequired => Some(401),
            Self::Refused { status, .. } | Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AuthRequired => write!(f, "not authenticated"),
            Self::Refused { status, message } => write!(f, "refused ({status}): {message}"),
            Self::Api { status, message } => write!(f, "api error ({status}): {message}"),
            Self::Transport(msg) => write!(f, "transport error: {msg}"),
            Self::Decode(msg) => write!(f, "decode error: {msg}"),
            Self::Config(msg) => write!(f, "config error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}
