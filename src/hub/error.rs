use thiserror::Error;

/// A hub call failed before producing a usable result.
#[derive(Debug, Error)]
pub enum HubError {
    #[error("failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Transport failure, non-success HTTP status or unparseable XML.
    #[error("{method}: request failed: {source}")]
    Call {
        method: String,
        #[source]
        source: xmlrpc::Error,
    },

    #[error("{method}: malformed response: {reason}")]
    Decode { method: String, reason: String },

    /// The hub executed the call and reported an error.
    #[error("{method}: hub fault {code}: {message}")]
    Fault {
        method: String,
        code: i64,
        message: String,
    },
}

impl HubError {
    pub fn fault(method: &str, code: i64, message: impl Into<String>) -> Self {
        HubError::Fault {
            method: method.to_string(),
            code,
            message: message.into(),
        }
    }

    pub(crate) fn decode(method: &str, reason: impl Into<String>) -> Self {
        HubError::Decode {
            method: method.to_string(),
            reason: reason.into(),
        }
    }
}
