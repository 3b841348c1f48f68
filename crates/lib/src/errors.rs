use thiserror::Error;

/// Errors raised by the optional external capabilities (detection, translation, model).
///
/// The processor never surfaces these to its caller. They exist so that callers and
/// tests can tell an absent capability apart from one that failed.
#[derive(Error, Debug)]
pub enum CapabilityError {
    #[error("Capability is not configured: {0}")]
    Unavailable(&'static str),
    #[error("Capability call timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Failed to send request to capability: {0}")]
    Request(reqwest::Error),
    #[error("Failed to deserialize capability response: {0}")]
    Deserialization(reqwest::Error),
    #[error("Capability returned an error: {0}")]
    Api(String),
    #[error("Capability returned an empty response")]
    EmptyResponse,
    #[error("Could not detect a language for the given text")]
    Undetectable,
}

/// Errors raised while reading a knowledge base file.
#[derive(Error, Debug)]
pub enum KnowledgeError {
    #[error("Failed to read knowledge base file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid knowledge base JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported knowledge base shape: expected a list or an object, found {0}")]
    UnsupportedShape(&'static str),
}
