use thiserror::Error;

/// Failure to obtain or decode a tree payload.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("tree data request failed: {0}")]
    Fetch(String),
    #[cfg(feature = "http")]
    #[error("tree data request failed: {0}")]
    Http(#[from] ureq::Error),
    #[error("tree data could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("tree payload root has no node_id")]
    MissingRoot,
}
