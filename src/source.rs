use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use crate::model::TreePayload;

/// Which tree the page asks the server for.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TreeRequest {
    /// The full hierarchy.
    Hierarchy,
    /// A single heading, addressed by its four-digit code.
    Heading(String),
}

impl TreeRequest {
    /// Builds a heading request from any commodity or heading code.
    ///
    /// Only digits count and only the first four are kept, so `"8471.30"` and
    /// `"8471300000"` both address heading `8471`.
    pub fn heading(code: &str) -> Self {
        Self::Heading(code.chars().filter(char::is_ascii_digit).take(4).collect())
    }
}

impl fmt::Display for TreeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hierarchy => f.write_str("hierarchy"),
            Self::Heading(code) => write!(f, "heading {code}"),
        }
    }
}

/// Supplies tree payloads.
pub trait TreeSource {
    fn fetch(&self, request: &TreeRequest) -> Result<TreePayload, LoadError>;
}

impl<F> TreeSource for F
where
    F: Fn(&TreeRequest) -> Result<TreePayload, LoadError>,
{
    #[inline]
    fn fetch(&self, request: &TreeRequest) -> Result<TreePayload, LoadError> {
        self(request)
    }
}

/// Endpoint layout of the tree-data server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeSourceConfig {
    pub base_url: String,
    pub hierarchy_path: String,
    /// Path template; `{code}` is replaced by the heading code.
    pub heading_path: String,
}

impl Default for TreeSourceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_owned(),
            hierarchy_path: "/hierarchy_data/".to_owned(),
            heading_path: "/heading_data/{code}".to_owned(),
        }
    }
}

impl TreeSourceConfig {
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Full URL for `request`.
    pub fn url_for(&self, request: &TreeRequest) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = match request {
            TreeRequest::Hierarchy => self.hierarchy_path.clone(),
            TreeRequest::Heading(code) => self.heading_path.replace("{code}", code),
        };
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }
}

/// In-memory source serving canned JSON bodies.
#[derive(Clone, Debug, Default)]
pub struct JsonSource {
    bodies: FxHashMap<TreeRequest, String>,
}

impl JsonSource {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_body(mut self, request: TreeRequest, body: impl Into<String>) -> Self {
        self.bodies.insert(request, body.into());
        self
    }
}

impl TreeSource for JsonSource {
    fn fetch(&self, request: &TreeRequest) -> Result<TreePayload, LoadError> {
        let body = self
            .bodies
            .get(request)
            .ok_or_else(|| LoadError::Fetch(format!("no tree data for {request}")))?;
        TreePayload::from_json(body)
    }
}

#[cfg(feature = "http")]
mod http {
    use super::{LoadError, TreePayload, TreeRequest, TreeSource, TreeSourceConfig};

    /// Blocking HTTP source. One GET per fetch; no retry and no timeout.
    #[derive(Clone)]
    pub struct HttpSource {
        agent: ureq::Agent,
        config: TreeSourceConfig,
    }

    impl HttpSource {
        pub fn new(config: TreeSourceConfig) -> Self {
            Self {
                agent: ureq::Agent::new_with_defaults(),
                config,
            }
        }

        pub const fn config(&self) -> &TreeSourceConfig {
            &self.config
        }
    }

    impl TreeSource for HttpSource {
        fn fetch(&self, request: &TreeRequest) -> Result<TreePayload, LoadError> {
            let url = self.config.url_for(request);
            tracing::debug!(url = %url, "fetching tree data");
            let mut response = self.agent.get(url.as_str()).call()?;
            let body = response.body_mut().read_to_string()?;
            TreePayload::from_json(&body)
        }
    }
}

#[cfg(feature = "http")]
pub use http::HttpSource;
