//! Scan configuration types.

use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Parameters of a single scan invocation.
///
/// A config is read-only for the lifetime of the scan it starts; the
/// cancellation signal is supplied separately by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ScanConfig {
    /// Root directory to walk. It does not have to exist.
    pub root: PathBuf,

    /// Matched folders smaller than this are not reported (0 = report all).
    #[builder(default = "0")]
    #[serde(default)]
    pub min_size_bytes: u64,
}

impl ScanConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref root) = self.root {
            if root.as_os_str().is_empty() {
                return Err("Root path cannot be empty".to_string());
            }
        } else {
            return Err("Root path is required".to_string());
        }
        Ok(())
    }
}

impl ScanConfig {
    /// Create a new scan config builder.
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }

    /// Create a config that reports every matched folder under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            min_size_bytes: 0,
        }
    }

    /// Set the minimum reported folder size.
    pub fn with_min_size(mut self, min_size_bytes: u64) -> Self {
        self.min_size_bytes = min_size_bytes;
        self
    }

    /// Whether a matched folder of `size` bytes passes the size threshold.
    pub fn accepts_size(&self, size: u64) -> bool {
        size >= self.min_size_bytes
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new(".")
    }
}
