//! Recorded oracle responses read from the artifact directory

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::error::{HighlightError, HighlightResult};
use crate::oracle::OracleRequest;
use crate::ports::ScoringOracle;

/// File name of a recorded response inside a file's artifact directory
pub const RESPONSE_FILE_NAME: &str = "oracle_response.json";

/// Oracle that replays a response saved next to the other artifacts
pub struct ResponseFileOracle {
    file_name: String,
    fallback_dir: Option<PathBuf>,
}

impl ResponseFileOracle {
    pub fn new() -> Self {
        Self {
            file_name: RESPONSE_FILE_NAME.to_string(),
            fallback_dir: None,
        }
    }

    /// Directory used when the request carries no artifact directory
    pub fn with_fallback_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fallback_dir = Some(dir.into());
        self
    }

    fn response_path(&self, request: &OracleRequest) -> HighlightResult<PathBuf> {
        request
            .artifacts_dir
            .as_deref()
            .or(self.fallback_dir.as_deref())
            .map(|dir: &Path| dir.join(&self.file_name))
            .ok_or_else(|| HighlightError::missing("oracle response directory", &self.file_name))
    }
}

impl Default for ResponseFileOracle {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScoringOracle for ResponseFileOracle {
    async fn propose(&self, request: &OracleRequest) -> HighlightResult<String> {
        let path = self.response_path(request)?;
        debug!("Reading recorded oracle response from {}", path.display());
        match tokio::fs::read_to_string(&path).await {
            Ok(body) => Ok(body),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(HighlightError::missing(
                "oracle response",
                path.display().to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    fn name(&self) -> &str {
        "response-file"
    }
}
