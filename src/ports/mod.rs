// Ports - Interface definitions (contracts)

use async_trait::async_trait;

use crate::error::HighlightResult;
use crate::oracle::OracleRequest;
use crate::planner::Invocation;

/// Port for the external scoring oracle
#[async_trait]
pub trait ScoringOracle: Send + Sync {
    /// Return the raw, untrusted response text for a request
    async fn propose(&self, request: &OracleRequest) -> HighlightResult<String>;

    /// Short name recorded in logs
    fn name(&self) -> &str;
}

/// Port for the external transcoder process
#[async_trait]
pub trait TranscodePort: Send + Sync {
    /// Run the invocation to completion, feeding every diagnostic line to `on_line`
    /// as soon as it is read.
    ///
    /// Returns the exit code (`None` when the process was killed by a signal).
    /// An `Err` means the process could not be started or its output could not be read.
    async fn run(
        &self,
        invocation: &Invocation,
        on_line: &mut (dyn for<'l> FnMut(&'l str) + Send),
    ) -> HighlightResult<Option<i32>>;
}

/// Port for host capability probing
#[async_trait]
pub trait SystemProbePort: Send + Sync {
    /// Whether a hardware accelerator is present on the host
    async fn hardware_present(&self) -> bool;

    /// Whether the transcoder lists the given encoder
    async fn encoder_supported(&self, encoder: &str) -> bool;
}
