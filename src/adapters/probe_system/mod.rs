//! System probe adapter
//!
//! Detects an NVIDIA GPU through `nvidia-smi` and asks the transcoder which
//! encoders it was built with. Both probes give up after a short timeout.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::ports::SystemProbePort;

/// Default per-probe timeout
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Probes the host with external commands
pub struct CommandSystemProbe {
    ffmpeg_path: String,
    gpu_tool: String,
    probe_timeout: Duration,
}

impl CommandSystemProbe {
    pub fn new(ffmpeg_path: impl Into<String>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            gpu_tool: "nvidia-smi".to_string(),
            probe_timeout: PROBE_TIMEOUT,
        }
    }

    pub fn with_gpu_tool(mut self, gpu_tool: impl Into<String>) -> Self {
        self.gpu_tool = gpu_tool.into();
        self
    }

    pub fn with_timeout(mut self, probe_timeout: Duration) -> Self {
        self.probe_timeout = probe_timeout;
        self
    }

    /// Run a command and return its stdout if it exits successfully in time
    async fn capture(&self, program: &str, args: &[&str]) -> Option<String> {
        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        match timeout(self.probe_timeout, command.output()).await {
            Ok(Ok(output)) if output.status.success() => {
                Some(String::from_utf8_lossy(&output.stdout).into_owned())
            }
            Ok(Ok(output)) => {
                debug!("{} exited with {}", program, output.status);
                None
            }
            Ok(Err(e)) => {
                debug!("{} could not be run: {}", program, e);
                None
            }
            Err(_) => {
                debug!("{} timed out after {:?}", program, self.probe_timeout);
                None
            }
        }
    }
}

/// Whether an encoder listing names the encoder as a whole word
pub fn lists_encoder(listing: &str, encoder: &str) -> bool {
    listing
        .lines()
        .any(|line| line.split_whitespace().any(|word| word == encoder))
}

#[async_trait]
impl SystemProbePort for CommandSystemProbe {
    async fn hardware_present(&self) -> bool {
        self.capture(&self.gpu_tool, &["-L"])
            .await
            .map_or(false, |listing| listing.contains("GPU"))
    }

    async fn encoder_supported(&self, encoder: &str) -> bool {
        self.capture(&self.ffmpeg_path, &["-hide_banner", "-encoders"])
            .await
            .map_or(false, |listing| lists_encoder(&listing, encoder))
    }
}
