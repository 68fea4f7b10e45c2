//! Oracle backed by an external command
//!
//! The request is written to the command's stdin as JSON and the response is
//! whatever the command prints on stdout.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::error::{HighlightError, HighlightResult};
use crate::oracle::OracleRequest;
use crate::ports::ScoringOracle;

/// Default time allowed for one oracle call
pub const ORACLE_TIMEOUT: Duration = Duration::from_secs(300);

pub struct CommandOracle {
    program: String,
    args: Vec<String>,
    call_timeout: Duration,
}

impl CommandOracle {
    /// Build from a whitespace-separated command line
    pub fn from_command_line(command_line: &str) -> HighlightResult<Self> {
        let mut words = command_line.split_whitespace().map(str::to_string);
        let program = words
            .next()
            .ok_or_else(|| HighlightError::config("oracle command is empty"))?;
        Ok(Self {
            program,
            args: words.collect(),
            call_timeout: ORACLE_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    async fn call(&self, payload: Vec<u8>) -> HighlightResult<String> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()?;

        // Feed stdin while stdout drains; sequential I/O deadlocks once both pipes fill
        let stdin = child.stdin.take();
        let feed = async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(&payload).await?;
                stdin.shutdown().await?;
            }
            Ok::<(), std::io::Error>(())
        };
        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        let output = output?;
        match fed {
            // The command may answer without reading all of its input
            Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                warn!("oracle command '{}' closed stdin early", self.program)
            }
            other => other?,
        }
        if !output.status.success() {
            return Err(HighlightError::OracleParse {
                message: format!("oracle command '{}' exited with {}", self.program, output.status),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl ScoringOracle for CommandOracle {
    async fn propose(&self, request: &OracleRequest) -> HighlightResult<String> {
        let payload = serde_json::to_vec(request)?;
        info!("Asking oracle command '{}' for highlights", self.program);

        timeout(self.call_timeout, self.call(payload))
            .await
            .map_err(|_| HighlightError::OracleParse {
                message: format!(
                    "oracle command '{}' timed out after {:?}",
                    self.program, self.call_timeout
                ),
            })?
    }

    fn name(&self) -> &str {
        &self.program
    }
}
