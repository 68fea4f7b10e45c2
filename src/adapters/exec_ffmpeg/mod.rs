//! FFmpeg execution adapter
//!
//! Runs the compiled invocation as a child process and streams its stderr
//! incrementally, so a long encode never accumulates its diagnostics in memory.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::trace;

use crate::engine::LineSplitter;
use crate::error::HighlightResult;
use crate::planner::Invocation;
use crate::ports::TranscodePort;

/// Child-process transcoder
pub struct FfmpegTranscoder;

impl FfmpegTranscoder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranscodePort for FfmpegTranscoder {
    async fn run(
        &self,
        invocation: &Invocation,
        on_line: &mut (dyn for<'l> FnMut(&'l str) + Send),
    ) -> HighlightResult<Option<i32>> {
        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        if let Some(mut stderr) = child.stderr.take() {
            let mut splitter = LineSplitter::new();
            let mut buffer = [0u8; 8192];
            loop {
                let read = stderr.read(&mut buffer).await?;
                if read == 0 {
                    break;
                }
                for line in splitter.push(&buffer[..read]) {
                    trace!("ffmpeg: {}", line);
                    on_line(&line);
                }
            }
            if let Some(line) = splitter.finish() {
                on_line(&line);
            }
        }

        let status = child.wait().await?;
        Ok(status.code())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn shell(script: &str) -> Invocation {
        Invocation {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
        }
    }

    #[tokio::test]
    async fn test_streams_carriage_return_lines_and_exit_code() {
        let transcoder = FfmpegTranscoder::new();
        let mut lines = Vec::new();
        let mut on_line = |line: &str| lines.push(line.to_string());

        let code = transcoder
            .run(
                &shell("printf 'a time=00:00:01.00\\rb time=00:00:02.00\\rdone\\n' >&2; exit 3"),
                &mut on_line,
            )
            .await
            .unwrap();

        assert_eq!(code, Some(3));
        assert_eq!(lines, vec!["a time=00:00:01.00", "b time=00:00:02.00", "done"]);
    }

    #[tokio::test]
    async fn test_runs_through_port_object() {
        let port: std::sync::Arc<dyn TranscodePort> = std::sync::Arc::new(FfmpegTranscoder::new());
        let mut count = 0usize;
        let mut on_line = |_: &str| count += 1;

        let code = port
            .run(&shell("echo one >&2; echo two >&2"), &mut on_line)
            .await
            .unwrap();

        assert_eq!(code, Some(0));
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_missing_program_is_error() {
        let transcoder = FfmpegTranscoder::new();
        let invocation = Invocation {
            program: "definitely-not-a-real-transcoder".to_string(),
            args: Vec::new(),
        };
        let mut on_line = |_: &str| {};
        assert!(transcoder.run(&invocation, &mut on_line).await.is_err());
    }
}
