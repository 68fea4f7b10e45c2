use std::sync::Arc;

use crate::adapters::{CommandOracle, CommandSystemProbe, FfmpegTranscoder, ResponseFileOracle};
use crate::app::{BatchInteractor, HighlightInteractor};
use crate::config::HighlightConfig;
use crate::engine::{
    AttemptRunner, ConsoleProgressCallback, ExecutionEngine, JsonProgressCallback,
    ProgressCallback,
};
use crate::error::HighlightResult;
use crate::ports::{ScoringOracle, SystemProbePort, TranscodePort};
use crate::probe::CapabilityDetector;
use crate::utils::logging::LogFormat;

pub trait AppContainer: Send + Sync {
    fn highlight_interactor(&self) -> Arc<HighlightInteractor>;
    fn batch_interactor(&self) -> Arc<BatchInteractor>;
    fn capability_detector(&self) -> &CapabilityDetector;
}

/// The ports a container wires together
pub struct Ports {
    pub oracle: Arc<dyn ScoringOracle>,
    pub transcoder: Arc<dyn TranscodePort>,
    pub probe: Arc<dyn SystemProbePort>,
    pub progress: Arc<dyn ProgressCallback>,
}

impl Ports {
    /// Process-backed adapters for a real run
    pub fn from_config(config: &HighlightConfig, log_format: LogFormat) -> HighlightResult<Self> {
        let oracle: Arc<dyn ScoringOracle> = match &config.oracle_command {
            Some(command_line) => Arc::new(CommandOracle::from_command_line(command_line)?),
            None => Arc::new(ResponseFileOracle::new()),
        };
        let progress: Arc<dyn ProgressCallback> = match log_format {
            LogFormat::Json => Arc::new(JsonProgressCallback),
            LogFormat::Pretty | LogFormat::Compact => Arc::new(ConsoleProgressCallback::new(false)),
        };

        Ok(Self {
            oracle,
            transcoder: Arc::new(FfmpegTranscoder::new()),
            probe: Arc::new(CommandSystemProbe::new(config.ffmpeg_path.clone())),
            progress,
        })
    }
}

pub struct DefaultAppContainer {
    highlight_interactor: Arc<HighlightInteractor>,
    batch_interactor: Arc<BatchInteractor>,
    detector: CapabilityDetector,
}

impl DefaultAppContainer {
    pub fn new(config: HighlightConfig, log_format: LogFormat) -> HighlightResult<Self> {
        let ports = Ports::from_config(&config, log_format)?;
        Ok(Self::with_ports(config, ports))
    }

    /// Wire the interactors over the given ports
    pub fn with_ports(config: HighlightConfig, ports: Ports) -> Self {
        let runner = AttemptRunner::new(
            ports.transcoder,
            ports.progress,
            config.progress_interval(),
            config.log_tail_lines,
        );
        let engine = ExecutionEngine::new(runner);

        let highlight_interactor = Arc::new(HighlightInteractor::new(
            config,
            ports.oracle,
            CapabilityDetector::new(Arc::clone(&ports.probe)),
            engine,
        ));
        let batch_interactor = Arc::new(BatchInteractor::new(Arc::clone(&highlight_interactor)));

        Self {
            highlight_interactor,
            batch_interactor,
            detector: CapabilityDetector::new(ports.probe),
        }
    }
}

impl AppContainer for DefaultAppContainer {
    fn highlight_interactor(&self) -> Arc<HighlightInteractor> {
        Arc::clone(&self.highlight_interactor)
    }

    fn batch_interactor(&self) -> Arc<BatchInteractor> {
        Arc::clone(&self.batch_interactor)
    }

    fn capability_detector(&self) -> &CapabilityDetector {
        &self.detector
    }
}
