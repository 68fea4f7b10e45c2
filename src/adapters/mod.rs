// Adapters - External system implementations

pub mod exec_ffmpeg;
pub mod oracle_command;
pub mod oracle_file;
pub mod probe_system;
pub mod toml_config;

// Re-export adapters
pub use exec_ffmpeg::FfmpegTranscoder;
pub use oracle_command::CommandOracle;
pub use oracle_file::ResponseFileOracle;
pub use probe_system::CommandSystemProbe;
