// Application layer - Use case interactors

pub mod artifacts;
pub mod batch_interactor;
pub mod container;
pub mod highlight_interactor;

// Re-export interactors
pub use batch_interactor::{BatchInteractor, BatchReport, BatchRequest, RESULTS_FILE_NAME};
pub use container::{AppContainer, DefaultAppContainer, Ports};
pub use highlight_interactor::{FileOutcome, HighlightInteractor, HighlightJob, PreparedRun};
