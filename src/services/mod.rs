pub mod scan;
pub use scan::{ScanOrchestrator, ScanOutcome, ScanScope, build_queries};

pub mod scanner;
pub use scanner::{ScanController, ScanPhase, ScanStatus};

pub mod scheduler;
pub use scheduler::Scheduler;

pub mod tracker;
pub use tracker::{
    Edit, EpisodeRow, EpisodeState, Library, TrackerError, apply_edit, episode_rows,
};
