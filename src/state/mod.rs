// State management module
// Pattern library, the persisted project document, edit history and file storage

pub mod history;
pub mod library;
pub mod models;
pub mod storage;

pub use history::EditHistory;
pub use library::{LibraryError, LibraryResult, PatternLibrary};
pub use models::{LoadError, LoadResult, PlaybackSettings, RhythmData, CURRENT_VERSION};
pub use storage::{calculate_sha256, get_app_data_dir, ProjectStore, SaveOutcome, StorageError, StorageResult};
