pub mod apply;
pub mod batch;
pub mod cleanup;
pub mod cli;
pub mod dates;
pub mod error;
pub mod exif;
pub mod locate;
pub mod manual;
pub mod media;
pub mod sidecar;
pub mod stats;

pub use apply::{RunOptions, apply, apply_sidecar, set_file_dates};
pub use batch::{process_directory, process_entry};
pub use cli::Cli;
pub use error::{Result, TakeoutError};
pub use locate::{Located, Locator};
pub use manual::{apply_manual_dates, prompt_manual_dates};
pub use media::{MediaEntry, MediaKind};
pub use sidecar::{GpsPosition, SidecarRecord};
pub use stats::{ProcessingOutcome, RunStats};
