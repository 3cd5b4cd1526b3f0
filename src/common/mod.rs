pub mod error;
pub mod logging;
pub mod progress;
pub mod types;
pub mod utils;

pub use error::CleanError;
pub use logging::*;
pub use progress::create_record_progress_bar;
pub use types::*;
pub use utils::*;
