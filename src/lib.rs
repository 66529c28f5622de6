pub mod cli;
pub mod config;
pub mod logging;
pub mod models;
pub mod store;
pub mod tui;
pub mod utils;

pub use config::Config;
pub use models::{Priority, Status, StatusFilter, Task};
pub use store::{JsonFile, LoadOutcome, StoreError, TaskEdit, TaskStore, ValidationError};
pub use utils::Profile;
