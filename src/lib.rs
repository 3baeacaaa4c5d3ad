pub mod app;
pub mod calendar;
pub mod config;
pub mod errors;
pub mod goals;
pub mod handlers;
pub mod models;
pub mod rollup;
pub mod snapshot;
pub mod state;
pub mod stats;
pub mod storage;
pub mod streak;

pub use app::router;
pub use config::{Config, Settings};
pub use snapshot::Snapshot;
pub use state::AppState;
pub use storage::{JsonFileStore, MemoryStore, RecordStore};
