pub mod cli;
pub mod config;
pub mod engine;
pub mod model;
pub mod onchain;
pub mod report;
pub mod tracker;

pub use engine::{EngineError, refresh};
pub use model::{Chain, ProbeCatalog, Snapshot, WalletRecord, WalletSet};
pub use tracker::{RefreshStatus, Tracker};
