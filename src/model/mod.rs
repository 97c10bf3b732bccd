pub mod catalog;
pub mod chain;
pub mod record;
pub mod wallet;

pub use catalog::{ProbeCatalog, ReadMethod, StakeProbe, TokenProbe};
pub use chain::Chain;
pub use record::{Health, HealthLabel, Snapshot, WalletRecord};
pub use wallet::WalletSet;
