pub mod abi;
pub mod explorer;
pub mod reader;

pub use explorer::{ActivityIndex, ExplorerClient, LatestActivity};
pub use reader::{ChainReader, RpcReader};
