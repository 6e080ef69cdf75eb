pub mod block;
pub mod hash;
pub mod model;
pub mod validate;

pub use block::Block;
pub use model::{Blockchain, ChainError};
pub use validate::ValidationError;

/// Payload of the genesis block.
pub const GENESIS_PAYLOAD: &str = "genesis block";

/// Sentinel `previous_hash` carried by the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0";
