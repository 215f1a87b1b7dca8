//! API for herb users
pub type HerbResult<T> = Result<T, HerbFatal>;
pub type BytesVec = Vec<u8>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HerbFatal;

/// Expose herb's (de)serialization functions
/// that use the appropriate bincode config options.
pub use super::wire_bytes::{deserialize, serialize};
