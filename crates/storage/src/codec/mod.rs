//! Codec adapters
//!
//! Composable wrappers that present the raw byte keyspace as a store over
//! typed keys and values. Purely structural — no concurrency logic.

mod subspace;
mod value;

pub use subspace::Subspace;
pub use value::{BincodeCodec, ValueCodec};
