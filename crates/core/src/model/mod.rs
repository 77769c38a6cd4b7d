//! Domain records shared by the gateway, the cache store and the repository.

mod types;

pub use types::*;
