pub mod cache;
pub mod key_set;
pub mod source;

pub use cache::JwksCache;
pub use key_set::{KeySet, SigningKey};
pub use source::{HttpKeySource, KeySetError, KeySource, StaticKeySource};
