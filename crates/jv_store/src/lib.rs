//! Process-resident bytecode storage for the javelin pipeline.
//!
//! One structure plays two roles: the package registry that in-flight
//! compilations file artifacts into and resolve classpath lookups from, and
//! the durable store that successful compilations promote into.

mod clock;
mod store;

pub use clock::{Clock, SystemClock};
pub use store::BytecodeStore;

/// Hash map with the fast non-cryptographic hasher used across the
/// workspace.
pub type FastHashMap<K, V> = hashbrown::HashMap<K, V, ahash::RandomState>;

pub fn fast_map_new<K, V>() -> FastHashMap<K, V> {
    FastHashMap::with_hasher(ahash::RandomState::new())
}
