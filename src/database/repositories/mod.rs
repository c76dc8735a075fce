//! SeaORM repository implementations
//!
//! Repositories own all persisted-state reads and mutations. Lifecycle
//! transitions are expressed as predicate-qualified updates, never as
//! read-modify-write of an in-memory copy, so racing callers resolve against
//! current row state at the store.

pub mod stream;
pub mod stream_tag;

// Re-export for convenience
pub use stream::StreamSeaOrmRepository;
pub use stream_tag::StreamTagSeaOrmRepository;
