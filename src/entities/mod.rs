//! SeaORM entity definitions

pub mod prelude;
pub mod stream_tags;
pub mod streams;
