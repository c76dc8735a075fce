pub use super::stream_tags::Entity as StreamTags;
pub use super::streams::Entity as Streams;
