//! Application services
//!
//! Services depend on I/O boundary traits (FileSystem) and a [`Codec`](crate::application::Codec)
//! but are themselves concrete structs, not traits.

mod document;

pub use document::DocumentService;
