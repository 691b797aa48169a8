//! Application layer: persistence use cases
//!
//! This layer orchestrates the domain model and depends on I/O boundary traits.

pub mod codec;
pub mod error;
pub mod error_ext;
pub mod services;

pub use codec::{Codec, CodecError, Format, JsonCodec, TomlCodec};
pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
