//! Domain layer: the tree model and its collaborators' interfaces
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod error;
pub mod events;
pub mod layout;
pub mod model;
pub mod node;
pub mod record;

pub use arena::TreeArena;
pub use error::{DomainError, DomainResult};
pub use events::TreeEvent;
pub use layout::{Layout, LayoutTree, NoLayout, TidyLayout};
pub use model::TreeModel;
pub use node::{Node, NodeId};
pub use record::{NodeRecord, TreeDocument};
