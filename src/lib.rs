//! btedit: in-memory model of a behavior-tree editor
//!
//! Layered like the binary uses it:
//! - [`domain`]: nodes, the arena-backed [`TreeModel`](domain::TreeModel), layout, events
//! - [`application`]: codecs and the document service
//! - [`infrastructure`]: filesystem boundary and service wiring
//! - [`cli`]: the `btedit` command line

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
