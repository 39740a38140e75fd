//! Subgraph manifest access and mutation.
//!
//! The manifest is kept as an ordered YAML tree so that fields this crate does
//! not know about survive a load, mutate, write cycle untouched. Typed views of
//! the parts we generate live in [`types`].

mod tree;
mod types;

pub use tree::*;
pub use types::*;
