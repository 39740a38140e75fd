//! grafter-lib: adding contracts to subgraph projects
//!
//! This crate holds the pieces behind `grafter add`:
//! - `manifest`: lossless editing of `subgraph.yaml`
//! - `abi`: loading contract ABIs from disk or a block explorer
//! - `collision`: reconciling new events with existing entities
//! - `datasource` / `scaffold`: the new data source and its generated files
//! - `add`: the ordered pipeline tying them together
//! - `fura`: subgraph management calls to a Fura graph node

pub mod abi;
pub mod add;
pub mod codegen;
pub mod collision;
pub mod consts;
pub mod datasource;
pub mod fura;
pub mod manifest;
pub mod networks;
pub mod registry;
pub mod scaffold;
