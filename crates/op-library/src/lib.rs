//! op-library
//!
//! Built-in operations for the op-engine dataflow engine. Each operation
//! is a plain function plus an author-supplied descriptor; the engine
//! wires them into graphs and the registry presents their metadata.
//!
//! # Categories
//!
//! - **Math**: scalar numeric operations
//! - **Text**: string operations
//! - **Collection**: operations over arrays of values

pub mod collect;
pub mod math;
pub mod setup;
pub mod text;

pub use setup::register_builtins;
