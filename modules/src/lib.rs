//! ferrircd command modules
//!
//! This crate provides the loadable command sets for the IRC daemon.

pub mod optional;
pub mod standard;

pub use optional::OptionalModule;
pub use standard::StandardModule;
