//! Shared test support for the contract test harness workspace.
//!
//! - [`mocks`]: scripted mock endpoint doubles recording lifecycle calls
//! - [`fixtures`]: ready-made fragments and class specs
//! - [`generators`]: proptest strategies over the contract model

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod mocks;

pub use mocks::{ScriptedBehavior, ScriptedMockServerFactory};
