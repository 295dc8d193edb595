//! Core library components.
//!
//! Configuration merging, value source resolution, secret providers and the
//! encrypted secret store. Nothing in here prints or prompts; the CLI layer
//! owns all user interaction.

pub mod cipher;
pub mod config;
pub mod constants;
pub mod domain;
pub mod merge;
pub mod provider;
pub mod resolve;
pub mod store;
pub mod types;
pub mod validation;
