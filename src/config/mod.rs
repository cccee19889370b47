// src/config/mod.rs

//! Task spec loading and validation.
//!
//! A task spec is a small YAML document describing what to launch: how many
//! nodes, on which cloud, with what setup commands and file mounts. Loading
//! is split into raw deserialization ([`model::RawLaunchTask`]) and semantic
//! validation ([`model::LaunchTask`]), so serde stays dumb and every
//! cross-field rule lives in [`validate`].

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{LaunchTask, RawLaunchTask};
