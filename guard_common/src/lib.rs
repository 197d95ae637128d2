//! Cabinet Guard Common Library
//!
//! This crate provides the shared vocabulary of the cabinet guard workspace:
//! sample and zone types, configuration loading and validation, and the
//! adapter traits implemented by sensor and actuation backends.
//!
//! # Module Structure
//!
//! - [`types`] - Samples, zones, states and line geometry
//! - [`config`] - Configuration loading traits and the validated `GuardConfig`
//! - [`sensor`] - Range/vision adapter traits and the actuation sink trait
//! - [`consts`] - Numeric limits and defaults
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust,no_run
//! use guard_common::config::GuardConfig;
//! use std::path::Path;
//!
//! let config = GuardConfig::load_validated(Path::new("config/guard.toml")).unwrap();
//! println!("{} cabinets configured", config.cabinets.len());
//! ```

pub mod config;
pub mod consts;
pub mod prelude;
pub mod sensor;
pub mod types;
