//! Configuration module for Linktide
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use linktide::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("linktide.toml")).unwrap();
//! println!("Windows hold {} links", config.pipeline.concurrency_limit);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BookmarkApiConfig, Config, ImportConfig, OutputConfig, PipelineConfig, ProbeMethod,
    UserAgentConfig, ValidationConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
