//! Configuration module for Access-Mapper
//!
//! Configuration comes from an optional TOML file; command-line flags are
//! layered on top of it and the merged result is validated before any page
//! is fetched.
//!
//! # Example
//!
//! ```no_run
//! use access_mapper::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("access-mapper.toml")).unwrap();
//! println!("Crawl will use {} workers", config.crawl.concurrency);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlConfig, FetchConfig, OutputConfig, DEFAULT_CONCURRENCY, DEFAULT_MAX_PAGES,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};

pub use validation::validate;
