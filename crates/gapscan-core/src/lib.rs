pub mod analyzer;
pub mod claims;
pub mod confidence;
pub mod config;
pub mod error;
pub mod evidence;
pub mod export;
pub mod gap;
pub mod io;
pub mod prioritizer;
pub mod progress;
pub mod roadmap;
pub mod scoring;
pub mod source;
pub mod types;

pub use error::{GapscanError, Result};
