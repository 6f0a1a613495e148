//! Content generation for SizeFS synthetic files.
//!
//! This crate turns a [`ContentConfig`] (four patterns plus randomness
//! settings) and a file size into a [`WindowedReader`] that can answer any
//! byte-range read without materializing the file.
//!
//! # Architecture
//!
//! ```text
//! ContentConfig (YAML / code)
//!        │
//!        ▼
//! ┌──────────────────────────┐
//! │  WindowedReader          │
//! │                          │
//! │  - prefix  (fixed bytes) │
//! │  - filler  (Pattern)     │
//! │  - padder  (Pattern)     │
//! │  - suffix  (fixed bytes) │
//! │  - remainder, cursor     │
//! └────────────┬─────────────┘
//!              │ read(start, end)
//!              ▼
//!         exactly end - start bytes
//! ```
//!
//! # Example
//!
//! ```rust
//! use sizefs_contents::{ContentConfig, WindowedReader};
//!
//! let config = ContentConfig::with_filler("a(bc){5}d");
//! let mut reader = WindowedReader::new(1024, &config).unwrap();
//! assert_eq!(reader.read(0, 16), b"abcbcbcbcbcdabcb");
//! ```

pub mod config;
pub mod error;
pub mod reader;

// Re-exports for convenience
pub use config::{
    ContentConfig, PatternRole, DEFAULT_FILLER, DEFAULT_MAX_RANDOM, DEFAULT_PADDER,
    DEFAULT_PREFIX, DEFAULT_SUFFIX,
};
pub use error::ContentError;
pub use reader::{ReadChunks, WindowedReader};
