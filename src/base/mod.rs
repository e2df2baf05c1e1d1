//! Foundation types for the Syster model engine.
//!
//! This module provides fundamental types used throughout the engine:
//! - [`TextRange`], [`TextSize`] - Source positions (byte offsets) supplied by the parser
//! - [`names`] - Name segment quoting and qualified path splitting
//!
//! This module has NO dependencies on other syster modules.

pub mod names;

pub use names::{is_basic_name, join_segments, quote_segment, split_qualified};
pub use text_size::{TextRange, TextSize};

// Re-export text-size for convenience
pub use text_size;
