//! Project configuration tests
//!
//! Loading implicit supertype tables from disk and linking models against them.

pub mod tests_library_loader;
