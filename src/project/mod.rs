//! Project configuration: loading the implicit supertype table.

pub mod library_loader;

pub use library_loader::{LibraryConfigError, LibraryFormat, LibraryLoader};
