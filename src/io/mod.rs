// External I/O for the binary
pub mod lock; // Single-instance lock file
pub mod signals; // Unix signal handling
