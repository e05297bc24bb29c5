#![forbid(unsafe_code)]

// Modules
pub mod server;
pub mod utils;
pub mod v1;
