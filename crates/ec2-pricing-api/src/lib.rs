pub mod config;
pub mod features;
pub mod server;
pub mod shared;
