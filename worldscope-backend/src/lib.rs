pub mod broadcast;
pub mod config;
pub mod error;
pub mod logging;
pub mod module;
pub mod server;
pub mod service;

#[cfg(test)]
mod testing;
