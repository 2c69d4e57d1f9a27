pub mod common;
pub mod configs;
pub mod metadata;
pub mod relay;
pub mod server;
pub mod sources;
pub mod transport;

#[cfg(test)]
mod testing;
