pub mod config;
pub mod connection;
pub mod frame;
pub mod message;
pub mod session;
pub mod transcript;
