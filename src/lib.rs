//! Deskchat is a terminal client for the service desk's real-time chat
//! endpoint.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the WebSocket connection, the frame codec, the transcript,
//!   and the session glue that turns connection events into transcript
//!   mutations.
//! - [`ui`] renders the terminal interface and runs the interactive event loop
//!   that drives user input and display updates.
//! - [`utils`] holds tracing setup, the transcript log, and scroll math.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`], which dispatches into [`ui::chat_loop`] for
//! interactive sessions and [`cli::say`] for one-shot messages.

pub mod cli;
pub mod core;
pub mod ui;
pub mod utils;
