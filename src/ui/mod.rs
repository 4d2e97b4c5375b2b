//! Terminal UI layer for interactive chat sessions.
//!
//! - [`chat_loop`]: the interaction loop that feeds keys to the input box and
//!   session updates to the view.
//! - [`renderer`] and [`title`]: frame composition.
//! - [`view`]: presentation state (input buffer, scroll position, status).
//! - [`theme`]: style policy.
//!
//! Ownership boundary: this layer presents and captures interaction state, while
//! [`crate::core`] owns the transcript and the connection.

pub mod chat_loop;
pub mod renderer;
pub mod theme;
pub mod title;
pub mod view;
