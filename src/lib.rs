//! Speech translator backed by Gemini
//!
//! Text is translated with a Gemini text model and spoken back with the
//! Gemini TTS model. The [`session`] module is a pure state machine; the
//! [`session::Runtime`] executes its effects against the [`api`] clients, the
//! [`audio`] pipeline and the on-disk [`history`].

pub mod api;
pub mod audio;
pub mod config;
pub mod error;
pub mod history;
pub mod logging;
pub mod session;

pub use error::SessionError;
pub use session::{Event, Runtime, Session, SessionState};
