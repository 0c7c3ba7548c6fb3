//! Terminal abstraction over a session channel.
//!
//! Turns the raw byte stream of a channel into discrete text lines with
//! prompt and echo handling, while passing out-of-band channel requests
//! through untouched.

mod editor;

pub use editor::{LineEditor, TermEvent};
