//! Tool input and output models.
//!
//! Output field names follow the wire contract exactly (`resolvedUser`,
//! `preferred_username`, ...), so renames are spelled out per field.

mod greeting;
mod inputs;

pub use greeting::{DEFAULT_SUBJECT, GreetingResponse, greeting_subject};
pub use inputs::HelloInput;
