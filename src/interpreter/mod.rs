//! Line-oriented command interpreter over the virtual filesystem.

mod command;
mod error;
mod interpreter;

pub use command::Command;
pub use interpreter::{Interpreter, Outcome, SessionInfo};
