//! Tasklets incluidos con la aplicación.

mod command;

pub use command::{CommandError, CommandTasklet};
