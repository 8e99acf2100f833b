pub mod args;
pub mod commands;
pub mod shell;

pub use args::{Args, Widget};
pub use shell::{LineOutput, Session, Shell};
