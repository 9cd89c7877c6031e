// Tables and colored output
pub mod display;

// The readline loop
mod shell;

// Parsing and handling of individual commands
mod command_handlers;

pub use shell::run_shell;
