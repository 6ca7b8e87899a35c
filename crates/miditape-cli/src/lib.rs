//! miditape CLI library.
//!
//! Command implementations and the input checks shared by them.

pub mod checks;
pub mod commands;
pub mod logging;
