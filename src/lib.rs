//! Command-line launcher for the lintel static-analysis engine.
//!
//! The launcher only decides *how* the engine runs: on piped input
//! (`--stdin`), as the configuration wizard (`--init`), or on a normal
//! command line. Linting itself happens in the external engine.

pub mod cli;
pub mod config;
pub mod delegate;
pub mod diagnostics;
pub mod error;
pub mod failure;
pub mod flags;
pub mod input;
pub mod template;
