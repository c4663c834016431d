//! Command Line Interface (CLI) layer for SCLMASK.
//!
//! This module defines argument parsing (`args`) and the orchestration logic
//! (`runner`) for image/SCL pairs and SAFE products. It wires user-provided
//! options to the library functionality exposed via `sclmask::api`.
//!
//! If you are embedding SCLMASK into another application, prefer using
//! the high-level `sclmask::api` module instead of calling the CLI code.
pub mod args;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
