//! # plate-duo CLI
//!
//! Command-line interface for dual-strategy plate recognition.
//!
//! ## Usage
//! ```bash
//! plate-duo car.jpg
//! plate-duo car.jpg --output line --encoding utf8-bom
//! plate-duo car.jpg --output json --timeout-ms 5000
//! ```

mod cli;

use std::process::ExitCode;

fn main() -> ExitCode {
    cli::run()
}
