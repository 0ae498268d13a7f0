//! # orgctl
//!
//! Command-line admin helper for a cloud org: assign permission sets to users
//! and set profile or banner photos for users and Chatter groups.
//!
//! All logic lives in the `orgctlapp` crate; this binary only parses arguments,
//! picks credentials and prints results. Run `orgctl --help` for usage.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
