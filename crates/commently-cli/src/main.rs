//! commently CLI
//!
//! Administer comments, replies and reactions kept in a local data directory.

mod commands;

fn main() {
    if let Err(err) = commands::run() {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
