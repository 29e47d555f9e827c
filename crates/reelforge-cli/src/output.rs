//! Output mode and printing. The reference CLI tracks `--json` with a
//! `static mut JSON_MODE: bool`, toggled from `main` before any command
//! runs and read from everywhere else — sound only because nothing here is
//! actually concurrent, but still undefined behavior the moment two threads
//! touch it. An `AtomicBool` behind a `OnceLock` gives the same global,
//! set-once-read-everywhere shape without the soundness hole.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

use serde::Serialize;
use termcolor::{ColorChoice, StandardStream};

static JSON_MODE: OnceLock<AtomicBool> = OnceLock::new();

pub fn init(json: bool) {
    JSON_MODE
        .get_or_init(|| AtomicBool::new(json))
        .store(json, Ordering::SeqCst);
}

pub fn is_json() -> bool {
    JSON_MODE
        .get_or_init(|| AtomicBool::new(false))
        .load(Ordering::SeqCst)
}

pub fn print<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    println!("{s}");
    Ok(())
}

pub fn eprintln_line(msg: &str) {
    let _ = writeln!(io::stderr(), "{msg}");
}

pub fn stdout() -> StandardStream {
    StandardStream::stdout(ColorChoice::Auto)
}
