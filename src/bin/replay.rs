//! Replay a scenario file against a fresh book and print the result.
//!
//! Usage: `replay <scenario-file>`
//!
//! Exits 0 when the scenario runs clean (including its `R` assertions),
//! 2 on usage errors, and 1 on I/O or scenario failures.

use std::process::ExitCode;

use crossbook::{scenario, Book};

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let (Some(path), None) = (args.next(), args.next()) else {
        eprintln!("usage: replay <scenario-file>");
        return ExitCode::from(2);
    };

    let text = match std::fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("replay: {path}: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut book = Book::new();
    if let Err(err) = scenario::run(&mut book, &text) {
        eprintln!("replay: {path}: {err}");
        return ExitCode::FAILURE;
    }

    let depth = book.depth();
    println!("orders: {}", book.size());
    println!("asks ({} levels):", depth.asks.len());
    for level in depth.asks.iter().rev() {
        println!("  {:>8} x {}", level.price, level.quantity);
    }
    println!("bids ({} levels):", depth.bids.len());
    for level in &depth.bids {
        println!("  {:>8} x {}", level.price, level.quantity);
    }

    ExitCode::SUCCESS
}
