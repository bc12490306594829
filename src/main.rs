//! crochet - Local-first records, pricing and time estimates for crochet work

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = crochet_ledger::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
