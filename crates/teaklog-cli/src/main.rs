use clap::Parser;
use std::process::ExitCode;
use teaklog::{Cli, run};

fn main() -> ExitCode {
    // `teaklog events run.log | head` must end quietly once the reader exits.
    #[cfg(unix)]
    restore_default_sigpipe();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

#[cfg(unix)]
fn restore_default_sigpipe() {
    // SAFETY: runs before any other thread exists; SIG_DFL is always a valid handler.
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}
