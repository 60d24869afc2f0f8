use std::process::ExitCode;

use mvedit::errors::MvEditError;
use mvedit::output as out;
use mvedit::{app, cli};

fn main() -> ExitCode {
    let args = cli::parse();
    match app::run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // A user cancellation exits non-zero but stays quiet.
            let cancelled = e
                .downcast_ref::<MvEditError>()
                .map(MvEditError::is_cancelled)
                .unwrap_or(false);
            if !cancelled {
                out::print_error(&format!("{e:#}"));
            }
            ExitCode::FAILURE
        }
    }
}
