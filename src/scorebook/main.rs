//! The `scorebook` binary is thin: the CLI lives in `cli/`, while this file only
//! invokes `cli::run()` and turns failures into an exit code.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        cli::report_error(&e);
        std::process::exit(1);
    }
}
