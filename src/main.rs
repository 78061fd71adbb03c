// src/main.rs

use statusblocks::{cli, logging, run};

fn main() {
    let args = cli::parse();
    if let Err(err) = logging::init_logging(args.log_level) {
        eprintln!("statusblocks error: {err:?}");
        std::process::exit(1);
    }
    if let Err(err) = run(args) {
        eprintln!("statusblocks error: {err}");
        std::process::exit(err.exit_code());
    }
}
