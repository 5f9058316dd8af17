use std::env;

use spellres::cli;

fn main() {
    let args: Vec<String> = env::args().collect();
    cli::init_tracing(args.iter().any(|arg| arg == "--verbose"));
    std::process::exit(cli::run_with_args(&args));
}
