use clap::Parser;
use env_logger::{Builder, Env};
use snipjar::{handle_command, Snipjar};
use std::process;

fn init_logger() {
    // RUST_LOG overrides the default filter
    Builder::from_env(Env::default().default_filter_or("warn"))
        .format_timestamp_millis()
        .init();
}

fn main() {
    init_logger();

    let args = Snipjar::parse();
    if let Err(e) = handle_command(args) {
        eprintln!("Error: {}", e.user_message());
        log::debug!("{:?}", e);
        process::exit(1);
    }
}
