//! Main application entry point (native).

#[cfg(feature = "native")]
fn main() {
    use clap::Parser;

    env_logger::init();
    let cli = inkboard_app::cli::Cli::parse();
    log::debug!("Running {:?}", cli.command);

    match inkboard_app::cli::run(&cli) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(not(feature = "native"))]
fn main() {
    eprintln!("Native feature not enabled. Use `cargo run --features native`");
    std::process::exit(1);
}
