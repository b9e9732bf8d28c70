use clap::Parser;

pub mod cli;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("diachron=info,diachronlib=info"))
        )
        .init();

    // Failures are already reported by the commands.
    if cli::CLI::parse().execute().is_err() {
        std::process::exit(1);
    }
}
