use clap::Parser;
use photo_noise::cli::Cli;

#[tokio::main]
async fn main() {
    photo_noise::init_logger();

    if let Err(e) = photo_noise::run(Cli::parse()).await {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}
