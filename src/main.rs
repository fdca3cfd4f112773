use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = platform_gateway::cli::Cli::parse();
    if let Err(e) = platform_gateway::cmd::dispatch(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
