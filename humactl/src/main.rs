use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = humactl::Cli::parse();
    if let Err(err) = humactl::run(cli).await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
