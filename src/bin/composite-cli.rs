use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "composite-cli")]
#[command(about = "Inspect a running product composite service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:7000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Composite health of all core services
    Health,
    /// Health of a single core service
    Component {
        /// product, recommendation or review
        name: String,
    },
    /// Worker pool occupancy and counters
    Pool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let path = match &cli.command {
        Commands::Health => "/actuator/health".to_string(),
        Commands::Component { name } => format!("/actuator/health/{name}"),
        Commands::Pool => "/actuator/pool".to_string(),
    };

    let res = client.get(format!("{base}{path}")).send().await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: service returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
