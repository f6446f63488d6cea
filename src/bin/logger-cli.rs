use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "logger-cli")]
#[command(about = "Client for a running interaction logger", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record an interaction
    Log {
        #[arg(long)]
        user_id: Option<String>,
        #[arg(long)]
        question: String,
        #[arg(long)]
        response: String,
    },
    /// Run only the completion step for a question/response pair
    Complete {
        #[arg(long)]
        question: String,
        #[arg(long)]
        response: String,
    },
    /// Send a CORS preflight and show the allow headers
    Preflight,
    /// Show server health and trace backend settings
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    match cli.command {
        Commands::Log { user_id, question, response } => {
            let mut body = json!({ "question": question, "response": response });
            if let Some(id) = user_id {
                body["userId"] = Value::String(id);
            }
            let res = client
                .post(format!("{}/api/logging", cli.url))
                .headers(headers)
                .json(&body)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Complete { question, response } => {
            let res = client
                .post(format!("{}/api/completion", cli.url))
                .headers(headers)
                .json(&json!({ "question": question, "response": response }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Preflight => {
            let res = client
                .request(reqwest::Method::OPTIONS, format!("{}/api/logging", cli.url))
                .send()
                .await?;
            for (name, value) in res.headers() {
                if name.as_str().starts_with("access-control-") {
                    println!("{}: {}", name, value.to_str().unwrap_or("<binary>"));
                }
            }
            print_response(res).await?;
        }
        Commands::Health => {
            let res = client.get(format!("{}/health", cli.url)).send().await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let json: Value = res.json().await?;
    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
    }
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
