mod config;
mod error;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use runtime::{Agent, Backend, McpToolHost, Outcome, ProviderBackend, Reply, ToolHost};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;
use error::{Error, Result};

const DEMO_QUERIES: [&str; 3] = [
    "What's the current weather in San Francisco?",
    "Give me a 5-day forecast for Tokyo",
    "What's the weather at coordinates 51.5074, -0.1278?",
];

type WeatherAgent = Agent<ProviderBackend, McpToolHost>;

const CONFIG_HINT: &str = "Set up your environment (or .env file) with:
  AI_PROVIDER=gemini (or anthropic)
  GEMINI_API_KEY=...     (if using Gemini)
  ANTHROPIC_API_KEY=...  (if using Anthropic)
  OPENWEATHER_API_KEY=... (for the weather server)";

#[derive(Parser)]
#[command(name = "weather-client")]
#[command(about = "Ask a language model about the weather via the MCP weather server", long_about = None)]
#[command(version)]
struct Cli {
    /// Run the canned demo queries instead of the interactive prompt
    #[arg(long)]
    demo: bool,

    /// Configuration file (defaults to ./weather.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Model provider, "gemini" or "anthropic" (overrides AI_PROVIDER)
    #[arg(short, long)]
    provider: Option<String>,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,runtime=info,cli=info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        if matches!(e, Error::Config(_)) {
            eprintln!("\n{CONFIG_HINT}");
        }
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let lookup = |name: &str| std::env::var(name).ok();

    let mut config = Config::discover(cli.config.as_deref())?;
    config.apply_env(lookup);
    if let Some(provider) = cli.provider {
        config.model.provider = Some(provider);
    }

    let settings = config.provider_settings(lookup)?;
    let backend = ProviderBackend::new(settings);

    let server = config.server_config(lookup);
    if server.api_key.is_some() {
        eprintln!("Authenticating with the weather server...");
    }
    let tools = McpToolHost::spawn(&server).await?;

    let agent = Agent::new(backend, tools).with_max_rounds(config.model.max_rounds);
    print_banner(&agent, if cli.demo { "Automated Demo" } else { "Interactive Mode" });

    let result = if cli.demo {
        demo(&agent).await
    } else {
        interactive(&agent).await
    };

    let (_, tools) = agent.into_parts();
    tools.shutdown().await?;
    result
}

fn print_banner(agent: &WeatherAgent, mode: &str) {
    let names: Vec<&str> = agent.tools().specs().iter().map(|s| s.name.as_str()).collect();
    eprintln!("Connected to weather server");
    eprintln!("Available tools: {}\n", names.join(", "));

    println!("{}", "=".repeat(60));
    println!("Weather Assistant - {mode}");
    println!("Powered by: {}", agent.backend().name());
    println!("{}", "=".repeat(60));
}

async fn interactive(agent: &WeatherAgent) -> Result<()> {
    println!("\nAsk me about the weather! Examples:");
    println!("  - What's the weather like in San Francisco?");
    println!("  - Give me a 5-day forecast for Tokyo");
    println!("  - Compare weather in London and Paris");
    println!("\nType 'quit' or 'exit' to stop.\n");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("You: ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            // EOF
            break;
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if is_exit(input) {
            break;
        }

        answer(agent, input).await;
    }

    println!("\nGoodbye!");
    Ok(())
}

async fn demo(agent: &WeatherAgent) -> Result<()> {
    println!();
    for query in DEMO_QUERIES {
        answer(agent, query).await;
        println!("{}\n", "-".repeat(60));
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
    Ok(())
}

/// Run one query and print the outcome. Errors end the query, not the session.
async fn answer(agent: &WeatherAgent, query: &str) {
    println!("Query: {query}\n");
    match agent.ask(query).await {
        Ok(reply) => println!("{}\n", render(&reply)),
        Err(e) => eprintln!("Error processing query: {e}\n"),
    }
}

fn render(reply: &Reply) -> String {
    match &reply.outcome {
        Outcome::Answer(text) => format!("Response:\n{text}"),
        Outcome::Stopped { reason, text } if text.is_empty() => {
            format!("Response stopped early ({reason}).")
        }
        Outcome::Stopped { reason, text } => {
            format!("Response (stopped early: {reason}):\n{text}")
        }
        Outcome::Incomplete { rounds } => format!(
            "Reached the maximum of {rounds} model rounds without a final answer. \
             Try a more specific question."
        ),
    }
}

fn is_exit(input: &str) -> bool {
    matches!(input.to_ascii_lowercase().as_str(), "quit" | "exit" | "q")
}

#[cfg(test)]
mod tests {
    use super::*;
    use runtime::{FinishReason, Usage};

    fn reply(outcome: Outcome) -> Reply {
        Reply {
            outcome,
            rounds: 1,
            usage: Usage::default(),
        }
    }

    #[test]
    fn exit_words_are_case_insensitive() {
        assert!(is_exit("quit"));
        assert!(is_exit("EXIT"));
        assert!(is_exit("q"));
        assert!(!is_exit("weather in quito"));
    }

    #[test]
    fn renders_each_outcome() {
        assert_eq!(
            render(&reply(Outcome::Answer("Sunny.".into()))),
            "Response:\nSunny."
        );
        assert!(
            render(&reply(Outcome::Stopped {
                reason: FinishReason::Length,
                text: "It is".into(),
            }))
            .contains("stopped early: length")
        );
        assert!(render(&reply(Outcome::Incomplete { rounds: 10 })).contains("10 model rounds"));
    }

    #[test]
    fn cli_flags_parse() {
        let cli = Cli::parse_from(["weather-client", "--demo", "--provider", "anthropic"]);
        assert!(cli.demo);
        assert_eq!(cli.provider.as_deref(), Some("anthropic"));
        assert!(cli.config.is_none());
    }
}
