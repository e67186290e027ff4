//! Pokemon Deep Research CLI
//!
//! Runs one query through the full research pipeline and renders the
//! finished report, optionally alongside a plain LLM answer for
//! comparison.
//!
//! Usage:
//!   cargo run --bin poke_research -- "Build a team of all bug type Pokemon"
//!
//!   # Prompt interactively, compare against a research-free answer,
//!   # and emit raw JSON instead of the text report
//!   cargo run --bin poke_research -- --compare
//!   cargo run --bin poke_research -- --json "I want a pink fairy pokemon"
//!
//! Credentials come from the environment (or a .env file):
//!   ANTHROPIC_API_KEY or OPENAI_API_KEY, with AGENT_BACKEND selecting
//!   between them.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;

use poke_research::{ResearchAgent, ResearchConfig};

/// Deep research over the PokeAPI, steered by an LLM
#[derive(Parser, Debug)]
#[command(name = "poke_research")]
#[command(about = "Answer natural-language Pokemon questions with API-grounded research")]
struct Args {
    /// The question to research; prompts interactively when omitted
    query: Option<String>,

    /// Print the report bundle as JSON instead of the text rendering
    #[arg(long)]
    json: bool,

    /// Also fetch a plain LLM answer for comparison
    #[arg(long, short = 'c')]
    compare: bool,

    /// Directory for saved report files
    #[arg(long, short = 'd', default_value = "reports")]
    report_dir: PathBuf,

    /// Skip writing report files
    #[arg(long)]
    no_save: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let args = Args::parse();

    let query = match args.query {
        Some(query) => query,
        None => prompt_for_query()?,
    };

    let config = ResearchConfig::from_env()?;
    let agent = ResearchAgent::from_config(config)?;

    if !args.json {
        println!("\n{} {}", "Researching:".cyan().bold(), query);
    }

    let report = agent.run(&query).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.render_text());
    }

    let comparison = if args.compare {
        match agent.simple_answer(&query).await {
            Ok(answer) => {
                if !args.json {
                    println!("{}", "PLAIN LLM ANSWER (no research)".yellow().bold());
                    println!("{}\n", answer);
                }
                Some(answer)
            }
            Err(e) => {
                eprintln!("{} comparison answer failed: {}", "WARN:".yellow(), e);
                None
            }
        }
    } else {
        None
    };

    if !args.no_save {
        let (text_path, json_path) =
            report.save_to_dir(&args.report_dir, comparison.as_deref())?;
        if !args.json {
            println!(
                "{} {} and {}",
                "Saved:".green().bold(),
                text_path.display(),
                json_path.display()
            );
        }
    }

    Ok(())
}

/// Interactive query prompt, looping until non-empty input
fn prompt_for_query() -> Result<String, std::io::Error> {
    let stdin = std::io::stdin();
    loop {
        print!("Enter your Pokemon query: ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            // EOF
            std::process::exit(0);
        }

        let query = line.trim().to_string();
        if !query.is_empty() {
            return Ok(query);
        }
        println!("Please enter a non-empty query.");
    }
}
