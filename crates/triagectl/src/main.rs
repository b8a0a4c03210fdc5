//! Triage Desk CLI - runs one triage invocation end to end.

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use triage_core::approval::{AutoApprove, InteractiveApproval};
use triage_core::classifier::LlmClassifier;
use triage_core::engine::{TriageEngine, TriageMode, TriageOutcome};
use triage_core::llm::HttpLlmClient;
use triage_core::responder::LlmResponder;
use triage_core::rules::Router;
use triage_core::{Category, Request, TriageConfig};

const DEFAULT_CONFIG: &str = "/etc/triage-desk/config.toml";

#[derive(Parser)]
#[command(name = "triagectl")]
#[command(about = "IT-support triage: diagnostics always, remediation behind approval", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the config file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one support request through the triage workflow
    Ask {
        /// The free-text support request
        text: String,

        /// Category preset (skips the classifier when valid)
        #[arg(long)]
        category: Option<String>,

        /// Auto-approve remediation (the reference stub gate)
        #[arg(long)]
        yes: bool,
    },

    /// List the triage categories and their topic keyword gates
    Categories,

    /// Check that the configured LLM endpoint is reachable
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let config = TriageConfig::load(&cli.config)?;

    match cli.command {
        Commands::Ask {
            text,
            category,
            yes,
        } => run_ask(config, text, category, yes).await,
        Commands::Categories => run_categories(config),
        Commands::Doctor => run_doctor(config).await,
    }
}

async fn run_ask(
    config: TriageConfig,
    text: String,
    category: Option<String>,
    yes: bool,
) -> Result<()> {
    let client = Arc::new(HttpLlmClient::new(config.llm.clone())?);
    let max_turns = config.history.effective_max_turns();

    let router = Router::new(config.vocabulary(), config.matching.mode);
    let engine = TriageEngine::new(
        Arc::new(LlmClassifier::new(client.clone())),
        Arc::new(LlmResponder::diagnostic(client.clone(), max_turns)),
        Arc::new(LlmResponder::remediation(client.clone(), max_turns)),
        if yes {
            Arc::new(AutoApprove) as Arc<dyn triage_core::ApprovalPort>
        } else {
            Arc::new(InteractiveApproval) as Arc<dyn triage_core::ApprovalPort>
        },
        router,
    );

    let mut request = Request::new(text);
    if let Some(hint) = category {
        request = request.with_category_hint(hint);
    }
    info!(case_id = %request.case_id, "starting triage");

    match engine.run(&request).await? {
        TriageOutcome::Completed(report) => {
            println!("{} {}", style("case").dim(), style(report.case_id).dim());
            println!(
                "{} {}  {} {}  {} {:?}",
                style("category").cyan(),
                report.decision.category,
                style("subtopic").cyan(),
                report.decision.subtopic,
                style("action").cyan(),
                report.decision.action,
            );
            if !report.decision.topic_evidence.is_empty() {
                println!(
                    "{} {}",
                    style("evidence").cyan(),
                    report.decision.topic_evidence.join(", ")
                );
            }
            if let Some(approved) = report.approval {
                let verdict = if approved {
                    style("approved").green()
                } else {
                    style("declined").yellow()
                };
                println!("{} {}", style("approval").cyan(), verdict);
            }

            let header = match report.mode {
                TriageMode::Diagnostic => style("DIAGNOSTICS").green().bold(),
                TriageMode::Remediation => style("REMEDIATION").red().bold(),
            };
            println!("\n{header}\n{}", report.output_text);
            Ok(())
        }
        TriageOutcome::InsufficientEvidence { case_id, category } => {
            eprintln!(
                "{} case {case_id}: classified {category} but the request text carries no {category} topic keywords",
                style("insufficient evidence").yellow().bold(),
            );
            eprintln!("Add more detail (exact error text, device names, protocol terms) and retry.");
            std::process::exit(2);
        }
    }
}

fn run_categories(config: TriageConfig) -> Result<()> {
    let vocab = config.vocabulary();
    for category in Category::all() {
        println!("{}", style(category).cyan().bold());
        match vocab.topic_set_for(*category) {
            Some(set) => println!("  gate: {}", set.literals().join(", ")),
            None => println!("  gate: {}", style("none (ungated)").dim()),
        }
    }
    Ok(())
}

async fn run_doctor(config: TriageConfig) -> Result<()> {
    let endpoint = config.llm.endpoint.clone();
    let model = config.llm.model.clone();
    let client = HttpLlmClient::new(config.llm)?;

    if client.is_reachable().await {
        println!(
            "{} {} reachable (model: {})",
            style("ok").green().bold(),
            endpoint,
            model
        );
        Ok(())
    } else {
        eprintln!(
            "{} LLM endpoint {} is not responding",
            style("fail").red().bold(),
            endpoint
        );
        std::process::exit(1);
    }
}
