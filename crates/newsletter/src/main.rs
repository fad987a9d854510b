//! Newsletter CLI - daily collection and weekly climate digest.

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use newsletter::config::mask_secret;
use newsletter::digest::{DigestGenerator, MailTransport, SmtpMailer};
use newsletter::search::{DuckDuckGoProvider, RapidApiProvider, SearchProvider};
use newsletter::{Category, CycleOutcome, DataStore, Dispatcher, NewsletterConfig, RunState};

const PROBE_QUERY: &str = "climate resilience grant";

/// Newsletter CLI - collect climate opportunities daily, mail a weekly digest.
#[derive(Parser)]
#[command(name = "newsletter")]
#[command(about = "Climate opportunity collector and weekly digest mailer")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Data directory for category files, state and cache
    #[arg(long, global = true, env = "NEWSLETTER_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Exit non-zero when a due digest could not be sent
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one cycle: collect, or send on the send day (default)
    Run,

    /// Verify configuration
    Check {
        /// Also issue one live query against each search provider
        #[arg(long)]
        probe: bool,
    },

    /// Render the digest from accumulated data without sending
    Preview {
        /// File to write the HTML to
        #[arg(long, short, default_value = "digest_preview.html")]
        output: PathBuf,
    },

    /// Show run state and accumulated row counts
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("newsletter=debug,info")
        } else {
            EnvFilter::new("newsletter=info,warn")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let mut config = NewsletterConfig::from_env();
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    let today = Local::now().date_naive();

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_cycle(config, today, cli.strict).await,
        Commands::Check { probe } => run_check(&config, probe).await,
        Commands::Preview { output } => run_preview(&config, today, &output),
        Commands::Status => {
            run_status(&config, today);
            Ok(())
        }
    }
}

async fn run_cycle(config: NewsletterConfig, today: NaiveDate, strict: bool) -> Result<()> {
    let limit = config.daily_query_limit;
    let dispatcher = Dispatcher::from_config(config)?;

    tracing::info!(
        data_dir = %dispatcher.store().dir().display(),
        providers = ?dispatcher.search().available_providers(),
        "Starting newsletter cycle"
    );

    let outcome = dispatcher.run_cycle(today).await?;

    println!("\n{}", "Cycle Summary".bold());
    println!("   Date: {}", today.format("%A, %B %d, %Y"));

    match &outcome {
        CycleOutcome::Collected {
            share,
            tallies,
            queries_used_today,
        } => {
            println!("   Mode: collecting ({share} queries per category)");
            for tally in tallies {
                println!(
                    "   {:<12} {} new / {} found, {} queries, {} cached",
                    tally.category.label(),
                    tally.added.to_string().green(),
                    tally.collected,
                    tally.queries_used,
                    tally.cache_hits,
                );
            }
            println!("   Queries used today: {queries_used_today}/{limit}");
        }
        CycleOutcome::QuotaExhausted { queries_used_today } => {
            println!(
                "   {} daily query limit reached ({queries_used_today}/{limit})",
                "Skipped:".yellow()
            );
        }
        CycleOutcome::Sent {
            rows,
            files_removed,
        } => {
            println!(
                "   {} digest with {rows} items, {files_removed} files cleared",
                "Sent:".green()
            );
        }
        CycleOutcome::SendFailed { reason } => {
            eprintln!("   {} {reason}", "Send failed:".red().bold());
        }
    }

    if strict && outcome.is_send_failure() {
        bail!("digest was due but could not be sent");
    }

    Ok(())
}

async fn run_check(config: &NewsletterConfig, probe: bool) -> Result<()> {
    println!("{}\n", "Newsletter setup check".bold());

    println!("{}", "Search".bold());
    match config.search.rapidapi_key.as_deref() {
        Some(key) => println!("   {} RAPIDAPI_KEY {}", "ok".green(), mask_secret(key)),
        None => println!(
            "   {} RAPIDAPI_KEY not set, DuckDuckGo fallback only",
            "warn".yellow()
        ),
    }
    println!(
        "   Daily limit {}, {} results per query, cache {} days",
        config.daily_query_limit, config.search.results_per_query, config.search.cache_max_age_days
    );

    println!("\n{}", "Mail".bold());
    println!("   Server {}:{}", config.mail.smtp_host, config.mail.smtp_port);
    let mailer = SmtpMailer::new(config.mail.clone());
    match mailer.validate() {
        Ok(()) => println!(
            "   {} {} -> {} recipient(s), password {}",
            "ok".green(),
            config.mail.sender_email,
            config.mail.recipients.len(),
            mask_secret(&config.mail.sender_password)
        ),
        Err(e) => println!("   {} {e}", "fail".red()),
    }

    println!("\n{}", "Schedule".bold());
    println!(
        "   Send day {}, minimum year {}, data dir {}",
        config.send_day,
        config.collect.min_year,
        config.data_dir.display()
    );

    if probe {
        println!("\n{}", "Provider probe".bold());
        let mut providers: Vec<Box<dyn SearchProvider>> = Vec::new();
        if let Some(key) = config.search.rapidapi_key.as_deref() {
            providers.push(Box::new(RapidApiProvider::new(key)?));
        }
        providers.push(Box::new(DuckDuckGoProvider::new()?));

        for provider in providers {
            match provider.search(PROBE_QUERY, 3).await {
                Ok(results) => println!(
                    "   {} {}: {} results",
                    "ok".green(),
                    provider.name(),
                    results.len()
                ),
                Err(e) => println!("   {} {}: {e}", "fail".red(), provider.name()),
            }
        }
    }

    Ok(())
}

fn run_preview(config: &NewsletterConfig, today: NaiveDate, output: &Path) -> Result<()> {
    let store = DataStore::new(config.data_dir.clone());
    let data = store.load_accumulated();
    let digest = DigestGenerator::render(&data, today);

    std::fs::write(output, &digest.html)
        .with_context(|| format!("Failed to write preview to {}", output.display()))?;

    println!("Subject: {}", digest.subject);
    println!(
        "{} preview with {} items written to {}",
        "ok".green(),
        data.total(),
        output.display()
    );
    Ok(())
}

fn run_status(config: &NewsletterConfig, today: NaiveDate) {
    let store = DataStore::new(config.data_dir.clone());
    let state = RunState::load(&store.state_path(), today);
    let data = store.load_accumulated();

    println!("{}", "Run state".bold());
    println!(
        "   Queries used: {}/{} (on {})",
        state.queries_used_today, config.daily_query_limit, state.last_reset_date
    );
    println!(
        "   Last email sent: {}",
        state
            .last_email_sent
            .map_or_else(|| "never".to_string(), |d| d.to_string())
    );
    println!("   Week started: {}", state.week_start_date);
    println!(
        "   Digest due today: {}",
        if state.should_send(today, config.send_day) {
            "yes".green()
        } else {
            "no".normal()
        }
    );

    println!("\n{}", "Accumulated".bold());
    for category in Category::all() {
        println!("   {:<12} {}", category.label(), data.count(*category));
    }
}
