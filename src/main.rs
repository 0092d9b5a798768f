//! eventid CLI - deterministic identifiers for deduplicated event ingestion.

use clap::Parser;
use colored::*;
use eventid::{Deduplicator, IdContract, IdGenerator, Ingested, read_reports};
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;

mod cli;

use cli::{Cli, Command};

fn setup_logging() -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("eventid")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("eventid.log");

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn load_generator(cli: &Cli) -> Result<IdGenerator> {
    let contract = match &cli.contract {
        Some(path) => IdContract::load(path)?,
        None => IdContract::v1(),
    };
    IdGenerator::new(contract).map_err(|e| eyre::eyre!(e))
}

fn run(cli: Cli) -> Result<()> {
    let generator = load_generator(&cli).context("Failed to load identity contract")?;

    match cli.command {
        Command::Event { user_id, start_time } => {
            let id = generator
                .event_id(&user_id, start_time)
                .map_err(|e| eyre::eyre!(e))
                .context("Failed to generate event ID")?;
            println!("{}", id);
        }

        Command::Activity { event_id, index } => {
            let id = generator
                .activity_id(&event_id, index)
                .map_err(|e| eyre::eyre!(e))
                .context("Failed to generate activity ID")?;
            println!("{}", id);
        }

        Command::Parts { parts } => {
            let id = generator
                .id_from_parts(parts.as_slice())
                .map_err(|e| eyre::eyre!(e))
                .context("Failed to generate ID")?;
            println!("{}", id);
        }

        Command::Bucket { start_time } => {
            let start = generator.bucket_start_ms(start_time);
            let width = generator.contract().bucket_width_ms;
            println!(
                "{} [{}, {}) {}",
                "→".blue(),
                start,
                start + width,
                format!("({}ms into bucket)", start_time.timestamp_millis() - start).dimmed()
            );
        }

        Command::Dedup { file, json } => {
            let reports = read_reports(&file).context("Failed to read reports")?;
            let mut dedup = Deduplicator::new(generator);
            let mut duplicates = 0;

            for report in &reports {
                let outcome = dedup
                    .ingest(report)
                    .map_err(|e| eyre::eyre!(e))
                    .context("Failed to ingest report")?;
                if let Ingested::Duplicate(_) = outcome {
                    duplicates += 1;
                }
            }

            if json {
                for event in dedup.events() {
                    println!("{}", serde_json::to_string(event).context("Failed to serialize event")?);
                }
            } else if dedup.is_empty() {
                println!("{}", "No reports found".dimmed());
            } else {
                println!(
                    "{} {} report(s) -> {} event(s), {} duplicate(s)",
                    "✓".green(),
                    reports.len(),
                    dedup.len(),
                    duplicates
                );
                for event in dedup.events() {
                    println!(
                        "{} {} @{} [{}]",
                        event.event_id.as_str().cyan(),
                        event.user_id,
                        event.bucket_start_ms,
                        event.sources.join(", ").dimmed()
                    );
                    for (index, activity) in event.activity_ids.iter().enumerate() {
                        println!("    {} {}", index, activity.as_str().dimmed());
                    }
                }
            }
        }

        Command::Contract => {
            print!("{}", generator.contract().to_yaml()?);
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    info!("Command: {:?}", std::env::args().collect::<Vec<_>>());

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
