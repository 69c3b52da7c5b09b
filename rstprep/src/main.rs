//! rstprep - reStructuredText preprocessor
//!
//! A CLI tool that turns a tree of reStructuredText files into one document
//! ready for a LaTeX/PDF conversion.

#![deny(unsafe_code)]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::all))]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::pedantic))]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(missing_docs))]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use rstprep::document_model::DocumentStats;
use rstprep::pipeline::{self, PipelineEvent, PipelineOptions, STAGE_COUNT};

/// Main entry point for the rstprep CLI application
fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    }
}

/// Run the CLI application
fn run() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    let options = PipelineOptions {
        input: cli.input.clone(),
        output: cli.output.clone(),
        app_name: cli.app_name.clone(),
        version: cli.version.clone(),
        language: cli.language().map(str::to_string),
        config: pipeline::load_config(cli.config.as_deref())?,
    };

    println!("Preprocessing documentation...");
    println!("Input: {}", options.input.display());
    println!("Output: {}", options.output.display());
    if let Some(language) = &options.language {
        println!("Language: {}", language);
    }

    pipeline::process_with(&options, |event| print_event(event, cli.verbose))
        .with_context(|| format!("Failed to preprocess {}", options.input.display()))?;

    println!("\n✓ Preprocessing completed successfully!");

    Ok(())
}

/// Print one progress line per pipeline event
fn print_event(event: PipelineEvent<'_>, verbose: bool) {
    match event {
        PipelineEvent::StageStarted { index, description } => {
            println!("\n[Stage {}/{}] {}...", index, STAGE_COUNT, description);
        }
        PipelineEvent::Flattened { files, lines } => {
            println!("✓ Flattened {} files into {} lines", files, lines);
        }
        PipelineEvent::Substituted { placeholders } => {
            println!("✓ Applied {} placeholder definitions", placeholders);
        }
        PipelineEvent::TocInlined { titles } => {
            println!("✓ Checked {} heading titles", titles);
        }
        PipelineEvent::Parsed { elements, stats } => {
            println!("✓ Parsed {} elements", elements);
            if verbose {
                print_stats(stats);
            }
        }
        PipelineEvent::Written { output, footnotes } => {
            if verbose {
                println!("  - {} table footnotes", footnotes);
            }
            println!("✓ Successfully wrote: {}", output.display());
        }
    }
}

/// Print element counts
fn print_stats(stats: &DocumentStats) {
    println!("  - {} headers", stats.headers);
    println!("  - {} paragraphs", stats.paragraphs);
    println!("  - {} tables", stats.tables);
    println!("  - {} figures", stats.figures);
    println!("  - {} labels", stats.labels);
}
