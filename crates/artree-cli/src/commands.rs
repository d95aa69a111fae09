use std::env;

use anyhow::{bail, Context};
use artree_sdk::{
    build_artifact_tree, build_bom, hash_object, show_object, ArtreeConfig, DispatchReport,
};
use colored::Colorize;
use serde_json::json;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let cwd = env::current_dir().context("cannot determine working directory")?;
    let config = ArtreeConfig::resolve(cli.config.as_deref(), &cwd)?;
    let config = cli.apply(config);
    let format = cli.format;

    match cli.command {
        Command::ArtifactTree(args) => cmd_artifact_tree(args, &config, format),
        Command::Bom(args) => cmd_bom(args, &config, format),
        Command::HashObject(args) => cmd_hash_object(args, &config, format),
        Command::Show(args) => cmd_show(args, &config, format),
    }
}

fn cmd_artifact_tree(args: ArtifactTreeArgs, config: &ArtreeConfig, format: OutputFormat) -> anyhow::Result<()> {
    let outcome = build_artifact_tree(&args.paths, config)?;
    match format {
        OutputFormat::Text => println!("{}", outcome.identity),
        OutputFormat::Json => print_json(&json!({
            "identity": outcome.identity,
            "entries": outcome.tree.len(),
            "report": report_json(&outcome.report),
        }))?,
    }
    check_report(&outcome.report)
}

fn cmd_bom(args: BomArgs, config: &ArtreeConfig, format: OutputFormat) -> anyhow::Result<()> {
    let outcome = build_bom(&args.artifact, &args.deps, config)?;
    match format {
        OutputFormat::Text => println!("{}", outcome.identity),
        OutputFormat::Json => print_json(&json!({
            "identity": outcome.identity,
            "artifact": outcome.artifact,
            "bom": outcome.dependencies.identity,
            "report": report_json(&outcome.dependencies.report),
        }))?,
    }
    check_report(&outcome.dependencies.report)
}

fn cmd_hash_object(args: HashObjectArgs, config: &ArtreeConfig, format: OutputFormat) -> anyhow::Result<()> {
    let mut objects = Vec::with_capacity(args.files.len());
    for file in &args.files {
        let id = hash_object(file, config)?;
        match format {
            OutputFormat::Text => println!("{id}"),
            OutputFormat::Json => objects.push(json!({ "path": file, "identity": id })),
        }
    }
    if let OutputFormat::Json = format {
        print_json(&json!(objects))?;
    }
    Ok(())
}

fn cmd_show(args: ShowArgs, config: &ArtreeConfig, format: OutputFormat) -> anyhow::Result<()> {
    let tree = show_object(&args.identity, config)?;
    match format {
        OutputFormat::Text => print!("{}", tree.serialize()),
        OutputFormat::Json => {
            let entries: Vec<_> = tree
                .references()
                .iter()
                .map(|r| json!({ "identity": r.identity(), "bom": r.bom() }))
                .collect();
            print_json(&json!({ "identity": tree.identity(), "entries": entries }))?;
        }
    }
    Ok(())
}

fn report_json(report: &DispatchReport) -> serde_json::Value {
    let failures: Vec<_> = report
        .failures
        .iter()
        .map(|f| json!({ "path": f.path, "error": f.error.to_string() }))
        .collect();
    json!({
        "workers": report.workers,
        "submitted": report.submitted,
        "succeeded": report.succeeded,
        "skipped": report.skipped,
        "failures": failures,
    })
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// The tree is stored even when some files failed; the exit status still
/// reflects the failures.
fn check_report(report: &DispatchReport) -> anyhow::Result<()> {
    if report.is_success() {
        return Ok(());
    }
    for failure in &report.failures {
        eprintln!("{} {}", "error:".red().bold(), failure);
    }
    if report.skipped > 0 {
        eprintln!("{} {} file(s) skipped", "warning:".yellow().bold(), report.skipped);
    }
    bail!(
        "{} of {} file(s) could not be hashed",
        report.failures.len() as u64 + report.skipped,
        report.submitted
    )
}
