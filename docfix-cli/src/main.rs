use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use docfix_catalog::{DemoCatalog, builtin_fix_metas, lookup_fix};
use docfix_cli::config::{self, ConfigMerger, MigrateOverrides};
use docfix_core::adapters::{FieldVersionReader, FsDocumentSink, FsDocumentSource, JsonCodec};
use docfix_core::pipeline::{DocumentResult, DocumentStatus, MigrateOutcome, run_migrate};
use docfix_core::settings::OutputMode;
use docfix_schema::DataVersion;
use std::io::Write;
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "docfix",
    version,
    about = "Versioned structural migration for stored documents."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Migrate documents to the newest (or a given) version.
    Migrate(MigrateArgs),
    /// Explain what a fix does and which documents it touches.
    Explain(ExplainArgs),
    /// List all built-in fixes in the order they run.
    ListFixes(ListFixesArgs),
}

#[derive(Debug, Parser)]
struct MigrateArgs {
    /// Documents to migrate. Directories contribute their `*.json` files.
    #[arg(required = true)]
    files: Vec<Utf8PathBuf>,

    /// Directory holding docfix.toml (default: current directory).
    #[arg(long, default_value = ".")]
    root: Utf8PathBuf,

    /// Document category every input belongs to (e.g. "entity").
    #[arg(long)]
    reference: Option<String>,

    /// Stored version of every input, overriding the version field.
    #[arg(long = "from")]
    from_version: Option<DataVersion>,

    /// Stop at this version instead of the newest.
    #[arg(long = "to")]
    to_version: Option<DataVersion>,

    /// Version assumed for documents without a version field.
    #[arg(long)]
    default_version: Option<DataVersion>,

    /// Top-level field holding the stored version (default: DataVersion).
    #[arg(long)]
    version_field: Option<String>,

    /// Write migrated documents into this directory.
    #[arg(long)]
    out_dir: Option<Utf8PathBuf>,

    /// Rewrite changed documents in place. If omitted, documents are printed.
    #[arg(long, default_value_t = false)]
    write: bool,

    /// Do not write the resulting version into the version field.
    #[arg(long, default_value_t = false)]
    no_stamp: bool,

    /// Emit compact JSON.
    #[arg(long, default_value_t = false)]
    compact: bool,

    /// Worker threads (default: one per core).
    #[arg(long)]
    jobs: Option<usize>,
}

#[derive(Debug, Parser)]
struct ExplainArgs {
    /// Fix key or pipeline name to explain (e.g., "skeleton-split", "entity_uuid").
    fix_key: String,
}

#[derive(Debug, Parser)]
struct ListFixesArgs {
    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    match real_main() {
        Ok(code) => code,
        Err(e) => {
            error!("{:?}", e);
            ExitCode::from(1)
        }
    }
}

fn real_main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Migrate(args) => cmd_migrate(args),
        Command::Explain(args) => cmd_explain(args).map(|()| ExitCode::SUCCESS),
        Command::ListFixes(args) => cmd_list_fixes(args).map(|()| ExitCode::SUCCESS),
    }
}

fn cmd_migrate(args: MigrateArgs) -> anyhow::Result<ExitCode> {
    // Load config file and merge with CLI arguments
    let file_config = config::load_or_default(&args.root).context("load docfix.toml config")?;
    let settings = ConfigMerger::new(file_config).merge_migrate_args(MigrateOverrides {
        reference: args.reference,
        version_field: args.version_field,
        default_version: args.default_version,
        from_version: args.from_version,
        target_version: args.to_version,
        out_dir: args.out_dir,
        write: args.write,
        no_stamp: args.no_stamp,
        compact: args.compact,
        jobs: args.jobs,
    })?;
    debug!(?settings, "merged config");

    let catalog = DemoCatalog::build().context("build fix catalog")?;
    let reader = FieldVersionReader::new(settings.version_field.clone())
        .with_default(settings.default_version);
    let codec = JsonCodec {
        pretty: settings.pretty,
    };
    let outcome = run_migrate(
        &settings,
        catalog.pipeline(),
        &FsDocumentSource::new(args.files),
        &FsDocumentSink,
        &codec,
        &reader,
    )?;

    if settings.output == OutputMode::DryRun {
        print_documents(&outcome)?;
    } else {
        for doc in &outcome.documents {
            if let Some(line) = describe(doc) {
                println!("{line}");
            }
        }
    }
    for doc in &outcome.documents {
        if let DocumentStatus::Failed { reason } = &doc.status {
            eprintln!("error: {}: {}", doc.path, reason);
        }
    }
    eprintln!(
        "{} migrated, {} unchanged, {} failed",
        outcome.summary.migrated, outcome.summary.unchanged, outcome.summary.failed
    );

    if outcome.has_failures() {
        return Ok(ExitCode::from(2));
    }
    Ok(ExitCode::SUCCESS)
}

/// Dry runs print each document; several documents get a header line each.
fn print_documents(outcome: &MigrateOutcome) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    let headers = outcome.documents.len() > 1;
    for doc in &outcome.documents {
        let Some(bytes) = &doc.output else {
            continue;
        };
        if headers {
            writeln!(stdout, "==> {} <==", doc.path)?;
        }
        stdout.write_all(bytes)?;
    }
    stdout.flush()?;
    Ok(())
}

fn describe(doc: &DocumentResult) -> Option<String> {
    let target = doc
        .written_to
        .as_ref()
        .map(|p| format!(" -> {p}"))
        .unwrap_or_default();
    match &doc.status {
        DocumentStatus::Migrated { from, to, applied } => Some(format!(
            "migrated  {} ({from} -> {to}, {applied} fixes){target}",
            doc.path
        )),
        DocumentStatus::Unchanged { version } => {
            Some(format!("unchanged {} ({version}){target}", doc.path))
        }
        DocumentStatus::Failed { .. } => None,
    }
}

fn cmd_explain(args: ExplainArgs) -> anyhow::Result<()> {
    use docfix_cli::explain::{list_fix_keys, render_explanation};

    let Some(meta) = lookup_fix(&args.fix_key) else {
        let available = list_fix_keys().join(", ");
        anyhow::bail!(
            "Unknown fix key: '{}'\n\nAvailable fixes: {}",
            args.fix_key,
            available
        );
    };
    let catalog = DemoCatalog::build().context("build fix catalog")?;
    print!("{}", render_explanation(meta, catalog.pipeline()));
    Ok(())
}

fn cmd_list_fixes(args: ListFixesArgs) -> anyhow::Result<()> {
    let metas = builtin_fix_metas();
    match args.format {
        OutputFormat::Text => {
            println!("Available fixes:\n");
            println!("  {:<26} {:<8} TITLE", "KEY", "VERSION");
            println!("  {:<26} {:<8} -----", "---", "-------");
            for meta in &metas {
                println!(
                    "  {:<26} {:<8} {}",
                    meta.key,
                    meta.version.to_string(),
                    meta.title
                );
            }
            println!();
            println!("Use 'docfix explain <key>' for details.");
        }
        OutputFormat::Json => {
            let fixes: Vec<_> = metas
                .iter()
                .map(|m| {
                    serde_json::json!({
                        "key": m.key,
                        "name": m.name,
                        "version": m.version.to_string(),
                        "title": m.title,
                        "references": m.references,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&fixes)?);
        }
    }
    Ok(())
}
