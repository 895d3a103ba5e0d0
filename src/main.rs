//! `citecheck` command-line entrypoint.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use mimalloc::MiMalloc;
use tracing::{info, warn};

use citecheck::cache::CacheHandle;
use citecheck::config::Config;
use citecheck::entry::bibtex;
use citecheck::report::{self, Summary};
use citecheck::verify::Verifier;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const DEFAULT_INPUT_FILE: &str = "input.bib";

#[derive(Debug, Parser)]
#[command(name = "citecheck", version, about = "Checks that BibTeX citations refer to real publications")]
struct Cli {
    /// BibTeX files to verify. Defaults to every `*.bib` file in the current directory.
    files: Vec<PathBuf>,

    /// Also write `<file>_report.json` with the raw verdicts.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = Config::from_env()?;
    config.validate()?;

    let files = if cli.files.is_empty() {
        discover_bib_files(Path::new("."))?
    } else {
        cli.files
    };

    if files.is_empty() {
        println!("[-] No .bib files found in current directory.");
        fs::write(DEFAULT_INPUT_FILE, "% Paste your BibTeX content here\n")
            .with_context(|| format!("failed to create {DEFAULT_INPUT_FILE}"))?;
        println!("[+] Created {DEFAULT_INPUT_FILE} for you.");
        return Ok(());
    }

    let cache = CacheHandle::load(&config.cache_path, config.persist_on_write);
    info!(
        path = %config.cache_path.display(),
        entries = cache.len(),
        "Result cache ready"
    );

    let verifier = Verifier::from_config(&config, cache.clone())?;
    info!(verifier = ?verifier, "Verifier ready");

    for file in &files {
        if let Err(err) = process_file(&verifier, file, cli.json).await {
            eprintln!("[!] {}: {err:#}", file.display());
        }
    }

    if let Err(err) = cache.persist() {
        warn!(error = %err, "Failed to persist result cache on shutdown");
    }

    Ok(())
}

async fn process_file(verifier: &Verifier, path: &Path, json: bool) -> anyhow::Result<()> {
    println!("\n[*] Processing file: {}", path.display());

    let entries = bibtex::parse_file(path).context("BibTeX parsing failed")?;
    println!(
        "[+] Found {} entries. Verifying in parallel...",
        entries.len()
    );

    let verdicts = verifier.verify_all(&entries).await;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let processed_at = chrono::Local::now();

    let report_path = format!("{}_report.md", path.display());
    let markdown = report::render_markdown(&file_name, &entries, &verdicts, &processed_at);
    fs::write(&report_path, markdown)
        .with_context(|| format!("failed to write {report_path}"))?;

    if json {
        let json_path = format!("{}_report.json", path.display());
        let body = report::render_json(&file_name, &verdicts, &processed_at)?;
        fs::write(&json_path, body).with_context(|| format!("failed to write {json_path}"))?;
    }

    let summary = Summary::from_verdicts(&verdicts);
    println!("\n{}", summary.render_console(&report_path));
    Ok(())
}

fn discover_bib_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("failed to list {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "bib"))
        .collect();
    files.sort();
    Ok(files)
}
