use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use clap::Parser;
use js_fmt::{config, formatter::format_text};
use walkdir::WalkDir;

#[derive(Debug, Parser)]
#[command(author, version, about = "JavaScript beautifier")]
struct Cli {
    /// Files or directories to format.
    #[arg(value_name = "FILES", required = true)]
    paths: Vec<PathBuf>,

    /// Overwrite files in place.
    #[arg(short = 'i', long = "in-place")]
    in_place: bool,

    /// Only check if files are already formatted.
    #[arg(long = "check", conflicts_with = "in_place")]
    check: bool,

    /// Path to a js-fmt.toml configuration file.
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::load_config(cli.config.as_deref())?;
    let files = collect_files(&cli.paths)?;
    if files.is_empty() {
        bail!("no JavaScript files found to format");
    }

    if !cli.check && !cli.in_place && files.len() > 1 {
        bail!("formatting multiple files requires --in-place or --check");
    }

    let mut failed_paths = Vec::new();

    for path in files {
        let original = read_input(&path)?;
        let formatted = format_text(&original, &config);
        let normalized = ensure_trailing_newline(&formatted);
        let original_normalized = ensure_trailing_newline(&original);

        if cli.check {
            if normalized != original_normalized {
                failed_paths.push(path.clone());
            }
            continue;
        }

        if cli.in_place {
            if normalized != original_normalized {
                fs::write(&path, normalized).with_context(|| format!("failed to write {}", path.display()))?;
            }
        } else {
            io::stdout().write_all(normalized.as_bytes())?;
        }
    }

    if !failed_paths.is_empty() {
        for path in &failed_paths {
            eprintln!("needs formatting: {}", path.display());
        }
        std::process::exit(1);
    }

    Ok(())
}

fn collect_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        let metadata = fs::metadata(path).with_context(|| format!("failed to read metadata for {}", path.display()))?;
        if metadata.is_file() {
            if is_js_file(path) {
                files.push(path.clone());
            }
            continue;
        }
        for entry in WalkDir::new(path) {
            let entry = entry.with_context(|| format!("failed to traverse {}", path.display()))?;
            if entry.file_type().is_file() && is_js_file(entry.path()) {
                files.push(entry.into_path());
            }
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

fn is_js_file(path: &Path) -> bool {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => ext.eq_ignore_ascii_case("js"),
        None => false,
    }
}

fn read_input(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let raw = String::from_utf8(bytes).with_context(|| format!("{} is not valid UTF-8", path.display()))?;

    // strip a UTF-8 BOM and normalize line endings in one pass
    let mut chars = raw.chars().peekable();
    if chars.peek() == Some(&'\u{feff}') {
        chars.next();
    }
    let mut text = String::with_capacity(raw.len());
    while let Some(ch) = chars.next() {
        if ch == '\r' {
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            text.push('\n');
        } else {
            text.push(ch);
        }
    }
    Ok(text)
}

fn ensure_trailing_newline(text: &str) -> String {
    if text.ends_with('\n') {
        text.to_string()
    } else {
        format!("{text}\n")
    }
}
