//! gdext-header: GDExtension interface header <-> JSON IR converter.
//!
//! Two modes, like the other generators in the build:
//!
//! - **stdin mode**: `gdext-header < gdextension_interface.h > interface.json`
//! - **file mode**: `gdext-header -o gen/ core/extension/gdextension_interface.h`

use anyhow::{Context, Result};
use clap::Parser;
use gdext_header::parser::{self, InputKind};
use gdext_header::render::{self, EncodeOptions};
use gdext_header::{is_stable, Document, LogSink};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "gdext-header",
    about = "Convert the GDExtension interface header to a JSON IR and back"
)]
struct Cli {
    /// Input files: .h headers or .json IR (glob patterns supported). If omitted, reads from stdin.
    files: Vec<String>,

    /// Output directory (required when files are given)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Output format: json or header. Defaults to the opposite of each input.
    #[arg(short = 'f', long)]
    format: Option<String>,

    /// File name written into the generated header banner
    #[arg(long)]
    header_name: Option<String>,

    /// Emit recorded legacy typedef names for interface functions
    #[arg(long)]
    legacy_names: bool,

    /// Fail if any diagnostic is reported while decoding
    #[arg(long)]
    strict: bool,

    /// Verify that encoding and decoding the IR again reproduces it
    #[arg(long)]
    check: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    if cli.files.is_empty() {
        return stdin_mode(&cli);
    }

    file_mode(&cli)
}

/// stdin mode: sniff the input kind, write the converted text to stdout.
fn stdin_mode(cli: &Cli) -> Result<()> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("failed to read stdin")?;

    let kind = InputKind::sniff(&input);
    let mut sink = LogSink::new("<stdin>");
    let doc = parser::parse(kind, &input, &mut sink)?;
    finish_checks(cli, &doc, &sink, "<stdin>")?;

    let options = encode_options(cli, "gdextension_interface.h");
    let renderer = render::create_renderer(output_format(cli, kind), options)?;
    print!("{}", renderer.render(&doc)?);
    Ok(())
}

/// file mode: convert every input into the output directory.
fn file_mode(cli: &Cli) -> Result<()> {
    let output_dir = cli
        .output
        .as_deref()
        .context("--output is required when files are given")?;

    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output directory: {}", output_dir.display()))?;

    for path in expand_globs(&cli.files)? {
        let Some(kind) = InputKind::from_path(&path) else {
            log::warn!("skipping {}: unsupported file type", path.display());
            continue;
        };
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        let source = path.display().to_string();
        let mut sink = LogSink::new(source.as_str());
        let doc = parser::parse(kind, &content, &mut sink)
            .with_context(|| format!("failed to parse {}", source))?;
        finish_checks(cli, &doc, &sink, &source)?;

        // The banner name is only used by the header renderer
        let stem = derive_output_name(&path);
        let options = encode_options(cli, &format!("{}.h", stem));
        let renderer = render::create_renderer(output_format(cli, kind), options)?;
        let out_name = format!("{}.{}", stem, renderer.file_extension());
        let out_path = output_dir.join(&out_name);

        let output = renderer
            .render(&doc)
            .with_context(|| format!("failed to generate {}", out_path.display()))?;
        fs::write(&out_path, &output)
            .with_context(|| format!("failed to write {}", out_path.display()))?;
        log::info!("wrote {}", out_path.display());
    }

    Ok(())
}

/// Apply --strict and --check to a parsed document.
fn finish_checks(cli: &Cli, doc: &Document, sink: &LogSink, source: &str) -> Result<()> {
    if cli.strict && sink.count > 0 {
        anyhow::bail!("{}: {} diagnostic(s) reported", source, sink.count);
    }
    if cli.check && !is_stable(doc)? {
        anyhow::bail!("{}: IR does not survive an encode/decode round trip", source);
    }
    Ok(())
}

fn output_format(cli: &Cli, input: InputKind) -> &str {
    match cli.format.as_deref() {
        Some(format) => format,
        None => match input {
            InputKind::Header => "json",
            InputKind::Ir => "header",
        },
    }
}

fn encode_options(cli: &Cli, default_name: &str) -> EncodeOptions {
    EncodeOptions {
        file_name: cli
            .header_name
            .clone()
            .unwrap_or_else(|| default_name.to_string()),
        legacy_names: cli.legacy_names,
    }
}

/// File extensions recognized as inputs.
const SUPPORTED_EXTENSIONS: &[&str] = &["h", "json"];

/// Expand glob patterns into a list of real file paths.
/// Also handles bare directory paths by scanning for supported file types.
fn expand_globs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        if path.is_file() {
            files.push(path.to_path_buf());
            continue;
        }
        // Directories are scanned non-recursively
        if path.is_dir() {
            let entries = fs::read_dir(path)
                .with_context(|| format!("failed to read directory: {}", path.display()))?;
            for entry in entries.flatten() {
                let p = entry.path();
                if p.is_file() {
                    if let Some(ext) = p.extension().and_then(|e| e.to_str()) {
                        if SUPPORTED_EXTENSIONS.contains(&ext) {
                            files.push(p);
                        }
                    }
                }
            }
            continue;
        }
        let matches: Vec<_> = glob::glob(pattern)
            .with_context(|| format!("invalid glob pattern: {}", pattern))?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file())
            .collect();
        if matches.is_empty() {
            log::warn!("no files matched: {}", pattern);
        }
        files.extend(matches);
    }
    // Sort for deterministic output
    files.sort();
    files.dedup();
    Ok(files)
}

/// Derive the output file name (without extension) from a source path.
/// "core/extension/gdextension_interface.h" → "gdextension_interface"
fn derive_output_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_name_from_header() {
        assert_eq!(
            derive_output_name(Path::new("core/extension/gdextension_interface.h")),
            "gdextension_interface"
        );
    }

    #[test]
    fn output_name_from_json() {
        assert_eq!(derive_output_name(Path::new("interface.json")), "interface");
    }

    #[test]
    fn output_name_no_extension() {
        assert_eq!(derive_output_name(Path::new("Makefile")), "Makefile");
    }
}
