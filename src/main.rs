// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Command-line interface for docmd.
//!
//! This binary provides the `docmd` command, which runs the ReScript
//! documentation extractor on a source file and writes the result as
//! Markdown.

use docmd::extract::{self, Extractor};
use docmd::{docgen, renderer};
use lexopt::prelude::*;
use snafu::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

/// Environment variable holding a default extractor command line.
const EXTRACTOR_ENV: &str = "DOCMD_EXTRACTOR";

/// Environment variable holding a tracing filter directive.
const LOG_ENV: &str = "DOCMD_LOG";

/// Where to write the rendered output.
#[derive(Debug, Clone, PartialEq, Eq)]
enum OutputTarget {
    /// A file, or a directory in batch mode.
    Path(PathBuf),
    /// Write to stdout.
    Stdout,
}

#[allow(clippy::struct_excessive_bools)]
struct Cli {
    positional: Vec<PathBuf>,
    json: bool,
    extractor: Option<String>,
    show_source: bool,
    show_deprecated: bool,
    show_details: bool,
    code_lang: String,
    heading_offset: u8,
    quiet: bool,
    verbose: u8,
    dry_run: bool,
    force: bool,
}

#[derive(Debug, Snafu)]
enum Error {
    #[snafu(display("failed to parse arguments: {source}"))]
    ParseArgs { source: lexopt::Error },

    #[snafu(display("expected 2 arguments, got {count}\n\n{}", usage()))]
    Usage { count: usize },

    #[snafu(display("cannot write a directory of sources to stdout"))]
    DirectoryToStdout,

    #[snafu(display("{source}"))]
    InvalidExtractor { source: extract::ExtractError },

    #[snafu(display("failed to create output directory: {source}"))]
    CreateOutputDir { source: std::io::Error },

    #[snafu(display("failed to read {}: {source}", path.display()))]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("failed to extract documentation from {}: {source}", path.display()))]
    Extract {
        path: PathBuf,
        source: extract::ExtractError,
    },

    #[snafu(display("failed to parse {}: {source}", path.display()))]
    ParseFile {
        path: PathBuf,
        source: docgen::ParseError,
    },

    #[snafu(display("invalid input filename: no file stem"))]
    InvalidFilename,

    #[snafu(display("failed to write {}: {source}", path.display()))]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn usage() -> String {
    format!(
        "Usage: {name} [OPTIONS] <SOURCE> <OUTPUT>",
        name = env!("CARGO_PKG_NAME")
    )
}

fn print_help() {
    println!(
        "\
{name} {version}
Convert ReScript documentation to Markdown

{usage}

Arguments:
  <SOURCE>  A .res/.resi file, a .json extractor dump with --json,
            or a directory of them
  <OUTPUT>  Output file, - for stdout, or a directory when SOURCE is one

Options:
      --json                Read extractor JSON instead of running the extractor
      --extractor <CMD>     Extractor command (default: npx rescript-tools doc,
                            or ${extractor_env})
      --heading-offset <N>  Shift heading levels by N (0-5, default: 0)
      --lang <LANG>         Code fence language for signatures (default: rescript)

Content (use --show-* or --hide-*):
      --show-source         Include definition file and line (default: off)
      --hide-source         Hide definition file and line
      --show-deprecated     Include deprecation notices (default: on)
      --hide-deprecated     Hide deprecation notices
      --show-details        Include record fields and constructors (default: on)
      --hide-details        Hide record fields and constructors

Other options:
  -q, --quiet               Only print warnings and errors
  -v, --verbose             More log output (repeatable; ${log_env} overrides)
  -n, --dry-run             Show what would be processed without writing
  -f, --force               Overwrite existing output files
  -h, --help                Print help
  -V, --version             Print version",
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
        usage = usage(),
        extractor_env = EXTRACTOR_ENV,
        log_env = LOG_ENV,
    );
}

fn parse_args() -> Result<Cli, lexopt::Error> {
    let mut positional = Vec::new();
    let mut json = false;
    let mut extractor = None;
    // Defaults: source off, deprecated on, details on
    let mut show_source = false;
    let mut show_deprecated = true;
    let mut show_details = true;
    let mut code_lang = String::from("rescript");
    let mut heading_offset: u8 = 0;
    let mut quiet = false;
    let mut verbose: u8 = 0;
    let mut dry_run = false;
    let mut force = false;

    let mut parser = lexopt::Parser::from_env();
    while let Some(arg) = parser.next()? {
        match arg {
            Long("json") => json = true,
            Long("extractor") => extractor = Some(parser.value()?.string()?),
            // Show/hide flags - last one wins
            Long("show-source") => show_source = true,
            Long("hide-source") => show_source = false,
            Long("show-deprecated") => show_deprecated = true,
            Long("hide-deprecated") => show_deprecated = false,
            Long("show-details") => show_details = true,
            Long("hide-details") => show_details = false,
            Long("lang") => code_lang = parser.value()?.string()?,
            Long("heading-offset") => {
                let val: u8 = parser
                    .value()?
                    .parse()
                    .map_err(|_| "heading-offset must be a number 0-5")?;
                if val > 5 {
                    return Err("heading-offset must be 0-5".into());
                }
                heading_offset = val;
            }
            Short('q') | Long("quiet") => quiet = true,
            Short('v') | Long("verbose") => verbose = verbose.saturating_add(1),
            Short('n') | Long("dry-run") => dry_run = true,
            Short('f') | Long("force") => force = true,
            Short('h') | Long("help") => {
                print_help();
                std::process::exit(0);
            }
            Short('V') | Long("version") => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            Value(val) => positional.push(val.parse()?),
            _ => return Err(arg.unexpected()),
        }
    }

    Ok(Cli {
        positional,
        json,
        extractor,
        show_source,
        show_deprecated,
        show_details,
        code_lang,
        heading_offset,
        quiet,
        verbose,
        dry_run,
        force,
    })
}

/// Installs the stderr log subscriber.
///
/// `-q` drops to warnings, each `-v` adds a level. `DOCMD_LOG` wins over both.
fn init_logging(quiet: bool, verbose: u8) {
    let directive = match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2)
        .without_time()
        .try_init();
}

#[snafu::report]
fn main() -> Result<(), Error> {
    let cli = parse_args().context(ParseArgsSnafu)?;
    init_logging(cli.quiet, cli.verbose);

    let (source, output) = split_positional(&cli.positional)?;

    let extractor = match cli
        .extractor
        .clone()
        .or_else(|| std::env::var(EXTRACTOR_ENV).ok())
    {
        Some(command) => Extractor::from_command_line(&command).context(InvalidExtractorSnafu)?,
        None => Extractor::default(),
    };

    if source.is_dir() {
        let OutputTarget::Path(out_dir) = &output else {
            return DirectoryToStdoutSnafu.fail();
        };
        let files = collect_input_files(source, cli.json);
        info!("found {} source files in {}", files.len(), source.display());
        if !cli.dry_run {
            std::fs::create_dir_all(out_dir).context(CreateOutputDirSnafu)?;
        }
        for file in &files {
            process_into_dir(file, out_dir, &extractor, &cli)?;
        }
    } else {
        let markdown = convert(source, &extractor, &cli)?;
        write_output(&markdown, &output, &cli)?;
    }

    Ok(())
}

/// Splits `<SOURCE> <OUTPUT>` into the source path and its output target.
/// An output of `-` means stdout.
fn split_positional(positional: &[PathBuf]) -> Result<(&Path, OutputTarget), Error> {
    let [source, output] = positional else {
        return UsageSnafu {
            count: positional.len(),
        }
        .fail();
    };
    let output = if output == Path::new("-") {
        OutputTarget::Stdout
    } else {
        OutputTarget::Path(output.clone())
    };
    Ok((source, output))
}

/// Collects the files to convert below `dir`.
///
/// A `.res` file is skipped when a `.resi` interface sits next to it; the
/// interface is what callers see.
fn collect_input_files(dir: &Path, json: bool) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| {
            let ext = path.extension().and_then(|ext| ext.to_str());
            if json {
                ext == Some("json")
            } else {
                ext == Some("resi") || (ext == Some("res") && !path.with_extension("resi").exists())
            }
        })
        .collect();
    files.sort();
    files
}

/// Creates render options from CLI arguments.
fn make_render_options(cli: &Cli) -> renderer::RenderOptions {
    renderer::RenderOptions {
        heading_offset: cli.heading_offset,
        show_source: cli.show_source,
        show_deprecated: cli.show_deprecated,
        show_details: cli.show_details,
        code_lang: cli.code_lang.clone(),
    }
}

/// Loads one source and renders it to Markdown.
fn convert(source: &Path, extractor: &Extractor, cli: &Cli) -> Result<String, Error> {
    let json = if cli.json {
        std::fs::read_to_string(source).context(ReadFileSnafu { path: source })?
    } else {
        extractor
            .run(source)
            .context(ExtractSnafu { path: source })?
    };
    let doc = docgen::parse_doc(&json).context(ParseFileSnafu { path: source })?;

    Ok(renderer::render_doc(&doc, &make_render_options(cli)))
}

/// Converts a single source into `<out_dir>/<stem>.md`.
fn process_into_dir(
    source: &Path,
    out_dir: &Path,
    extractor: &Extractor,
    cli: &Cli,
) -> Result<(), Error> {
    let out_name = source.file_stem().context(InvalidFilenameSnafu)?;
    let out_path = out_dir.join(format!("{}.md", out_name.to_string_lossy()));

    if cli.dry_run {
        info!("would write {}", out_path.display());
        return Ok(());
    }

    if out_path.exists() && !cli.force {
        warn!(
            "skipping {} (already exists, use --force to overwrite)",
            out_path.display()
        );
        return Ok(());
    }

    let markdown = convert(source, extractor, cli)?;
    std::fs::write(&out_path, &markdown).context(WriteFileSnafu { path: &out_path })?;
    info!("wrote {}", out_path.display());

    Ok(())
}

/// Writes a single rendered document to its target.
fn write_output(markdown: &str, output: &OutputTarget, cli: &Cli) -> Result<(), Error> {
    match output {
        OutputTarget::Stdout => {
            if cli.dry_run {
                info!("would write to stdout");
            } else {
                print!("{markdown}");
            }
        }
        OutputTarget::Path(path) => {
            if cli.dry_run {
                info!("would write {}", path.display());
            } else if path.exists() && !cli.force {
                warn!(
                    "skipping {} (already exists, use --force to overwrite)",
                    path.display()
                );
            } else {
                // Create parent directory if needed
                if let Some(parent) = path.parent()
                    && !parent.as_os_str().is_empty()
                {
                    std::fs::create_dir_all(parent).context(CreateOutputDirSnafu)?;
                }
                std::fs::write(path, markdown).context(WriteFileSnafu { path })?;
                info!("wrote {}", path.display());
            }
        }
    }

    Ok(())
}
