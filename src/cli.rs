use crate::config::ResolvedConfig;
use crate::errors::{AppError, AppResult};
use crate::exporter::exporter_for;
use crate::site_map_parser::SitemapParser;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use tracing::info;

// CLI metadata constants
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
const APP_ABOUT: &str = env!("CARGO_PKG_DESCRIPTION");

/// Builds the command-line definition.
pub fn build_command() -> Command {
    Command::new("sitemap-parser")
        .version(APP_VERSION)
        .about(APP_ABOUT)
        .after_help("Examples:\n  sitemap-parser https://example.com/sitemap.xml\n  sitemap-parser --file sitemap.xml -f csv")
        .arg(
            Arg::new("source")
                .help("Sitemap URL (or XML text with --raw, or a path with --file)")
                .required(true)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("raw")
                .long("raw")
                .help("Treat SOURCE as literal XML")
                .conflicts_with("file")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("file")
                .long("file")
                .help("Treat SOURCE as a path to a local XML file")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .help("Export format: 'json' or 'csv'")
                .default_value("json")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("no_cache")
                .long("no-cache")
                .help("Always download, bypassing the response cache")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("cache_dir")
                .long("cache-dir")
                .help("Directory for cached responses")
                .value_parser(clap::value_parser!(PathBuf))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Path to a TOML configuration file")
                .value_parser(clap::value_parser!(PathBuf))
                .action(ArgAction::Set),
        )
}

/// Parses process arguments, runs the export and prints it to stdout.
pub fn cli() -> AppResult<()> {
    let output = run_from(std::env::args_os())?;
    println!("{output}");
    Ok(())
}

/// Runs the command for the given arguments and returns the exported text.
///
/// # Errors
///
/// Returns `InvalidInput` for bad arguments or an unknown format, and any error from
/// loading the configuration, resolving the source, parsing or exporting.
pub fn run_from<I, T>(args: I) -> AppResult<String>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = build_command()
        .try_get_matches_from(args)
        .map_err(|e| AppError::InvalidInput(e.to_string()))?;
    run(&matches)
}

fn resolve_config(matches: &ArgMatches) -> AppResult<ResolvedConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => ResolvedConfig::from_toml_file(path)?,
        None => ResolvedConfig::default(),
    };
    if matches.get_flag("no_cache") {
        config.should_cache = false;
    }
    if let Some(dir) = matches.get_one::<PathBuf>("cache_dir") {
        config.cache_dir = dir.clone();
    }
    Ok(config)
}

fn run(matches: &ArgMatches) -> AppResult<String> {
    let source = matches
        .get_one::<String>("source")
        .ok_or_else(|| AppError::InvalidInput("SOURCE is required".into()))?;
    let format = matches
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("json");
    let exporter = exporter_for(format)?;
    let config = resolve_config(matches)?;

    let parser = if matches.get_flag("file") {
        let xml = fs::read(source)
            .map_err(|e| AppError::Io(format!("Failed to read {source}: {e}")))?;
        SitemapParser::from_bytes(&xml)?
    } else {
        SitemapParser::new(source, matches.get_flag("raw"), &config)?
    };

    info!(
        document = %parser,
        format = exporter.short_name(),
        "Exporting sitemap"
    );
    parser.export(exporter.as_ref())
}
