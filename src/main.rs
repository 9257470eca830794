//! Redirect engine CLI entry point.
//!
//! Validates redirect rule sets before publishing and resolves sample
//! request targets against them.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use redirect_engine::context::status_text;
use redirect_engine::{
    validate_all_with, Redirect, RedirectConfig, RedirectEngine, ValidationResult,
    ValidationSummary,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "redirect-engine")]
#[command(author, version, about = "Validate and resolve URL redirect rules")]
struct Args {
    /// Rules file (YAML or JSON, full config or bare rule array)
    #[arg(short, long, env = "REDIRECT_RULES")]
    config: Option<PathBuf>,

    /// Validate every active rule; exits non-zero when any rule is invalid.
    /// This is the default when no --resolve is given.
    #[arg(long)]
    validate: bool,

    /// Fail validation on warnings as well as errors
    #[arg(long)]
    deny_warnings: bool,

    /// Resolve a request target such as "/old?page=2" (repeatable)
    #[arg(long, value_name = "URI")]
    resolve: Vec<String>,

    /// Report format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Print example configuration and exit.
    #[arg(long)]
    example_config: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Serialize)]
struct Report<'a> {
    checked_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ValidationSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    results: Option<&'a BTreeMap<String, ValidationResult>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    resolutions: Vec<Resolution>,
}

#[derive(Serialize)]
struct Resolution {
    uri: String,
    redirect: Option<Redirect>,
}

fn print_example_config() {
    let example = r#"# Redirect Engine Configuration Example
version: "1"

settings:
  # Maximum hops followed when looking for loops
  max_chain_depth: 10
  # Chains longer than this produce a warning
  long_chain_threshold: 3
  # Refuse to load a rule set with validation errors
  reject_invalid: false

rules:
  # Single page move
  - id: "about-page"
    from: "/about-us"
    to: "/company"
    matchType: exact
    statusCode: 301

  # Section move keeping the slug
  - id: "blog-to-articles"
    from: "/blog/*"
    to: "/articles/$1"
    matchType: wildcard
    statusCode: 308
    priority: 10

  # Numeric product ids
  - id: "legacy-products"
    from: "^/product/(\\d+)$"
    to: "/products/$1"
    matchType: regex
    statusCode: 301
    queryStringHandling: remove

  # Off-site
  - id: "docs"
    from: "/docs"
    to: "https://docs.example.com"
    matchType: exact
    statusCode: 302
    caseSensitive: false
"#;
    println!("{}", example);
}

fn init_logging(args: &Args) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    if args.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn print_validation(
    config: &RedirectConfig,
    results: &BTreeMap<String, ValidationResult>,
    summary: &ValidationSummary,
) {
    for rule in config.active_rules() {
        let Some(result) = results.get(&rule.id) else {
            continue;
        };
        if result.errors.is_empty() && result.warnings.is_empty() {
            continue;
        }

        let mark = if result.is_valid { "!" } else { "✗" };
        println!(
            "{} {}  {} → {}  ({}, {})",
            mark,
            rule.id,
            rule.from(),
            rule.to,
            rule.match_type(),
            rule.status_code
        );
        for error in &result.errors {
            println!("    error: {}", error);
        }
        for warning in &result.warnings {
            println!("    warning: {}", warning);
        }
    }

    println!(
        "Checked {} rules: {} invalid, {} errors, {} warnings",
        summary.checked, summary.invalid, summary.errors, summary.warnings
    );
}

fn print_resolution(resolution: &Resolution) {
    match &resolution.redirect {
        Some(redirect) => println!(
            "{} → {} {} {}  (rule {})",
            resolution.uri,
            redirect.status,
            status_text(redirect.status.code()),
            redirect.location,
            redirect.rule_id
        ),
        None => println!("{} → no match", resolution.uri),
    }
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    init_logging(&args);

    // Print example config if requested
    if args.example_config {
        print_example_config();
        return Ok(ExitCode::SUCCESS);
    }

    let Some(config_path) = &args.config else {
        bail!("No rules file given (use --config or REDIRECT_RULES)");
    };

    let config = RedirectConfig::from_path(config_path)
        .with_context(|| format!("Failed to load rules: {}", config_path.display()))?;

    info!(
        config = %config_path.display(),
        rules = config.rules.len(),
        "Loaded redirect rules"
    );

    if config.rules.is_empty() {
        warn!(config = %config_path.display(), "Rules file contains no rules");
    }

    let validate = args.validate || args.resolve.is_empty();

    let results = validate.then(|| validate_all_with(&config.rules, &config.settings));
    let summary = results.as_ref().map(ValidationSummary::from_results);

    let resolutions = if args.resolve.is_empty() {
        Vec::new()
    } else {
        let engine = RedirectEngine::new(&config).context("Failed to build redirect engine")?;
        args.resolve
            .iter()
            .map(|uri| Resolution {
                uri: uri.clone(),
                redirect: engine.resolve_uri(uri),
            })
            .collect()
    };

    match args.format {
        Format::Json => {
            let report = Report {
                checked_at: Utc::now(),
                summary,
                results: results.as_ref(),
                resolutions,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Format::Text => {
            if let (Some(results), Some(summary)) = (&results, &summary) {
                print_validation(&config, results, summary);
            }
            for resolution in &resolutions {
                print_resolution(resolution);
            }
        }
    }

    let failed = summary.is_some_and(|s| s.has_errors() || (args.deny_warnings && s.warnings > 0));
    debug!(failed, "Finished");

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
