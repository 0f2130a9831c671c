//! WHOIS Sweep CLI Application
//!
//! A command-line interface for checking keyword × TLD domain availability
//! over raw WHOIS. This CLI application provides a user-friendly interface to
//! the whois-sweep-lib library.

mod ui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::Parser;
use std::process;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;
use whois_sweep_lib::{
    discover_whois_server, load_env_config, normalize_tld, split_list, validate_keyword,
    BatchChecker, CheckConfig, ConfigManager, DomainCheckResult, DomainChecker, EnvConfig,
    FileConfig, TldEntry, TldRegistry, WhoisClient,
};

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// Per-run caps on keywords and explicit TLDs, lifted by --force
const MAX_KEYWORDS: usize = 10;
const MAX_TLDS: usize = 10;

const DEFAULT_TLD: &str = "com";

/// Pattern suggested by --discover when no built-in entry exists
const FALLBACK_PATTERN: &str = "No match for";

/// CLI arguments for whois-sweep
#[derive(Parser, Debug)]
#[command(name = "whois-sweep")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "Sai Dutt G.V <gvs46@protonmail.com>")]
#[command(about = "Check keyword x TLD domain availability over raw WHOIS")]
#[command(
    long_about = "Check which keyword x TLD domain names are unregistered by querying each TLD's WHOIS server directly.\n\nChecks run in small paced windows so registries are not flooded; a failure on one domain never hides the others."
)]
#[command(styles = STYLES)]
pub struct Args {
    /// Keywords to check (bare labels, e.g. "rustacean")
    #[arg(value_name = "KEYWORDS", help_heading = "Domain Selection")]
    pub keywords: Vec<String>,

    /// TLDs to check (comma-separated or multiple -t flags)
    #[arg(short = 't', long = "tld", value_name = "TLD", value_delimiter = ',', action = clap::ArgAction::Append, help_heading = "Domain Selection")]
    pub tlds: Option<Vec<String>>,

    /// Check against every enabled TLD
    #[arg(long = "all", help_heading = "Domain Selection")]
    pub all_tlds: bool,

    /// List the TLD table (servers, patterns, enabled) and exit
    #[arg(long = "list-tlds", help_heading = "Domain Selection")]
    pub list_tlds: bool,

    /// Look up WHOIS servers via IANA and print [[tlds]] config entries
    #[arg(
        long = "discover",
        value_name = "TLD",
        value_delimiter = ',',
        help_heading = "Domain Selection"
    )]
    pub discover: Option<Vec<String>>,

    /// Output results in JSON format
    #[arg(short = 'j', long = "json", help_heading = "Output Format")]
    pub json: bool,

    /// Output results in CSV format
    #[arg(long = "csv", help_heading = "Output Format")]
    pub csv: bool,

    /// Enable grouped, structured output with section headers
    #[arg(short = 'p', long = "pretty", help_heading = "Output Format")]
    pub pretty: bool,

    /// Tasks checked concurrently per window (default: 3, max: 50)
    #[arg(long = "window", value_name = "N", help_heading = "Performance")]
    pub window: Option<usize>,

    /// Pause between windows in milliseconds (default: 500)
    #[arg(long = "pacing-ms", value_name = "MS", help_heading = "Performance")]
    pub pacing_ms: Option<u64>,

    /// Stop after SECS seconds and report the checks finished so far
    #[arg(long = "deadline", value_name = "SECS", help_heading = "Performance")]
    pub deadline: Option<u64>,

    /// Check one domain at a time, retrying failed lookups
    #[arg(long = "retry", help_heading = "Performance")]
    pub retry: bool,

    /// Override the 10 keyword / 10 TLD limits
    #[arg(long = "force", help_heading = "Performance")]
    pub force: bool,

    /// Use specific config file instead of automatic discovery
    #[arg(long = "config", value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Show debug logs and full error messages
    #[arg(short = 'd', long = "debug", help_heading = "Configuration")]
    pub debug: bool,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose", help_heading = "Configuration")]
    pub verbose: bool,
}

/// Error statistics for aggregated reporting
#[derive(Debug, Default)]
pub(crate) struct ErrorStats {
    pub(crate) timeouts: Vec<String>,
    pub(crate) dns_errors: Vec<String>,
    pub(crate) connection_errors: Vec<String>,
    pub(crate) other_errors: Vec<String>,
}

impl ErrorStats {
    fn from_results(results: &[DomainCheckResult]) -> Self {
        let mut stats = Self::default();
        for result in results {
            if let Some(message) = &result.error {
                stats.add_error(&result.domain, message);
            }
        }
        stats
    }

    fn add_error(&mut self, domain: &str, message: &str) {
        let bucket = match categorize_error_message(message) {
            ErrorCategory::Timeout => &mut self.timeouts,
            ErrorCategory::Dns => &mut self.dns_errors,
            ErrorCategory::Connection => &mut self.connection_errors,
            ErrorCategory::Other => &mut self.other_errors,
        };
        bucket.push(domain.to_string());
    }

    fn has_errors(&self) -> bool {
        !self.timeouts.is_empty()
            || !self.dns_errors.is_empty()
            || !self.connection_errors.is_empty()
            || !self.other_errors.is_empty()
    }

    fn total(&self) -> usize {
        self.timeouts.len()
            + self.dns_errors.len()
            + self.connection_errors.len()
            + self.other_errors.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCategory {
    Timeout,
    Dns,
    Connection,
    Other,
}

/// Bucket a captured error message. Results carry errors as text.
pub(crate) fn categorize_error_message(message: &str) -> ErrorCategory {
    let msg_lower = message.to_lowercase();

    if msg_lower.contains("timed out") || msg_lower.contains("timeout") {
        ErrorCategory::Timeout
    } else if msg_lower.contains("could not resolve") {
        ErrorCategory::Dns
    } else if msg_lower.contains("connection to") || msg_lower.contains("transport error") {
        ErrorCategory::Connection
    } else {
        ErrorCategory::Other
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Validate arguments
    if let Err(e) = validate_args(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    init_tracing(&args);
    debug!(version = env!("CARGO_PKG_VERSION"), "whois-sweep starting");

    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Install the stderr log subscriber. RUST_LOG directives win over -v/-d.
fn init_tracing(args: &Args) {
    let level = if args.debug {
        LevelFilter::DEBUG
    } else if args.verbose {
        LevelFilter::INFO
    } else {
        LevelFilter::WARN
    };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Validate command line arguments
fn validate_args(args: &Args) -> Result<(), String> {
    // --list-tlds and --discover are self-contained
    if args.list_tlds || args.discover.is_some() {
        return Ok(());
    }

    if args.keywords.is_empty() {
        return Err("You must specify at least one keyword".to_string());
    }

    for keyword in &args.keywords {
        validate_keyword(keyword).map_err(|e| e.to_string())?;
    }

    // Can't have multiple output formats
    if args.json && args.csv {
        return Err("Cannot specify multiple output formats (--json, --csv)".to_string());
    }

    if args.tlds.is_some() && args.all_tlds {
        return Err("Cannot specify both -t/--tld and --all".to_string());
    }

    if let Some(window) = args.window {
        if !(1..=50).contains(&window) {
            return Err("Window size must be between 1 and 50".to_string());
        }
    }

    if args.deadline == Some(0) {
        return Err("Deadline must be at least 1 second".to_string());
    }

    if args.retry && args.deadline.is_some() {
        return Err("Cannot use --deadline with --retry".to_string());
    }

    if args.keywords.len() > MAX_KEYWORDS && !args.force {
        return Err(format!(
            "Too many keywords ({}); at most {} per run. Use --force to override",
            args.keywords.len(),
            MAX_KEYWORDS
        ));
    }

    if let Some(tlds) = &args.tlds {
        check_tld_cap(args, &split_list(tlds))?;
    }

    Ok(())
}

/// Enforce the per-run TLD cap. `--all` and `--force` are exempt.
fn check_tld_cap(args: &Args, tld_names: &[String]) -> Result<(), String> {
    if args.all_tlds || args.force || tld_names.len() <= MAX_TLDS {
        return Ok(());
    }
    Err(format!(
        "Too many TLDs ({}); at most {} per run. Use --force to override",
        tld_names.len(),
        MAX_TLDS
    ))
}

/// Effective settings after config files, environment and flags.
struct Settings {
    check: CheckConfig,
    registry: TldRegistry,
    env: EnvConfig,
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let settings = build_config(&args)?;

    if args.list_tlds {
        ui::print_tld_table(&settings.registry);
        return Ok(());
    }

    if let Some(tlds) = &args.discover {
        return run_discover(tlds, &settings).await;
    }

    let tld_names = resolve_tlds(&args, &settings);
    // WS_TLD is only known once the environment is loaded
    check_tld_cap(&args, &tld_names)?;
    let registry = Arc::new(settings.registry);

    if args.retry {
        run_retry_check(&args, registry, settings.check, &tld_names).await
    } else {
        run_batch_check(&args, registry, settings.check, &tld_names).await
    }
}

/// TLDs for this run: --all > -t > WS_TLD > "com".
fn resolve_tlds(args: &Args, settings: &Settings) -> Vec<String> {
    if args.all_tlds {
        return settings
            .registry
            .get_enabled_tlds()
            .iter()
            .map(|tld| tld.name.clone())
            .collect();
    }

    if let Some(tlds) = &args.tlds {
        return split_list(tlds);
    }

    settings
        .env
        .tlds
        .clone()
        .unwrap_or_else(|| vec![DEFAULT_TLD.to_string()])
}

/// Warn about requested TLDs that will be skipped.
fn warn_skipped_tlds(registry: &TldRegistry, tld_names: &[String]) {
    for name in tld_names {
        match registry.lookup(name) {
            None => warn!(tld = %name, "unknown TLD, skipping"),
            Some(tld) if !tld.enabled => warn!(tld = %tld.name, "TLD is disabled, skipping"),
            Some(_) => {}
        }
    }
}

/// Run the windowed batch (the default path)
async fn run_batch_check(
    args: &Args,
    registry: Arc<TldRegistry>,
    config: CheckConfig,
    tld_names: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let batch = BatchChecker::new(registry, config.clone());
    warn_skipped_tlds(batch.registry(), tld_names);

    let task_count = batch.build_tasks(&args.keywords, tld_names)?.len();
    let is_structured = args.json || args.csv;

    if args.pretty && !is_structured {
        ui::print_header(task_count, &config);
    }
    info!(
        domains = task_count,
        window_size = config.window_size,
        pacing_ms = config.pacing_delay.as_millis() as u64,
        "checking domains"
    );

    // Spinner::start returns None if stderr isn't a TTY.
    let spinner = if !is_structured && task_count > 1 {
        ui::Spinner::start(format!("Checking {} domains...", task_count))
    } else {
        None
    };

    let start_time = Instant::now();

    let mut deadline_note = None;
    let results = match args.deadline {
        Some(secs) => {
            let outcome = batch
                .check_domains_within(&args.keywords, tld_names, Duration::from_secs(secs))
                .await?;
            if !outcome.complete {
                deadline_note = Some(format!(
                    "Deadline of {}s reached: {} of {} checks completed",
                    secs,
                    outcome.results.len(),
                    outcome.total_tasks
                ));
            }
            outcome.results
        }
        None => batch.check_domains(&args.keywords, tld_names).await?,
    };

    let duration = start_time.elapsed();

    // Stop spinner before printing results
    if let Some(s) = spinner {
        s.stop().await;
    }
    if let Some(note) = deadline_note {
        eprintln!("{}", note);
    }

    display_results(&results, args, duration)
}

/// Check domains one at a time through the retry path.
///
/// Text output is printed as each check finishes.
async fn run_retry_check(
    args: &Args,
    registry: Arc<TldRegistry>,
    config: CheckConfig,
    tld_names: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let batch = BatchChecker::new(registry, config.clone());
    warn_skipped_tlds(batch.registry(), tld_names);

    let tasks = batch.build_tasks(&args.keywords, tld_names)?;
    let checker = DomainChecker::with_config(config.clone());
    let is_structured = args.json || args.csv;

    if args.pretty && !is_structured {
        ui::print_header(tasks.len(), &config);
    }

    let start_time = Instant::now();
    let mut results = Vec::with_capacity(tasks.len());

    for (index, task) in tasks.iter().enumerate() {
        if index > 0 {
            tokio::time::sleep(config.pacing_delay).await;
        }

        let result = checker.check_with_retry(task).await;
        if !is_structured {
            let counter = (tasks.len() > 1).then_some((index + 1, tasks.len()));
            if args.pretty {
                ui::print_result(&result, args.debug, counter);
            } else {
                ui::print_result_default(&result, args.debug, counter);
            }
        }
        results.push(result);
    }

    let duration = start_time.elapsed();

    if is_structured {
        display_results(&results, args, duration)
    } else {
        print_run_summary(&results, duration);
        Ok(())
    }
}

/// Print [[tlds]] entries for each TLD, discovered through IANA.
async fn run_discover(
    tlds: &[String],
    settings: &Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = WhoisClient::with_config(&settings.check);
    let mut entries = Vec::new();

    for tld in split_list(tlds) {
        let name = normalize_tld(&tld);
        match discover_whois_server(&client, &name).await? {
            Some(server) => {
                let known = settings.registry.lookup(&name);
                let available_pattern = known
                    .map(|entry| entry.available_pattern.clone())
                    .unwrap_or_else(|| FALLBACK_PATTERN.to_string());
                if known.is_none() {
                    eprintln!(
                        "Note: .{} has no built-in pattern; verify available_pattern against a response for an unregistered name",
                        name
                    );
                }
                entries.push(TldEntry {
                    name,
                    server,
                    available_pattern,
                    enabled: None,
                    display_name: None,
                });
            }
            None => eprintln!("IANA lists no WHOIS server for .{}", name),
        }
    }

    if entries.is_empty() {
        return Err("No WHOIS servers discovered".into());
    }

    let file = FileConfig {
        tlds: Some(entries),
        ..Default::default()
    };
    print!("{}", toml::to_string(&file)?);
    Ok(())
}

/// Build the effective configuration.
///
/// Precedence order (highest to lowest):
/// 1. CLI arguments (explicit user input)
/// 2. Environment variables (WS_*)
/// 3. Local config file (./whois-sweep.toml)
/// 4. Global config file (~/.whois-sweep.toml)
/// 5. XDG config file (~/.config/whois-sweep/config.toml)
/// 6. Built-in defaults
fn build_config(args: &Args) -> Result<Settings, Box<dyn std::error::Error>> {
    let config_manager = ConfigManager::new(args.verbose);
    let env_config = load_env_config();

    // Step 1: Determine config file path and load config files
    let file_config = if let Some(explicit_config_path) = &args.config {
        info!(path = %explicit_config_path, "using config file from --config");
        config_manager
            .load_file(explicit_config_path)
            .map_err(|e| format!("Failed to load config file '{}': {}", explicit_config_path, e))?
    } else if let Some(env_config_path) = &env_config.config {
        info!(path = %env_config_path, "using config file from WS_CONFIG");
        config_manager
            .load_file(env_config_path)
            .map_err(|e| format!("Failed to load config file '{}': {}", env_config_path, e))?
    } else {
        config_manager.discover_and_load()?
    };

    let config = file_config.apply_to(CheckConfig::default())?;
    let registry = file_config.build_registry()?;

    // Step 2: Apply environment variables (WS_*)
    let config = env_config.apply_to(config);

    // Step 3: Apply CLI arguments (highest precedence)
    let config = apply_cli_args_to_config(config, args);

    Ok(Settings {
        check: config,
        registry,
        env: env_config,
    })
}

/// Apply CLI arguments to config (highest precedence).
fn apply_cli_args_to_config(mut config: CheckConfig, args: &Args) -> CheckConfig {
    if let Some(window) = args.window {
        config = config.with_window_size(window);
    }
    if let Some(pacing_ms) = args.pacing_ms {
        config = config.with_pacing_delay(Duration::from_millis(pacing_ms));
    }
    config
}

fn display_results(
    results: &[DomainCheckResult],
    args: &Args,
    duration: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    if args.json {
        display_json_results(results)?;
    } else if args.csv {
        display_csv_results(results);
    } else {
        display_text_results(results, args, duration);
    }

    Ok(())
}

/// Display results in JSON format
fn display_json_results(results: &[DomainCheckResult]) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(results)?;
    println!("{}", json);
    Ok(())
}

/// Display results in CSV format
fn display_csv_results(results: &[DomainCheckResult]) {
    println!("domain,tld,available,timestamp,error");
    for result in results {
        println!("{}", csv_row(result));
    }
}

fn csv_row(result: &DomainCheckResult) -> String {
    format!(
        "{},{},{},{},{}",
        result.domain,
        result.tld,
        result.available,
        result.timestamp,
        csv_field(result.error.as_deref().unwrap_or(""))
    )
}

/// Quote a CSV field when it contains a delimiter, quote or newline.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Display results in human-readable text format
fn display_text_results(results: &[DomainCheckResult], args: &Args, duration: Duration) {
    if args.pretty {
        // Pretty mode: grouped layout with section headers
        ui::print_grouped_results(results, args.debug);
    } else {
        // Default mode: colored flat list
        for result in results {
            ui::print_result_default(result, args.debug, None);
        }
    }

    print_run_summary(results, duration);
}

/// Shared summary for text modes
fn print_run_summary(results: &[DomainCheckResult], duration: Duration) {
    let error_stats = ErrorStats::from_results(results);

    if results.len() > 1 {
        let available = results.iter().filter(|r| r.available).count();
        let errors = error_stats.total();
        let taken = results.len() - available - errors;
        println!();
        ui::print_summary(results.len(), available, taken, errors, duration);
    }

    if error_stats.has_errors() {
        println!();
        ui::print_error_summary(&error_stats);
    }
}

// whois-sweep/src/main.rs tests module
