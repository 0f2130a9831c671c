//! Terminal display logic for the whois-sweep CLI.
//!
//! This module handles all text output: colored result lines, grouped
//! `--pretty` output, spinner animation, progress counters, headers, the TLD
//! table and summaries. Uses only the `console` crate.

use console::{pad_str, style, Alignment, Term};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use whois_sweep_lib::{CheckConfig, DomainCheckResult, TldRegistry};

use crate::{categorize_error_message, ErrorCategory, ErrorStats};

const DOMAIN_WIDTH: usize = 30;

// ── Spinner ──────────────────────────────────────────────────────────────────

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// An async braille-dot spinner that writes to stderr so stdout stays clean.
pub struct Spinner {
    running: Arc<AtomicBool>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl Spinner {
    /// Start a spinner with the given message (e.g. "Checking 8 domains...").
    ///
    /// Returns `None` when stderr is not a terminal.
    pub fn start(message: String) -> Option<Self> {
        let term = Term::stderr();
        if !term.is_term() {
            return None;
        }

        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();

        let handle = tokio::spawn(async move {
            let mut idx = 0usize;
            while running_clone.load(Ordering::Relaxed) {
                let frame = SPINNER_FRAMES[idx % SPINNER_FRAMES.len()];
                let _ = term.clear_line();
                let _ = term.write_str(&format!("{} {}", style(frame).cyan(), message));
                idx += 1;
                tokio::time::sleep(Duration::from_millis(80)).await;
            }
            let _ = term.clear_line();
        });

        Some(Self {
            running,
            handle: Some(handle),
        })
    }

    /// Stop the spinner and clear the line.
    pub async fn stop(mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(h) = self.handle.take() {
            let _ = h.await;
        }
    }
}

// ── Header ───────────────────────────────────────────────────────────────────

/// Print a styled header at the start of a pretty run.
pub fn print_header(domain_count: usize, config: &CheckConfig) {
    println!(
        "{} {} {}",
        style("whois-sweep").bold(),
        style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim(),
        style(format!(
            "- Checking {} domain{}",
            domain_count,
            plural(domain_count)
        ))
        .dim(),
    );

    let meta_parts = [
        format!("Window: {}", config.window_size),
        format!("Pacing: {}ms", config.pacing_delay.as_millis()),
        format!("Idle timeout: {}ms", config.idle_timeout.as_millis()),
    ];
    println!("{}", style(meta_parts.join(" | ")).dim());
    println!();
}

// ── Single result line ───────────────────────────────────────────────────────

fn counter_prefix(counter: Option<(usize, usize)>) -> String {
    match counter {
        Some((cur, total)) => format!("{} ", style(format!("[{}/{}]", cur, total)).dim()),
        None => String::new(),
    }
}

/// Pretty result line with alignment.
///
/// If `counter` is Some((current, total)), a progress prefix like `[3/8]` is shown.
pub fn print_result(result: &DomainCheckResult, debug: bool, counter: Option<(usize, usize)>) {
    let padded_domain = pad_str(&result.domain, DOMAIN_WIDTH, Alignment::Left, Some(".."));
    let prefix = counter_prefix(counter);

    match (&result.error, result.available) {
        (None, true) => println!(
            "  {}{}  {}",
            prefix,
            style(&padded_domain).white(),
            style("AVAILABLE").green().bold(),
        ),
        (None, false) => println!(
            "  {}{}  {}",
            prefix,
            style(&padded_domain).white(),
            style("TAKEN").red().bold(),
        ),
        (Some(message), _) => println!(
            "  {}{}  {}  {}",
            prefix,
            style(&padded_domain).white(),
            style("ERROR").yellow(),
            style(error_detail(message, debug)).dim(),
        ),
    }
}

/// Default (non-pretty) result line.
pub fn print_result_default(
    result: &DomainCheckResult,
    debug: bool,
    counter: Option<(usize, usize)>,
) {
    let prefix = counter_prefix(counter);

    match (&result.error, result.available) {
        (None, true) => println!(
            "{}{} {}",
            prefix,
            style(&result.domain).bold(),
            style("is available").green()
        ),
        (None, false) => println!(
            "{}{} {}",
            prefix,
            style(&result.domain).bold(),
            style("is taken").red()
        ),
        (Some(message), _) => println!(
            "{}{} {} {}",
            prefix,
            style(&result.domain).bold(),
            style("could not be checked").yellow(),
            style(error_detail(message, debug)).dim(),
        ),
    }
}

// ── Grouped batch output ─────────────────────────────────────────────────────

/// Print results grouped by status: Available, Taken, Errors.
/// Empty sections are omitted entirely. Order within a section follows the
/// submission order.
pub fn print_grouped_results(results: &[DomainCheckResult], debug: bool) {
    let available: Vec<&DomainCheckResult> = results
        .iter()
        .filter(|r| r.error.is_none() && r.available)
        .collect();
    let taken: Vec<&DomainCheckResult> = results
        .iter()
        .filter(|r| r.error.is_none() && !r.available)
        .collect();
    let errors: Vec<&DomainCheckResult> = results.iter().filter(|r| r.is_error()).collect();

    if !available.is_empty() {
        println!(
            "  {} {}",
            style(format!("── Available ({}) ", available.len()))
                .green()
                .bold(),
            style("─".repeat(40)).green().dim(),
        );
        for r in &available {
            print_grouped_line(r, debug);
        }
        println!();
    }

    if !taken.is_empty() {
        println!(
            "  {} {}",
            style(format!("── Taken ({}) ", taken.len())).red().bold(),
            style("─".repeat(44)).red().dim(),
        );
        for r in &taken {
            print_grouped_line(r, debug);
        }
        println!();
    }

    if !errors.is_empty() {
        println!(
            "  {} {}",
            style(format!("── Errors ({}) ", errors.len())).yellow().bold(),
            style("─".repeat(43)).yellow().dim(),
        );
        for r in &errors {
            print_grouped_line(r, debug);
        }
        println!();
    }
}

/// Print a single line inside a grouped section.
fn print_grouped_line(result: &DomainCheckResult, debug: bool) {
    let padded = pad_str(&result.domain, DOMAIN_WIDTH, Alignment::Left, Some(".."));

    match &result.error {
        None => println!("    {}", style(&padded).white()),
        Some(message) => println!(
            "    {}  {}",
            style(&padded).white(),
            style(error_detail(message, debug)).dim()
        ),
    }
}

// ── Summary ──────────────────────────────────────────────────────────────────

/// Print the final summary bar with colored counts.
pub fn print_summary(total: usize, available: usize, taken: usize, errors: usize, duration: Duration) {
    println!(
        "  {}",
        style("────────────────────────────────────────────────────").dim()
    );
    println!(
        "  {} domain{} in {:.1}s  {}  {}  {}  {}  {}  {}",
        style(total).bold(),
        plural(total),
        duration.as_secs_f64(),
        style("|").dim(),
        style(format!("{} available", available)).green(),
        style("|").dim(),
        style(format!("{} taken", taken)).red(),
        style("|").dim(),
        style(format!("{} error{}", errors, plural(errors))).yellow(),
    );
}

// ── Error summary ────────────────────────────────────────────────────────────

/// Print a categorized error summary using colors.
pub fn print_error_summary(error_stats: &ErrorStats) {
    if !error_stats.has_errors() {
        return;
    }

    println!("  {}", style("Some domains could not be checked:").yellow());

    let sections = [
        ("timeout", &error_stats.timeouts),
        ("DNS error", &error_stats.dns_errors),
        ("connection error", &error_stats.connection_errors),
        ("other error", &error_stats.other_errors),
    ];

    for (label, domains) in sections {
        if domains.is_empty() {
            continue;
        }
        println!(
            "  {} {} {}{}: {}",
            style("•").dim(),
            domains.len(),
            label,
            plural(domains.len()),
            format_domain_list(domains, 5),
        );
    }
}

/// Join domains, truncating after `max_show` entries.
pub fn format_domain_list(domains: &[String], max_show: usize) -> String {
    if domains.len() <= max_show {
        domains.join(", ")
    } else {
        let shown = &domains[..max_show];
        let remaining = domains.len() - max_show;
        format!("{}, ... and {} more", shown.join(", "), remaining)
    }
}

// ── TLD table ────────────────────────────────────────────────────────────────

/// Print every registry entry, then exit.
pub fn print_tld_table(registry: &TldRegistry) {
    let heading = console::Style::new().yellow().bold();

    println!();
    println!(
        "{}",
        heading.apply_to(format!("Known TLDs ({}):", registry.len()))
    );
    println!();

    for tld in registry.all_tlds() {
        let name = pad_str(&tld.display_name, 8, Alignment::Left, None);
        let server = pad_str(&tld.server, 36, Alignment::Left, Some(".."));
        let line = format!("  {}  {}  \"{}\"", name, server, tld.available_pattern);
        if tld.enabled {
            println!("{}", line);
        } else {
            println!("{}  {}", style(line).dim(), style("(disabled)").dim());
        }
    }

    println!();
    println!("Override or add entries with [[tlds]] in whois-sweep.toml");
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Full message in debug mode, otherwise a brief reason.
fn error_detail(message: &str, debug: bool) -> String {
    if debug {
        message.to_string()
    } else {
        brief_error(message).to_string()
    }
}

/// Extract a brief error reason from a captured error message.
fn brief_error(message: &str) -> &'static str {
    match categorize_error_message(message) {
        ErrorCategory::Timeout => "(timeout)",
        ErrorCategory::Dns => "(DNS error)",
        ErrorCategory::Connection => "(connection error)",
        ErrorCategory::Other => "(error)",
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brief_error_timeout() {
        assert_eq!(
            brief_error("Connection to whois.nic.io failed: connect to 1.2.3.4:43 timed out after 5s"),
            "(timeout)"
        );
    }

    #[test]
    fn test_brief_error_dns() {
        assert_eq!(
            brief_error("Connection to whois.x failed: Could not resolve 'whois.x': no addresses returned"),
            "(DNS error)"
        );
    }

    #[test]
    fn test_brief_error_other() {
        assert_eq!(brief_error("Invalid WHOIS server ''"), "(error)");
    }

    #[test]
    fn test_error_detail_debug_shows_message() {
        let message = "Transport error with whois.x: read failed: reset";
        assert_eq!(error_detail(message, true), message);
        assert_eq!(error_detail(message, false), "(connection error)");
    }

    #[test]
    fn test_format_domain_list_truncation() {
        let domains: Vec<String> = (0..7).map(|i| format!("d{}.com", i)).collect();
        assert_eq!(
            format_domain_list(&domains, 5),
            "d0.com, d1.com, d2.com, d3.com, d4.com, ... and 2 more"
        );
        assert_eq!(format_domain_list(&domains[..2], 5), "d0.com, d1.com");
    }

    #[test]
    fn test_plural() {
        assert_eq!(plural(1), "");
        assert_eq!(plural(0), "s");
        assert_eq!(plural(2), "s");
    }
}
