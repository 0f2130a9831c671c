//! Windowed batch checking.
//!
//! A batch expands keywords × TLDs into check tasks and runs them in
//! fixed-size windows: every task in a window is in flight at once, the next
//! window starts only after the whole window has settled and a pacing delay
//! has passed. Windows bound the number of simultaneous WHOIS connections and
//! the pacing keeps registries from rate limiting us.

use crate::checker::{CheckDomain, DomainChecker};
use crate::error::DomainCheckError;
use crate::protocols::TldRegistry;
use crate::types::{BatchOutcome, CheckConfig, CheckTask, DomainCheckResult, TldConfig};
use crate::utils::{normalize_tld, validate_keyword};
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn, Instrument};

/// Runs keyword × TLD availability checks in paced, bounded windows.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use whois_sweep_lib::{BatchChecker, CheckConfig, TldRegistry};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let registry = Arc::new(TldRegistry::builtin());
///     let batch = BatchChecker::new(registry, CheckConfig::default());
///
///     let keywords = vec!["rustacean".to_string(), "ferris".to_string()];
///     let tlds = vec!["com".to_string(), "dev".to_string()];
///     for result in batch.check_domains(&keywords, &tlds).await? {
///         println!("{}: {}", result.domain, result.available);
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct BatchChecker<C = DomainChecker> {
    registry: Arc<TldRegistry>,
    checker: C,
    window_size: usize,
    pacing_delay: Duration,
}

impl BatchChecker<DomainChecker> {
    /// Batch checker backed by a WHOIS [`DomainChecker`] built from `config`.
    pub fn new(registry: Arc<TldRegistry>, config: CheckConfig) -> Self {
        let checker = DomainChecker::with_config(config.clone());
        Self::with_checker(registry, checker, &config)
    }
}

impl<C: CheckDomain> BatchChecker<C> {
    /// Batch checker that delegates each task to `checker`.
    ///
    /// Only `window_size` and `pacing_delay` are taken from `config`.
    pub fn with_checker(registry: Arc<TldRegistry>, checker: C, config: &CheckConfig) -> Self {
        Self {
            registry,
            checker,
            window_size: config.window_size.max(1),
            pacing_delay: config.pacing_delay,
        }
    }

    pub fn registry(&self) -> &TldRegistry {
        &self.registry
    }

    pub fn checker(&self) -> &C {
        &self.checker
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Requested TLDs that exist and are enabled, in first-seen order.
    ///
    /// Names are normalized before lookup and duplicates are dropped.
    pub fn valid_tlds(&self, tld_names: &[String]) -> Vec<&TldConfig> {
        let mut seen = HashSet::new();
        tld_names
            .iter()
            .filter_map(|name| self.registry.lookup(name))
            .filter(|tld| tld.enabled)
            .filter(|tld| seen.insert(normalize_tld(&tld.name)))
            .collect()
    }

    /// Expand keywords × valid TLDs into tasks, keyword-outer and TLD-inner.
    ///
    /// Keywords that are not a single valid label (see
    /// [`validate_keyword`](crate::validate_keyword)) are skipped with a
    /// warning, so no task can carry an empty name or a second query line.
    ///
    /// # Errors
    ///
    /// Returns `DomainCheckError::NoValidTlds` if none of `tld_names` is a
    /// known, enabled TLD.
    pub fn build_tasks(
        &self,
        keywords: &[String],
        tld_names: &[String],
    ) -> Result<Vec<CheckTask>, DomainCheckError> {
        let tlds = self.valid_tlds(tld_names);
        if tlds.is_empty() {
            return Err(DomainCheckError::no_valid_tlds(tld_names));
        }

        Ok(keywords
            .iter()
            .map(|keyword| keyword.trim())
            .filter(|keyword| match validate_keyword(keyword) {
                Ok(()) => true,
                Err(e) => {
                    warn!(error = %e, "skipping invalid keyword");
                    false
                }
            })
            .flat_map(|keyword| tlds.iter().map(move |tld| CheckTask::new(keyword, tld)))
            .collect())
    }

    /// Check every keyword × TLD combination.
    ///
    /// Returns one result per task in submission order, whatever order the
    /// exchanges finish in. Per-domain failures are reported inside the
    /// results; the call itself fails only when no requested TLD is valid.
    pub async fn check_domains(
        &self,
        keywords: &[String],
        tld_names: &[String],
    ) -> Result<Vec<DomainCheckResult>, DomainCheckError> {
        let tasks = self.build_tasks(keywords, tld_names)?;
        let started = Instant::now();
        info!(tasks = tasks.len(), window_size = self.window_size, "starting batch");

        let mut slots = vec![None; tasks.len()];
        self.run_windows(&tasks, &mut slots).await;
        let results: Vec<DomainCheckResult> = slots.into_iter().flatten().collect();

        log_finished(&results, started);
        Ok(results)
    }

    /// Like [`check_domains`](Self::check_domains), bounded by `deadline`.
    ///
    /// When the deadline expires the in-flight window is dropped (closing its
    /// sockets) and the results that had already settled are returned, still
    /// in submission order, with `complete` set to `false`.
    pub async fn check_domains_within(
        &self,
        keywords: &[String],
        tld_names: &[String],
        deadline: Duration,
    ) -> Result<BatchOutcome, DomainCheckError> {
        let tasks = self.build_tasks(keywords, tld_names)?;
        let started = Instant::now();
        info!(tasks = tasks.len(), deadline = ?deadline, "starting batch with deadline");

        let mut slots = vec![None; tasks.len()];
        let complete = tokio::time::timeout(deadline, self.run_windows(&tasks, &mut slots))
            .await
            .is_ok();
        let results: Vec<DomainCheckResult> = slots.into_iter().flatten().collect();

        if !complete {
            info!(
                settled = results.len(),
                total = tasks.len(),
                "batch deadline expired, returning partial results"
            );
        }
        log_finished(&results, started);

        Ok(BatchOutcome {
            results,
            total_tasks: tasks.len(),
            complete,
        })
    }

    /// Run windows sequentially; each task writes only its own slot.
    async fn run_windows(&self, tasks: &[CheckTask], slots: &mut [Option<DomainCheckResult>]) {
        let window_count = tasks.len().div_ceil(self.window_size);
        let windows = tasks
            .chunks(self.window_size)
            .zip(slots.chunks_mut(self.window_size));

        for (index, (window, window_slots)) in windows.enumerate() {
            if index > 0 {
                tokio::time::sleep(self.pacing_delay).await;
            }
            debug!(
                window = index + 1,
                windows = window_count,
                tasks = window.len(),
                "dispatching window"
            );

            let in_flight = window
                .iter()
                .zip(window_slots.iter_mut())
                .map(|(task, slot)| {
                    let span = tracing::debug_span!("check", domain = %task.domain);
                    async move {
                        *slot = Some(self.checker.check(task).await);
                    }
                    .instrument(span)
                });
            join_all(in_flight).await;
        }
    }
}

fn log_finished(results: &[DomainCheckResult], started: Instant) {
    let available = results.iter().filter(|r| r.available).count();
    let failed = results.iter().filter(|r| r.is_error()).count();
    info!(
        results = results.len(),
        available,
        failed,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "batch finished"
    );
}
