//! Readiness probing for service instances.
//!
//! Issues real TCP connects against each instance endpoint on a bounded
//! retry schedule with exponential backoff, instead of sleeping for a fixed
//! duration and hoping. Returns as soon as every endpoint accepts a
//! connection; fails with a distinct timeout error when the deadline passes.

use crate::config::ReadinessConfig;
use crate::error::ProvisionError;
use crate::progress::ProgressReporter;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout};

/// Active readiness probe with a global deadline.
pub struct ReadinessProbe {
    deadline: Duration,
    connect_timeout: Duration,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl ReadinessProbe {
    pub fn new(config: &ReadinessConfig) -> Self {
        Self {
            deadline: Duration::from_secs(config.deadline_secs),
            connect_timeout: Duration::from_millis(config.connect_timeout_ms),
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
        }
    }

    /// Block until every endpoint accepts a TCP connection.
    ///
    /// Progress is monotonically non-decreasing, starts at 0 and ends at 100
    /// exactly once, when all endpoints became reachable. Endpoints are
    /// `(name, addr)` pairs; the timeout error names whichever are still
    /// unreachable.
    pub async fn wait_until_ready(
        &self,
        endpoints: &[(String, String)],
        reporter: &dyn ProgressReporter,
    ) -> Result<(), ProvisionError> {
        let start = Instant::now();
        let mut pending: Vec<(String, String)> = endpoints.to_vec();
        let mut backoff = self.initial_backoff;
        let mut last_pct: u32 = 0;

        reporter.emit_phased(
            0,
            format!("Probing {} instance endpoint(s)", pending.len()),
            Some("readiness".to_string()),
            None,
        );

        loop {
            let mut still_pending = Vec::new();
            for (name, addr) in &pending {
                match timeout(self.connect_timeout, TcpStream::connect(addr.as_str())).await {
                    Ok(Ok(_)) => {
                        tracing::info!(
                            "[Readiness] {} accepting connections at {} ({:?} elapsed)",
                            name,
                            addr,
                            start.elapsed()
                        );
                    }
                    _ => still_pending.push((name.clone(), addr.clone())),
                }
            }
            pending = still_pending;

            if pending.is_empty() {
                reporter.emit_phased(
                    100,
                    "All instances ready".to_string(),
                    Some("readiness".to_string()),
                    None,
                );
                return Ok(());
            }

            let elapsed = start.elapsed();
            if elapsed >= self.deadline {
                let unreachable: Vec<String> = pending
                    .iter()
                    .map(|(name, addr)| format!("{} ({})", name, addr))
                    .collect();
                return Err(ProvisionError::ReadinessTimeout(format!(
                    "{} not reachable within {:?}",
                    unreachable.join(", "),
                    self.deadline
                )));
            }

            // Progress tracks the share of the deadline consumed, capped
            // below 100 so completion is reported exactly once.
            let pct = ((elapsed.as_secs_f64() / self.deadline.as_secs_f64()) * 100.0) as u32;
            let pct = pct.min(99).max(last_pct);
            if pct > last_pct {
                reporter.emit_phased(
                    pct,
                    format!("Waiting for {} instance(s)", pending.len()),
                    Some("readiness".to_string()),
                    None,
                );
                last_pct = pct;
            }

            tracing::debug!(
                "[Readiness] {} endpoint(s) still unreachable, retrying in {:?} ({:?} elapsed)",
                pending.len(),
                backoff,
                elapsed
            );

            let remaining = self.deadline.saturating_sub(elapsed);
            sleep(backoff.min(remaining)).await;
            backoff = (backoff * 2).min(self.max_backoff);
        }
    }
}
