//! Background reconciliation of locally `ACTIVE` charges against the
//! provider's authoritative status.
//!
//! Each pass loads the recent `ACTIVE` transactions, asks the provider about
//! every one of them with bounded parallelism and applies at most one
//! `ACTIVE -> terminal` transition per transaction. A completion is followed
//! by a single webhook attempt. Failures stay local to the transaction they
//! happened on; the transaction remains `ACTIVE` and is looked at again on
//! the next pass.

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use pixbridge_common::{
    PixProvider, StoredTransaction, TransactionStatus, TransactionStore, WebhookNotifier,
    WebhookPayload,
};
use pixbridge_config::ReconcilerConfig;
use std::fmt;
use std::ops::AddAssign;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Source of wall-clock time for recency and settlement windows.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone)]
pub struct ReconcilerSettings {
    pub poll_interval: Duration,
    pub recency_window: chrono::Duration,
    pub settlement_lookback: chrono::Duration,
    pub max_concurrency: usize,
}

impl From<&ReconcilerConfig> for ReconcilerSettings {
    fn from(config: &ReconcilerConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            recency_window: config.recency_window(),
            settlement_lookback: config.settlement_lookback(),
            max_concurrency: config.max_concurrency.max(1),
        }
    }
}

impl Default for ReconcilerSettings {
    fn default() -> Self {
        Self::from(&ReconcilerConfig::default())
    }
}

/// What a single pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    pub candidates: usize,
    pub unchanged: usize,
    pub completed: usize,
    pub removed: usize,
    pub query_failures: usize,
    pub write_failures: usize,
    pub tax_id_failures: usize,
    pub webhooks_delivered: usize,
    pub webhook_failures: usize,
    /// Transitions not applied because the row had already left `ACTIVE`
    pub skipped: usize,
}

impl AddAssign for PassReport {
    fn add_assign(&mut self, other: Self) {
        self.candidates += other.candidates;
        self.unchanged += other.unchanged;
        self.completed += other.completed;
        self.removed += other.removed;
        self.query_failures += other.query_failures;
        self.write_failures += other.write_failures;
        self.tax_id_failures += other.tax_id_failures;
        self.webhooks_delivered += other.webhooks_delivered;
        self.webhook_failures += other.webhook_failures;
        self.skipped += other.skipped;
    }
}

impl fmt::Display for PassReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "candidates={} unchanged={} completed={} removed={} query_failures={} \
             write_failures={} tax_id_failures={} webhooks_delivered={} \
             webhook_failures={} skipped={}",
            self.candidates,
            self.unchanged,
            self.completed,
            self.removed,
            self.query_failures,
            self.write_failures,
            self.tax_id_failures,
            self.webhooks_delivered,
            self.webhook_failures,
            self.skipped
        )
    }
}

pub struct Reconciler<P, S, N> {
    provider: Arc<P>,
    store: Arc<S>,
    notifier: Arc<N>,
    clock: Arc<dyn Clock>,
    settings: ReconcilerSettings,
}

impl<P, S, N> Reconciler<P, S, N>
where
    P: PixProvider + 'static,
    S: TransactionStore + 'static,
    N: WebhookNotifier + 'static,
{
    pub fn new(
        provider: Arc<P>,
        store: Arc<S>,
        notifier: Arc<N>,
        settings: ReconcilerSettings,
    ) -> Self {
        Self {
            provider,
            store,
            notifier,
            clock: Arc::new(SystemClock),
            settings,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Runs one reconciliation pass over the current candidates.
    ///
    /// Only a failure to load the candidates fails the pass; everything that
    /// goes wrong for an individual transaction is counted in the report.
    pub async fn run_pass(&self) -> Result<PassReport, S::Error> {
        let now = self.clock.now();
        let since = now - self.settings.recency_window;
        let candidates = self.store.list_active_since(since).await?;

        let mut report = PassReport {
            candidates: candidates.len(),
            ..PassReport::default()
        };
        if candidates.is_empty() {
            debug!("No transactions to reconcile");
            return Ok(report);
        }

        let outcomes: Vec<PassReport> = stream::iter(candidates)
            .map(|transaction| self.reconcile(transaction, now))
            .buffer_unordered(self.settings.max_concurrency.max(1))
            .collect()
            .await;
        for outcome in outcomes {
            report += outcome;
        }
        Ok(report)
    }

    async fn reconcile(&self, transaction: StoredTransaction, now: DateTime<Utc>) -> PassReport {
        let mut report = PassReport::default();
        let txid = transaction.txid.as_str();

        let charge = match self.provider.get_charge(txid).await {
            Ok(charge) => charge,
            Err(e) => {
                warn!(txid, error = %e, "Failed to query charge status");
                report.query_failures = 1;
                return report;
            }
        };

        match charge.status {
            TransactionStatus::Active => {
                report.unchanged = 1;
            }
            TransactionStatus::Completed => {
                self.complete(&transaction, now, &mut report).await;
            }
            status @ (TransactionStatus::RemovedByUser | TransactionStatus::RemovedByPsp) => {
                match self.store.update_status(txid, status).await {
                    Ok(true) => {
                        info!(txid, %status, "Charge removed");
                        report.removed = 1;
                    }
                    Ok(false) => {
                        debug!(txid, "Transaction already left ACTIVE");
                        report.skipped = 1;
                    }
                    Err(e) => {
                        error!(txid, %status, error = %e, "Failed to persist status");
                        report.write_failures = 1;
                    }
                }
            }
        }
        report
    }

    async fn complete(
        &self,
        transaction: &StoredTransaction,
        now: DateTime<Utc>,
        report: &mut PassReport,
    ) {
        let txid = transaction.txid.as_str();
        let mut tax_id = transaction.tax_id.clone();

        match self.lookup_tax_id(txid, now).await {
            Ok(Some(found)) if tax_id.as_deref() != Some(found.as_str()) => {
                match self.store.update_tax_id(txid, &found).await {
                    Ok(()) => tax_id = Some(found),
                    Err(e) => {
                        warn!(txid, error = %e, "Failed to persist payer tax id");
                        report.tax_id_failures += 1;
                    }
                }
            }
            Ok(_) => {}
            Err(e) => {
                warn!(txid, error = %e, "Settlement lookup failed, completing without tax id");
                report.tax_id_failures += 1;
            }
        }

        match self
            .store
            .update_status(txid, TransactionStatus::Completed)
            .await
        {
            Ok(true) => {
                info!(txid, "Charge completed");
                report.completed = 1;
            }
            Ok(false) => {
                debug!(txid, "Transaction already left ACTIVE, no webhook");
                report.skipped = 1;
                return;
            }
            Err(e) => {
                error!(txid, error = %e, "Failed to persist completion");
                report.write_failures = 1;
                return;
            }
        }

        let Some(callback_url) = transaction.callback_url.as_deref() else {
            return;
        };
        let payload = WebhookPayload {
            status: TransactionStatus::Completed,
            tax_id,
            internal_id: transaction.internal_id.clone(),
        };
        match self.notifier.notify(callback_url, &payload).await {
            Ok(()) => report.webhooks_delivered = 1,
            Err(e) => {
                warn!(txid, callback_url, error = %e, "Webhook delivery failed");
                report.webhook_failures = 1;
            }
        }
    }

    async fn lookup_tax_id(&self, txid: &str, now: DateTime<Utc>) -> Result<Option<String>, P::Error> {
        let from = now - self.settings.settlement_lookback;
        let settlements = self.provider.get_settlements(txid, from, now).await?;
        Ok(settlements
            .into_iter()
            .filter(|record| record.txid.as_deref().is_none_or(|t| t == txid))
            .find_map(|record| record.payer_tax_id))
    }

    /// Runs passes on the poll interval until `shutdown` flips to `true`.
    ///
    /// A pass runs inline, so a pass slower than the interval makes the next
    /// tick skip rather than overlap.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(self.settings.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            interval_secs = self.settings.poll_interval.as_secs(),
            recency_window_minutes = self.settings.recency_window.num_minutes(),
            "Starting reconciler"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.run_pass().await {
                        Ok(report) if report.candidates > 0 => {
                            info!(%report, "Reconciliation pass finished");
                        }
                        Ok(_) => {}
                        Err(e) => error!(error = %e, "Failed to load reconciliation candidates"),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Reconciler shutting down");
                        break;
                    }
                }
            }
        }
    }

    /// Moves the reconciler onto its own task.
    pub fn spawn(self: Arc<Self>) -> ReconcilerHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let join = tokio::spawn(async move { self.run(shutdown_rx).await });
        ReconcilerHandle { shutdown_tx, join }
    }
}

/// Handle to a spawned reconciler task.
pub struct ReconcilerHandle {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl ReconcilerHandle {
    /// Signals shutdown and waits for the in-progress pass, if any, to end.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.join.await {
            error!(error = %e, "Reconciler task ended abnormally");
        }
    }
}
