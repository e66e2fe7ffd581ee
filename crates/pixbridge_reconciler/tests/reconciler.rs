use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use pixbridge_common::{
    BoxFuture, ChargeState, NewTransaction, PixProvider, SettlementRecord, StoredTransaction,
    TransactionStatus, TransactionStore, WebhookNotifier, WebhookPayload,
};
use pixbridge_db::{DbClient, SqlTransactionStore};
use pixbridge_reconciler::{Clock, PassReport, Reconciler, ReconcilerSettings};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    GetCharge(String),
    GetSettlements(String, DateTime<Utc>, DateTime<Utc>),
    UpdateTaxId(String, String),
    UpdateStatus(String, TransactionStatus),
    Webhook(String, WebhookPayload),
}

type Journal = Arc<Mutex<Vec<Call>>>;

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct FakeError(String);

struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 5, 12, 0, 0).unwrap()
}

// --- provider ---

#[derive(Default)]
struct FakeProvider {
    journal: Journal,
    statuses: Mutex<HashMap<String, Result<TransactionStatus, String>>>,
    settlements: Mutex<HashMap<String, Result<Vec<SettlementRecord>, String>>>,
}

impl FakeProvider {
    fn status(&self, txid: &str, status: TransactionStatus) {
        self.statuses
            .lock()
            .unwrap()
            .insert(txid.to_string(), Ok(status));
    }

    fn status_fails(&self, txid: &str) {
        self.statuses
            .lock()
            .unwrap()
            .insert(txid.to_string(), Err("connection reset".to_string()));
    }

    fn payer(&self, txid: &str, tax_id: &str) {
        self.settlements.lock().unwrap().insert(
            txid.to_string(),
            Ok(vec![SettlementRecord {
                end_to_end_id: format!("E2E-{}", txid),
                txid: Some(txid.to_string()),
                amount: "10.00".to_string(),
                paid_at: Some(now() - ChronoDuration::minutes(2)),
                payer_tax_id: Some(tax_id.to_string()),
            }]),
        );
    }

    fn settlements_fail(&self, txid: &str) {
        self.settlements
            .lock()
            .unwrap()
            .insert(txid.to_string(), Err("503 from provider".to_string()));
    }
}

impl PixProvider for FakeProvider {
    type Error = FakeError;

    fn create_charge(&self, _txid: &str, _amount: &str) -> BoxFuture<'_, ChargeState, FakeError> {
        Box::pin(async move { Err(FakeError("not used".to_string())) })
    }

    fn get_charge(&self, txid: &str) -> BoxFuture<'_, ChargeState, FakeError> {
        let txid = txid.to_string();
        Box::pin(async move {
            self.journal.lock().unwrap().push(Call::GetCharge(txid.clone()));
            // let an overlapping pass load its candidates before this one writes
            tokio::task::yield_now().await;
            let status = self
                .statuses
                .lock()
                .unwrap()
                .get(&txid)
                .cloned()
                .unwrap_or(Ok(TransactionStatus::Active));
            status.map_err(FakeError).map(|status| ChargeState {
                txid,
                status,
                amount: "10.00".to_string(),
                pix_copy_paste: None,
            })
        })
    }

    fn get_settlements(
        &self,
        txid: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<SettlementRecord>, FakeError> {
        let txid = txid.to_string();
        Box::pin(async move {
            self.journal
                .lock()
                .unwrap()
                .push(Call::GetSettlements(txid.clone(), from, to));
            self.settlements
                .lock()
                .unwrap()
                .get(&txid)
                .cloned()
                .unwrap_or(Ok(Vec::new()))
                .map_err(FakeError)
        })
    }
}

// --- store ---

#[derive(Default)]
struct FakeStore {
    journal: Journal,
    rows: Mutex<Vec<StoredTransaction>>,
    failing_writes: Mutex<HashSet<String>>,
    failing_list: Mutex<bool>,
}

impl FakeStore {
    fn seed(&self, txid: &str, age_minutes: i64, tax_id: Option<&str>, callback: bool) {
        let created_at = now() - ChronoDuration::minutes(age_minutes);
        self.rows.lock().unwrap().push(StoredTransaction {
            id: format!("id-{}", txid),
            txid: txid.to_string(),
            internal_id: format!("order-{}", txid),
            tax_id: tax_id.map(str::to_string),
            status: TransactionStatus::Active,
            callback_url: callback.then(|| format!("https://merchant.example/{}", txid)),
            amount: "10.00".to_string(),
            pix_copy_paste: None,
            created_at,
            updated_at: created_at,
        });
    }

    fn fail_writes_for(&self, txid: &str) {
        self.failing_writes.lock().unwrap().insert(txid.to_string());
    }

    fn row(&self, txid: &str) -> StoredTransaction {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|row| row.txid == txid)
            .cloned()
            .unwrap()
    }

    fn check_write(&self, txid: &str) -> Result<(), FakeError> {
        if self.failing_writes.lock().unwrap().contains(txid) {
            Err(FakeError("database is locked".to_string()))
        } else {
            Ok(())
        }
    }
}

impl TransactionStore for FakeStore {
    type Error = FakeError;

    fn insert(&self, _transaction: NewTransaction) -> BoxFuture<'_, StoredTransaction, FakeError> {
        Box::pin(async move { Err(FakeError("not used".to_string())) })
    }

    fn find_by_txid(&self, txid: &str) -> BoxFuture<'_, Option<StoredTransaction>, FakeError> {
        let txid = txid.to_string();
        Box::pin(async move {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|row| row.txid == txid)
                .cloned())
        })
    }

    fn list_active_since(
        &self,
        since: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<StoredTransaction>, FakeError> {
        Box::pin(async move {
            if *self.failing_list.lock().unwrap() {
                return Err(FakeError("connection refused".to_string()));
            }
            let mut rows: Vec<_> = self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|row| row.status == TransactionStatus::Active && row.created_at >= since)
                .cloned()
                .collect();
            rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(rows)
        })
    }

    fn update_status(
        &self,
        txid: &str,
        status: TransactionStatus,
    ) -> BoxFuture<'_, bool, FakeError> {
        let txid = txid.to_string();
        Box::pin(async move {
            self.journal
                .lock()
                .unwrap()
                .push(Call::UpdateStatus(txid.clone(), status));
            self.check_write(&txid)?;
            let mut rows = self.rows.lock().unwrap();
            match rows
                .iter_mut()
                .find(|row| row.txid == txid && row.status == TransactionStatus::Active)
            {
                Some(row) => {
                    row.status = status;
                    Ok(true)
                }
                None => Ok(false),
            }
        })
    }

    fn update_tax_id(&self, txid: &str, tax_id: &str) -> BoxFuture<'_, (), FakeError> {
        let txid = txid.to_string();
        let tax_id = tax_id.to_string();
        Box::pin(async move {
            self.journal
                .lock()
                .unwrap()
                .push(Call::UpdateTaxId(txid.clone(), tax_id.clone()));
            self.check_write(&txid)?;
            if let Some(row) = self
                .rows
                .lock()
                .unwrap()
                .iter_mut()
                .find(|r| r.txid == txid && r.status == TransactionStatus::Active)
            {
                row.tax_id = Some(tax_id);
            }
            Ok(())
        })
    }
}

// --- notifier ---

#[derive(Default)]
struct FakeNotifier {
    journal: Journal,
    failing: Mutex<bool>,
}

impl WebhookNotifier for FakeNotifier {
    type Error = FakeError;

    fn notify(&self, callback_url: &str, payload: &WebhookPayload) -> BoxFuture<'_, (), FakeError> {
        let callback_url = callback_url.to_string();
        let payload = payload.clone();
        Box::pin(async move {
            self.journal
                .lock()
                .unwrap()
                .push(Call::Webhook(callback_url, payload));
            if *self.failing.lock().unwrap() {
                Err(FakeError("timed out".to_string()))
            } else {
                Ok(())
            }
        })
    }
}

struct Harness {
    journal: Journal,
    provider: Arc<FakeProvider>,
    store: Arc<FakeStore>,
    notifier: Arc<FakeNotifier>,
    reconciler: Reconciler<FakeProvider, FakeStore, FakeNotifier>,
}

impl Harness {
    fn new() -> Self {
        let journal: Journal = Arc::default();
        let provider = Arc::new(FakeProvider {
            journal: journal.clone(),
            ..FakeProvider::default()
        });
        let store = Arc::new(FakeStore {
            journal: journal.clone(),
            ..FakeStore::default()
        });
        let notifier = Arc::new(FakeNotifier {
            journal: journal.clone(),
            ..FakeNotifier::default()
        });
        let settings = ReconcilerSettings {
            poll_interval: Duration::from_secs(30),
            recency_window: ChronoDuration::minutes(40),
            settlement_lookback: ChronoDuration::hours(48),
            max_concurrency: 4,
        };
        let reconciler = Reconciler::new(provider.clone(), store.clone(), notifier.clone(), settings)
            .with_clock(Arc::new(FixedClock(now())));
        Self {
            journal,
            provider,
            store,
            notifier,
            reconciler,
        }
    }

    /// Store writes and webhooks, in order; reads are left out.
    fn effects(&self) -> Vec<Call> {
        self.journal
            .lock()
            .unwrap()
            .iter()
            .filter(|call| {
                matches!(
                    call,
                    Call::UpdateTaxId(..) | Call::UpdateStatus(..) | Call::Webhook(..)
                )
            })
            .cloned()
            .collect()
    }

    fn webhooks(&self) -> Vec<WebhookPayload> {
        self.journal
            .lock()
            .unwrap()
            .iter()
            .filter_map(|call| match call {
                Call::Webhook(_, payload) => Some(payload.clone()),
                _ => None,
            })
            .collect()
    }
}

#[tokio::test]
async fn test_completed_with_settlement_updates_tax_id_then_status_then_webhook() {
    let h = Harness::new();
    h.store.seed("tx1", 5, None, true);
    h.provider.status("tx1", TransactionStatus::Completed);
    h.provider.payer("tx1", "12345678900");

    let report = h.reconciler.run_pass().await.unwrap();

    assert_eq!(
        h.effects(),
        vec![
            Call::UpdateTaxId("tx1".to_string(), "12345678900".to_string()),
            Call::UpdateStatus("tx1".to_string(), TransactionStatus::Completed),
            Call::Webhook(
                "https://merchant.example/tx1".to_string(),
                WebhookPayload {
                    status: TransactionStatus::Completed,
                    tax_id: Some("12345678900".to_string()),
                    internal_id: "order-tx1".to_string(),
                }
            ),
        ]
    );
    assert_eq!(report.completed, 1);
    assert_eq!(report.webhooks_delivered, 1);
    assert_eq!(h.store.row("tx1").status, TransactionStatus::Completed);
}

#[tokio::test]
async fn test_settlement_window_covers_lookback() {
    let h = Harness::new();
    h.store.seed("tx1", 5, None, false);
    h.provider.status("tx1", TransactionStatus::Completed);

    h.reconciler.run_pass().await.unwrap();

    let lookups: Vec<_> = h
        .journal
        .lock()
        .unwrap()
        .iter()
        .filter_map(|call| match call {
            Call::GetSettlements(txid, from, to) => Some((txid.clone(), *from, *to)),
            _ => None,
        })
        .collect();
    assert_eq!(
        lookups,
        vec![("tx1".to_string(), now() - ChronoDuration::hours(48), now())]
    );
}

#[tokio::test]
async fn test_unchanged_status_writes_nothing() {
    let h = Harness::new();
    h.store.seed("tx1", 5, None, true);
    h.provider.status("tx1", TransactionStatus::Active);

    let report = h.reconciler.run_pass().await.unwrap();

    assert!(h.effects().is_empty());
    assert_eq!(
        report,
        PassReport {
            candidates: 1,
            unchanged: 1,
            ..PassReport::default()
        }
    );
}

#[tokio::test]
async fn test_settlement_failure_still_completes_with_stored_tax_id() {
    let h = Harness::new();
    h.store.seed("tx1", 5, Some("98765432100"), true);
    h.provider.status("tx1", TransactionStatus::Completed);
    h.provider.settlements_fail("tx1");

    let report = h.reconciler.run_pass().await.unwrap();

    assert_eq!(
        h.effects(),
        vec![
            Call::UpdateStatus("tx1".to_string(), TransactionStatus::Completed),
            Call::Webhook(
                "https://merchant.example/tx1".to_string(),
                WebhookPayload {
                    status: TransactionStatus::Completed,
                    tax_id: Some("98765432100".to_string()),
                    internal_id: "order-tx1".to_string(),
                }
            ),
        ]
    );
    assert_eq!(report.tax_id_failures, 1);
    assert_eq!(report.completed, 1);
}

#[tokio::test]
async fn test_known_tax_id_is_not_rewritten() {
    let h = Harness::new();
    h.store.seed("tx1", 5, Some("12345678900"), false);
    h.provider.status("tx1", TransactionStatus::Completed);
    h.provider.payer("tx1", "12345678900");

    h.reconciler.run_pass().await.unwrap();

    assert_eq!(
        h.effects(),
        vec![Call::UpdateStatus(
            "tx1".to_string(),
            TransactionStatus::Completed
        )]
    );
}

#[tokio::test]
async fn test_transaction_outside_recency_window_is_not_a_candidate() {
    let h = Harness::new();
    h.store.seed("old", 41, None, true);
    h.provider.status("old", TransactionStatus::Completed);

    let report = h.reconciler.run_pass().await.unwrap();

    assert_eq!(report.candidates, 0);
    assert!(h.journal.lock().unwrap().is_empty());
    assert_eq!(h.store.row("old").status, TransactionStatus::Active);
}

#[tokio::test]
async fn test_removed_charge_transitions_without_webhook() {
    let h = Harness::new();
    h.store.seed("user", 5, None, true);
    h.store.seed("psp", 6, None, true);
    h.provider.status("user", TransactionStatus::RemovedByUser);
    h.provider.status("psp", TransactionStatus::RemovedByPsp);

    let report = h.reconciler.run_pass().await.unwrap();

    assert_eq!(report.removed, 2);
    assert!(h.webhooks().is_empty());
    assert_eq!(h.store.row("user").status, TransactionStatus::RemovedByUser);
    assert_eq!(h.store.row("psp").status, TransactionStatus::RemovedByPsp);
}

#[tokio::test]
async fn test_store_failure_leaves_transaction_active_for_next_pass() {
    let h = Harness::new();
    h.store.seed("tx1", 5, None, true);
    h.provider.status("tx1", TransactionStatus::Completed);
    h.store.fail_writes_for("tx1");

    let report = h.reconciler.run_pass().await.unwrap();

    assert_eq!(report.write_failures, 1);
    assert!(h.webhooks().is_empty());
    assert_eq!(h.store.row("tx1").status, TransactionStatus::Active);

    // the store recovers; the next pass completes it
    h.store.failing_writes.lock().unwrap().clear();
    let report = h.reconciler.run_pass().await.unwrap();
    assert_eq!(report.completed, 1);
    assert_eq!(h.webhooks().len(), 1);
}

#[tokio::test]
async fn test_failures_are_isolated_per_transaction() {
    let h = Harness::new();
    h.store.seed("broken", 1, None, true);
    h.store.seed("unwritable", 2, None, true);
    h.store.seed("healthy", 3, None, true);
    h.provider.status_fails("broken");
    h.provider.status("unwritable", TransactionStatus::Completed);
    h.provider.status("healthy", TransactionStatus::Completed);
    h.store.fail_writes_for("unwritable");

    let report = h.reconciler.run_pass().await.unwrap();

    assert_eq!(report.candidates, 3);
    assert_eq!(report.query_failures, 1);
    assert_eq!(report.write_failures, 1);
    assert_eq!(report.completed, 1);
    assert_eq!(h.store.row("healthy").status, TransactionStatus::Completed);
    assert_eq!(h.store.row("broken").status, TransactionStatus::Active);
    assert_eq!(h.store.row("unwritable").status, TransactionStatus::Active);
    let webhooks = h.webhooks();
    assert_eq!(webhooks.len(), 1);
    assert_eq!(webhooks[0].internal_id, "order-healthy");
}

#[tokio::test]
async fn test_webhook_failure_is_not_retried() {
    let h = Harness::new();
    h.store.seed("tx1", 5, None, true);
    h.provider.status("tx1", TransactionStatus::Completed);
    *h.notifier.failing.lock().unwrap() = true;

    let first = h.reconciler.run_pass().await.unwrap();
    let second = h.reconciler.run_pass().await.unwrap();

    assert_eq!(first.completed, 1);
    assert_eq!(first.webhook_failures, 1);
    assert_eq!(second.candidates, 0);
    assert_eq!(h.webhooks().len(), 1);
}

#[tokio::test]
async fn test_concurrent_passes_transition_and_notify_once() {
    let h = Harness::new();
    h.store.seed("tx1", 5, None, true);
    h.provider.status("tx1", TransactionStatus::Completed);
    h.provider.payer("tx1", "12345678900");

    let (a, b) = tokio::join!(h.reconciler.run_pass(), h.reconciler.run_pass());
    let (a, b) = (a.unwrap(), b.unwrap());

    // both passes saw tx1 while it was still ACTIVE
    assert_eq!(a.candidates, 1);
    assert_eq!(b.candidates, 1);
    assert_eq!(a.completed + b.completed, 1);
    assert_eq!(a.skipped + b.skipped, 1);
    assert_eq!(a.webhooks_delivered + b.webhooks_delivered, 1);
    let webhooks = h.webhooks();
    assert_eq!(webhooks.len(), 1);
    assert_eq!(webhooks[0].tax_id.as_deref(), Some("12345678900"));
    let stored = h.store.row("tx1");
    assert_eq!(stored.status, TransactionStatus::Completed);
    assert_eq!(stored.tax_id.as_deref(), Some("12345678900"));
}

#[tokio::test]
async fn test_no_candidates_is_a_no_op_pass() {
    let h = Harness::new();

    let report = h.reconciler.run_pass().await.unwrap();

    assert_eq!(report, PassReport::default());
    assert!(h.journal.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_candidate_load_failure_fails_the_pass() {
    let h = Harness::new();
    h.store.seed("tx1", 5, None, true);
    *h.store.failing_list.lock().unwrap() = true;

    assert!(h.reconciler.run_pass().await.is_err());
    assert!(h.journal.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_spawned_reconciler_polls_until_shutdown() {
    let h = Harness::new();
    h.store.seed("tx1", 5, None, false);
    h.provider.status("tx1", TransactionStatus::Active);
    let journal = h.journal.clone();

    let handle = Arc::new(h.reconciler).spawn();
    // first tick fires immediately, then every 30 seconds
    tokio::time::sleep(Duration::from_secs(65)).await;
    handle.shutdown().await;

    let queries = journal
        .lock()
        .unwrap()
        .iter()
        .filter(|call| matches!(call, Call::GetCharge(_)))
        .count();
    assert_eq!(queries, 3);

    tokio::time::sleep(Duration::from_secs(120)).await;
    let after = journal
        .lock()
        .unwrap()
        .iter()
        .filter(|call| matches!(call, Call::GetCharge(_)))
        .count();
    assert_eq!(after, 3);
}

#[tokio::test]
async fn test_pass_over_sql_store_completes_rows_without_optional_fields() {
    let journal: Journal = Arc::default();
    let provider = Arc::new(FakeProvider {
        journal: journal.clone(),
        ..FakeProvider::default()
    });
    let notifier = Arc::new(FakeNotifier {
        journal: journal.clone(),
        ..FakeNotifier::default()
    });
    let store = Arc::new(SqlTransactionStore::new(
        DbClient::from_url("sqlite::memory:").await.unwrap(),
    ));
    store.init_schema().await.unwrap();
    for (txid, callback_url) in [
        ("paid", Some("https://merchant.example/paid".to_string())),
        ("pending", None),
    ] {
        store
            .insert(NewTransaction {
                txid: txid.to_string(),
                internal_id: format!("order-{}", txid),
                tax_id: None,
                status: TransactionStatus::Active,
                callback_url,
                amount: "10.00".to_string(),
                pix_copy_paste: None,
            })
            .await
            .unwrap();
    }
    provider.status("paid", TransactionStatus::Completed);
    provider.payer("paid", "12345678900");

    // rows are stamped with the wall clock, so the reconciler keeps the system one
    let reconciler = Reconciler::new(
        provider,
        store.clone(),
        notifier,
        ReconcilerSettings::default(),
    );
    let report = reconciler.run_pass().await.unwrap();

    assert_eq!(report.candidates, 2);
    assert_eq!(report.completed, 1);
    assert_eq!(report.unchanged, 1);
    assert_eq!(report.webhooks_delivered, 1);

    let paid = store.find_by_txid("paid").await.unwrap().unwrap();
    assert_eq!(paid.status, TransactionStatus::Completed);
    assert_eq!(paid.tax_id.as_deref(), Some("12345678900"));
    let pending = store.find_by_txid("pending").await.unwrap().unwrap();
    assert_eq!(pending.status, TransactionStatus::Active);
    assert!(pending.tax_id.is_none());

    let second = reconciler.run_pass().await.unwrap();
    assert_eq!(second.candidates, 1);
    assert_eq!(second.webhooks_delivered, 0);
}
