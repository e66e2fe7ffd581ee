use chrono::{Duration, Utc};
use pixbridge_common::{NewTransaction, TransactionStatus, TransactionStore};
use pixbridge_db::repositories::format_timestamp;
use pixbridge_db::{DbClient, DbError, SqlTransactionStore};

async fn store() -> (DbClient, SqlTransactionStore) {
    let client = DbClient::from_url("sqlite::memory:").await.unwrap();
    let store = SqlTransactionStore::new(client.clone());
    store.init_schema().await.unwrap();
    (client, store)
}

fn new_tx(txid: &str) -> NewTransaction {
    NewTransaction {
        txid: txid.to_string(),
        internal_id: format!("order-{}", txid),
        tax_id: None,
        status: TransactionStatus::Active,
        callback_url: Some("https://merchant.example/hook".to_string()),
        amount: "10.00".to_string(),
        pix_copy_paste: Some("00020126...".to_string()),
    }
}

async fn backdate(client: &DbClient, txid: &str, minutes: i64) {
    sqlx::query("UPDATE transactions SET created_at = $1 WHERE txid = $2")
        .bind(format_timestamp(Utc::now() - Duration::minutes(minutes)))
        .bind(txid)
        .execute(client.pool())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_insert_and_find() {
    let (_client, store) = store().await;

    let inserted = store.insert(new_tx("tx1")).await.unwrap();
    assert_eq!(inserted.txid, "tx1");
    assert_eq!(inserted.status, TransactionStatus::Active);
    assert!(inserted.tax_id.is_none());

    let found = store.find_by_txid("tx1").await.unwrap().unwrap();
    assert_eq!(found, inserted);
    assert!(store.find_by_txid("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_txid_is_rejected() {
    let (_client, store) = store().await;
    store.insert(new_tx("tx1")).await.unwrap();

    let err = store.insert(new_tx("tx1")).await.unwrap_err();
    assert!(matches!(err, DbError::Duplicate(_)));
}

#[tokio::test]
async fn test_list_active_since_filters_and_orders() {
    let (client, store) = store().await;
    for txid in ["old", "mid", "new", "done"] {
        store.insert(new_tx(txid)).await.unwrap();
    }
    backdate(&client, "old", 41).await;
    backdate(&client, "mid", 20).await;
    backdate(&client, "new", 1).await;
    backdate(&client, "done", 5).await;
    store
        .update_status("done", TransactionStatus::Completed)
        .await
        .unwrap();

    let since = Utc::now() - Duration::minutes(40);
    let active = store.list_active_since(since).await.unwrap();
    let txids: Vec<_> = active.iter().map(|t| t.txid.as_str()).collect();

    assert_eq!(txids, vec!["new", "mid"]);
}

#[tokio::test]
async fn test_update_status_only_moves_active_rows() {
    let (_client, store) = store().await;
    store.insert(new_tx("tx1")).await.unwrap();

    assert!(store
        .update_status("tx1", TransactionStatus::Completed)
        .await
        .unwrap());
    // already terminal, second transition is a no-op
    assert!(!store
        .update_status("tx1", TransactionStatus::RemovedByPsp)
        .await
        .unwrap());
    assert!(!store
        .update_status("missing", TransactionStatus::Completed)
        .await
        .unwrap());

    let found = store.find_by_txid("tx1").await.unwrap().unwrap();
    assert_eq!(found.status, TransactionStatus::Completed);
}

#[tokio::test]
async fn test_update_tax_id() {
    let (_client, store) = store().await;
    store.insert(new_tx("tx1")).await.unwrap();

    store.update_tax_id("tx1", "12345678900").await.unwrap();

    let found = store.find_by_txid("tx1").await.unwrap().unwrap();
    assert_eq!(found.tax_id.as_deref(), Some("12345678900"));
    assert_eq!(found.status, TransactionStatus::Active);
}

#[tokio::test]
async fn test_nullable_columns_read_back_as_none() {
    let (_client, store) = store().await;
    let mut bare = new_tx("tx1");
    bare.callback_url = None;
    bare.pix_copy_paste = None;
    store.insert(bare).await.unwrap();

    let found = store.find_by_txid("tx1").await.unwrap().unwrap();
    assert!(found.tax_id.is_none());
    assert!(found.callback_url.is_none());
    assert!(found.pix_copy_paste.is_none());

    let active = store
        .list_active_since(Utc::now() - Duration::minutes(40))
        .await
        .unwrap();
    assert_eq!(active.len(), 1);
}

#[tokio::test]
async fn test_update_tax_id_leaves_terminal_rows_untouched() {
    let (_client, store) = store().await;
    let mut tx = new_tx("tx1");
    tx.tax_id = Some("11111111111".to_string());
    store.insert(tx).await.unwrap();
    assert!(store
        .update_status("tx1", TransactionStatus::Completed)
        .await
        .unwrap());

    store.update_tax_id("tx1", "99999999999").await.unwrap();

    let found = store.find_by_txid("tx1").await.unwrap().unwrap();
    assert_eq!(found.tax_id.as_deref(), Some("11111111111"));
    assert_eq!(found.status, TransactionStatus::Completed);
}
