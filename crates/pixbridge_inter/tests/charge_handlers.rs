use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use pixbridge_common::{
    BoxFuture, HttpStatusCode, NewTransaction, PixbridgeError, StoredTransaction,
    TransactionStatus, TransactionStore,
};
use pixbridge_config::InterConfig;
use pixbridge_inter::handlers::{create_charge_handler, get_charge_handler};
use pixbridge_inter::models::CreateChargeRequest;
use pixbridge_inter::{InterClient, InterState};
use serde_json::json;
use std::sync::{Arc, Mutex};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, thiserror::Error)]
#[error("memory store failure")]
struct MemoryStoreError;

impl From<MemoryStoreError> for PixbridgeError {
    fn from(err: MemoryStoreError) -> Self {
        PixbridgeError::DatabaseError(err.to_string())
    }
}

#[derive(Default)]
struct MemoryStore {
    rows: Mutex<Vec<StoredTransaction>>,
}

impl TransactionStore for MemoryStore {
    type Error = MemoryStoreError;

    fn insert(&self, tx: NewTransaction) -> BoxFuture<'_, StoredTransaction, MemoryStoreError> {
        Box::pin(async move {
            let now = Utc::now();
            let stored = StoredTransaction {
                id: format!("id-{}", tx.txid),
                txid: tx.txid,
                internal_id: tx.internal_id,
                tax_id: tx.tax_id,
                status: tx.status,
                callback_url: tx.callback_url,
                amount: tx.amount,
                pix_copy_paste: tx.pix_copy_paste,
                created_at: now,
                updated_at: now,
            };
            self.rows.lock().unwrap().push(stored.clone());
            Ok(stored)
        })
    }

    fn find_by_txid(&self, txid: &str) -> BoxFuture<'_, Option<StoredTransaction>, MemoryStoreError> {
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
        _since: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<StoredTransaction>, MemoryStoreError> {
        Box::pin(async move { Ok(Vec::new()) })
    }

    fn update_status(
        &self,
        _txid: &str,
        _status: TransactionStatus,
    ) -> BoxFuture<'_, bool, MemoryStoreError> {
        Box::pin(async move { Ok(false) })
    }

    fn update_tax_id(&self, _txid: &str, _tax_id: &str) -> BoxFuture<'_, (), MemoryStoreError> {
        Box::pin(async move { Ok(()) })
    }
}

fn state(base_url: &str) -> Arc<InterState<MemoryStore>> {
    let config = InterConfig {
        base_url: base_url.to_string(),
        client_id: "client".to_string(),
        client_secret: "secret".to_string(),
        cert_path: None,
        key_path: None,
        pix_key: "chave@example.com".to_string(),
        scope: None,
        token_safety_margin_secs: 300,
        charge_expiration_secs: 3600,
        payer_request: None,
    };
    Arc::new(InterState {
        client: Arc::new(InterClient::new(&config).unwrap()),
        store: Arc::new(MemoryStore::default()),
    })
}

async fn provider() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/v2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "T1",
            "expires_in": 3600
        })))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_create_charge_records_active_transaction() {
    let server = provider().await;
    Mock::given(method("PUT"))
        .and(path_regex(r"^/pix/v2/cob/[0-9a-f]{32}$"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "calendario": {"criacao": "2024-01-05T09:00:00Z", "expiracao": 3600},
            "txid": "0123456789abcdef0123456789abcdef",
            "status": "ATIVA",
            "valor": {"original": "10.50"},
            "chave": "chave@example.com",
            "pixCopiaECola": "00020126..."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let state = state(&server.uri());
    let (status, Json(response)) = create_charge_handler(
        State(state.clone()),
        Json(CreateChargeRequest {
            value: 10.5,
            internal_id: "order-1".to_string(),
            callback_url: Some("https://merchant.example/hook".to_string()),
            tax_id: None,
        }),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(response.status, TransactionStatus::Active);

    let stored = state
        .store
        .find_by_txid(&response.txid)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.internal_id, "order-1");
    assert_eq!(stored.amount, "10.50");
    assert_eq!(stored.status, TransactionStatus::Active);
    assert_eq!(stored.pix_copy_paste.as_deref(), Some("00020126..."));
    assert_eq!(
        stored.callback_url.as_deref(),
        Some("https://merchant.example/hook")
    );
}

#[tokio::test]
async fn test_invalid_amount_never_reaches_provider() {
    let server = provider().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let result = create_charge_handler(
        State(state(&server.uri())),
        Json(CreateChargeRequest {
            value: -1.0,
            internal_id: "order-1".to_string(),
            callback_url: None,
            tax_id: None,
        }),
    )
    .await;

    assert_eq!(result.unwrap_err().status_code(), 400);
}

#[tokio::test]
async fn test_get_unknown_charge_is_not_found() {
    let server = provider().await;
    Mock::given(method("GET"))
        .and(path("/pix/v2/cob/nope"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let result = get_charge_handler(State(state(&server.uri())), Path("nope".to_string())).await;

    assert_eq!(result.unwrap_err().status_code(), 404);
}
