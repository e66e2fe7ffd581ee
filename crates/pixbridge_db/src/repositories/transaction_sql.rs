//! SQL implementation of the transaction store

use crate::error::DbError;
use crate::repositories::transaction::{
    format_timestamp, transaction_from_row, SELECT_COLUMNS, TRANSACTIONS_SCHEMA,
    TRANSACTIONS_STATUS_INDEX,
};
use crate::DbClient;
use chrono::{DateTime, Utc};
use pixbridge_common::{
    BoxFuture, NewTransaction, StoredTransaction, TransactionStatus, TransactionStore,
};
use tracing::{debug, error, info};
use uuid::Uuid;

/// SQL implementation of [`TransactionStore`]
#[derive(Debug, Clone)]
pub struct SqlTransactionStore {
    db_client: DbClient,
}

impl SqlTransactionStore {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    /// Create the `transactions` table and its index if they don't exist.
    pub async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing transactions schema");
        self.db_client.execute(TRANSACTIONS_SCHEMA).await?;
        self.db_client.execute(TRANSACTIONS_STATUS_INDEX).await?;
        info!("Transactions schema initialized successfully");
        Ok(())
    }

    async fn insert_transaction(
        &self,
        transaction: NewTransaction,
    ) -> Result<StoredTransaction, DbError> {
        debug!(
            "Inserting transaction {} for internal id {}",
            transaction.txid, transaction.internal_id
        );

        let now = format_timestamp(Utc::now());
        let query = r#"
            INSERT INTO transactions
                (id, txid, internal_id, tax_id, status, callback_url, amount,
                 pix_copy_paste, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#;

        sqlx::query(query)
            .bind(Uuid::new_v4().to_string())
            .bind(&transaction.txid)
            .bind(&transaction.internal_id)
            .bind(transaction.tax_id.clone())
            .bind(transaction.status.as_str())
            .bind(transaction.callback_url.clone())
            .bind(&transaction.amount)
            .bind(transaction.pix_copy_paste.clone())
            .bind(&now)
            .bind(&now)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to insert transaction {}: {}", transaction.txid, e);
                DbError::from_query(e)
            })?;

        self.find_transaction(&transaction.txid)
            .await?
            .ok_or_else(|| DbError::QueryError(format!("inserted row {} vanished", transaction.txid)))
    }

    async fn find_transaction(&self, txid: &str) -> Result<Option<StoredTransaction>, DbError> {
        let query = format!("SELECT {} FROM transactions WHERE txid = $1", SELECT_COLUMNS);

        let row = sqlx::query(&query)
            .bind(txid)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to find transaction {}: {}", txid, e);
                DbError::QueryError(e.to_string())
            })?;

        row.as_ref().map(transaction_from_row).transpose()
    }

    async fn list_active(&self, since: DateTime<Utc>) -> Result<Vec<StoredTransaction>, DbError> {
        let query = format!(
            "SELECT {} FROM transactions WHERE status = $1 AND created_at >= $2 \
             ORDER BY created_at DESC",
            SELECT_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(TransactionStatus::Active.as_str())
            .bind(format_timestamp(since))
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to list active transactions: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        rows.iter().map(transaction_from_row).collect()
    }

    async fn transition_status(
        &self,
        txid: &str,
        status: TransactionStatus,
    ) -> Result<bool, DbError> {
        debug!("Updating transaction {} to {}", txid, status);

        // Only ACTIVE rows move; a row already terminal is left untouched.
        let query = r#"
            UPDATE transactions
            SET status = $1, updated_at = $2
            WHERE txid = $3 AND status = $4
        "#;

        let result = sqlx::query(query)
            .bind(status.as_str())
            .bind(format_timestamp(Utc::now()))
            .bind(txid)
            .bind(TransactionStatus::Active.as_str())
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to update status of {}: {}", txid, e);
                DbError::QueryError(e.to_string())
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_tax_id(&self, txid: &str, tax_id: &str) -> Result<(), DbError> {
        debug!("Recording payer tax id for transaction {}", txid);

        // Terminal rows are immutable.
        let query = r#"
            UPDATE transactions
            SET tax_id = $1, updated_at = $2
            WHERE txid = $3 AND status = $4
        "#;

        let result = sqlx::query(query)
            .bind(tax_id)
            .bind(format_timestamp(Utc::now()))
            .bind(txid)
            .bind(TransactionStatus::Active.as_str())
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to update tax id of {}: {}", txid, e);
                DbError::QueryError(e.to_string())
            })?;

        if result.rows_affected() == 0 {
            debug!("Transaction {} is not ACTIVE, tax id left unchanged", txid);
        }
        Ok(())
    }
}

impl TransactionStore for SqlTransactionStore {
    type Error = DbError;

    fn insert(&self, transaction: NewTransaction) -> BoxFuture<'_, StoredTransaction, DbError> {
        Box::pin(self.insert_transaction(transaction))
    }

    fn find_by_txid(&self, txid: &str) -> BoxFuture<'_, Option<StoredTransaction>, DbError> {
        let txid = txid.to_string();
        Box::pin(async move { self.find_transaction(&txid).await })
    }

    fn list_active_since(
        &self,
        since: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<StoredTransaction>, DbError> {
        Box::pin(self.list_active(since))
    }

    fn update_status(&self, txid: &str, status: TransactionStatus) -> BoxFuture<'_, bool, DbError> {
        let txid = txid.to_string();
        Box::pin(async move { self.transition_status(&txid, status).await })
    }

    fn update_tax_id(&self, txid: &str, tax_id: &str) -> BoxFuture<'_, (), DbError> {
        let txid = txid.to_string();
        let tax_id = tax_id.to_string();
        Box::pin(async move { self.set_tax_id(&txid, &tax_id).await })
    }
}
