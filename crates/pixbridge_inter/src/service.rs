use chrono::{DateTime, Utc};
use pixbridge_common::{BoxFuture, ChargeState, PixProvider, SettlementRecord};
use std::sync::Arc;

use crate::client::InterClient;
use crate::error::InterError;
use crate::mappers::{charge_to_state, settlement_from_wire};

/// [`PixProvider`] backed by the Inter API.
#[derive(Debug, Clone)]
pub struct InterPixService {
    client: Arc<InterClient>,
}

impl InterPixService {
    pub fn new(client: Arc<InterClient>) -> Self {
        Self { client }
    }
}

impl PixProvider for InterPixService {
    type Error = InterError;

    fn create_charge(&self, txid: &str, amount: &str) -> BoxFuture<'_, ChargeState, Self::Error> {
        let txid = txid.to_string();
        let amount = amount.to_string();
        Box::pin(async move {
            let charge = self.client.create_charge(&txid, &amount).await?;
            charge_to_state(&charge)
        })
    }

    fn get_charge(&self, txid: &str) -> BoxFuture<'_, ChargeState, Self::Error> {
        let txid = txid.to_string();
        Box::pin(async move {
            let charge = self.client.get_charge(&txid).await?;
            charge_to_state(&charge)
        })
    }

    fn get_settlements(
        &self,
        txid: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<SettlementRecord>, Self::Error> {
        let txid = txid.to_string();
        Box::pin(async move {
            let received = self.client.list_received(&txid, from, to).await?;
            received
                .pix
                .into_iter()
                .map(settlement_from_wire)
                .collect()
        })
    }
}
