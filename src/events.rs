//! Order lifecycle events, published to NATS when configured.

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::order::PaymentMethod;

const SUBJECT: &str = "eshop.orders";

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OrderEvent {
    #[serde(rename_all = "camelCase")]
    Created {
        order_id: Uuid,
        user: Uuid,
        total: Decimal,
        payment_method: PaymentMethod,
    },
    #[serde(rename_all = "camelCase")]
    Paid { order_id: Uuid },
    #[serde(rename_all = "camelCase")]
    Delivered { order_id: Uuid },
}

#[derive(Clone, Default)]
pub struct EventBus {
    nats: Option<async_nats::Client>,
}

impl EventBus {
    pub fn new(nats: Option<async_nats::Client>) -> Self {
        Self { nats }
    }

    /// Publishing is best-effort: a broker failure is logged, never surfaced
    /// to the request that produced the event.
    pub async fn publish(&self, event: OrderEvent) {
        let Some(client) = &self.nats else {
            tracing::debug!(?event, "no event broker configured, dropping event");
            return;
        };
        let payload = match serde_json::to_vec(&event) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize order event");
                return;
            }
        };
        if let Err(e) = client.publish(SUBJECT.to_string(), payload.into()).await {
            tracing::warn!(error = %e, "failed to publish order event");
        }
    }
}
