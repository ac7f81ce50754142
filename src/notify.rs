// src/notify.rs

//! Push notifications plus the notification and audit side channels.
//!
//! Pushes go to an external gateway over HTTP and are best-effort: a failed
//! delivery is logged and never fails the request that triggered it. The same
//! holds for the side-channel rows, the primary write has already succeeded
//! by the time they are appended.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::dates::now_stamp;
use crate::models::rows;
use crate::models::{AuditEntry, FieldChange, NotificationRecord, Settings};
use crate::store::{sheets, SheetStore};

#[derive(Debug, Clone, Serialize)]
pub struct PushPayload {
    pub title: String,
    pub body: String,
    /// Free-form extras for the client, e.g. `{"employeeId": "..."}`.
    pub data: serde_json::Value,
}

impl PushPayload {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        PushPayload {
            title: title.into(),
            body: body.into(),
            data: serde_json::Value::Null,
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `payload` to one subscription token, swallowing failures.
    async fn notify(&self, token: &str, payload: &PushPayload);
}

/// Posts `{ token, payload }` to the configured push gateway.
pub struct HttpNotifier {
    client: reqwest::Client,
    gateway_url: String,
}

impl HttpNotifier {
    pub fn new(gateway_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        HttpNotifier {
            client,
            gateway_url,
        }
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn notify(&self, token: &str, payload: &PushPayload) {
        let body = serde_json::json!({
            "token": token,
            "payload": payload,
        });
        match self.client.post(&self.gateway_url).json(&body).send().await {
            Ok(resp) if resp.status().is_success() => {
                debug!(title = %payload.title, "push delivered");
            }
            Ok(resp) => {
                warn!(status = %resp.status(), "push gateway rejected the notification");
            }
            Err(err) => {
                warn!(error = %err, "push gateway unreachable");
            }
        }
    }
}

/// Stand-in when no gateway is configured; pushes become debug logs.
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, _token: &str, payload: &PushPayload) {
        debug!(title = %payload.title, "push skipped, no gateway configured");
    }
}

/// Push to one coordinator, if they have a subscription on file.
pub async fn push_to_coordinator(
    notifier: &dyn Notifier,
    settings: &Settings,
    uid: &str,
    payload: &PushPayload,
) {
    let token = settings
        .coordinator(uid)
        .and_then(|c| c.push_subscription.as_deref());
    if let Some(token) = token {
        notifier.notify(token, payload).await;
    }
}

/// Push to every coordinator with a subscription on file.
pub async fn push_to_all_subscribed(
    notifier: &dyn Notifier,
    settings: &Settings,
    payload: &PushPayload,
) {
    for c in &settings.coordinators {
        if let Some(token) = c.push_subscription.as_deref() {
            notifier.notify(token, payload).await;
        }
    }
}

/// Append a row to the Powiadomienia sheet.
pub async fn record_notification(
    store: &dyn SheetStore,
    recipient_id: &str,
    message: String,
    changes: Vec<FieldChange>,
) {
    let record = NotificationRecord {
        id: Uuid::new_v4().to_string(),
        message,
        changes,
        recipient_id: recipient_id.to_string(),
        created_at: now_stamp(),
    };
    if let Err(err) = store
        .add_row(sheets::NOTIFICATIONS, rows::notification_to_row(&record))
        .await
    {
        warn!(error = %err, "failed to record notification");
    }
}

/// Append a row to the AuditLog sheet.
pub async fn record_audit(
    store: &dyn SheetStore,
    actor_name: &str,
    action: &str,
    entity_id: &str,
    details: String,
) {
    let entry = AuditEntry {
        id: Uuid::new_v4().to_string(),
        actor_name: actor_name.to_string(),
        action: action.to_string(),
        entity_id: entity_id.to_string(),
        details,
        created_at: now_stamp(),
    };
    if let Err(err) = store.add_row(sheets::AUDIT_LOG, rows::audit_to_row(&entry)).await {
        warn!(error = %err, "failed to record audit entry");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinator;
    use crate::store::JsonStore;
    use std::sync::Mutex;

    struct CapturingNotifier {
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Notifier for CapturingNotifier {
        async fn notify(&self, token: &str, _payload: &PushPayload) {
            self.sent.lock().unwrap().push(token.to_string());
        }
    }

    fn coordinator(uid: &str, sub: Option<&str>) -> Coordinator {
        Coordinator {
            uid: uid.to_string(),
            name: uid.to_string(),
            password: String::new(),
            is_admin: false,
            departments: Vec::new(),
            push_subscription: sub.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn only_subscribed_coordinators_receive_pushes() {
        let notifier = CapturingNotifier { sent: Mutex::new(Vec::new()) };
        let settings = Settings {
            coordinators: vec![
                coordinator("c1", Some("tok-1")),
                coordinator("c2", None),
                coordinator("c3", Some("tok-3")),
            ],
            ..Settings::default()
        };
        let payload = PushPayload::new("t", "b");

        push_to_all_subscribed(&notifier, &settings, &payload).await;
        assert_eq!(*notifier.sent.lock().unwrap(), vec!["tok-1", "tok-3"]);

        notifier.sent.lock().unwrap().clear();
        push_to_coordinator(&notifier, &settings, "c2", &payload).await;
        push_to_coordinator(&notifier, &settings, "missing", &payload).await;
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn notification_rows_carry_their_changes() {
        let store = JsonStore::in_memory();
        record_notification(
            &store,
            "c1",
            "Zaktualizowano mieszkańca".into(),
            vec![FieldChange {
                field: "address".into(),
                from: "Polna 5".into(),
                to: "Leśna 2".into(),
            }],
        )
        .await;

        let rows = store.get_rows(sheets::NOTIFICATIONS).await.unwrap();
        assert_eq!(rows.len(), 1);
        let rec = rows::notification_from_row(&rows[0]);
        assert_eq!(rec.recipient_id, "c1");
        assert_eq!(rec.changes.len(), 1);
        assert_eq!(rec.changes[0].to, "Leśna 2");
    }
}
