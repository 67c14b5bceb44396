//! Supabase realtime client - Phoenix channels over tokio-tungstenite.
//!
//! Minimal implementation: join one channel with a `postgres_changes`
//! INSERT filter, keep it alive with heartbeats, forward inserts.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::sync::{broadcast, mpsc};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

use crate::core::paths::{phoenix, supabase as paths};
use crate::error::{EcoError, EcoResult};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(25);

/// Which inserts to receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeFilter {
    pub schema: String,
    pub table: String,
    /// PostgREST-style filter, e.g. `wallet_id=eq.<id>`.
    pub filter: Option<String>,
}

impl ChangeFilter {
    pub fn inserts(table: impl Into<String>) -> Self {
        Self { schema: paths::SCHEMA.into(), table: table.into(), filter: None }
    }

    pub fn eq(mut self, column: &str, value: &str) -> Self {
        self.filter = Some(format!("{column}=eq.{value}"));
        self
    }

    pub fn topic(&self) -> String { format!("realtime:{}", self.table) }
}

/// Events forwarded to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum RealtimeEvent {
    Subscribed,
    Insert { table: String, record: Value },
    Error(String),
    Closed,
}

pub struct RealtimeClient {
    url: String,
    access_token: Option<String>,
}

impl RealtimeClient {
    pub fn new(supabase_url: &str, anon_key: &str) -> Self {
        Self { url: websocket_url(supabase_url, anon_key), access_token: None }
    }

    pub fn with_access_token(mut self, token: Option<String>) -> Self {
        self.access_token = token;
        self
    }

    pub fn url(&self) -> &str { &self.url }

    /// Connect, join the channel, and spawn the socket task. The returned
    /// receiver ends after `Closed` (server close or shutdown).
    pub async fn subscribe(
        &self,
        filter: ChangeFilter,
        mut shutdown: broadcast::Receiver<()>,
    ) -> EcoResult<mpsc::Receiver<RealtimeEvent>> {
        let (ws, _) = connect_async(self.url.as_str())
            .await
            .map_err(|e| EcoError::Realtime(e.to_string()))?;
        let (mut write, mut read) = ws.split();

        let topic = filter.topic();
        let join = join_message(&filter, self.access_token.as_deref(), 1);
        write
            .send(Message::Text(join.to_string()))
            .await
            .map_err(|e| EcoError::Realtime(e.to_string()))?;
        info!(%topic, filter = filter.filter.as_deref().unwrap_or("-"), "realtime join sent");

        let (tx, rx) = mpsc::channel::<RealtimeEvent>(64);
        tokio::spawn(async move {
            let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
            heartbeat.tick().await;
            let mut next_ref: u64 = 2;

            loop {
                tokio::select! {
                    _ = shutdown.recv() => {
                        let leave = control_message(&topic, phoenix::LEAVE, next_ref);
                        let _ = write.send(Message::Text(leave.to_string())).await;
                        let _ = write.close().await;
                        break;
                    }
                    _ = heartbeat.tick() => {
                        let beat = control_message(phoenix::HEARTBEAT_TOPIC, phoenix::HEARTBEAT, next_ref);
                        next_ref += 1;
                        if write.send(Message::Text(beat.to_string())).await.is_err() {
                            warn!("realtime heartbeat failed");
                            break;
                        }
                    }
                    msg = read.next() => match msg {
                        Some(Ok(Message::Text(txt))) => {
                            if let Some(event) = parse_message(&txt, &topic) {
                                let closed = event == RealtimeEvent::Closed;
                                if tx.send(event).await.is_err() || closed {
                                    break;
                                }
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            let _ = tx.send(RealtimeEvent::Error(e.to_string())).await;
                            break;
                        }
                    }
                }
            }

            let _ = tx.send(RealtimeEvent::Closed).await;
            debug!("realtime socket task finished");
        });

        Ok(rx)
    }
}

/// `https://x.supabase.co` → `wss://x.supabase.co/realtime/v1/websocket?apikey=..&vsn=1.0.0`
pub fn websocket_url(supabase_url: &str, anon_key: &str) -> String {
    let base = supabase_url.trim_end_matches('/');
    let ws = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        base.to_string()
    };
    format!("{ws}{}?apikey={anon_key}&vsn=1.0.0", paths::REALTIME)
}

/// Channel join carrying the `postgres_changes` subscription.
pub fn join_message(filter: &ChangeFilter, access_token: Option<&str>, msg_ref: u64) -> Value {
    let mut change = json!({
        "event": "INSERT",
        "schema": filter.schema,
        "table": filter.table,
    });
    if let Some(f) = &filter.filter {
        change["filter"] = json!(f);
    }

    let mut payload = json!({
        "config": {
            "broadcast": { "self": false },
            "presence": { "key": "" },
            "postgres_changes": [change],
        }
    });
    if let Some(token) = access_token {
        payload["access_token"] = json!(token);
    }

    json!({
        "topic": filter.topic(),
        "event": phoenix::JOIN,
        "payload": payload,
        "ref": msg_ref.to_string(),
    })
}

pub fn control_message(topic: &str, event: &str, msg_ref: u64) -> Value {
    json!({ "topic": topic, "event": event, "payload": {}, "ref": msg_ref.to_string() })
}

/// Parse one server frame for `topic`. Frames for other topics and
/// heartbeat replies yield `None`.
pub fn parse_message(msg: &str, topic: &str) -> Option<RealtimeEvent> {
    let frame: Value = serde_json::from_str(msg).ok()?;
    if frame.get("topic")?.as_str()? != topic {
        return None;
    }
    let payload = frame.get("payload").cloned().unwrap_or(Value::Null);

    match frame.get("event")?.as_str()? {
        phoenix::REPLY => {
            let status = payload.get("status").and_then(|s| s.as_str()).unwrap_or_default();
            if status == "ok" {
                Some(RealtimeEvent::Subscribed)
            } else {
                let reason = payload
                    .pointer("/response/reason")
                    .and_then(|r| r.as_str())
                    .unwrap_or(status);
                Some(RealtimeEvent::Error(reason.to_string()))
            }
        }
        phoenix::POSTGRES_CHANGES => {
            let data = payload.get("data")?;
            if data.get("type")?.as_str()? != "INSERT" {
                return None;
            }
            Some(RealtimeEvent::Insert {
                table: data.get("table").and_then(|t| t.as_str()).unwrap_or_default().to_string(),
                record: data.get("record").cloned().unwrap_or(Value::Null),
            })
        }
        phoenix::ERROR => Some(RealtimeEvent::Error("channel error".into())),
        phoenix::CLOSE => Some(RealtimeEvent::Closed),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOPIC: &str = "realtime:eco_transactions";

    #[test]
    fn websocket_url_swaps_scheme() {
        assert_eq!(
            websocket_url("https://abc.supabase.co/", "key"),
            "wss://abc.supabase.co/realtime/v1/websocket?apikey=key&vsn=1.0.0"
        );
        assert!(websocket_url("http://127.0.0.1:54321", "k").starts_with("ws://127.0.0.1:54321/"));
    }

    #[test]
    fn join_carries_filter_and_token() {
        let filter = ChangeFilter::inserts("eco_transactions").eq("wallet_id", "w-1");
        let msg = join_message(&filter, Some("jwt"), 1);

        assert_eq!(msg["topic"], TOPIC);
        assert_eq!(msg["event"], "phx_join");
        assert_eq!(msg["ref"], "1");
        assert_eq!(msg["payload"]["access_token"], "jwt");
        let change = &msg["payload"]["config"]["postgres_changes"][0];
        assert_eq!(change["event"], "INSERT");
        assert_eq!(change["schema"], "public");
        assert_eq!(change["filter"], "wallet_id=eq.w-1");
    }

    #[test]
    fn parses_insert_and_replies() {
        let insert = json!({
            "topic": TOPIC,
            "event": "postgres_changes",
            "payload": {"data": {"type": "INSERT", "table": "eco_transactions", "record": {"id": "t9"}}, "ids": [1]},
            "ref": null
        })
        .to_string();
        assert_eq!(
            parse_message(&insert, TOPIC),
            Some(RealtimeEvent::Insert { table: "eco_transactions".into(), record: json!({"id": "t9"}) })
        );

        let ok = json!({"topic": TOPIC, "event": "phx_reply", "payload": {"status": "ok", "response": {}}, "ref": "1"}).to_string();
        assert_eq!(parse_message(&ok, TOPIC), Some(RealtimeEvent::Subscribed));

        let denied = json!({"topic": TOPIC, "event": "phx_reply", "payload": {"status": "error", "response": {"reason": "unauthorized"}}, "ref": "1"}).to_string();
        assert_eq!(parse_message(&denied, TOPIC), Some(RealtimeEvent::Error("unauthorized".into())));
    }

    #[test]
    fn ignores_other_topics_and_updates() {
        let beat = json!({"topic": "phoenix", "event": "phx_reply", "payload": {"status": "ok"}, "ref": "2"}).to_string();
        assert_eq!(parse_message(&beat, TOPIC), None);

        let update = json!({"topic": TOPIC, "event": "postgres_changes", "payload": {"data": {"type": "UPDATE"}}}).to_string();
        assert_eq!(parse_message(&update, TOPIC), None);
        assert_eq!(parse_message("not json", TOPIC), None);
    }
}
