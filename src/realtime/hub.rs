//! Per-user notification delivery hub
//!
//! Thread-safe registry of active notification stream sessions, keyed by
//! user id. A user may hold several simultaneous sessions (multiple tabs or
//! devices); a publish reaches all of them. Delivery is best-effort and
//! at-most-once per session: users with no active session are skipped.

use bson::oid::ObjectId;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tokio::sync::mpsc;
use tracing::debug;

/// One registered stream session
struct Session {
    id: u64,
    tx: mpsc::UnboundedSender<String>,
}

/// Per-user addressable broadcast hub
pub struct NotificationHub {
    rooms: DashMap<ObjectId, Vec<Session>>,
    next_session: AtomicU64,
    count: AtomicUsize,
    max_connections: usize,
}

impl NotificationHub {
    pub fn new(max_connections: usize) -> Self {
        Self {
            rooms: DashMap::new(),
            next_session: AtomicU64::new(1),
            count: AtomicUsize::new(0),
            max_connections,
        }
    }

    /// Check if the hub is at capacity
    pub fn is_at_capacity(&self) -> bool {
        self.count.load(Ordering::Relaxed) >= self.max_connections
    }

    /// Current session count across all users
    pub fn connection_count(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }

    /// Whether a user has at least one active session
    pub fn is_connected(&self, user: &ObjectId) -> bool {
        self.rooms.get(user).map(|s| !s.is_empty()).unwrap_or(false)
    }

    /// Register a session for a user.
    ///
    /// Returns the session id and the receiving end the connection task
    /// drains into its WebSocket sink.
    pub fn join(&self, user: ObjectId) -> (u64, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.next_session.fetch_add(1, Ordering::Relaxed);

        self.rooms.entry(user).or_default().push(Session { id, tx });
        self.count.fetch_add(1, Ordering::Relaxed);

        debug!(user = %user, session = id, count = self.connection_count(), "stream joined");
        (id, rx)
    }

    /// Remove a session for a user
    pub fn leave(&self, user: &ObjectId, session_id: u64) {
        let mut removed = false;

        if let Some(mut sessions) = self.rooms.get_mut(user) {
            let before = sessions.len();
            sessions.retain(|s| s.id != session_id);
            removed = sessions.len() < before;
        }
        self.rooms.remove_if(user, |_, sessions| sessions.is_empty());

        if removed {
            self.count.fetch_sub(1, Ordering::Relaxed);
            debug!(user = %user, session = session_id, "stream left");
        }
    }

    /// Publish an event to every active session of a user.
    ///
    /// Fire-and-forget: sends never block, a closed session is dropped from
    /// the room, and a user with no sessions is a no-op. Returns the number
    /// of sessions reached.
    pub fn publish(&self, user: &ObjectId, event: &str, payload: Value) -> usize {
        let Some(mut sessions) = self.rooms.get_mut(user) else {
            return 0;
        };

        let message = serde_json::json!({ "event": event, "payload": payload }).to_string();

        let before = sessions.len();
        sessions.retain(|s| s.tx.send(message.clone()).is_ok());
        let delivered = sessions.len();

        let dropped = before - delivered;
        if dropped > 0 {
            self.count.fetch_sub(dropped, Ordering::Relaxed);
        }

        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hub() -> NotificationHub {
        NotificationHub::new(16)
    }

    #[tokio::test]
    async fn publish_reaches_all_sessions_of_one_user() {
        let hub = hub();
        let user = ObjectId::new();

        let (_s1, mut rx1) = hub.join(user);
        let (_s2, mut rx2) = hub.join(user);
        assert_eq!(hub.connection_count(), 2);

        let reached = hub.publish(&user, "notification", serde_json::json!({"n": 1}));
        assert_eq!(reached, 2);

        let m1 = rx1.recv().await.unwrap();
        let m2 = rx2.recv().await.unwrap();
        assert_eq!(m1, m2);

        let parsed: Value = serde_json::from_str(&m1).unwrap();
        assert_eq!(parsed["event"], "notification");
        assert_eq!(parsed["payload"]["n"], 1);
    }

    #[tokio::test]
    async fn publish_to_disconnected_user_is_a_noop() {
        let hub = hub();
        let user = ObjectId::new();
        assert_eq!(hub.publish(&user, "notification", Value::Null), 0);
        assert!(!hub.is_connected(&user));
    }

    #[tokio::test]
    async fn publish_does_not_cross_users() {
        let hub = hub();
        let alice = ObjectId::new();
        let bob = ObjectId::new();

        let (_sa, mut rx_a) = hub.join(alice);
        let (_sb, mut rx_b) = hub.join(bob);

        hub.publish(&alice, "notification", serde_json::json!({"for": "alice"}));

        assert!(rx_a.recv().await.is_some());
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn leave_removes_only_that_session() {
        let hub = hub();
        let user = ObjectId::new();

        let (s1, rx1) = hub.join(user);
        let (_s2, mut rx2) = hub.join(user);

        drop(rx1);
        hub.leave(&user, s1);
        assert_eq!(hub.connection_count(), 1);
        assert!(hub.is_connected(&user));

        hub.publish(&user, "notification", Value::Null);
        assert!(rx2.recv().await.is_some());
    }

    #[tokio::test]
    async fn closed_sessions_are_pruned_on_publish() {
        let hub = hub();
        let user = ObjectId::new();

        let (_s1, rx) = hub.join(user);
        drop(rx);

        assert_eq!(hub.publish(&user, "notification", Value::Null), 0);
        assert_eq!(hub.connection_count(), 0);
        assert!(!hub.is_connected(&user));
    }

    #[test]
    fn capacity_tracking() {
        let hub = NotificationHub::new(1);
        assert!(!hub.is_at_capacity());
        let _keep = hub.join(ObjectId::new());
        assert!(hub.is_at_capacity());
    }
}
