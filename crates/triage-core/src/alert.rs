use crate::error::{Result, TriageError};
use crate::types::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use uuid::Uuid;

pub const DEFAULT_ACTIVITY_CAPACITY: usize = 5;
pub const DEFAULT_ALERT_CAPACITY: usize = 20;

// ---------------------------------------------------------------------------
// BoundedLog
// ---------------------------------------------------------------------------

/// Most-recent-first list that drops its oldest entries past `capacity`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundedLog<T> {
    capacity: usize,
    entries: VecDeque<T>,
}

impl<T> BoundedLog<T> {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, entry: T) {
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
    }

    pub fn latest(&self) -> Option<&T> {
        self.entries.front()
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

// ---------------------------------------------------------------------------
// ActivityEntry
// ---------------------------------------------------------------------------

/// One line in the scoring-engine activity feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

impl ActivityEntry {
    pub fn new(timestamp: DateTime<Utc>, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// AlertEvent
// ---------------------------------------------------------------------------

/// A notification addressed to a care-team role. Immutable once created;
/// acknowledgement is tracked by [`AlertLog`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub id: Uuid,
    pub role: Role,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl AlertEvent {
    /// Build the standard pager message for `role`.
    pub fn for_role(role: Role, timestamp: DateTime<Utc>) -> Self {
        let (title, message) = template(role);
        Self {
            id: Uuid::new_v4(),
            role,
            title: title.to_string(),
            message: message.to_string(),
            timestamp,
        }
    }
}

/// `(title, message)` sent to each role.
pub fn template(role: Role) -> (&'static str, &'static str) {
    match role {
        Role::Doctor => (
            "Dr. Kumar - Emergency",
            "Critical patient incoming. Trauma ICU needed.",
        ),
        Role::Nurse => (
            "Head Nurse - Alert",
            "Please prepare ICU bed #12 immediately.",
        ),
        Role::Admin => (
            "System Administrator",
            "Network status updated. All systems operational.",
        ),
    }
}

// ---------------------------------------------------------------------------
// AlertLog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertLog {
    entries: BoundedLog<AlertEvent>,
    acknowledged: HashSet<Uuid>,
}

impl Default for AlertLog {
    fn default() -> Self {
        Self::new(DEFAULT_ALERT_CAPACITY)
    }
}

impl AlertLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: BoundedLog::new(capacity),
            acknowledged: HashSet::new(),
        }
    }

    pub fn push(&mut self, event: AlertEvent) {
        self.entries.push(event);
        // forget acknowledgements for alerts that fell off the end
        let live: HashSet<Uuid> = self.entries.iter().map(|e| e.id).collect();
        self.acknowledged.retain(|id| live.contains(id));
    }

    pub fn acknowledge(&mut self, id: Uuid) -> Result<()> {
        if !self.entries.iter().any(|e| e.id == id) {
            return Err(TriageError::AlertNotFound(id.to_string()));
        }
        self.acknowledged.insert(id);
        Ok(())
    }

    pub fn is_acknowledged(&self, id: Uuid) -> bool {
        self.acknowledged.contains(&id)
    }

    pub fn unacknowledged(&self) -> impl Iterator<Item = &AlertEvent> {
        self.entries
            .iter()
            .filter(move |e| !self.acknowledged.contains(&e.id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &AlertEvent> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count_for(&self, role: Role) -> usize {
        self.entries.iter().filter(|e| e.role == role).count()
    }
}

// ---------------------------------------------------------------------------
// NotificationSink
// ---------------------------------------------------------------------------

/// Where alerts, activity lines and transient notices end up. The delivery
/// mechanism is up to the implementor.
pub trait NotificationSink {
    fn alert(&mut self, event: &AlertEvent);

    fn log(&mut self, entry: &ActivityEntry);

    /// Transient banner such as "Bed Reserved". Ignored by default.
    fn notice(&mut self, _title: &str, _message: &str) {}
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn alert(&mut self, _event: &AlertEvent) {}

    fn log(&mut self, _entry: &ActivityEntry) {}
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn ts() -> DateTime<Utc> {
        "2026-03-01T08:00:00Z".parse().unwrap()
    }

    #[test]
    fn bounded_log_keeps_newest_first() {
        let mut log = BoundedLog::new(3);
        for i in 1..=5 {
            log.push(i);
        }
        let items: Vec<i32> = log.iter().copied().collect();
        assert_eq!(items, vec![5, 4, 3]);
        assert_eq!(log.latest(), Some(&5));
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn zero_capacity_keeps_one_entry() {
        let mut log = BoundedLog::new(0);
        log.push("a");
        log.push("b");
        assert_eq!(log.capacity(), 1);
        assert_eq!(log.iter().collect::<Vec<_>>(), vec![&"b"]);
    }

    #[test]
    fn alert_uses_role_template() {
        let e = AlertEvent::for_role(Role::Nurse, ts());
        assert_eq!(e.title, "Head Nurse - Alert");
        assert_eq!(e.message, "Please prepare ICU bed #12 immediately.");
        assert_eq!(e.role, Role::Nurse);
    }

    #[test]
    fn acknowledge_known_alert() {
        let mut log = AlertLog::new(5);
        let e = AlertEvent::for_role(Role::Doctor, ts());
        let id = e.id;
        log.push(e);
        log.push(AlertEvent::for_role(Role::Nurse, ts()));

        log.acknowledge(id).unwrap();
        assert!(log.is_acknowledged(id));
        assert_eq!(log.unacknowledged().count(), 1);
        assert!(matches!(
            log.acknowledge(Uuid::new_v4()),
            Err(TriageError::AlertNotFound(_))
        ));
    }

    #[test]
    fn evicted_alerts_drop_acknowledgement() {
        let mut log = AlertLog::new(1);
        let first = AlertEvent::for_role(Role::Doctor, ts());
        let first_id = first.id;
        log.push(first);
        log.acknowledge(first_id).unwrap();
        log.push(AlertEvent::for_role(Role::Nurse, ts()));
        assert!(!log.is_acknowledged(first_id));
        assert_eq!(log.count_for(Role::Doctor), 0);
        assert_eq!(log.count_for(Role::Nurse), 1);
    }
}
