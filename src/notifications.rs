//! Append-only notification log with a turn-based retention window.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Success,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Success => "success",
            Severity::Error => "error",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(u64);

impl NotificationId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub severity: Severity,
    pub turn: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationLog {
    entries: Vec<Notification>,
    next_id: u64,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>, severity: Severity, turn: u32) -> NotificationId {
        let id = NotificationId(self.next_id);
        self.next_id += 1;
        self.entries.push(Notification {
            id,
            message: message.into(),
            severity,
            turn,
        });
        id
    }

    pub fn dismiss(&mut self, id: NotificationId) {
        self.entries.retain(|entry| entry.id != id);
    }

    /// Drops every entry created `window` or more turns before `current_turn`.
    pub fn prune(&mut self, current_turn: u32, window: u32) {
        self.entries
            .retain(|entry| current_turn.saturating_sub(entry.turn) < window);
    }

    pub fn entries(&self) -> &[Notification] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&Notification> {
        self.entries.last()
    }

    /// Id the next pushed entry will receive.
    pub fn next_id(&self) -> NotificationId {
        NotificationId(self.next_id)
    }

    /// Entries issued at or after `mark`, in issue order.
    pub fn issued_since(&self, mark: NotificationId) -> impl Iterator<Item = &Notification> + '_ {
        self.entries.iter().filter(move |entry| entry.id >= mark)
    }
}
