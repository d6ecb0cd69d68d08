//! Immutable audit records for state-changing operations.
//!
//! The engine only appends; nothing in the core reads these back. External
//! display surfaces consume the log through `entries`/`for_tournament`.

use std::fmt;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bracket::TournamentId;

/// What kind of entity an audit event touched
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Tournament,
    Match,
    PickBan,
    Duel,
    Round,
}

/// The entity an audit event refers to
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: i64,
}

impl EntityRef {
    #[must_use]
    pub const fn new(kind: EntityKind, id: i64) -> Self {
        Self { kind, id }
    }
}

/// One immutable audit record
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AuditEvent {
    pub at: DateTime<Utc>,
    pub tournament_id: TournamentId,
    /// Free-form identity of whoever performed the operation
    pub actor: String,
    /// Operation name, e.g. `report`, `pickban.lock`
    pub action: String,
    pub entity: EntityRef,
    /// Operation-specific context rendered for display
    pub detail: String,
}

impl fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] t{} {} {} {:?}#{}: {}",
            self.at.format("%Y-%m-%d %H:%M:%S"),
            self.tournament_id,
            self.actor,
            self.action,
            self.entity.kind,
            self.entity.id,
            self.detail
        )
    }
}

/// Append-only in-memory audit log
#[derive(Debug, Default)]
pub struct AuditLog {
    events: Mutex<Vec<AuditEvent>>,
}

impl AuditLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &self,
        tournament_id: TournamentId,
        actor: &str,
        action: &str,
        entity: EntityRef,
        detail: String,
    ) {
        let event = AuditEvent {
            at: Utc::now(),
            tournament_id,
            actor: actor.to_string(),
            action: action.to_string(),
            entity,
            detail,
        };
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }

    /// Snapshot of every recorded event
    #[must_use]
    pub fn entries(&self) -> Vec<AuditEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Snapshot of one tournament's events
    #[must_use]
    pub fn for_tournament(&self, tournament_id: TournamentId) -> Vec<AuditEvent> {
        self.entries()
            .into_iter()
            .filter(|e| e.tournament_id == tournament_id)
            .collect()
    }
}
