//! Audit recorder backends.

use std::sync::{Arc, Mutex};

use super::{AuditError, AuditEvent, AuditRecorder};

/// Emits each event as a structured `info!` on target `well_registry::audit`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditRecorder;

impl AuditRecorder for TracingAuditRecorder {
    fn record(&self, event: &AuditEvent) -> Result<(), AuditError> {
        tracing::info!(
            target: "well_registry::audit",
            who = %event.who,
            when = %event.when,
            well_tag_number = event.well_tag_number,
            filing_number = ?event.filing_number,
            activity = %event.activity_type,
            changed = %event.changed_fields(),
            "Well record changed"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "tracing"
    }
}

/// Discards events. Used when auditing is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAuditRecorder;

impl AuditRecorder for NullAuditRecorder {
    fn record(&self, _event: &AuditEvent) -> Result<(), AuditError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "null"
    }
}

/// Keeps events in memory, for tests and embedding callers.
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl AuditRecorder for MemoryAuditLog {
    fn record(&self, event: &AuditEvent) -> Result<(), AuditError> {
        self.events
            .lock()
            .map_err(|e| AuditError::Storage(e.to_string()))?
            .push(event.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Durable audit log in the `audit` tree of the record store's sled database.
///
/// Keys are well tag (big-endian) followed by a database-generated id, so a
/// prefix scan returns one well's events in recording order.
#[derive(Clone)]
pub struct StoreAuditLog {
    db: Arc<sled::Db>,
    tree: sled::Tree,
}

impl StoreAuditLog {
    pub fn open(db: Arc<sled::Db>) -> Result<Self, AuditError> {
        let tree = db.open_tree("audit")?;
        Ok(Self { db, tree })
    }

    pub fn events_for(&self, well_tag_number: u64) -> Result<Vec<AuditEvent>, AuditError> {
        let mut events = Vec::new();
        for item in self.tree.scan_prefix(well_tag_number.to_be_bytes()) {
            let (_key, value) = item?;
            match serde_json::from_slice::<AuditEvent>(&value) {
                Ok(event) => events.push(event),
                Err(e) => tracing::warn!(well_tag_number, "Failed to deserialize audit event: {}", e),
            }
        }
        Ok(events)
    }
}

impl AuditRecorder for StoreAuditLog {
    fn record(&self, event: &AuditEvent) -> Result<(), AuditError> {
        let id = self.db.generate_id()?;
        let mut key = [0u8; 16];
        key[..8].copy_from_slice(&event.well_tag_number.to_be_bytes());
        key[8..].copy_from_slice(&id.to_be_bytes());

        self.tree.insert(key, serde_json::to_vec(event)?)?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "store"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ActivityType;
    use chrono::Utc;

    fn event(tag: u64, who: &str) -> AuditEvent {
        AuditEvent {
            who: who.to_string(),
            when: Utc::now(),
            well_tag_number: tag,
            filing_number: Some(1),
            activity_type: ActivityType::Alteration,
            field_diffs: Vec::new(),
        }
    }

    #[test]
    fn test_memory_log_keeps_order() {
        let log = MemoryAuditLog::new();
        log.record(&event(1, "a")).unwrap();
        log.record(&event(1, "b")).unwrap();
        let who: Vec<String> = log.events().into_iter().map(|e| e.who).collect();
        assert_eq!(who, vec!["a", "b"]);
    }

    #[test]
    fn test_store_log_groups_by_well() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db = Arc::new(sled::open(temp_dir.path()).unwrap());
        let log = StoreAuditLog::open(db).unwrap();

        log.record(&event(7, "first")).unwrap();
        log.record(&event(8, "other well")).unwrap();
        log.record(&event(7, "second")).unwrap();

        let who: Vec<String> = log.events_for(7).unwrap().into_iter().map(|e| e.who).collect();
        assert_eq!(who, vec!["first", "second"]);
    }
}
