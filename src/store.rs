//! Session records kept for the lifetime of the process.
//!
//! Records are appended when a session finishes and are never changed
//! afterwards. They can be exported to a pretty-printed JSON array and read
//! back for reporting:
//!
//! ```text
//! [
//!   { "id": "…", "workerName": "…", "startedAt": "…", "intervals": [ … ] },
//!   …
//! ]
//! ```

use std::{fs, io, path::Path};

use uuid::Uuid;

use crate::model::SessionRecord;

/// Errors that can occur while looking up, exporting, or importing records.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no session matching '{0}'")]
    NotFound(String),

    #[error(
        "'{reference}' is ambiguous — matches {} sessions: {}",
        .matches.len(),
        .matches.join(", ")
    )]
    Ambiguous {
        reference: String,
        matches: Vec<String>,
    },

    #[error("session already recorded: {0}")]
    AlreadyRecorded(Uuid),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, StoreError>;

/// Append-only collection of finished sessions.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: Vec<SessionRecord>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record. Record ids must be unique.
    pub fn append(&mut self, record: SessionRecord) -> Result<&SessionRecord> {
        if self.records.iter().any(|r| r.id == record.id) {
            return Err(StoreError::AlreadyRecorded(record.id));
        }
        self.records.push(record);
        Ok(&self.records[self.records.len() - 1])
    }

    /// All records in the order they were finished.
    pub fn list(&self) -> &[SessionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Resolves a full UUID, an unambiguous id prefix, or a 1-based position.
    pub fn resolve(&self, reference: &str) -> Result<&SessionRecord> {
        let reference = reference.trim();

        if let Ok(id) = reference.parse::<Uuid>() {
            return self
                .records
                .iter()
                .find(|r| r.id == id)
                .ok_or_else(|| StoreError::NotFound(reference.to_string()));
        }

        if let Ok(position) = reference.parse::<usize>()
            && position >= 1
            && let Some(record) = self.records.get(position - 1)
        {
            return Ok(record);
        }

        let matches: Vec<&SessionRecord> = self
            .records
            .iter()
            .filter(|r| !reference.is_empty() && r.id.to_string().starts_with(reference))
            .collect();

        match matches.as_slice() {
            [] => Err(StoreError::NotFound(reference.to_string())),
            [record] => Ok(record),
            many => Err(StoreError::Ambiguous {
                reference: reference.to_string(),
                matches: many.iter().map(|r| r.short_id()).collect(),
            }),
        }
    }

    /// Writes every record to `path` as a JSON array.
    pub fn export_json(&self, path: &Path) -> Result<()> {
        write_json(path, &self.records)
    }

    /// Reads records previously written by [`RecordStore::export_json`].
    pub fn import_json(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let records: Vec<SessionRecord> = serde_json::from_str(&json)?;
        log::info!("imported {} session records from {}", records.len(), path.display());
        Ok(Self { records })
    }
}

/// Serializes `value` as pretty JSON into `path`, creating parent directories.
pub fn write_json<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::Timestamp;
    use tempfile::TempDir;

    use crate::model::{
        ActivityInterval, Area, ClassificationPath, Sector, Session, SessionHeader,
    };

    fn sample_record(worker: &str) -> SessionRecord {
        let session = Session {
            header: SessionHeader::new(
                "Observador",
                worker,
                "4500123456",
                Sector::Torre,
                Area::Mecanica,
            )
            .unwrap(),
            started_at: Timestamp::from_second(1_800_000_000).unwrap(),
        };
        let interval = ActivityInterval {
            id: Uuid::new_v4(),
            text: "Trocar rolamento".into(),
            classification: ClassificationPath::new(
                "Agrega valor",
                "Execução direta da atividade",
                "",
                "",
            ),
            start_at: Some(session.started_at),
            end_at: Some(Timestamp::from_second(1_800_000_300).unwrap()),
        };
        SessionRecord::freeze(
            &session,
            Timestamp::from_second(1_800_000_300).unwrap(),
            vec![interval],
        )
    }

    #[test]
    fn append_and_list_in_order() {
        let mut store = RecordStore::new();
        store.append(sample_record("Ana")).unwrap();
        store.append(sample_record("Bruno")).unwrap();

        let names: Vec<&str> = store
            .list()
            .iter()
            .map(|r| r.header.worker_name.as_str())
            .collect();
        assert_eq!(names, vec!["Ana", "Bruno"]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn append_duplicate_fails() {
        let mut store = RecordStore::new();
        let record = sample_record("Ana");
        store.append(record.clone()).unwrap();
        let err = store.append(record).unwrap_err();

        assert!(matches!(err, StoreError::AlreadyRecorded(_)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn resolve_by_full_id_prefix_and_position() {
        let mut store = RecordStore::new();
        let id = store.append(sample_record("Ana")).unwrap().id;
        store.append(sample_record("Bruno")).unwrap();

        assert_eq!(store.resolve(&id.to_string()).unwrap().id, id);
        assert_eq!(store.resolve(&id.to_string()[..8]).unwrap().id, id);
        assert_eq!(store.resolve("2").unwrap().header.worker_name, "Bruno");
    }

    #[test]
    fn resolve_unknown_fails() {
        let mut store = RecordStore::new();
        store.append(sample_record("Ana")).unwrap();

        let err = store.resolve(&Uuid::new_v4().to_string()).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        let err = store.resolve("").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn resolve_ambiguous_prefix_fails() {
        let mut store = RecordStore::new();
        let mut first = sample_record("Ana");
        first.id = "aaaaaaaa-0000-4000-8000-000000000001".parse().unwrap();
        let mut second = sample_record("Bruno");
        second.id = "aaaaaaaa-0000-4000-8000-000000000002".parse().unwrap();
        store.append(first).unwrap();
        store.append(second).unwrap();

        let err = store.resolve("aaaa").unwrap_err();
        assert!(matches!(err, StoreError::Ambiguous { ref matches, .. } if matches.len() == 2));
    }

    #[test]
    fn export_then_import_keeps_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("exports").join("records.json");

        let mut store = RecordStore::new();
        store.append(sample_record("Ana")).unwrap();
        store.append(sample_record("Bruno")).unwrap();
        store.export_json(&path).unwrap();

        let imported = RecordStore::import_json(&path).unwrap();
        assert_eq!(imported.list(), store.list());
    }

    #[test]
    fn import_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let err = RecordStore::import_json(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
    }
}
