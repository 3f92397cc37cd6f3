//! File-backed source for dumped hub responses.

use super::{CalendarSource, SourceError};
use crate::calendar::group::DateRange;
use log::debug;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Reads raw events for one entity from a JSON file.
///
/// The file holds either a bare array of hub events or an object keyed by
/// entity id. The whole dump is returned; day grouping clips it to the
/// view range later.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    entity_id: String,
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(entity_id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            entity_id: entity_id.into(),
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CalendarSource for JsonFileSource {
    fn entity_id(&self) -> &str {
        &self.entity_id
    }

    fn fetch(&self, range: DateRange) -> Result<Vec<Value>, SourceError> {
        let raw = std::fs::read_to_string(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })?;
        let payload: Value = serde_json::from_str(&raw)?;
        let events = match payload {
            Value::Array(items) => items,
            Value::Object(mut by_entity) => match by_entity.remove(&self.entity_id) {
                Some(Value::Array(items)) => items,
                Some(_) => {
                    return Err(SourceError::Unavailable {
                        entity_id: self.entity_id.clone(),
                        reason: "entry is not an array".to_string(),
                    })
                }
                None => Vec::new(),
            },
            _ => {
                return Err(SourceError::Unavailable {
                    entity_id: self.entity_id.clone(),
                    reason: "payload is neither array nor object".to_string(),
                })
            }
        };
        debug!(
            "event=source_read module=source status=ok entity={} events={} range_start={}",
            self.entity_id,
            events.len(),
            range.start
        );
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::JsonFileSource;
    use crate::calendar::group::DateRange;
    use crate::source::{CalendarSource, SourceError};
    use chrono::NaiveDate;
    use std::io::Write;

    fn range() -> DateRange {
        DateRange::from_start(NaiveDate::from_ymd_opt(2026, 10, 15).unwrap(), 14)
    }

    #[test]
    fn reads_entity_entry_from_keyed_dump() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"calendar.work": [{{"summary": "Standup"}}], "calendar.home": []}}"#
        )
        .unwrap();
        let source = JsonFileSource::new("calendar.work", file.path());
        assert_eq!(source.fetch(range()).unwrap().len(), 1);

        let missing = JsonFileSource::new("calendar.other", file.path());
        assert!(missing.fetch(range()).unwrap().is_empty());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = JsonFileSource::new("calendar.work", dir.path().join("absent.json"));
        assert!(matches!(
            source.fetch(range()),
            Err(SourceError::Io { .. })
        ));
    }
}
