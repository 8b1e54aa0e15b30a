use std::collections::BTreeMap;

use log::{debug, warn};

use crate::dates::parse_date_key;
use crate::storage::{Storage, StorageError};

pub const NOTES_STORAGE_KEY: &str = "dailyNotes";

/// Note text keyed by `YYYY-MM-DD`.
pub type NoteMap = BTreeMap<String, String>;

/// Loads and saves the whole note map through a [`Storage`] backend.
#[derive(Debug)]
pub struct NoteStore<S> {
    storage: S,
}

impl<S: Storage> NoteStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Reads the stored map. Never fails: a missing, unreadable or
    /// malformed value yields an empty map.
    pub fn load(&self) -> NoteMap {
        let raw = match self.storage.get(NOTES_STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("event=notes_load status=empty reason=no_data");
                return NoteMap::new();
            }
            Err(err) => {
                warn!("event=notes_load status=degraded reason=read_failed error={err}");
                return NoteMap::new();
            }
        };

        if raw.trim().is_empty() {
            return NoteMap::new();
        }

        match serde_json::from_str::<NoteMap>(&raw) {
            Ok(notes) => {
                let unexpected = notes
                    .keys()
                    .filter(|key| parse_date_key(key).is_none())
                    .count();
                if unexpected > 0 {
                    warn!("event=notes_load status=ok unexpected_keys={unexpected}");
                }
                debug!("event=notes_load status=ok entries={}", notes.len());
                notes
            }
            Err(err) => {
                warn!(
                    "event=notes_load status=degraded reason=parse_failed error={}",
                    StorageError::JsonDecode(err)
                );
                NoteMap::new()
            }
        }
    }

    /// Overwrites the stored map with `notes`.
    pub fn save(&mut self, notes: &NoteMap) -> Result<(), StorageError> {
        let raw = serde_json::to_string(notes).map_err(StorageError::JsonEncode)?;
        self.storage.set(NOTES_STORAGE_KEY, &raw)?;
        debug!("event=notes_save status=ok entries={}", notes.len());
        Ok(())
    }
}

/// Returns a copy of `notes` with `key` set to `text`. Empty text is stored
/// as-is.
pub fn set_note(notes: &NoteMap, key: &str, text: &str) -> NoteMap {
    let mut next = notes.clone();
    next.insert(key.to_string(), text.to_string());
    next
}

pub fn note_text<'a>(notes: &'a NoteMap, key: &str) -> &'a str {
    notes.get(key).map(String::as_str).unwrap_or("")
}

pub fn has_note(notes: &NoteMap, key: &str) -> bool {
    !note_text(notes, key).trim().is_empty()
}

pub fn preview(text: &str) -> String {
    text.lines()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("")
        .trim()
        .to_string()
}
