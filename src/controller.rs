use chrono::NaiveDate;
use log::{debug, error, info};

use crate::calendar::CalendarState;
use crate::dates::{date_key, Clock};
use crate::notes::{note_text, set_note, NoteMap, NoteStore};
use crate::storage::{Storage, StorageError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    PrevMonth,
    NextMonth,
    Today,
    SelectWeekDay(NaiveDate),
    EditNote { key: String, text: String },
}

/// Owns the month cursor and the note map, and mediates between them and
/// whatever draws them.
///
/// Scroll requests are not applied immediately. They wait in a single slot
/// until the surface reports a finished frame through [`after_render`], so
/// the target section already reflects the new cursor. A newer request
/// replaces an older one.
///
/// [`after_render`]: ViewController::after_render
pub struct ViewController<S, C> {
    calendar: CalendarState,
    notes: NoteMap,
    store: NoteStore<S>,
    clock: C,
    pending_scroll: Option<String>,
    status: String,
}

impl<S: Storage, C: Clock> ViewController<S, C> {
    pub fn new(store: NoteStore<S>, clock: C) -> Self {
        let notes = store.load();
        let today = clock.today();
        info!(
            "event=controller_start cursor={} notes={}",
            date_key(&today),
            notes.len()
        );
        Self {
            calendar: CalendarState::new(today),
            notes,
            store,
            clock,
            pending_scroll: None,
            status: "Ready".to_string(),
        }
    }

    pub fn dispatch(&mut self, command: Command) {
        match command {
            Command::PrevMonth => {
                self.calendar.previous_month();
                self.status = format!("Moved to {}", self.cursor().format("%B %Y"));
            }
            Command::NextMonth => {
                self.calendar.next_month();
                self.status = format!("Moved to {}", self.cursor().format("%B %Y"));
            }
            Command::Today => {
                self.calendar.today(&self.clock);
                self.request_scroll(self.cursor());
                self.status = "Jumped to today".to_string();
            }
            Command::SelectWeekDay(date) => {
                self.calendar.select(date);
                self.request_scroll(date);
                self.status = format!("Selected {}", date.format("%a %d %b"));
            }
            Command::EditNote { key, text } => {
                self.status = match self.edit_note(&key, &text) {
                    Ok(()) => format!("Saved {key}"),
                    Err(err) => {
                        error!("event=notes_save status=failed key={key} error={err}");
                        format!("error: note kept in memory, save failed: {err}")
                    }
                };
            }
        }
    }

    /// Updates one note and persists the whole map. On a failed save the
    /// in-memory map already holds the new text.
    pub fn edit_note(&mut self, key: &str, text: &str) -> Result<(), StorageError> {
        self.notes = set_note(&self.notes, key, text);
        self.store.save(&self.notes)
    }

    /// Moves the cursor without requesting a scroll.
    pub fn goto_date(&mut self, date: NaiveDate) {
        self.calendar.select(date);
    }

    /// Hands the pending scroll request to the surface once a frame has been
    /// drawn. Returns the index of the section carrying the requested key,
    /// or `None` when nothing is pending or no such section was rendered.
    pub fn after_render<K: AsRef<str>>(&mut self, rendered_keys: &[K]) -> Option<usize> {
        let target = self.pending_scroll.take()?;
        let index = rendered_keys
            .iter()
            .position(|key| key.as_ref() == target);
        if index.is_none() {
            debug!("event=scroll status=skipped key={target}");
        }
        index
    }

    pub fn pending_scroll(&self) -> Option<&str> {
        self.pending_scroll.as_deref()
    }

    pub fn cursor(&self) -> NaiveDate {
        self.calendar.cursor()
    }

    pub fn days_in_month(&self) -> Vec<NaiveDate> {
        self.calendar.days_in_month()
    }

    pub fn week_header(&self) -> [NaiveDate; 7] {
        self.calendar.week_header()
    }

    pub fn notes(&self) -> &NoteMap {
        &self.notes
    }

    pub fn note_for(&self, date: NaiveDate) -> &str {
        note_text(&self.notes, &date_key(&date))
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn store(&self) -> &NoteStore<S> {
        &self.store
    }

    fn request_scroll(&mut self, date: NaiveDate) {
        self.pending_scroll = Some(date_key(&date));
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, NaiveDate};

    use crate::dates::{date_key, FixedClock};
    use crate::notes::{NoteStore, NOTES_STORAGE_KEY};
    use crate::storage::{MemoryStorage, Storage, StorageError};

    use super::{Command, ViewController};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn controller(
        storage: MemoryStorage,
        today: NaiveDate,
    ) -> ViewController<MemoryStorage, FixedClock> {
        ViewController::new(NoteStore::new(storage), FixedClock(today))
    }

    struct FailingStorage;

    impl Storage for FailingStorage {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Io(std::io::Error::other("disk gone")))
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::other("disk gone")))
        }
    }

    #[test]
    fn starts_on_today_with_empty_notes() {
        let view = controller(MemoryStorage::new(), date(2026, 1, 20));
        assert!(view.notes().is_empty());
        assert_eq!(view.cursor(), date(2026, 1, 20));

        let days = view.days_in_month();
        assert_eq!(days.len(), 31);
        assert_eq!(days.first(), Some(&date(2026, 1, 1)));
        assert_eq!(days.last(), Some(&date(2026, 1, 31)));
    }

    #[test]
    fn edits_survive_restart() {
        let storage = MemoryStorage::new();
        let mut view = controller(storage.clone(), date(2024, 3, 1));
        view.dispatch(Command::EditNote {
            key: "2024-03-15".to_string(),
            text: "Buy".to_string(),
        });
        view.dispatch(Command::EditNote {
            key: "2024-03-15".to_string(),
            text: "Buy milk".to_string(),
        });
        assert_eq!(view.note_for(date(2024, 3, 15)), "Buy milk");
        drop(view);

        let restarted = controller(storage.clone(), date(2024, 3, 2));
        assert_eq!(
            restarted.notes().get("2024-03-15").map(String::as_str),
            Some("Buy milk")
        );
        assert!(
            storage
                .get(NOTES_STORAGE_KEY)
                .expect("get should work")
                .is_some()
        );
    }

    #[test]
    fn today_from_three_months_away_requests_scroll() {
        let today = date(2026, 10, 19);
        let mut view = controller(MemoryStorage::new(), today);
        for _ in 0..3 {
            view.dispatch(Command::PrevMonth);
        }
        assert_eq!((view.cursor().year(), view.cursor().month()), (2026, 7));
        assert_eq!(view.pending_scroll(), None);

        view.dispatch(Command::Today);
        assert_eq!((view.cursor().year(), view.cursor().month()), (2026, 10));
        assert_eq!(view.pending_scroll(), Some("2026-10-19"));

        let rendered = view
            .days_in_month()
            .iter()
            .map(date_key)
            .collect::<Vec<_>>();
        assert_eq!(view.after_render(&rendered), Some(18));
        assert_eq!(view.pending_scroll(), None);
        assert_eq!(view.after_render(&rendered), None);
    }

    #[test]
    fn week_day_selection_moves_cursor_and_scrolls() {
        let mut view = controller(MemoryStorage::new(), date(2026, 10, 1));
        let sunday = view.week_header()[6];
        assert_eq!(sunday, date(2026, 10, 4));
        let monday = view.week_header()[0];
        assert_eq!(monday, date(2026, 9, 28));

        view.dispatch(Command::SelectWeekDay(monday));
        assert_eq!(view.cursor(), monday);
        let rendered = view
            .days_in_month()
            .iter()
            .map(date_key)
            .collect::<Vec<_>>();
        assert_eq!(rendered.len(), 30);
        assert_eq!(view.after_render(&rendered), Some(27));
    }

    #[test]
    fn later_scroll_request_wins() {
        let mut view = controller(MemoryStorage::new(), date(2026, 10, 19));
        view.dispatch(Command::SelectWeekDay(date(2026, 10, 21)));
        view.dispatch(Command::SelectWeekDay(date(2026, 10, 23)));
        let rendered = view
            .days_in_month()
            .iter()
            .map(date_key)
            .collect::<Vec<_>>();
        assert_eq!(view.after_render(&rendered), Some(22));
    }

    #[test]
    fn scroll_to_missing_section_is_a_no_op() {
        let mut view = controller(MemoryStorage::new(), date(2026, 10, 19));
        view.dispatch(Command::Today);
        let stale = vec!["2026-09-01".to_string(), "2026-09-02".to_string()];
        assert_eq!(view.after_render(&stale), None);
        assert_eq!(view.pending_scroll(), None);
    }

    #[test]
    fn storage_failures_keep_notes_in_memory() {
        let mut view = ViewController::new(
            NoteStore::new(FailingStorage),
            FixedClock(date(2026, 10, 19)),
        );
        assert!(view.notes().is_empty());

        view.dispatch(Command::EditNote {
            key: "2026-10-19".to_string(),
            text: "still here".to_string(),
        });
        assert_eq!(view.note_for(date(2026, 10, 19)), "still here");
        assert!(view.status().starts_with("error:"));
        assert!(view.edit_note("2026-10-20", "again").is_err());
        assert_eq!(view.notes().len(), 2);
    }
}
