use chrono::{NaiveDate, NaiveDateTime};

/// Source of local wall-clock time for day boundaries and alert stamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}
