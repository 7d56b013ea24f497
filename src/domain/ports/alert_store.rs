use crate::domain::entities::alert::AlertRecord;
use crate::domain::error::DomainError;
use chrono::{Local, NaiveDate};

#[derive(Debug, Clone, Default)]
pub struct AlertFilter {
    pub city: Option<String>,
    /// Only alerts generated on or after this calendar date.
    pub since: Option<NaiveDate>,
    pub limit: Option<usize>,
}

/// Append-only persistence for alert records.
///
/// Implementations must never drop previously stored records and must
/// return records in insertion order from `query_day`. Writers are assumed
/// to live in a single process.
pub trait AlertStore: Send + Sync {
    fn append(&self, alert: &AlertRecord) -> Result<(), DomainError>;

    /// All alerts for `city` generated on `day`, oldest first.
    fn query_day(&self, city: &str, day: NaiveDate) -> Result<Vec<AlertRecord>, DomainError>;

    /// Alert history, newest first.
    fn list(&self, filter: &AlertFilter) -> Result<Vec<AlertRecord>, DomainError>;

    /// Alerts for `city` generated on the current local calendar date.
    fn query_today(&self, city: &str) -> Result<Vec<AlertRecord>, DomainError> {
        self.query_day(city, Local::now().date_naive())
    }
}
