use crate::domain::error::DomainError;
use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<(), DomainError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS alerts (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            alert_type TEXT NOT NULL,
            city TEXT NOT NULL COLLATE NOCASE,
            district TEXT NOT NULL,
            property_type TEXT NOT NULL,
            current_price REAL NOT NULL,
            avg_price REAL NOT NULL,
            discount_percent REAL NOT NULL,
            confidence TEXT NOT NULL,
            score INTEGER NOT NULL,
            generated_at TEXT NOT NULL,
            generated_on TEXT NOT NULL,
            source TEXT NOT NULL DEFAULT '[]'
        );

        CREATE INDEX IF NOT EXISTS idx_alerts_city_day ON alerts(city, generated_on);
        CREATE INDEX IF NOT EXISTS idx_alerts_generated ON alerts(generated_at);
        ",
    )
    .map_err(|e| DomainError::Store(format!("Migration failed: {e}")))
}
