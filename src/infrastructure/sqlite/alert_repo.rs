use crate::domain::entities::alert::{AlertFacts, AlertRecord, AlertType};
use crate::domain::error::DomainError;
use crate::domain::ports::alert_store::{AlertFilter, AlertStore};
use crate::domain::values::confidence::ConfidenceTier;
use crate::domain::values::timestamp::MinuteTimestamp;
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use std::sync::Mutex;

const DAY_FORMAT: &str = "%Y-%m-%d";
const SELECT_COLUMNS: &str = "SELECT alert_type, city, district, property_type, current_price, avg_price, discount_percent, confidence, score, generated_at, source FROM alerts";

pub struct SqliteAlertStore {
    conn: Mutex<Connection>,
}

impl SqliteAlertStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn row_to_alert(row: &rusqlite::Row) -> Result<AlertRecord, rusqlite::Error> {
        let confidence_str: String = row.get(7)?;
        let generated_str: String = row.get(9)?;
        let source_str: String = row.get(10)?;
        let score: i64 = row.get(8)?;

        let confidence: ConfidenceTier = confidence_str.parse().map_err(|e: String| {
            rusqlite::Error::FromSqlConversionFailure(7, rusqlite::types::Type::Text, e.into())
        })?;
        let generated_at: MinuteTimestamp = generated_str.parse().map_err(|e: String| {
            rusqlite::Error::FromSqlConversionFailure(9, rusqlite::types::Type::Text, e.into())
        })?;

        let source: Vec<String> = serde_json::from_str(&source_str).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(10, rusqlite::types::Type::Text, e.into())
        })?;

        Ok(AlertRecord {
            alert_type: AlertType::GoldenOpportunity,
            city: row.get(1)?,
            district: row.get(2)?,
            property_type: row.get(3)?,
            facts: AlertFacts {
                current_price: row.get(4)?,
                avg_price: row.get(5)?,
                discount_percent: row.get(6)?,
            },
            confidence,
            score: score.clamp(0, 100) as u8,
            generated_at,
            source,
        })
    }

    fn collect(
        conn: &Connection,
        sql: &str,
        params: &[&dyn rusqlite::types::ToSql],
    ) -> Result<Vec<AlertRecord>, DomainError> {
        let mut stmt = conn.prepare(sql)?;
        let alerts = stmt
            .query_map(params, Self::row_to_alert)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(alerts)
    }
}

impl AlertStore for SqliteAlertStore {
    fn append(&self, alert: &AlertRecord) -> Result<(), DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Store(e.to_string()))?;
        let source = serde_json::to_string(&alert.source)
            .map_err(|e| DomainError::Store(format!("Failed to encode alert source: {e}")))?;
        conn.execute(
            "INSERT INTO alerts (alert_type, city, district, property_type, current_price, avg_price, discount_percent, confidence, score, generated_at, generated_on, source)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                alert.alert_type.to_string(),
                alert.city,
                alert.district,
                alert.property_type,
                alert.facts.current_price,
                alert.facts.avg_price,
                alert.facts.discount_percent,
                alert.confidence.to_string(),
                alert.score as i64,
                alert.generated_at.to_string(),
                alert.generated_at.date().format(DAY_FORMAT).to_string(),
                source,
            ],
        )
        .map_err(|e| DomainError::Store(format!("Failed to append alert: {e}")))?;
        Ok(())
    }

    fn query_day(&self, city: &str, day: NaiveDate) -> Result<Vec<AlertRecord>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Store(e.to_string()))?;
        let day = day.format(DAY_FORMAT).to_string();
        Self::collect(
            &conn,
            &format!("{SELECT_COLUMNS} WHERE city = ?1 COLLATE NOCASE AND generated_on = ?2 ORDER BY seq ASC"),
            params![city.trim(), day],
        )
    }

    fn list(&self, filter: &AlertFilter) -> Result<Vec<AlertRecord>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Store(e.to_string()))?;
        let mut sql = format!("{SELECT_COLUMNS} WHERE 1=1");
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(city) = &filter.city {
            sql.push_str(&format!(" AND city = ?{} COLLATE NOCASE", param_values.len() + 1));
            param_values.push(Box::new(city.trim().to_string()));
        }
        if let Some(since) = &filter.since {
            sql.push_str(&format!(" AND generated_on >= ?{}", param_values.len() + 1));
            param_values.push(Box::new(since.format(DAY_FORMAT).to_string()));
        }
        sql.push_str(" ORDER BY seq DESC");
        if let Some(limit) = filter.limit {
            sql.push_str(&format!(" LIMIT ?{}", param_values.len() + 1));
            param_values.push(Box::new(limit as i64));
        }

        let params_refs: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();
        Self::collect(&conn, &sql, params_refs.as_slice())
    }
}
