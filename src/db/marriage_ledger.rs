use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};
use tracing::info;
use uuid::Uuid;

use super::lock_conn;
use crate::models::{Marriage, MarriageStatus};
use crate::utils::date::{format_date, parse_date};
use crate::utils::{AppError, AppResult};

/// Vigselregister. Poster läggs bara till, de ändras eller tas aldrig bort.
pub struct MarriageLedger {
    conn: Arc<Mutex<Connection>>,
}

impl MarriageLedger {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Registrera ett äktenskap och returnera dess ID
    pub fn record(&self, person1_id: &str, person2_id: &str, date: NaiveDate) -> AppResult<String> {
        if person1_id.trim().is_empty() || person2_id.trim().is_empty() {
            return Err(AppError::validation("Båda personerna måste anges"));
        }

        let marriage = Marriage::new(person1_id.trim(), person2_id.trim(), date);
        let id = Uuid::new_v4().to_string();

        let conn = lock_conn(&self.conn)?;
        conn.execute(
            "INSERT INTO marriages (id, person1_id, person2_id, marriage_date, status)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                id,
                marriage.person1_id,
                marriage.person2_id,
                format_date(marriage.date),
                marriage.status.to_string(),
            ],
        )?;

        info!("Registrerade äktenskap {} mellan {} och {}", id, marriage.person1_id, marriage.person2_id);

        Ok(id)
    }

    pub fn find_by_id(&self, id: &str) -> AppResult<Option<Marriage>> {
        let conn = lock_conn(&self.conn)?;
        let marriage = conn
            .query_row(
                "SELECT id, person1_id, person2_id, marriage_date, status FROM marriages WHERE id = ?",
                [id],
                row_to_marriage,
            )
            .optional()?;
        Ok(marriage)
    }

    pub fn count(&self) -> AppResult<i64> {
        let conn = lock_conn(&self.conn)?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM marriages", [], |row| row.get(0))?;
        Ok(count)
    }
}

/// Antal registrerade äktenskap där personen ingår
pub(crate) fn count_involving(conn: &Connection, person_id: &str) -> AppResult<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM marriages WHERE person1_id = ?1 OR person2_id = ?1",
        [person_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

fn row_to_marriage(row: &Row) -> rusqlite::Result<Marriage> {
    let date_text: String = row.get(3)?;
    let date = parse_date(&date_text).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(3, Type::Text, format!("ogiltigt datum: {}", date_text).into())
    })?;
    let status_text: String = row.get(4)?;
    let status = MarriageStatus::from_db_str(&status_text).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(4, Type::Text, format!("okänd status: {}", status_text).into())
    })?;

    Ok(Marriage {
        id: row.get(0)?,
        person1_id: row.get(1)?,
        person2_id: row.get(2)?,
        date,
        status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Database, SqlPersonStore};
    use crate::models::{Gender, Person};

    fn setup_couple() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.with_connection(|conn| {
            let store = SqlPersonStore::new(conn);
            let mut a = Person::new("Ayşe", "Kaya", "10000000001", Gender::Female);
            a.id = Some("a".into());
            let mut b = Person::new("Ahmet", "Kaya", "10000000002", Gender::Male);
            b.id = Some("b".into());
            store.insert(&a)?;
            store.insert(&b)
        })
        .unwrap();
        db
    }

    fn wedding_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(1990, 6, 15).unwrap()
    }

    #[test]
    fn test_record_defaults_status() {
        let db = setup_couple();
        let date = NaiveDate::from_ymd_opt(1985, 4, 12).unwrap();

        let id = db.marriages().record("a", "b", date).unwrap();
        let marriage = db.marriages().find_by_id(&id).unwrap().unwrap();

        assert_eq!(marriage.status, MarriageStatus::Married);
        assert_eq!(marriage.date, date);
        assert!(marriage.involves("a"));
        assert_eq!(db.marriages().count().unwrap(), 1);
    }

    #[test]
    fn test_record_requires_both_ids() {
        let db = setup_couple();
        let result = db.marriages().record("a", " ", wedding_day());
        assert!(result.unwrap_err().is_validation());
        assert_eq!(db.marriages().count().unwrap(), 0);
    }

    #[test]
    fn test_records_are_independent_of_spouse_link() {
        let db = setup_couple();
        let first = db.marriages().record("a", "b", wedding_day()).unwrap();
        let second = db.marriages().record("a", "b", wedding_day()).unwrap();
        assert_ne!(first, second);

        let a = db.persons().find_by_id("a").unwrap().unwrap();
        assert_eq!(a.spouse_id, None);
        assert_eq!(
            db.with_connection(|conn| count_involving(conn, "b")).unwrap(),
            2
        );
    }
}
