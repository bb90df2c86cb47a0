use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

use super::lock_conn;
use super::store::PersonStore;
use crate::models::{Gender, Person, PersonWithParents};
use crate::utils::{AppError, AppResult};

const PERSON_COLUMNS: &str = "id, first_name, last_name, national_id, phone, bio, photo_ref,
                              mother_id, father_id, spouse_id, gender, created_at";

/// SQL-frågor mot en lånad anslutning eller transaktion
pub struct SqlPersonStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqlPersonStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    fn query_people(&self, sql: &str, params: impl rusqlite::Params) -> AppResult<Vec<Person>> {
        let mut stmt = self.conn.prepare(sql)?;
        let persons = stmt
            .query_map(params, row_to_person)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(persons)
    }

    /// Hämta person via ID
    pub fn find_by_id(&self, id: &str) -> AppResult<Option<Person>> {
        let person = self
            .conn
            .query_row(
                &format!("SELECT {} FROM people WHERE id = ?", PERSON_COLUMNS),
                [id],
                row_to_person,
            )
            .optional()?;
        Ok(person)
    }

    /// Hämta alla personer
    pub fn find_all(&self) -> AppResult<Vec<Person>> {
        self.query_people(
            &format!(
                "SELECT {} FROM people ORDER BY last_name, first_name, id",
                PERSON_COLUMNS
            ),
            [],
        )
    }

    /// Alla personer med föräldrarnas namn
    pub fn find_all_with_parents(&self) -> AppResult<Vec<PersonWithParents>> {
        let mut stmt = self.conn.prepare(
            "SELECT p.id, p.first_name, p.last_name, p.national_id, p.phone, p.bio, p.photo_ref,
                    p.mother_id, p.father_id, p.spouse_id, p.gender, p.created_at,
                    mother.first_name || ' ' || mother.last_name,
                    father.first_name || ' ' || father.last_name
             FROM people p
             LEFT JOIN people mother ON p.mother_id = mother.id
             LEFT JOIN people father ON p.father_id = father.id
             ORDER BY p.last_name, p.first_name, p.id",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(PersonWithParents {
                    person: row_to_person(row)?,
                    mother_name: row.get(12)?,
                    father_name: row.get(13)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Person med föräldrarnas namn
    pub fn find_with_parents(&self, id: &str) -> AppResult<PersonWithParents> {
        let person = self.get(id)?;
        let (mother, father) = self.find_parents_of(id)?;
        Ok(PersonWithParents {
            person,
            mother_name: mother.map(|m| m.full_name()),
            father_name: father.map(|f| f.full_name()),
        })
    }

    /// Sök på namn eller personnummer
    pub fn search(&self, query: &str) -> AppResult<Vec<Person>> {
        let pattern = format!("%{}%", query.trim());
        self.query_people(
            &format!(
                "SELECT {} FROM people
                 WHERE first_name LIKE ?1 OR last_name LIKE ?1 OR national_id LIKE ?1
                 ORDER BY last_name, first_name, id",
                PERSON_COLUMNS
            ),
            [pattern],
        )
    }

    pub fn count(&self) -> AppResult<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM people", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Kontrollera om personnumret redan används av någon annan
    pub fn is_national_id_taken(&self, national_id: &str, exclude_id: Option<&str>) -> AppResult<bool> {
        let taken: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM people WHERE national_id = ?1 AND id IS NOT ?2)",
            params![national_id, exclude_id],
            |row| row.get(0),
        )?;
        Ok(taken)
    }

    pub fn insert(&self, person: &Person) -> AppResult<()> {
        let id = person
            .id
            .as_deref()
            .ok_or_else(|| AppError::validation("Person saknar ID"))?;

        self.conn.execute(
            "INSERT INTO people (id, first_name, last_name, national_id, phone, bio, photo_ref,
                                 mother_id, father_id, spouse_id, gender)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                id,
                person.first_name,
                person.last_name,
                person.national_id,
                person.phone,
                person.bio,
                person.photo_ref,
                person.mother_id,
                person.father_id,
                person.spouse_id,
                person.gender.label(),
            ],
        )?;

        Ok(())
    }

    /// Ersätt hela posten
    pub fn update(&self, person: &Person) -> AppResult<()> {
        let id = person
            .id
            .as_deref()
            .ok_or_else(|| AppError::validation("Person saknar ID"))?;

        let rows = self.conn.execute(
            "UPDATE people SET
                first_name = ?1, last_name = ?2, national_id = ?3, phone = ?4, bio = ?5,
                photo_ref = ?6, mother_id = ?7, father_id = ?8, spouse_id = ?9, gender = ?10
             WHERE id = ?11",
            params![
                person.first_name,
                person.last_name,
                person.national_id,
                person.phone,
                person.bio,
                person.photo_ref,
                person.mother_id,
                person.father_id,
                person.spouse_id,
                person.gender.label(),
                id,
            ],
        )?;

        if rows == 0 {
            return Err(AppError::not_found(format!("Person med ID {}", id)));
        }

        Ok(())
    }

    /// Sätt eller nollställ make/maka på en enskild post
    pub fn set_spouse(&self, id: &str, spouse_id: Option<&str>) -> AppResult<usize> {
        let rows = self.conn.execute(
            "UPDATE people SET spouse_id = ?1 WHERE id = ?2",
            params![spouse_id, id],
        )?;
        Ok(rows)
    }

    /// Koppla loss alla utom `a` och `b` som pekar på någon av dem
    pub fn detach_spouse_refs(&self, a: &str, b: &str) -> AppResult<usize> {
        let rows = self.conn.execute(
            "UPDATE people SET spouse_id = NULL
             WHERE spouse_id IN (?1, ?2) AND id NOT IN (?1, ?2)",
            params![a, b],
        )?;
        Ok(rows)
    }

    /// Ta bort person. Referenser till personen nollställs av schemat.
    pub fn delete(&self, id: &str) -> AppResult<()> {
        let rows = self.conn.execute("DELETE FROM people WHERE id = ?", [id])?;

        if rows == 0 {
            return Err(AppError::not_found(format!("Person med ID {}", id)));
        }

        Ok(())
    }
}

impl PersonStore for SqlPersonStore<'_> {
    fn get(&self, id: &str) -> AppResult<Person> {
        self.find_by_id(id)?
            .ok_or_else(|| AppError::not_found(format!("Person med ID {}", id)))
    }

    fn find_parents_of(&self, id: &str) -> AppResult<(Option<Person>, Option<Person>)> {
        let person = self.get(id)?;
        let mother = match person.mother_id.as_deref() {
            Some(mother_id) => self.find_by_id(mother_id)?,
            None => None,
        };
        let father = match person.father_id.as_deref() {
            Some(father_id) => self.find_by_id(father_id)?,
            None => None,
        };
        Ok((mother, father))
    }

    fn find_children_of(&self, id: &str) -> AppResult<Vec<Person>> {
        self.query_people(
            &format!(
                "SELECT {} FROM people WHERE mother_id = ?1 OR father_id = ?1 ORDER BY id",
                PERSON_COLUMNS
            ),
            [id],
        )
    }

    fn find_by_parent_pair(&self, mother_id: &str, father_id: &str) -> AppResult<Vec<Person>> {
        self.query_people(
            &format!(
                "SELECT {} FROM people WHERE mother_id = ?1 AND father_id = ?2 ORDER BY id",
                PERSON_COLUMNS
            ),
            [mother_id, father_id],
        )
    }

    fn find_spouse_of(&self, id: &str) -> AppResult<Option<Person>> {
        let person = self.get(id)?;
        match person.spouse_id.as_deref() {
            Some(spouse_id) => self.find_by_id(spouse_id),
            None => Ok(None),
        }
    }
}

fn row_to_person(row: &Row) -> rusqlite::Result<Person> {
    let gender_label: String = row.get(10)?;
    let gender = Gender::from_label(&gender_label).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            10,
            Type::Text,
            format!("okänt kön: {}", gender_label).into(),
        )
    })?;

    Ok(Person {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        national_id: row.get(3)?,
        phone: row.get(4)?,
        bio: row.get(5)?,
        photo_ref: row.get(6)?,
        mother_id: row.get(7)?,
        father_id: row.get(8)?,
        spouse_id: row.get(9)?,
        gender,
        created_at: row.get(11)?,
    })
}

/// Repository som låser den delade anslutningen per anrop
pub struct PersonRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PersonRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn with_store<T>(&self, f: impl FnOnce(&SqlPersonStore<'_>) -> AppResult<T>) -> AppResult<T> {
        let conn = lock_conn(&self.conn)?;
        f(&SqlPersonStore::new(&conn))
    }

    pub fn find_all(&self) -> AppResult<Vec<Person>> {
        self.with_store(|store| store.find_all())
    }

    pub fn find_all_with_parents(&self) -> AppResult<Vec<PersonWithParents>> {
        self.with_store(|store| store.find_all_with_parents())
    }

    pub fn find_by_id(&self, id: &str) -> AppResult<Option<Person>> {
        self.with_store(|store| store.find_by_id(id))
    }

    pub fn search(&self, query: &str) -> AppResult<Vec<Person>> {
        self.with_store(|store| store.search(query))
    }

    pub fn count(&self) -> AppResult<i64> {
        self.with_store(|store| store.count())
    }
}

impl PersonStore for PersonRepository {
    fn get(&self, id: &str) -> AppResult<Person> {
        self.with_store(|store| store.get(id))
    }

    fn find_parents_of(&self, id: &str) -> AppResult<(Option<Person>, Option<Person>)> {
        self.with_store(|store| store.find_parents_of(id))
    }

    fn find_children_of(&self, id: &str) -> AppResult<Vec<Person>> {
        self.with_store(|store| store.find_children_of(id))
    }

    fn find_by_parent_pair(&self, mother_id: &str, father_id: &str) -> AppResult<Vec<Person>> {
        self.with_store(|store| store.find_by_parent_pair(mother_id, father_id))
    }

    fn find_spouse_of(&self, id: &str) -> AppResult<Option<Person>> {
        self.with_store(|store| store.find_spouse_of(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn insert(db: &Database, id: &str, first: &str, national_id: &str, gender: Gender) -> Person {
        let mut person = Person::new(first, "Kaya", national_id, gender);
        person.id = Some(id.into());
        db.with_connection(|conn| SqlPersonStore::new(conn).insert(&person))
            .unwrap();
        person
    }

    fn set_parents(db: &Database, id: &str, mother: Option<&str>, father: Option<&str>) {
        db.with_connection(|conn| {
            conn.execute(
                "UPDATE people SET mother_id = ?1, father_id = ?2 WHERE id = ?3",
                params![mother, father, id],
            )?;
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_create_and_find() {
        let db = setup_db();
        insert(&db, "p1", "Ayşe", "10000000001", Gender::Female);

        let found = db.persons().find_by_id("p1").unwrap();
        assert!(found.is_some());
        let found = found.unwrap();
        assert_eq!(found.first_name, "Ayşe");
        assert_eq!(found.gender, Gender::Female);
        assert!(found.created_at.is_some());

        assert!(db.persons().find_by_id("saknas").unwrap().is_none());
        assert!(db.persons().get("saknas").unwrap_err().is_not_found());
    }

    #[test]
    fn test_duplicate_national_id_rejected_by_store() {
        let db = setup_db();
        insert(&db, "p1", "Ayşe", "10000000001", Gender::Female);

        let mut dup = Person::new("Fatma", "Kaya", "10000000001", Gender::Female);
        dup.id = Some("p2".into());
        let result = db.with_connection(|conn| SqlPersonStore::new(conn).insert(&dup));
        assert!(matches!(result, Err(AppError::Storage(_))));

        let taken = db
            .with_connection(|conn| SqlPersonStore::new(conn).is_national_id_taken("10000000001", Some("p2")))
            .unwrap();
        assert!(taken);
        let own = db
            .with_connection(|conn| SqlPersonStore::new(conn).is_national_id_taken("10000000001", Some("p1")))
            .unwrap();
        assert!(!own);
    }

    #[test]
    fn test_parent_and_child_queries() {
        let db = setup_db();
        insert(&db, "mor", "Hatice", "10000000001", Gender::Female);
        insert(&db, "far", "Mehmet", "10000000002", Gender::Male);
        insert(&db, "barn1", "Ali", "10000000003", Gender::Male);
        insert(&db, "barn2", "Elif", "10000000004", Gender::Female);
        insert(&db, "halv", "Can", "10000000005", Gender::Male);
        set_parents(&db, "barn1", Some("mor"), Some("far"));
        set_parents(&db, "barn2", Some("mor"), Some("far"));
        set_parents(&db, "halv", Some("mor"), None);

        let repo = db.persons();
        let (mother, father) = repo.find_parents_of("barn1").unwrap();
        assert_eq!(mother.unwrap().id.as_deref(), Some("mor"));
        assert_eq!(father.unwrap().id.as_deref(), Some("far"));

        let children = repo.find_children_of("mor").unwrap();
        assert_eq!(children.len(), 3);

        let pair = repo.find_by_parent_pair("mor", "far").unwrap();
        let ids: Vec<&str> = pair.iter().map(|p| p.id_str()).collect();
        assert_eq!(ids, vec!["barn1", "barn2"]);

        let listed = repo.find_all_with_parents().unwrap();
        let halv = listed.iter().find(|p| p.person.id_str() == "halv").unwrap();
        assert_eq!(halv.mother_name.as_deref(), Some("Hatice Kaya"));
        assert_eq!(halv.father_name, None);
    }

    #[test]
    fn test_search() {
        let db = setup_db();
        insert(&db, "p1", "Ayşe", "10000000001", Gender::Female);
        insert(&db, "p2", "Ahmet", "10000000002", Gender::Male);

        assert_eq!(db.persons().search("Kaya").unwrap().len(), 2);
        assert_eq!(db.persons().search("Ahm").unwrap().len(), 1);
        assert_eq!(db.persons().search("10000000001").unwrap().len(), 1);
    }

    #[test]
    fn test_delete_nulls_references() {
        let db = setup_db();
        insert(&db, "mor", "Hatice", "10000000001", Gender::Female);
        insert(&db, "barn", "Ali", "10000000002", Gender::Male);
        set_parents(&db, "barn", Some("mor"), None);
        db.with_connection(|conn| {
            let store = SqlPersonStore::new(conn);
            store.set_spouse("mor", Some("barn"))?;
            store.delete("mor")
        })
        .unwrap();

        let child = db.persons().find_by_id("barn").unwrap().unwrap();
        assert_eq!(child.mother_id, None);
        assert_eq!(db.persons().count().unwrap(), 1);
    }
}
