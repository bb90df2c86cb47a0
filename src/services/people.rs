//! Skrivningar av personer: validering, lagring och make/maka-avstämning
//! som en enda transaktion.

use std::collections::{HashSet, VecDeque};

use tracing::{info, warn};
use uuid::Uuid;

use super::spouse_link::SpouseLinkManager;
use crate::db::marriage_ledger::count_involving;
use crate::db::{Database, PersonStore, SqlPersonStore};
use crate::models::{Person, Settings};
use crate::utils::{AppError, AppResult, CancelFlag};

pub struct PersonService<'a> {
    db: &'a Database,
    reject_ancestry_cycles: bool,
}

impl<'a> PersonService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self {
            db,
            reject_ancestry_cycles: true,
        }
    }

    pub fn from_settings(db: &'a Database, settings: &Settings) -> Self {
        Self::new(db).with_cycle_check(settings.reject_ancestry_cycles)
    }

    pub fn with_cycle_check(mut self, enabled: bool) -> Self {
        self.reject_ancestry_cycles = enabled;
        self
    }

    pub fn find(&self, id: &str) -> AppResult<Person> {
        self.db.persons().get(id)
    }

    pub fn apply_person_upsert(&self, person: Person) -> AppResult<Person> {
        self.apply_person_upsert_with(person, &CancelFlag::new())
    }

    /// Skapa (utan ID) eller ersätt (med ID) en person.
    ///
    /// Hela posten skrivs och make/maka stäms av i samma transaktion;
    /// vid fel eller avbrott rullas allt tillbaka.
    pub fn apply_person_upsert_with(&self, mut person: Person, cancel: &CancelFlag) -> AppResult<Person> {
        person.normalize();
        person.validate()?;
        cancel.check()?;

        let saved = self.db.with_transaction(|tx| {
            let store = SqlPersonStore::new(tx);

            let previous = match person.id.as_deref() {
                Some(id) => Some(store.get(id)?),
                None => None,
            };

            if store.is_national_id_taken(&person.national_id, person.id.as_deref())? {
                return Err(AppError::validation(format!(
                    "Personnummer {} används redan",
                    person.national_id
                )));
            }

            ensure_exists(&store, person.mother_id.as_deref(), "mor")?;
            ensure_exists(&store, person.father_id.as_deref(), "far")?;
            ensure_exists(&store, person.spouse_id.as_deref(), "make/maka")?;

            match previous.as_ref() {
                Some(previous) => {
                    if self.reject_ancestry_cycles {
                        reject_ancestry_cycle(&store, &person)?;
                    }
                    person.created_at = previous.created_at.clone();
                    store.update(&person)?;
                }
                None => {
                    person.id = Some(Uuid::new_v4().to_string());
                    store.insert(&person)?;
                }
            }

            let id = person.id_str();
            SpouseLinkManager::new(tx).reconcile(
                id,
                person.spouse_id.as_deref(),
                previous.as_ref().and_then(|p| p.spouse_id.as_deref()),
            )?;

            cancel.check()?;
            store.get(id)
        })?;

        info!("Sparade person {} ({})", saved.id_str(), saved.full_name());
        Ok(saved)
    }

    /// Ta bort person. Föräldra- och make/maka-referenser till personen
    /// nollställs; personer i vigselregistret kan inte tas bort.
    pub fn delete(&self, id: &str) -> AppResult<()> {
        self.db.with_transaction(|tx| {
            if count_involving(tx, id)? > 0 {
                return Err(AppError::validation(format!(
                    "Person {} finns i vigselregistret och kan inte tas bort",
                    id
                )));
            }
            SqlPersonStore::new(tx).delete(id)
        })?;

        info!("Tog bort person {}", id);
        Ok(())
    }
}

fn ensure_exists(store: &SqlPersonStore<'_>, id: Option<&str>, role: &str) -> AppResult<()> {
    if let Some(id) = id {
        if store.find_by_id(id)?.is_none() {
            return Err(AppError::not_found(format!("{} med ID {}", role, id)));
        }
    }
    Ok(())
}

/// Avvisa föräldrar som själva härstammar från personen
fn reject_ancestry_cycle(store: &SqlPersonStore<'_>, person: &Person) -> AppResult<()> {
    let subject = person.id_str();
    let mut visited: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<String> = [person.mother_id.clone(), person.father_id.clone()]
        .into_iter()
        .flatten()
        .collect();

    while let Some(ancestor_id) = queue.pop_front() {
        if ancestor_id == subject {
            warn!("Avvisade föräldralänk som ger cykel för {}", subject);
            return Err(AppError::validation(
                "En person kan inte vara sin egen förfader",
            ));
        }
        if !visited.insert(ancestor_id.clone()) {
            continue;
        }
        if let Some(ancestor) = store.find_by_id(&ancestor_id)? {
            queue.extend(ancestor.mother_id);
            queue.extend(ancestor.father_id);
        }
    }

    Ok(())
}
