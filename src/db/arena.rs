use std::collections::HashMap;

use super::store::PersonStore;
use crate::models::Person;
use crate::utils::{AppError, AppResult};

/// Personer i minnet, nycklade på ID. Alla länkar är ID-uppslag.
#[derive(Debug, Clone, Default)]
pub struct PersonArena {
    people: HashMap<String, Person>,
}

impl PersonArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_people(people: impl IntoIterator<Item = Person>) -> AppResult<Self> {
        let mut arena = Self::new();
        for person in people {
            arena.insert(person)?;
        }
        Ok(arena)
    }

    /// Lägg till eller ersätt en person. ID krävs.
    pub fn insert(&mut self, person: Person) -> AppResult<()> {
        let id = person
            .id
            .clone()
            .ok_or_else(|| AppError::validation("Person saknar ID"))?;
        self.people.insert(id, person);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    fn lookup(&self, id: Option<&str>) -> Option<Person> {
        id.and_then(|id| self.people.get(id)).cloned()
    }
}

impl PersonStore for PersonArena {
    fn get(&self, id: &str) -> AppResult<Person> {
        self.people
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Person med ID {}", id)))
    }

    fn find_parents_of(&self, id: &str) -> AppResult<(Option<Person>, Option<Person>)> {
        let person = self.get(id)?;
        Ok((
            self.lookup(person.mother_id.as_deref()),
            self.lookup(person.father_id.as_deref()),
        ))
    }

    fn find_children_of(&self, id: &str) -> AppResult<Vec<Person>> {
        Ok(self
            .people
            .values()
            .filter(|p| p.mother_id.as_deref() == Some(id) || p.father_id.as_deref() == Some(id))
            .cloned()
            .collect())
    }

    fn find_by_parent_pair(&self, mother_id: &str, father_id: &str) -> AppResult<Vec<Person>> {
        Ok(self
            .people
            .values()
            .filter(|p| p.parent_pair() == Some((mother_id, father_id)))
            .cloned()
            .collect())
    }

    fn find_spouse_of(&self, id: &str) -> AppResult<Option<Person>> {
        let person = self.get(id)?;
        Ok(self.lookup(person.spouse_id.as_deref()))
    }
}
