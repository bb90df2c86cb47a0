//! Släktskapsberäkning kring en rotperson
//!
//! Förfäder hämtas med två fasta steg uppåt (föräldrar, far-/morföräldrar).
//! Ättlingar hämtas bredden-först utan djupgräns, med besökt-mängd.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::db::{Database, PersonStore, SqlPersonStore};
use crate::models::{
    sort_relatives, Person, PersonWithParents, Relative, CHILD_GENERATION, GRANDPARENT_GENERATION,
    PARENT_GENERATION, SIBLING_GENERATION, SPOUSE_GENERATION,
};
use crate::utils::{AppResult, CancelFlag};

/// Rotperson med föräldranamn och sorterade släktingar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonDetail {
    pub person: PersonWithParents,
    pub relatives: Vec<Relative>,
}

/// Ren beräkning över en `PersonStore`. Skriver aldrig.
pub struct KinshipResolver<'s, S: PersonStore + ?Sized> {
    store: &'s S,
    cancel: CancelFlag,
}

impl<'s, S: PersonStore + ?Sized> KinshipResolver<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self {
            store,
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Beräkna sorterade släktingar till `root_id`.
    ///
    /// Okänd rot ger `NotFound`; alla andra fel avbryter hela beräkningen.
    pub fn resolve(&self, root_id: &str) -> AppResult<Vec<Relative>> {
        let root = self.store.get(root_id)?;
        let mut relatives = Vec::new();

        if let Some(spouse) = self.store.find_spouse_of(root_id)? {
            relatives.push(Relative::new(spouse, SPOUSE_GENERATION));
        }

        self.cancel.check()?;
        self.collect_ancestors(root_id, &mut relatives)?;

        self.cancel.check()?;
        self.collect_siblings(&root, &mut relatives)?;

        self.collect_descendants(root_id, &mut relatives)?;

        self.attach_parent_names(&root, &mut relatives)?;
        sort_relatives(&mut relatives);

        debug!("Släktskap för {}: {} släktingar", root_id, relatives.len());
        Ok(relatives)
    }

    /// Föräldrar och deras föräldrar, exakt två nivåer
    fn collect_ancestors(&self, root_id: &str, relatives: &mut Vec<Relative>) -> AppResult<()> {
        let (mother, father) = self.store.find_parents_of(root_id)?;
        let mut grandparents_seen = HashSet::new();

        for parent in [mother, father].into_iter().flatten() {
            let (grandmother, grandfather) = self.store.find_parents_of(parent.id_str())?;
            for grandparent in [grandmother, grandfather].into_iter().flatten() {
                if grandparents_seen.insert(grandparent.id_str().to_string()) {
                    relatives.push(Relative::new(grandparent, GRANDPARENT_GENERATION));
                }
            }
            relatives.push(Relative::new(parent, PARENT_GENERATION));
        }

        Ok(())
    }

    /// Helsyskon: samma mor och samma far. Halvsyskon räknas inte.
    fn collect_siblings(&self, root: &Person, relatives: &mut Vec<Relative>) -> AppResult<()> {
        let Some((mother_id, father_id)) = root.parent_pair() else {
            return Ok(());
        };

        for sibling in self.store.find_by_parent_pair(mother_id, father_id)? {
            if sibling.id != root.id {
                relatives.push(Relative::new(sibling, SIBLING_GENERATION));
            }
        }

        Ok(())
    }

    /// Barn och alla ättlingar, märkta med sitt verkliga djup
    fn collect_descendants(&self, root_id: &str, relatives: &mut Vec<Relative>) -> AppResult<()> {
        let mut visited: HashSet<String> = HashSet::from([root_id.to_string()]);
        let mut queue: VecDeque<(String, i32)> = VecDeque::from([(root_id.to_string(), 0)]);

        while let Some((person_id, depth)) = queue.pop_front() {
            self.cancel.check()?;

            for child in self.store.find_children_of(&person_id)? {
                let child_id = child.id_str().to_string();
                if visited.insert(child_id.clone()) {
                    let generation = depth + CHILD_GENERATION;
                    queue.push_back((child_id, generation));
                    relatives.push(Relative::new(child, generation));
                }
            }
        }

        Ok(())
    }

    fn attach_parent_names(&self, root: &Person, relatives: &mut [Relative]) -> AppResult<()> {
        let mut names: HashMap<String, Option<String>> = HashMap::new();
        names.insert(root.id_str().to_string(), Some(root.full_name()));
        for relative in relatives.iter() {
            names.insert(
                relative.person.id_str().to_string(),
                Some(relative.person.full_name()),
            );
        }

        for relative in relatives.iter_mut() {
            relative.mother_name = self.name_of(relative.person.mother_id.as_deref(), &mut names)?;
            relative.father_name = self.name_of(relative.person.father_id.as_deref(), &mut names)?;
        }

        Ok(())
    }

    fn name_of(
        &self,
        id: Option<&str>,
        names: &mut HashMap<String, Option<String>>,
    ) -> AppResult<Option<String>> {
        let Some(id) = id else {
            return Ok(None);
        };
        if let Some(name) = names.get(id) {
            return Ok(name.clone());
        }

        let name = match self.store.get(id) {
            Ok(person) => Some(person.full_name()),
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(e),
        };
        names.insert(id.to_string(), name.clone());
        Ok(name)
    }
}

/// Kör släktskapsberäkningen mot databasen i en enda ögonblicksbild
pub struct KinshipService<'a> {
    db: &'a Database,
}

impl<'a> KinshipService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn resolve_kinship(&self, root_id: &str) -> AppResult<Vec<Relative>> {
        self.resolve_kinship_with(root_id, &CancelFlag::new())
    }

    pub fn resolve_kinship_with(&self, root_id: &str, cancel: &CancelFlag) -> AppResult<Vec<Relative>> {
        self.db.with_snapshot(|conn| {
            let store = SqlPersonStore::new(conn);
            KinshipResolver::new(&store)
                .with_cancel(cancel.clone())
                .resolve(root_id)
        })
    }

    /// Detaljvy: personen, föräldrarnas namn och släktingarna
    pub fn person_detail(&self, root_id: &str) -> AppResult<PersonDetail> {
        self.db.with_snapshot(|conn| {
            let store = SqlPersonStore::new(conn);
            let person = store.find_with_parents(root_id)?;
            let relatives = KinshipResolver::new(&store).resolve(root_id)?;
            Ok(PersonDetail { person, relatives })
        })
    }
}
