use crate::models::Person;
use crate::utils::AppResult;

/// Läsyta som släktskapsberäkningen behöver.
///
/// Alla uppslag är ögonblicksbilder; beräkningen skriver aldrig.
pub trait PersonStore {
    /// Hämta person, `NotFound` om den saknas
    fn get(&self, id: &str) -> AppResult<Person>;

    /// (mor, far) för personen. Okända eller saknade föräldrar blir `None`.
    fn find_parents_of(&self, id: &str) -> AppResult<(Option<Person>, Option<Person>)>;

    /// Personer med `id` som mor eller far
    fn find_children_of(&self, id: &str) -> AppResult<Vec<Person>>;

    /// Personer med exakt detta föräldrapar
    fn find_by_parent_pair(&self, mother_id: &str, father_id: &str) -> AppResult<Vec<Person>>;

    fn find_spouse_of(&self, id: &str) -> AppResult<Option<Person>>;
}
