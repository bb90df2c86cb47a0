use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::person::Person;

/// Generation för make/maka i resultatlistan
pub const SPOUSE_GENERATION: i32 = -3;
pub const GRANDPARENT_GENERATION: i32 = -2;
pub const PARENT_GENERATION: i32 = -1;
pub const SIBLING_GENERATION: i32 = 0;
pub const CHILD_GENERATION: i32 = 1;

/// Visningsrang. Ordningen är ett externt kontrakt och får inte ändras.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum KinshipRank {
    Spouse = 1,
    Grandparent = 2,
    Parent = 3,
    Sibling = 4,
    Child = 5,
    Descendant = 6,
    Other = 7,
}

impl KinshipRank {
    pub fn from_generation(generation: i32) -> Self {
        match generation {
            SPOUSE_GENERATION => Self::Spouse,
            GRANDPARENT_GENERATION => Self::Grandparent,
            PARENT_GENERATION => Self::Parent,
            SIBLING_GENERATION => Self::Sibling,
            CHILD_GENERATION => Self::Child,
            g if g >= 2 => Self::Descendant,
            _ => Self::Other,
        }
    }
}

/// En släkting relativt en rotperson
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relative {
    pub person: Person,
    /// Negativ = förfäder, positiv = ättlingar, -3 = make/maka
    pub generation: i32,
    pub rank: KinshipRank,
    pub mother_name: Option<String>,
    pub father_name: Option<String>,
}

impl Relative {
    pub fn new(person: Person, generation: i32) -> Self {
        Self {
            person,
            generation,
            rank: KinshipRank::from_generation(generation),
            mother_name: None,
            father_name: None,
        }
    }

    /// Visningsordning: rang, kön fallande, förnamn stigande.
    /// Efternamn och id bryter kvarvarande lika poster.
    pub fn display_cmp(&self, other: &Self) -> Ordering {
        self.rank
            .cmp(&other.rank)
            .then_with(|| other.person.gender.sort_label().cmp(self.person.gender.sort_label()))
            .then_with(|| self.person.first_name.cmp(&other.person.first_name))
            .then_with(|| self.person.last_name.cmp(&other.person.last_name))
            .then_with(|| self.person.id.cmp(&other.person.id))
    }
}

/// Sortera släktingar i visningsordning
pub fn sort_relatives(relatives: &mut [Relative]) {
    relatives.sort_by(Relative::display_cmp);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Gender;

    fn relative(first: &str, gender: Gender, generation: i32) -> Relative {
        let mut person = Person::new(first, "Test", "12345678901", gender);
        person.id = Some(first.to_lowercase());
        Relative::new(person, generation)
    }

    #[test]
    fn test_rank_from_generation() {
        assert_eq!(KinshipRank::from_generation(-3), KinshipRank::Spouse);
        assert_eq!(KinshipRank::from_generation(-2), KinshipRank::Grandparent);
        assert_eq!(KinshipRank::from_generation(-1), KinshipRank::Parent);
        assert_eq!(KinshipRank::from_generation(0), KinshipRank::Sibling);
        assert_eq!(KinshipRank::from_generation(1), KinshipRank::Child);
        assert_eq!(KinshipRank::from_generation(2), KinshipRank::Descendant);
        assert_eq!(KinshipRank::from_generation(7), KinshipRank::Descendant);
        assert_eq!(KinshipRank::from_generation(-4), KinshipRank::Other);
    }

    #[test]
    fn test_display_order() {
        let mut list = vec![
            relative("Zeynep", Gender::Female, 1),
            relative("Ali", Gender::Male, 1),
            relative("Can", Gender::Male, 1),
            relative("Deniz", Gender::Female, -1),
            relative("Elif", Gender::Female, -3),
            relative("Ege", Gender::Male, 3),
            relative("Fatma", Gender::Female, 2),
        ];
        sort_relatives(&mut list);

        let names: Vec<&str> = list.iter().map(|r| r.person.first_name.as_str()).collect();
        // Kvinnor före män inom samma rang. Alla ättlingar delar rang oavsett djup.
        assert_eq!(names, vec!["Elif", "Deniz", "Zeynep", "Ali", "Can", "Fatma", "Ege"]);
    }

    #[test]
    fn test_other_gender_sorts_last_within_rank() {
        let mut list = vec![
            relative("Ada", Gender::Other, 0),
            relative("Cem", Gender::Male, 0),
            relative("Selin", Gender::Female, 0),
        ];
        sort_relatives(&mut list);

        let names: Vec<&str> = list.iter().map(|r| r.person.first_name.as_str()).collect();
        assert_eq!(names, vec!["Selin", "Cem", "Ada"]);
    }

    #[test]
    fn test_first_name_compared_bytewise() {
        let mut list = vec![
            relative("ali", Gender::Male, 0),
            relative("Ali", Gender::Male, 0),
            relative("Ömer", Gender::Male, 0),
            relative("Zafer", Gender::Male, 0),
        ];
        sort_relatives(&mut list);

        let names: Vec<&str> = list.iter().map(|r| r.person.first_name.as_str()).collect();
        assert_eq!(names, vec!["Ali", "Zafer", "ali", "Ömer"]);
    }
}
