use serde::{Deserialize, Serialize};
use std::fmt;

/// Längd på ett personnummer/nationellt ID
pub const NATIONAL_ID_LEN: usize = 11;

/// Kön. `label` lagras i databasen, `sort_label` styr visningsordningen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Female,
    Male,
    Other,
}

impl Gender {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Female => "female",
            Self::Male => "male",
            Self::Other => "other",
        }
    }

    /// Registeretikett. Släktingar sorteras fallande på den inom samma rang,
    /// vilket ger kvinnor före män.
    pub fn sort_label(&self) -> &'static str {
        match self {
            Self::Female => "Kadın",
            Self::Male => "Erkek",
            Self::Other => "Diğer",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        match value {
            "female" => Some(Self::Female),
            "male" => Some(Self::Male),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn all() -> &'static [Self] {
        &[Self::Female, Self::Male, Self::Other]
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Tilldelas vid skapande, därefter oföränderligt
    pub id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub national_id: String,
    pub phone: Option<String>,
    pub bio: Option<String>,
    /// Referens till externt lagrad bild
    pub photo_ref: Option<String>,
    pub mother_id: Option<String>,
    pub father_id: Option<String>,
    pub spouse_id: Option<String>,
    pub gender: Gender,
    pub created_at: Option<String>,
}

impl Person {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        national_id: impl Into<String>,
        gender: Gender,
    ) -> Self {
        Self {
            id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            national_id: national_id.into(),
            phone: None,
            bio: None,
            photo_ref: None,
            mother_id: None,
            father_id: None,
            spouse_id: None,
            gender,
            created_at: None,
        }
    }

    pub fn with_parents(mut self, mother_id: Option<&str>, father_id: Option<&str>) -> Self {
        self.mother_id = mother_id.map(str::to_string);
        self.father_id = father_id.map(str::to_string);
        self
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// ID som sträng, tom om personen ännu inte sparats
    pub fn id_str(&self) -> &str {
        self.id.as_deref().unwrap_or("")
    }

    /// Båda föräldrarna när båda är kända
    pub fn parent_pair(&self) -> Option<(&str, &str)> {
        match (self.mother_id.as_deref(), self.father_id.as_deref()) {
            (Some(m), Some(f)) => Some((m, f)),
            _ => None,
        }
    }

    /// Trimma fält och gör tomma referenser till `None`
    pub fn normalize(&mut self) {
        fn clean(value: &mut Option<String>) {
            *value = value
                .take()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty());
        }

        self.first_name = self.first_name.trim().to_string();
        self.last_name = self.last_name.trim().to_string();
        self.national_id = self.national_id.trim().to_string();
        clean(&mut self.id);
        clean(&mut self.phone);
        clean(&mut self.bio);
        clean(&mut self.photo_ref);
        clean(&mut self.mother_id);
        clean(&mut self.father_id);
        clean(&mut self.spouse_id);
    }

    pub fn validate(&self) -> Result<(), PersonValidationError> {
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err(PersonValidationError::MissingName);
        }

        if self.national_id.chars().count() != NATIONAL_ID_LEN {
            return Err(PersonValidationError::InvalidNationalId);
        }

        if let Some(id) = self.id.as_deref() {
            if self.mother_id.as_deref() == Some(id) || self.father_id.as_deref() == Some(id) {
                return Err(PersonValidationError::OwnParent);
            }
            if self.spouse_id.as_deref() == Some(id) {
                return Err(PersonValidationError::OwnSpouse);
            }
        }

        if self.mother_id.is_some() && self.mother_id == self.father_id {
            return Err(PersonValidationError::SameParentTwice);
        }

        Ok(())
    }
}

/// Person med föräldrarnas namn, för listor och detaljvy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonWithParents {
    #[serde(flatten)]
    pub person: Person,
    pub mother_name: Option<String>,
    pub father_name: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum PersonValidationError {
    #[error("Förnamn och efternamn krävs")]
    MissingName,
    #[error("Personnummer måste vara exakt {} tecken", NATIONAL_ID_LEN)]
    InvalidNationalId,
    #[error("En person kan inte vara sin egen förälder")]
    OwnParent,
    #[error("En person kan inte vara gift med sig själv")]
    OwnSpouse,
    #[error("Mor och far kan inte vara samma person")]
    SameParentTwice,
}

impl From<PersonValidationError> for crate::utils::AppError {
    fn from(err: PersonValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name() {
        let person = Person::new("Ayşe", "Yılmaz", "12345678901", Gender::Female);
        assert_eq!(person.full_name(), "Ayşe Yılmaz");
    }

    #[test]
    fn test_gender_labels() {
        for gender in Gender::all() {
            assert_eq!(Gender::from_label(gender.label()), Some(*gender));
        }
        assert_eq!(Gender::from_label("unknown"), None);
    }

    #[test]
    fn test_sort_labels_descending_put_women_first() {
        let mut labels: Vec<&str> = Gender::all().iter().map(Gender::sort_label).collect();
        labels.sort_by(|a, b| b.cmp(a));
        assert_eq!(labels, vec!["Kadın", "Erkek", "Diğer"]);
    }

    #[test]
    fn test_validation() {
        let valid = Person::new("Johan", "Andersson", "12345678901", Gender::Male);
        assert!(valid.validate().is_ok());

        let short_id = Person::new("Johan", "Andersson", "1234", Gender::Male);
        assert!(matches!(
            short_id.validate(),
            Err(PersonValidationError::InvalidNationalId)
        ));

        let no_name = Person::new("  ", "Andersson", "12345678901", Gender::Male);
        assert!(matches!(
            no_name.validate(),
            Err(PersonValidationError::MissingName)
        ));
    }

    #[test]
    fn test_national_id_counts_characters() {
        // 11 tecken men fler än 11 bytes
        let person = Person::new("Ömer", "Çelik", "ÇÇÇÇÇÇÇÇÇÇÇ", Gender::Male);
        assert!(person.validate().is_ok());
    }

    #[test]
    fn test_self_references_rejected() {
        let mut person = Person::new("Johan", "Andersson", "12345678901", Gender::Male);
        person.id = Some("p1".into());
        person.father_id = Some("p1".into());
        assert!(matches!(person.validate(), Err(PersonValidationError::OwnParent)));

        person.father_id = None;
        person.spouse_id = Some("p1".into());
        assert!(matches!(person.validate(), Err(PersonValidationError::OwnSpouse)));
    }

    #[test]
    fn test_normalize_empty_references() {
        let mut person = Person::new(" Johan ", "Andersson", "12345678901", Gender::Male);
        person.mother_id = Some(String::new());
        person.spouse_id = Some("  ".into());
        person.phone = Some(" 0701234567 ".into());
        person.normalize();

        assert_eq!(person.first_name, "Johan");
        assert_eq!(person.mother_id, None);
        assert_eq!(person.spouse_id, None);
        assert_eq!(person.phone.as_deref(), Some("0701234567"));
    }
}
