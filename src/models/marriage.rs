use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status i vigselregistret. Registret skriver bara `married`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarriageStatus {
    #[default]
    Married,
}

impl MarriageStatus {
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "married" => Some(Self::Married),
            _ => None,
        }
    }
}

impl fmt::Display for MarriageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Married => write!(f, "married"),
        }
    }
}

/// En post i vigselregistret. Oberoende av `Person::spouse_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marriage {
    pub id: Option<String>,
    pub person1_id: String,
    pub person2_id: String,
    pub date: NaiveDate,
    pub status: MarriageStatus,
}

impl Marriage {
    pub fn new(person1_id: impl Into<String>, person2_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: None,
            person1_id: person1_id.into(),
            person2_id: person2_id.into(),
            date,
            status: MarriageStatus::default(),
        }
    }

    pub fn involves(&self, person_id: &str) -> bool {
        self.person1_id == person_id || self.person2_id == person_id
    }
}
