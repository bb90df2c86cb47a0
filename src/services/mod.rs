//! Tjänster för släktskap
//!
//! Affärslogik ovanpå databasen: skrivningar av personer, make/maka-länkar
//! och upplösning av släktingar.

pub mod kinship;
pub mod people;
pub mod spouse_link;

pub use kinship::{KinshipResolver, KinshipService, PersonDetail};
pub use people::PersonService;
pub use spouse_link::SpouseLinkManager;
