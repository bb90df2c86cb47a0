//! Genlib Kinship - släktskapsmotor för släktforskning
//!
//! Personer med föräldra- och make/maka-länkar lagras i SQLite. Från en
//! person räknas make/maka, far- och morföräldrar, föräldrar, helsyskon,
//! barn och ättlingar fram i en fast visningsordning.

pub mod db;
pub mod models;
pub mod services;
pub mod utils;

// Re-exports
pub use db::Database;
pub use models::*;
pub use services::{KinshipResolver, KinshipService, PersonDetail, PersonService, SpouseLinkManager};
pub use utils::{AppError, AppResult, CancelFlag};
