pub mod person;
pub mod marriage;
pub mod kinship;
pub mod config;

pub use person::*;
pub use marriage::*;
pub use kinship::*;
pub use config::*;
