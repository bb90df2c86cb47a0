pub mod cancel;
pub mod date;
pub mod error;
pub mod path;

pub use cancel::CancelFlag;
pub use error::{AppError, AppResult};
