use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Databasfel: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Databasfel: {0}")]
    StorageMessage(String),

    #[error("IO-fel: {0}")]
    Io(#[from] std::io::Error),

    #[error("Valideringsfel: {0}")]
    Validation(String),

    #[error("Hittades inte: {0}")]
    NotFound(String),

    /// Make/maka-länken kunde inte uppdateras fullständigt och rullades tillbaka
    #[error("Inkonsekvent make/maka-länk: {0}")]
    LinkConsistency(String),

    #[error("Åtgärden avbröts")]
    Cancelled,
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn link_consistency(msg: impl Into<String>) -> Self {
        Self::LinkConsistency(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::StorageMessage(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

pub type AppResult<T> = Result<T, AppError>;
