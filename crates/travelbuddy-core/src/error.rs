use thiserror::Error;

/// Failures of the durable key-value backend.
///
/// These never escape `PersistentStore`; they are logged and the caller
/// gets a default value or a `false` success flag instead.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage lock poisoned")]
    Poisoned,
}

/// User-input rejections, surfaced to the front end with a readable reason.
///
/// An operation that returns one of these has not changed anything.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Amount must be greater than 0")]
    NonPositiveAmount,

    #[error("Budget amount cannot be negative")]
    NegativeBudget,

    #[error("Start date cannot be in the past")]
    StartInPast,

    #[error("End date must be after start date")]
    EndBeforeStart,

    #[error("Trip must have at least one day")]
    LastDay,

    #[error("Day {0} does not exist")]
    NoSuchDay(usize),

    #[error("Activity {0} does not exist")]
    NoSuchActivity(usize),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Category already exists: {0}")]
    DuplicateCategory(String),

    #[error("Please select an image file")]
    NotAnImage,

    #[error("Image size must be less than 5MB")]
    ImageTooLarge,

    #[error("Invalid trip file: {0}")]
    InvalidImport(String),
}
