use thiserror::Error;

use crate::domain::InvalidInput;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    InvalidInput(#[from] InvalidInput),

    #[error("{0} cannot be empty")]
    EmptyName(&'static str),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("User already exists: {0}")]
    UserAlreadyExists(String),

    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    #[error("Category already exists: {0}")]
    CategoryAlreadyExists(String),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}
