//! Error types for the diet planner
//!
//! All errors use thiserror for structured error handling.
//! These errors can be serialized for any front end as plain strings.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Diet not found: {0}")]
    DietNotFound(String),

    #[error("Meal category not found: {0}")]
    MealCategoryNotFound(String),

    #[error("Food category not found: {0}")]
    FoodCategoryNotFound(String),

    #[error("Food not found: {0}")]
    FoodNotFound(String),

    #[error("Weekly plan not found: {0}")]
    PlanNotFound(String),

    #[error("Invalid rating {0}: must be between 1 and 5")]
    InvalidRating(i64),

    #[error("Validation error: {0}")]
    Validation(String),

    /// The diet has no meal categories, or none of them has a food.
    #[error("Diet {0} has nothing to plan: add meal categories and foods first")]
    EmptyCatalog(String),

    #[error("Malformed weekly plan: {0}")]
    MalformedPlan(String),
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
