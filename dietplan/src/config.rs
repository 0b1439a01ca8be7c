//! Application configuration constants
//!
//! Central location for the fixed domain vocabulary, validation boundaries
//! and the runtime configuration resolved from the environment.

use std::path::PathBuf;

// ===== Weekly Plan Shape =====

/// Day names used as top-level keys of every weekly plan, in plan order.
pub const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

// ===== Food Rating Limits =====

/// Lowest preference rating a food can carry
pub const MIN_RATING: u8 = 1;

/// Highest preference rating a food can carry
pub const MAX_RATING: u8 = 5;

/// Rating assigned when a caller does not pick one
pub const DEFAULT_RATING: u8 = 3;

// ===== Catalog Defaults =====

/// Food categories every diet is seeded with, in display order.
/// Seeding is additive and never touches custom categories.
pub const DEFAULT_FOOD_CATEGORIES: &[&str] =
    &["Fruits", "Vegetables", "Proteins", "Carbohydrates", "Fats"];

/// Meal categories offered as one-click presets
pub const PRESET_MEAL_CATEGORIES: &[&str] = &["Breakfast", "Lunch", "Dinner", "Snack"];

/// Maximum length for diet, category, food and plan names
pub const MAX_NAME_LENGTH: usize = 100;

// ===== Storage =====

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "DIETPLAN_DATA_DIR";

/// Data directory used when nothing else is configured
pub const DEFAULT_DATA_DIR: &str = "data";

/// SQLite database file name inside the data directory
pub const DATABASE_FILE_NAME: &str = "diet_app.db";

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
}

impl AppConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Resolve configuration from `DIETPLAN_DATA_DIR`, falling back to `./data`.
    pub fn from_env() -> Self {
        let data_dir = std::env::var(DATA_DIR_ENV).unwrap_or_else(|_| DEFAULT_DATA_DIR.into());
        Self::new(data_dir)
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE_NAME)
    }
}
