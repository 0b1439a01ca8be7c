//! Database models
//!
//! Rust structs representing catalog and plan rows.
//! All models use serde so they can be handed to a front end unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

use crate::config::DEFAULT_RATING;
use crate::planner::WeeklyPlan;

/// A named diet owning categories, foods and saved plans
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Diet {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A meal slot (Breakfast, Lunch, ...) ordered within its diet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct MealCategory {
    pub id: String,
    pub diet_id: String,
    pub name: String,
    pub order_index: i64,
}

/// A food grouping (Proteins, Fats, ...) ordered within its diet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct FoodCategory {
    pub id: String,
    pub diet_id: String,
    pub name: String,
    pub order_index: i64,
}

/// A rated food attached to one meal category.
///
/// `food_category_name` is a free-text tag, not a reference: removing or
/// renaming a food category leaves existing foods tagged with the old name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Food {
    pub id: String,
    pub diet_id: String,
    pub meal_category_id: String,
    pub name: String,
    pub food_category_name: String,
    pub portion: Option<String>,
    /// Preference from 1 (least) to 5 (most)
    pub rating: u8,
    /// Mandatory foods appear in every generated day
    pub mandatory: bool,
    pub created_at: DateTime<Utc>,
}

/// Create food request
#[derive(Debug, Clone, Deserialize)]
pub struct NewFood {
    pub diet_id: String,
    pub meal_category_id: String,
    pub name: String,
    pub food_category_name: String,
    pub portion: Option<String>,
    #[serde(default = "default_rating")]
    pub rating: i64,
    #[serde(default)]
    pub mandatory: bool,
}

fn default_rating() -> i64 {
    i64::from(DEFAULT_RATING)
}

/// Stored weekly plan row. `plan_data` is the JSON document written by
/// [`crate::planner::encode_plan`] and is never rewritten after insert.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WeeklyPlanRecord {
    pub id: String,
    pub diet_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub plan_data: String,
}

/// Stored weekly plan with its payload decoded
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedPlan {
    pub id: String,
    pub diet_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub plan: WeeklyPlan,
}

/// Direction for swapping a category with its neighbour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Up,
    Down,
}

impl FromStr for MoveDirection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "up" => Ok(MoveDirection::Up),
            "down" => Ok(MoveDirection::Down),
            other => Err(format!("Invalid move direction: {}", other)),
        }
    }
}

impl fmt::Display for MoveDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveDirection::Up => f.write_str("up"),
            MoveDirection::Down => f.write_str("down"),
        }
    }
}
