//! Weekly plan generation
//!
//! - `generator`: the pure plan generator and its weighted selection policy
//! - `random`: injectable randomness
//! - `plan`: the plan value and its persisted JSON encoding

pub mod generator;
pub mod plan;
pub mod random;

pub use generator::{generate_weekly_plan, preference_weight, select_for_meal};
pub use plan::{decode_plan, encode_plan, DayPlan, MealSelection, SelectedFood, WeeklyPlan};
pub use random::{RandomSource, RngSource};
