//! Weekly plan value and its persisted JSON document
//!
//! The document is a JSON object keyed by the seven day names. Each day maps
//! meal-category names to arrays of selected foods:
//!
//! ```json
//! {
//!   "Monday": {
//!     "Breakfast": [
//!       {"name": "Oatmeal", "type": "Carbohydrates", "portion": "80g", "rating": 5, "mandatory": true}
//!     ]
//!   },
//!   "Tuesday": { ... }
//! }
//! ```
//!
//! Day order is always re-derived from [`DAY_NAMES`]. Meal order inside a day
//! follows the document as written.

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{DAY_NAMES, MAX_RATING, MIN_RATING};
use crate::database::Food;
use crate::error::{AppError, Result};

/// One food picked for a meal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedFood {
    pub name: String,
    #[serde(rename = "type")]
    pub food_category_name: String,
    /// Free-text portion, empty when the food has none
    pub portion: String,
    #[serde(deserialize_with = "deserialize_rating")]
    pub rating: u8,
    pub mandatory: bool,
}

impl From<&Food> for SelectedFood {
    fn from(food: &Food) -> Self {
        Self {
            name: food.name.clone(),
            food_category_name: food.food_category_name.clone(),
            portion: food.portion.clone().unwrap_or_default(),
            rating: food.rating,
            mandatory: food.mandatory,
        }
    }
}

fn deserialize_rating<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = i64::deserialize(deserializer)?;
    u8::try_from(value)
        .ok()
        .filter(|rating| (MIN_RATING..=MAX_RATING).contains(rating))
        .ok_or_else(|| {
            de::Error::custom(format!(
                "rating {} outside {}..={}",
                value, MIN_RATING, MAX_RATING
            ))
        })
}

/// The foods chosen for one meal category on one day
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MealSelection {
    pub meal_category: String,
    pub foods: Vec<SelectedFood>,
}

/// All meal selections of one day, in meal-category order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayPlan {
    meals: Vec<MealSelection>,
}

impl DayPlan {
    pub fn new(meals: Vec<MealSelection>) -> Self {
        Self { meals }
    }

    pub fn meals(&self) -> &[MealSelection] {
        &self.meals
    }

    /// Foods selected for a meal category, if the day has that category
    pub fn meal(&self, meal_category: &str) -> Option<&[SelectedFood]> {
        self.meals
            .iter()
            .find(|m| m.meal_category == meal_category)
            .map(|m| m.foods.as_slice())
    }
}

impl Serialize for DayPlan {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.meals.len()))?;
        for meal in &self.meals {
            map.serialize_entry(&meal.meal_category, &meal.foods)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for DayPlan {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DayVisitor;

        impl<'de> Visitor<'de> for DayVisitor {
            type Value = DayPlan;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of meal category names to food lists")
            }

            fn visit_map<A>(self, mut access: A) -> std::result::Result<DayPlan, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut meals: Vec<MealSelection> = Vec::new();
                while let Some((meal_category, foods)) =
                    access.next_entry::<String, Vec<SelectedFood>>()?
                {
                    if meals.iter().any(|m| m.meal_category == meal_category) {
                        return Err(de::Error::custom(format!(
                            "duplicate meal category `{}`",
                            meal_category
                        )));
                    }
                    meals.push(MealSelection {
                        meal_category,
                        foods,
                    });
                }
                Ok(DayPlan { meals })
            }
        }

        deserializer.deserialize_map(DayVisitor)
    }
}

/// A generated week: exactly seven days, Monday through Sunday
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyPlan {
    days: [DayPlan; 7],
}

impl WeeklyPlan {
    /// Build a plan from the seven days in [`DAY_NAMES`] order
    pub fn new(days: [DayPlan; 7]) -> Self {
        Self { days }
    }

    /// Days paired with their names, Monday first
    pub fn days(&self) -> impl Iterator<Item = (&'static str, &DayPlan)> {
        DAY_NAMES.iter().copied().zip(self.days.iter())
    }

    pub fn day(&self, name: &str) -> Option<&DayPlan> {
        DAY_NAMES
            .iter()
            .position(|day| *day == name)
            .map(|index| &self.days[index])
    }

    /// Number of foods selected across the whole week
    pub fn selection_count(&self) -> usize {
        self.days
            .iter()
            .flat_map(|day| day.meals.iter())
            .map(|meal| meal.foods.len())
            .sum()
    }
}

impl Serialize for WeeklyPlan {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(DAY_NAMES.len()))?;
        for (name, day) in self.days() {
            map.serialize_entry(name, day)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for WeeklyPlan {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct WeekVisitor;

        impl<'de> Visitor<'de> for WeekVisitor {
            type Value = WeeklyPlan;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map keyed by the seven day names")
            }

            fn visit_map<A>(self, mut access: A) -> std::result::Result<WeeklyPlan, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut slots: [Option<DayPlan>; 7] = Default::default();

                while let Some(name) = access.next_key::<String>()? {
                    let index = DAY_NAMES
                        .iter()
                        .position(|day| *day == name)
                        .ok_or_else(|| <A::Error as de::Error>::unknown_field(&name, &DAY_NAMES))?;

                    if slots[index].is_some() {
                        return Err(de::Error::custom(format!("duplicate day `{}`", name)));
                    }
                    slots[index] = Some(access.next_value()?);
                }

                let mut days: [DayPlan; 7] = Default::default();
                for (index, slot) in slots.into_iter().enumerate() {
                    days[index] = slot.ok_or_else(|| {
                        <A::Error as de::Error>::missing_field(DAY_NAMES[index])
                    })?;
                }

                Ok(WeeklyPlan { days })
            }
        }

        deserializer.deserialize_map(WeekVisitor)
    }
}

/// Encode a plan into the text document stored by the plan store
pub fn encode_plan(plan: &WeeklyPlan) -> Result<String> {
    Ok(serde_json::to_string(plan)?)
}

/// Decode a stored plan document. Shape violations are reported, never repaired.
pub fn decode_plan(data: &str) -> Result<WeeklyPlan> {
    serde_json::from_str(data).map_err(|e| AppError::MalformedPlan(e.to_string()))
}
