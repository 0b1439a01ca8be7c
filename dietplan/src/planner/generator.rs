//! Weekly plan generation
//!
//! Every day is built independently. For each meal category the mandatory
//! foods are always included, then one optional food is drawn from each
//! food-category group with probability proportional to `rating²`.

use crate::config::{DAY_NAMES, MAX_RATING, MIN_RATING};
use crate::database::{Food, MealCategory};

use super::plan::{DayPlan, MealSelection, SelectedFood, WeeklyPlan};
use super::random::RandomSource;

/// Selection weight of a food. Ratings outside 1..=5 are clamped so every
/// food keeps a nonzero chance.
pub fn preference_weight(rating: u8) -> u32 {
    u32::from(rating.clamp(MIN_RATING, MAX_RATING)).pow(2)
}

/// Generate a seven-day plan.
///
/// `food_lookup` returns the foods of a meal category in stored order. Meal
/// categories are expected to have distinct names; a repeated name is merged
/// into the entry of its first occurrence. Empty categories yield empty
/// selections, so this never fails.
pub fn generate_weekly_plan<F, R>(
    meal_categories: &[MealCategory],
    mut food_lookup: F,
    rng: &mut R,
) -> WeeklyPlan
where
    F: FnMut(&MealCategory) -> Vec<Food>,
    R: RandomSource + ?Sized,
{
    let days: [DayPlan; 7] = std::array::from_fn(|_| {
        let mut meals: Vec<MealSelection> = Vec::with_capacity(meal_categories.len());

        for category in meal_categories {
            let foods = food_lookup(category);
            let selected = select_for_meal(&foods, &mut *rng);

            match meals.iter_mut().find(|m| m.meal_category == category.name) {
                Some(existing) => existing.foods.extend(selected),
                None => meals.push(MealSelection {
                    meal_category: category.name.clone(),
                    foods: selected,
                }),
            }
        }

        DayPlan::new(meals)
    });

    let plan = WeeklyPlan::new(days);

    tracing::debug!(
        "Generated weekly plan: {} meal categories, {} selections over {} days",
        meal_categories.len(),
        plan.selection_count(),
        DAY_NAMES.len()
    );

    plan
}

/// One meal's selection: all mandatory foods in stored order, then one pick
/// per optional food-category group, groups in order of first appearance.
pub fn select_for_meal<R>(foods: &[Food], rng: &mut R) -> Vec<SelectedFood>
where
    R: RandomSource + ?Sized,
{
    let (mandatory, optional): (Vec<&Food>, Vec<&Food>) = foods.iter().partition(|f| f.mandatory);

    let mut selection: Vec<SelectedFood> =
        mandatory.into_iter().map(SelectedFood::from).collect();

    for (_, group) in group_by_food_category(&optional) {
        let weights: Vec<u32> = group.iter().map(|f| preference_weight(f.rating)).collect();

        if let Some(food) = rng.pick_weighted(&weights).and_then(|i| group.get(i)) {
            selection.push(SelectedFood::from(*food));
        }
    }

    selection
}

fn group_by_food_category<'a>(foods: &[&'a Food]) -> Vec<(&'a str, Vec<&'a Food>)> {
    let mut groups: Vec<(&'a str, Vec<&'a Food>)> = Vec::new();

    for &food in foods {
        let key = food.food_category_name.as_str();
        match groups.iter_mut().find(|(name, _)| *name == key) {
            Some((_, members)) => members.push(food),
            None => groups.push((key, vec![food])),
        }
    }

    groups
}
