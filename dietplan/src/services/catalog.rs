//! Catalog service
//!
//! Diets, their ordered meal and food categories, and rated foods.
//! Validates input before it reaches the repository.

use crate::config::{MAX_NAME_LENGTH, MAX_RATING, MIN_RATING, PRESET_MEAL_CATEGORIES};
use crate::database::{
    Diet, Food, FoodCategory, MealCategory, MoveDirection, NewFood, Repository,
};
use crate::error::{AppError, Result};

/// Service for managing the diet catalog
#[derive(Clone)]
pub struct CatalogService {
    repo: Repository,
}

impl CatalogService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    // ===== Diets =====

    /// Create a diet and seed its default food categories
    pub async fn create_diet(&self, name: &str) -> Result<Diet> {
        let name = validate_name("Diet", name)?;
        tracing::info!("Creating diet: {}", name);

        let diet = self.repo.create_diet(&name).await?;
        self.repo.ensure_default_food_categories(&diet.id).await?;

        tracing::info!("Diet created successfully: {}", diet.id);
        Ok(diet)
    }

    pub async fn get_diet(&self, id: &str) -> Result<Diet> {
        self.repo.get_diet(id).await
    }

    pub async fn list_diets(&self) -> Result<Vec<Diet>> {
        self.repo.list_diets().await
    }

    /// Delete a diet with its categories, foods and saved plans
    pub async fn delete_diet(&self, id: &str) -> Result<()> {
        tracing::info!("Deleting diet: {}", id);
        self.repo.delete_diet(id).await
    }

    // ===== Meal categories =====

    /// Append a meal category. Names are unique within a diet because they
    /// key the generated plan.
    pub async fn add_meal_category(&self, diet_id: &str, name: &str) -> Result<MealCategory> {
        let name = validate_name("Meal category", name)?;
        self.repo.get_diet(diet_id).await?;

        let existing = self.repo.list_meal_categories(diet_id).await?;
        if existing.iter().any(|c| c.name == name) {
            return Err(AppError::Validation(format!(
                "Meal category '{}' already exists in this diet",
                name
            )));
        }

        let category = self.repo.add_meal_category(diet_id, &name).await?;

        tracing::info!("Meal category added: {} ({})", category.name, category.id);
        Ok(category)
    }

    /// Append every preset meal category the diet does not have yet,
    /// in preset order. Returns the categories added.
    pub async fn add_preset_meal_categories(&self, diet_id: &str) -> Result<Vec<MealCategory>> {
        self.repo.get_diet(diet_id).await?;

        let existing = self.repo.list_meal_categories(diet_id).await?;
        let mut added = Vec::new();

        for preset in PRESET_MEAL_CATEGORIES.iter().copied() {
            if existing.iter().any(|c| c.name == preset) {
                continue;
            }
            added.push(self.repo.add_meal_category(diet_id, preset).await?);
        }

        tracing::info!("Added {} preset meal categories to diet {}", added.len(), diet_id);
        Ok(added)
    }

    pub async fn list_meal_categories(&self, diet_id: &str) -> Result<Vec<MealCategory>> {
        self.repo.list_meal_categories(diet_id).await
    }

    /// Swap a meal category with its neighbour; a no-op at either end
    pub async fn move_meal_category(&self, id: &str, direction: MoveDirection) -> Result<bool> {
        self.repo.move_meal_category(id, direction).await
    }

    /// Delete a meal category together with its foods
    pub async fn delete_meal_category(&self, id: &str) -> Result<()> {
        tracing::info!("Deleting meal category: {}", id);
        self.repo.delete_meal_category(id).await
    }

    // ===== Food categories =====

    /// Add a food category; an existing category with that name is returned as is
    pub async fn add_food_category(&self, diet_id: &str, name: &str) -> Result<FoodCategory> {
        let name = validate_name("Food category", name)?;
        self.repo.get_diet(diet_id).await?;

        self.repo.add_food_category(diet_id, &name).await
    }

    /// List food categories, seeding the defaults on first use
    pub async fn list_food_categories(&self, diet_id: &str) -> Result<Vec<FoodCategory>> {
        self.ensure_default_food_categories(diet_id).await?;
        self.repo.list_food_categories(diet_id).await
    }

    /// Add any missing default food category. Never removes or renames.
    pub async fn ensure_default_food_categories(&self, diet_id: &str) -> Result<usize> {
        self.repo.get_diet(diet_id).await?;
        self.repo.ensure_default_food_categories(diet_id).await
    }

    pub async fn move_food_category(&self, id: &str, direction: MoveDirection) -> Result<bool> {
        self.repo.move_food_category(id, direction).await
    }

    /// Delete a food category. Foods keep their tag.
    pub async fn delete_food_category(&self, id: &str) -> Result<()> {
        tracing::info!("Deleting food category: {}", id);
        self.repo.delete_food_category(id).await
    }

    // ===== Foods =====

    /// Add a food to a meal category of the same diet
    pub async fn add_food(&self, request: NewFood) -> Result<Food> {
        let name = validate_name("Food", &request.name)?;
        let food_category_name = validate_name("Food category", &request.food_category_name)?;
        let rating = validate_rating(request.rating)?;

        let meal_category = self.repo.get_meal_category(&request.meal_category_id).await?;
        if meal_category.diet_id != request.diet_id {
            return Err(AppError::Validation(format!(
                "Meal category {} does not belong to diet {}",
                meal_category.id, request.diet_id
            )));
        }

        let portion = request
            .portion
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        let food = self
            .repo
            .create_food(&NewFood {
                name,
                food_category_name,
                portion,
                rating: i64::from(rating),
                ..request
            })
            .await?;

        tracing::info!(
            "Food added: {} to {} (rating {}, mandatory {})",
            food.name,
            meal_category.name,
            food.rating,
            food.mandatory
        );
        Ok(food)
    }

    pub async fn list_foods(&self, meal_category_id: &str) -> Result<Vec<Food>> {
        self.repo.list_foods(meal_category_id).await
    }

    pub async fn delete_food(&self, id: &str) -> Result<()> {
        tracing::info!("Deleting food: {}", id);
        self.repo.delete_food(id).await
    }
}

/// Trim a user-supplied name and check it is usable
pub(crate) fn validate_name(kind: &str, name: &str) -> Result<String> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{} name is required", kind)));
    }

    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(AppError::Validation(format!(
            "{} name exceeds {} characters",
            kind, MAX_NAME_LENGTH
        )));
    }

    Ok(trimmed.to_string())
}

/// Check a preference rating lies in 1..=5
pub(crate) fn validate_rating(rating: i64) -> Result<u8> {
    u8::try_from(rating)
        .ok()
        .filter(|r| (MIN_RATING..=MAX_RATING).contains(r))
        .ok_or(AppError::InvalidRating(rating))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_FOOD_CATEGORIES;
    use crate::database::initialize_database;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn create_test_service() -> CatalogService {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        initialize_database(&pool).await.unwrap();

        CatalogService::new(Repository::new(pool))
    }

    fn food_request(diet: &Diet, meal: &MealCategory, name: &str, rating: i64) -> NewFood {
        NewFood {
            diet_id: diet.id.clone(),
            meal_category_id: meal.id.clone(),
            name: name.to_string(),
            food_category_name: "Proteins".to_string(),
            portion: Some("  ".to_string()),
            rating,
            mandatory: false,
        }
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("Diet", "  Keto ").unwrap(), "Keto");
        assert!(matches!(validate_name("Diet", "   "), Err(AppError::Validation(_))));
        assert!(validate_name("Diet", &"x".repeat(MAX_NAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_validate_rating() {
        assert_eq!(validate_rating(1).unwrap(), 1);
        assert_eq!(validate_rating(5).unwrap(), 5);
        assert!(matches!(validate_rating(0), Err(AppError::InvalidRating(0))));
        assert!(matches!(validate_rating(6), Err(AppError::InvalidRating(6))));
        assert!(matches!(validate_rating(-3), Err(AppError::InvalidRating(-3))));
    }

    #[tokio::test]
    async fn test_create_diet_seeds_default_food_categories() {
        let service = create_test_service().await;

        let diet = service.create_diet("Nutritionist Plan").await.unwrap();
        let categories = service.list_food_categories(&diet.id).await.unwrap();

        let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, DEFAULT_FOOD_CATEGORIES.to_vec());
    }

    #[tokio::test]
    async fn test_custom_food_category_survives_default_seeding() {
        let service = create_test_service().await;
        let diet = service.create_diet("Diet").await.unwrap();

        service.add_food_category(&diet.id, "Snacks").await.unwrap();
        assert_eq!(service.ensure_default_food_categories(&diet.id).await.unwrap(), 0);

        let names: Vec<String> = service
            .list_food_categories(&diet.id)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();

        assert_eq!(names.len(), 6);
        assert!(names.contains(&"Snacks".to_string()));
        for expected in DEFAULT_FOOD_CATEGORIES {
            assert_eq!(names.iter().filter(|n| n.as_str() == *expected).count(), 1);
        }
    }

    #[tokio::test]
    async fn test_duplicate_meal_category_rejected() {
        let service = create_test_service().await;
        let diet = service.create_diet("Diet").await.unwrap();

        service.add_meal_category(&diet.id, "Breakfast").await.unwrap();
        let result = service.add_meal_category(&diet.id, " Breakfast ").await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_add_preset_meal_categories() {
        let service = create_test_service().await;
        let diet = service.create_diet("Diet").await.unwrap();

        service.add_meal_category(&diet.id, "Lunch").await.unwrap();
        let added = service.add_preset_meal_categories(&diet.id).await.unwrap();
        assert_eq!(added.len(), 3);

        let names: Vec<String> = service
            .list_meal_categories(&diet.id)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Lunch", "Breakfast", "Dinner", "Snack"]);

        assert!(service.add_preset_meal_categories(&diet.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_meal_category_requires_diet() {
        let service = create_test_service().await;

        let result = service.add_meal_category("missing", "Lunch").await;
        assert!(matches!(result, Err(AppError::DietNotFound(_))));
    }

    #[tokio::test]
    async fn test_add_food_validates_and_normalizes() {
        let service = create_test_service().await;
        let diet = service.create_diet("Diet").await.unwrap();
        let meal = service.add_meal_category(&diet.id, "Lunch").await.unwrap();

        let food = service
            .add_food(food_request(&diet, &meal, "  Chicken ", 4))
            .await
            .unwrap();
        assert_eq!(food.name, "Chicken");
        assert_eq!(food.portion, None);

        let too_high = service.add_food(food_request(&diet, &meal, "Fish", 6)).await;
        assert!(matches!(too_high, Err(AppError::InvalidRating(6))));

        let unnamed = service.add_food(food_request(&diet, &meal, "", 3)).await;
        assert!(matches!(unnamed, Err(AppError::Validation(_))));

        assert_eq!(service.list_foods(&meal.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_add_food_rejects_foreign_meal_category() {
        let service = create_test_service().await;
        let diet = service.create_diet("Mine").await.unwrap();
        let other = service.create_diet("Other").await.unwrap();
        let meal = service.add_meal_category(&other.id, "Lunch").await.unwrap();

        let result = service.add_food(food_request(&diet, &meal, "Eggs", 3)).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
