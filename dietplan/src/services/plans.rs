//! Plans service
//!
//! Generates weekly plans from the catalog and keeps named snapshots of them.
//! A freshly generated plan is owned by the caller until it is saved.

use std::collections::HashMap;

use crate::database::{Food, Repository, SavedPlan, WeeklyPlanRecord};
use crate::error::{AppError, Result};
use crate::planner::{
    decode_plan, encode_plan, generate_weekly_plan, RandomSource, RngSource, WeeklyPlan,
};
use crate::services::catalog::validate_name;

/// Service for generating and storing weekly plans
#[derive(Clone)]
pub struct PlanService {
    repo: Repository,
}

impl PlanService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Generate a plan for a diet using the given randomness.
    ///
    /// Fails with `EmptyCatalog` when the diet has no meal categories or no
    /// foods at all.
    pub async fn generate<R>(&self, diet_id: &str, rng: &mut R) -> Result<WeeklyPlan>
    where
        R: RandomSource + ?Sized,
    {
        self.repo.get_diet(diet_id).await?;

        let meal_categories = self.repo.list_meal_categories(diet_id).await?;
        if meal_categories.is_empty() || self.repo.count_foods(diet_id).await? == 0 {
            return Err(AppError::EmptyCatalog(diet_id.to_string()));
        }

        let mut foods: HashMap<String, Vec<Food>> = HashMap::with_capacity(meal_categories.len());
        for category in &meal_categories {
            foods.insert(category.id.clone(), self.repo.list_foods(&category.id).await?);
        }

        tracing::info!(
            "Generating weekly plan for diet {} from {} meal categories",
            diet_id,
            meal_categories.len()
        );

        let plan = generate_weekly_plan(
            &meal_categories,
            |category| foods.get(&category.id).cloned().unwrap_or_default(),
            rng,
        );

        Ok(plan)
    }

    /// Generate a fresh plan from entropy. Calling it again reshuffles.
    pub async fn shuffle(&self, diet_id: &str) -> Result<WeeklyPlan> {
        let mut rng = RngSource::from_entropy();
        self.generate(diet_id, &mut rng).await
    }

    /// Persist a generated plan under a name
    pub async fn save_plan(
        &self,
        diet_id: &str,
        name: &str,
        plan: &WeeklyPlan,
    ) -> Result<SavedPlan> {
        let name = validate_name("Plan", name)?;
        self.repo.get_diet(diet_id).await?;

        let data = encode_plan(plan)?;
        let record = self.repo.save_plan(diet_id, &name, &data).await?;

        tracing::info!("Weekly plan saved: {} ({})", record.name, record.id);

        Ok(SavedPlan {
            id: record.id,
            diet_id: record.diet_id,
            name: record.name,
            created_at: record.created_at,
            plan: plan.clone(),
        })
    }

    /// Saved plans of a diet, newest first
    pub async fn list_plans(&self, diet_id: &str) -> Result<Vec<SavedPlan>> {
        self.repo
            .list_plans(diet_id)
            .await?
            .into_iter()
            .map(decode_record)
            .collect()
    }

    pub async fn get_plan(&self, id: &str) -> Result<SavedPlan> {
        decode_record(self.repo.get_plan(id).await?)
    }

    /// Rename a saved plan; its content stays as saved
    pub async fn rename_plan(&self, id: &str, new_name: &str) -> Result<()> {
        let new_name = validate_name("Plan", new_name)?;
        tracing::info!("Renaming weekly plan {} to {}", id, new_name);

        self.repo.rename_plan(id, &new_name).await
    }

    pub async fn delete_plan(&self, id: &str) -> Result<()> {
        tracing::info!("Deleting weekly plan: {}", id);
        self.repo.delete_plan(id).await
    }
}

fn decode_record(record: WeeklyPlanRecord) -> Result<SavedPlan> {
    let plan = decode_plan(&record.plan_data).map_err(|e| match e {
        AppError::MalformedPlan(reason) => {
            tracing::error!("Stored weekly plan {} is malformed: {}", record.id, reason);
            AppError::MalformedPlan(format!("plan {}: {}", record.id, reason))
        }
        other => other,
    })?;

    Ok(SavedPlan {
        id: record.id,
        diet_id: record.diet_id,
        name: record.name,
        created_at: record.created_at,
        plan,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{initialize_database, Diet, MealCategory, NewFood};
    use crate::services::CatalogService;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn create_test_services() -> (CatalogService, PlanService, Repository) {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        initialize_database(&pool).await.unwrap();

        let repo = Repository::new(pool);
        (
            CatalogService::new(repo.clone()),
            PlanService::new(repo.clone()),
            repo,
        )
    }

    async fn add_food(
        catalog: &CatalogService,
        diet: &Diet,
        meal: &MealCategory,
        name: &str,
        kind: &str,
        rating: i64,
        mandatory: bool,
    ) {
        catalog
            .add_food(NewFood {
                diet_id: diet.id.clone(),
                meal_category_id: meal.id.clone(),
                name: name.to_string(),
                food_category_name: kind.to_string(),
                portion: Some("1 unit".to_string()),
                rating,
                mandatory,
            })
            .await
            .unwrap();
    }

    async fn breakfast_diet(catalog: &CatalogService) -> Diet {
        let diet = catalog.create_diet("Diet").await.unwrap();
        let breakfast = catalog.add_meal_category(&diet.id, "Breakfast").await.unwrap();
        add_food(catalog, &diet, &breakfast, "Oatmeal", "Carbohydrates", 5, true).await;
        add_food(catalog, &diet, &breakfast, "Eggs", "Proteins", 4, false).await;
        add_food(catalog, &diet, &breakfast, "Tofu", "Proteins", 1, false).await;
        diet
    }

    #[tokio::test]
    async fn test_generate_breakfast_plan() {
        let (catalog, plans, _) = create_test_services().await;
        let diet = breakfast_diet(&catalog).await;

        let plan = plans.shuffle(&diet.id).await.unwrap();

        for (_, day) in plan.days() {
            let breakfast = day.meal("Breakfast").unwrap();
            assert_eq!(breakfast.len(), 2);
            assert_eq!(breakfast[0].name, "Oatmeal");
            assert_eq!(breakfast[0].portion, "1 unit");
            assert!(["Eggs", "Tofu"].contains(&breakfast[1].name.as_str()));
        }
    }

    #[tokio::test]
    async fn test_generate_follows_meal_category_order() {
        let (catalog, plans, _) = create_test_services().await;
        let diet = breakfast_diet(&catalog).await;
        let dinner = catalog.add_meal_category(&diet.id, "Dinner").await.unwrap();
        catalog
            .move_meal_category(&dinner.id, crate::database::MoveDirection::Up)
            .await
            .unwrap();

        let plan = plans.generate(&diet.id, &mut RngSource::seeded(4)).await.unwrap();

        let monday = plan.day("Monday").unwrap();
        let meals: Vec<&str> = monday.meals().iter().map(|m| m.meal_category.as_str()).collect();
        assert_eq!(meals, vec!["Dinner", "Breakfast"]);
        assert_eq!(monday.meal("Dinner"), Some(&[][..]));
    }

    #[tokio::test]
    async fn test_generate_empty_catalog() {
        let (catalog, plans, _) = create_test_services().await;
        let diet = catalog.create_diet("Empty").await.unwrap();

        assert!(matches!(
            plans.shuffle(&diet.id).await,
            Err(AppError::EmptyCatalog(_))
        ));

        catalog.add_meal_category(&diet.id, "Lunch").await.unwrap();
        assert!(matches!(
            plans.shuffle(&diet.id).await,
            Err(AppError::EmptyCatalog(_))
        ));

        assert!(matches!(
            plans.shuffle("missing").await,
            Err(AppError::DietNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_save_list_rename_delete() {
        let (catalog, plans, _) = create_test_services().await;
        let diet = breakfast_diet(&catalog).await;

        let plan = plans.generate(&diet.id, &mut RngSource::seeded(9)).await.unwrap();
        let saved = plans.save_plan(&diet.id, "Week 1", &plan).await.unwrap();

        let listed = plans.list_plans(&diet.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].plan, plan);

        plans.rename_plan(&saved.id, "Holiday week").await.unwrap();
        let renamed = plans.get_plan(&saved.id).await.unwrap();
        assert_eq!(renamed.name, "Holiday week");
        assert_eq!(renamed.plan, plan);

        plans.delete_plan(&saved.id).await.unwrap();
        assert!(plans.list_plans(&diet.id).await.unwrap().is_empty());
        assert!(matches!(
            plans.get_plan(&saved.id).await,
            Err(AppError::PlanNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_save_plan_requires_name() {
        let (catalog, plans, _) = create_test_services().await;
        let diet = breakfast_diet(&catalog).await;
        let plan = plans.shuffle(&diet.id).await.unwrap();

        assert!(matches!(
            plans.save_plan(&diet.id, "  ", &plan).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_malformed_stored_plan_is_reported() {
        let (catalog, plans, repo) = create_test_services().await;
        let diet = catalog.create_diet("Diet").await.unwrap();

        let record = repo
            .save_plan(&diet.id, "Broken", r#"{"Monday": {}}"#)
            .await
            .unwrap();

        match plans.get_plan(&record.id).await {
            Err(AppError::MalformedPlan(reason)) => assert!(reason.contains(&record.id)),
            other => panic!("expected MalformedPlan, got {:?}", other),
        }
        assert!(plans.list_plans(&diet.id).await.is_err());
    }
}
