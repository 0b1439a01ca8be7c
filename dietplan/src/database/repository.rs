//! Repository layer for database operations
//!
//! CRUD operations for diets, categories, foods and saved plans.
//! Each public method is one logical operation; the ones touching more
//! than one row run inside a transaction.

use super::models::*;
use crate::config::DEFAULT_FOOD_CATEGORIES;
use crate::error::{AppError, Result};
use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

/// Tables whose rows carry a per-diet `order_index`
#[derive(Debug, Clone, Copy)]
enum OrderedTable {
    MealCategories,
    FoodCategories,
}

impl OrderedTable {
    fn table(self) -> &'static str {
        match self {
            OrderedTable::MealCategories => "meal_categories",
            OrderedTable::FoodCategories => "food_categories",
        }
    }

    fn not_found(self, id: &str) -> AppError {
        match self {
            OrderedTable::MealCategories => AppError::MealCategoryNotFound(id.to_string()),
            OrderedTable::FoodCategories => AppError::FoodCategoryNotFound(id.to_string()),
        }
    }
}

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ===== Diets =====

    /// Create a new diet
    pub async fn create_diet(&self, name: &str) -> Result<Diet> {
        let id = Uuid::new_v4().to_string();

        let diet = sqlx::query_as::<_, Diet>(
            r#"
            INSERT INTO diets (id, name, created_at)
            VALUES (?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(name)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Created diet: {}", id);
        Ok(diet)
    }

    /// Get a diet by ID
    pub async fn get_diet(&self, id: &str) -> Result<Diet> {
        sqlx::query_as::<_, Diet>("SELECT * FROM diets WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::DietNotFound(id.to_string()))
    }

    /// List all diets, oldest first
    pub async fn list_diets(&self) -> Result<Vec<Diet>> {
        let diets = sqlx::query_as::<_, Diet>("SELECT * FROM diets ORDER BY created_at, rowid")
            .fetch_all(&self.pool)
            .await?;

        Ok(diets)
    }

    /// Delete a diet together with everything it owns
    pub async fn delete_diet(&self, id: &str) -> Result<()> {
        let rows = sqlx::query("DELETE FROM diets WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(AppError::DietNotFound(id.to_string()));
        }

        tracing::debug!("Deleted diet: {}", id);
        Ok(())
    }

    // ===== Meal categories =====

    /// Append a meal category after the diet's current last one
    pub async fn add_meal_category(&self, diet_id: &str, name: &str) -> Result<MealCategory> {
        let id = Uuid::new_v4().to_string();
        let mut tx = self.pool.begin().await?;

        let order_index = next_order_index(&mut tx, OrderedTable::MealCategories, diet_id).await?;

        let category = sqlx::query_as::<_, MealCategory>(
            r#"
            INSERT INTO meal_categories (id, diet_id, name, order_index)
            VALUES (?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(diet_id)
        .bind(name)
        .bind(order_index)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(
            "Created meal category: {} for diet: {} at position {}",
            id,
            diet_id,
            order_index
        );
        Ok(category)
    }

    /// Get a meal category by ID
    pub async fn get_meal_category(&self, id: &str) -> Result<MealCategory> {
        sqlx::query_as::<_, MealCategory>("SELECT * FROM meal_categories WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::MealCategoryNotFound(id.to_string()))
    }

    /// List a diet's meal categories in display order
    pub async fn list_meal_categories(&self, diet_id: &str) -> Result<Vec<MealCategory>> {
        let categories = sqlx::query_as::<_, MealCategory>(
            r#"
            SELECT * FROM meal_categories
            WHERE diet_id = ?
            ORDER BY order_index, rowid
            "#,
        )
        .bind(diet_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Swap a meal category with its neighbour. Returns false at the edge.
    pub async fn move_meal_category(&self, id: &str, direction: MoveDirection) -> Result<bool> {
        self.swap_with_neighbour(OrderedTable::MealCategories, id, direction)
            .await
    }

    /// Delete a meal category. Its foods are removed by the cascade.
    pub async fn delete_meal_category(&self, id: &str) -> Result<()> {
        let rows = sqlx::query("DELETE FROM meal_categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(AppError::MealCategoryNotFound(id.to_string()));
        }

        tracing::debug!("Deleted meal category: {}", id);
        Ok(())
    }

    // ===== Food categories =====

    /// Add a food category, or return the existing one with the same name
    pub async fn add_food_category(&self, diet_id: &str, name: &str) -> Result<FoodCategory> {
        let mut tx = self.pool.begin().await?;
        let (category, _) = insert_food_category_if_missing(&mut tx, diet_id, name).await?;
        tx.commit().await?;

        Ok(category)
    }

    /// List a diet's food categories in display order
    pub async fn list_food_categories(&self, diet_id: &str) -> Result<Vec<FoodCategory>> {
        let categories = sqlx::query_as::<_, FoodCategory>(
            r#"
            SELECT * FROM food_categories
            WHERE diet_id = ?
            ORDER BY order_index, rowid
            "#,
        )
        .bind(diet_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Make sure every default food category exists for the diet.
    /// Returns how many were missing and got inserted.
    pub async fn ensure_default_food_categories(&self, diet_id: &str) -> Result<usize> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for name in DEFAULT_FOOD_CATEGORIES.iter().copied() {
            let (_, created) = insert_food_category_if_missing(&mut tx, diet_id, name).await?;
            if created {
                inserted += 1;
            }
        }

        tx.commit().await?;

        if inserted > 0 {
            tracing::debug!(
                "Seeded {} default food categories for diet: {}",
                inserted,
                diet_id
            );
        }
        Ok(inserted)
    }

    /// Swap a food category with its neighbour. Returns false at the edge.
    pub async fn move_food_category(&self, id: &str, direction: MoveDirection) -> Result<bool> {
        self.swap_with_neighbour(OrderedTable::FoodCategories, id, direction)
            .await
    }

    /// Delete a food category. Foods tagged with its name are left alone.
    pub async fn delete_food_category(&self, id: &str) -> Result<()> {
        let rows = sqlx::query("DELETE FROM food_categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(AppError::FoodCategoryNotFound(id.to_string()));
        }

        tracing::debug!("Deleted food category: {}", id);
        Ok(())
    }

    // ===== Foods =====

    /// Create a food. The caller validates the request.
    pub async fn create_food(&self, food: &NewFood) -> Result<Food> {
        let id = Uuid::new_v4().to_string();

        let created = sqlx::query_as::<_, Food>(
            r#"
            INSERT INTO foods (
                id, diet_id, meal_category_id, name, food_category_name,
                portion, rating, mandatory, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(&food.diet_id)
        .bind(&food.meal_category_id)
        .bind(&food.name)
        .bind(&food.food_category_name)
        .bind(&food.portion)
        .bind(food.rating)
        .bind(food.mandatory)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(
            "Created food: {} in meal category: {}",
            id,
            food.meal_category_id
        );
        Ok(created)
    }

    /// List the foods of a meal category, best rated first, then by insertion
    pub async fn list_foods(&self, meal_category_id: &str) -> Result<Vec<Food>> {
        let foods = sqlx::query_as::<_, Food>(
            r#"
            SELECT * FROM foods
            WHERE meal_category_id = ?
            ORDER BY rating DESC, rowid ASC
            "#,
        )
        .bind(meal_category_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(foods)
    }

    /// Count foods across all meal categories of a diet
    pub async fn count_foods(&self, diet_id: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM foods WHERE diet_id = ?")
            .bind(diet_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Delete a food
    pub async fn delete_food(&self, id: &str) -> Result<()> {
        let rows = sqlx::query("DELETE FROM foods WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(AppError::FoodNotFound(id.to_string()));
        }

        tracing::debug!("Deleted food: {}", id);
        Ok(())
    }

    // ===== Weekly plans =====

    /// Store an encoded plan under a name
    pub async fn save_plan(
        &self,
        diet_id: &str,
        name: &str,
        plan_data: &str,
    ) -> Result<WeeklyPlanRecord> {
        let id = Uuid::new_v4().to_string();

        let record = sqlx::query_as::<_, WeeklyPlanRecord>(
            r#"
            INSERT INTO weekly_plans (id, diet_id, name, created_at, plan_data)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(diet_id)
        .bind(name)
        .bind(Utc::now())
        .bind(plan_data)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Saved weekly plan: {} for diet: {}", id, diet_id);
        Ok(record)
    }

    /// Get a stored plan by ID
    pub async fn get_plan(&self, id: &str) -> Result<WeeklyPlanRecord> {
        sqlx::query_as::<_, WeeklyPlanRecord>("SELECT * FROM weekly_plans WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::PlanNotFound(id.to_string()))
    }

    /// List a diet's stored plans, newest first
    pub async fn list_plans(&self, diet_id: &str) -> Result<Vec<WeeklyPlanRecord>> {
        let plans = sqlx::query_as::<_, WeeklyPlanRecord>(
            r#"
            SELECT * FROM weekly_plans
            WHERE diet_id = ?
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(diet_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(plans)
    }

    /// Rename a stored plan. The payload is never touched.
    pub async fn rename_plan(&self, id: &str, new_name: &str) -> Result<()> {
        let rows = sqlx::query("UPDATE weekly_plans SET name = ? WHERE id = ?")
            .bind(new_name)
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(AppError::PlanNotFound(id.to_string()));
        }

        tracing::debug!("Renamed weekly plan: {}", id);
        Ok(())
    }

    /// Delete a stored plan
    pub async fn delete_plan(&self, id: &str) -> Result<()> {
        let rows = sqlx::query("DELETE FROM weekly_plans WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(AppError::PlanNotFound(id.to_string()));
        }

        tracing::debug!("Deleted weekly plan: {}", id);
        Ok(())
    }

    // ===== Ordering =====

    async fn swap_with_neighbour(
        &self,
        table: OrderedTable,
        id: &str,
        direction: MoveDirection,
    ) -> Result<bool> {
        let name = table.table();
        let mut tx = self.pool.begin().await?;

        let current_sql = format!("SELECT diet_id, order_index FROM {} WHERE id = ?", name);
        let (diet_id, current_order): (String, i64) = sqlx::query_as(&current_sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| table.not_found(id))?;

        let neighbour_sql = match direction {
            MoveDirection::Up => format!(
                "SELECT id, order_index FROM {} WHERE diet_id = ? AND order_index < ? \
                 ORDER BY order_index DESC LIMIT 1",
                name
            ),
            MoveDirection::Down => format!(
                "SELECT id, order_index FROM {} WHERE diet_id = ? AND order_index > ? \
                 ORDER BY order_index ASC LIMIT 1",
                name
            ),
        };

        let neighbour: Option<(String, i64)> = sqlx::query_as(&neighbour_sql)
            .bind(&diet_id)
            .bind(current_order)
            .fetch_optional(&mut *tx)
            .await?;

        let Some((neighbour_id, neighbour_order)) = neighbour else {
            return Ok(false);
        };

        let update_sql = format!("UPDATE {} SET order_index = ? WHERE id = ?", name);
        sqlx::query(&update_sql)
            .bind(neighbour_order)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query(&update_sql)
            .bind(current_order)
            .bind(&neighbour_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!("Moved {} row {} {}", name, id, direction);
        Ok(true)
    }
}

async fn next_order_index(
    tx: &mut Transaction<'_, Sqlite>,
    table: OrderedTable,
    diet_id: &str,
) -> Result<i64> {
    let sql = format!(
        "SELECT COALESCE(MAX(order_index), 0) + 1 FROM {} WHERE diet_id = ?",
        table.table()
    );
    let next: i64 = sqlx::query_scalar(&sql)
        .bind(diet_id)
        .fetch_one(&mut **tx)
        .await?;

    Ok(next)
}

async fn insert_food_category_if_missing(
    tx: &mut Transaction<'_, Sqlite>,
    diet_id: &str,
    name: &str,
) -> Result<(FoodCategory, bool)> {
    let existing = sqlx::query_as::<_, FoodCategory>(
        "SELECT * FROM food_categories WHERE diet_id = ? AND name = ?",
    )
    .bind(diet_id)
    .bind(name)
    .fetch_optional(&mut **tx)
    .await?;

    if let Some(category) = existing {
        return Ok((category, false));
    }

    let order_index = next_order_index(tx, OrderedTable::FoodCategories, diet_id).await?;
    let id = Uuid::new_v4().to_string();

    let category = sqlx::query_as::<_, FoodCategory>(
        r#"
        INSERT INTO food_categories (id, diet_id, name, order_index)
        VALUES (?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&id)
    .bind(diet_id)
    .bind(name)
    .bind(order_index)
    .fetch_one(&mut **tx)
    .await?;

    tracing::debug!("Created food category: {} ({}) for diet: {}", name, id, diet_id);
    Ok((category, true))
}
