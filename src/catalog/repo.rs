use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

/// Catalog entry visible to everyone. Nutrition fields are display strings,
/// not numbers; the like counter is mutated only through the like engine.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PublicRecipe {
    pub id: i64,
    pub name: String,
    pub portions: i64,
    pub cook_time: String,
    pub calories: String,
    pub protein: String,
    pub fat: String,
    pub carbs: String,
    pub instructions: String,
    pub category: String,
    pub likes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ingredient {
    pub id: i64,
    pub recipe_id: i64,
    pub name: String,
    pub quantity: String,
}

/// Fields of a new catalog entry; ingredients are (name, quantity) pairs.
#[derive(Debug)]
pub struct NewPublicRecipe<'a> {
    pub name: &'a str,
    pub portions: i64,
    pub cook_time: &'a str,
    pub calories: &'a str,
    pub protein: &'a str,
    pub fat: &'a str,
    pub carbs: &'a str,
    pub instructions: &'a str,
    pub category: &'a str,
}

impl PublicRecipe {
    /// Inserts the recipe and all its ingredients in one transaction.
    pub async fn create(
        db: &SqlitePool,
        recipe: NewPublicRecipe<'_>,
        ingredients: &[(&str, &str)],
    ) -> Result<PublicRecipe, sqlx::Error> {
        let mut tx = db.begin().await?;

        let created = sqlx::query_as::<_, PublicRecipe>(
            r#"
            INSERT INTO recipes
                (name, portions, cook_time, calories, protein, fat, carbs,
                 instructions, category, likes)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 0)
            RETURNING id, name, portions, cook_time, calories, protein, fat,
                      carbs, instructions, category, likes
            "#,
        )
        .bind(recipe.name)
        .bind(recipe.portions)
        .bind(recipe.cook_time)
        .bind(recipe.calories)
        .bind(recipe.protein)
        .bind(recipe.fat)
        .bind(recipe.carbs)
        .bind(recipe.instructions)
        .bind(recipe.category)
        .fetch_one(&mut *tx)
        .await?;

        for (name, quantity) in ingredients.iter().copied() {
            sqlx::query(
                r#"INSERT INTO ingredients (recipe_id, name, quantity) VALUES (?1, ?2, ?3)"#,
            )
            .bind(created.id)
            .bind(name)
            .bind(quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(created)
    }

    pub async fn get(db: &SqlitePool, id: i64) -> Result<Option<PublicRecipe>, sqlx::Error> {
        sqlx::query_as::<_, PublicRecipe>(
            r#"
            SELECT id, name, portions, cook_time, calories, protein, fat,
                   carbs, instructions, category, likes
            FROM recipes
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn ingredients(
        db: &SqlitePool,
        recipe_id: i64,
    ) -> Result<Vec<Ingredient>, sqlx::Error> {
        sqlx::query_as::<_, Ingredient>(
            r#"
            SELECT id, recipe_id, name, quantity
            FROM ingredients
            WHERE recipe_id = ?1
            ORDER BY id
            "#,
        )
        .bind(recipe_id)
        .fetch_all(db)
        .await
    }

    /// Deletes the recipe together with its ingredients. Like records are
    /// left behind on purpose; readers tolerate dangling recipe ids.
    pub async fn delete(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let mut tx = db.begin().await?;
        sqlx::query(r#"DELETE FROM ingredients WHERE recipe_id = ?1"#)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query(r#"DELETE FROM recipes WHERE id = ?1"#)
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tx.commit().await?;
        Ok(deleted > 0)
    }

    pub async fn count_in_category(db: &SqlitePool, category: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(r#"SELECT COUNT(*) FROM recipes WHERE category = ?1"#)
            .bind(category)
            .fetch_one(db)
            .await
    }

    /// One page of a category, most-liked first.
    pub async fn page_in_category(
        db: &SqlitePool,
        category: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PublicRecipe>, sqlx::Error> {
        sqlx::query_as::<_, PublicRecipe>(
            r#"
            SELECT id, name, portions, cook_time, calories, protein, fat,
                   carbs, instructions, category, likes
            FROM recipes
            WHERE category = ?1
            ORDER BY likes DESC
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(category)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
    }
}

/// Unit separator; cannot occur in ingredient names.
pub(crate) const NAME_SEP: char = '\u{1f}';

/// A recipe row with its ingredient names concatenated, for text matching
/// on the Rust side. The GROUP BY collapses the recipe×ingredient join, so
/// a recipe appears once no matter how many ingredients match.
#[derive(Debug, FromRow)]
pub struct SearchRow {
    pub id: i64,
    pub name: String,
    pub portions: i64,
    pub cook_time: String,
    pub calories: String,
    pub protein: String,
    pub fat: String,
    pub carbs: String,
    pub instructions: String,
    pub category: String,
    pub likes: i64,
    pub ingredient_names: String,
}

impl SearchRow {
    pub async fn all_in_category(
        db: &SqlitePool,
        category: &str,
    ) -> Result<Vec<SearchRow>, sqlx::Error> {
        sqlx::query_as::<_, SearchRow>(
            r#"
            SELECT r.id, r.name, r.portions, r.cook_time, r.calories, r.protein,
                   r.fat, r.carbs, r.instructions, r.category, r.likes,
                   COALESCE(GROUP_CONCAT(i.name, CHAR(31)), '') AS ingredient_names
            FROM recipes r
            LEFT JOIN ingredients i ON i.recipe_id = r.id
            WHERE r.category = ?1
            GROUP BY r.id
            ORDER BY r.likes DESC
            "#,
        )
        .bind(category)
        .fetch_all(db)
        .await
    }

    pub fn into_recipe(self) -> PublicRecipe {
        PublicRecipe {
            id: self.id,
            name: self.name,
            portions: self.portions,
            cook_time: self.cook_time,
            calories: self.calories,
            protein: self.protein,
            fat: self.fat,
            carbs: self.carbs,
            instructions: self.instructions,
            category: self.category,
            likes: self.likes,
        }
    }
}
