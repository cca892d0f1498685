use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Sqlite, SqlitePool, Transaction};
use time::OffsetDateTime;

use crate::auth::service::require_ownership;
use crate::error::AppError;

/// Private recipe, visible and editable only by its owner. `owner` holds
/// the owning user's pseudonym and is matched by value on every access.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PersonalRecipe {
    pub id: i64,
    pub name: String,
    pub ingredients: String,
    pub description: String,
    pub owner: String,
    pub created_at: OffsetDateTime,
}

/// Replacement fields for an update; applied all-or-nothing.
#[derive(Debug)]
pub struct PersonalRecipeFields<'a> {
    pub name: &'a str,
    pub ingredients: &'a str,
    pub description: &'a str,
}

const SELECT_COLUMNS: &str = "id, name, ingredients, description, owner, created_at";

/// Loads the row and applies the ownership gate inside the caller's
/// transaction, so the check and the following mutation see the same row.
async fn fetch_owned(
    tx: &mut Transaction<'_, Sqlite>,
    id: i64,
    acting_pseudonym: &str,
) -> Result<PersonalRecipe, AppError> {
    let recipe = sqlx::query_as::<_, PersonalRecipe>(&format!(
        "SELECT {SELECT_COLUMNS} FROM personal_recipes WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or(AppError::NotFound)?;

    require_ownership(acting_pseudonym, &recipe.owner)?;
    Ok(recipe)
}

impl PersonalRecipe {
    pub async fn create(
        db: &SqlitePool,
        owner: &str,
        fields: PersonalRecipeFields<'_>,
    ) -> Result<PersonalRecipe, AppError> {
        let recipe = sqlx::query_as::<_, PersonalRecipe>(&format!(
            r#"
            INSERT INTO personal_recipes (name, ingredients, description, owner, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING {SELECT_COLUMNS}
            "#
        ))
        .bind(fields.name)
        .bind(fields.ingredients)
        .bind(fields.description)
        .bind(owner)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(db)
        .await?;
        Ok(recipe)
    }

    /// The owner's menu, newest first.
    pub async fn list_by_owner(
        db: &SqlitePool,
        owner: &str,
    ) -> Result<Vec<PersonalRecipe>, AppError> {
        let rows = sqlx::query_as::<_, PersonalRecipe>(&format!(
            "SELECT {SELECT_COLUMNS} FROM personal_recipes WHERE owner = ?1 ORDER BY id DESC"
        ))
        .bind(owner)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn get_owned(
        db: &SqlitePool,
        id: i64,
        acting_pseudonym: &str,
    ) -> Result<PersonalRecipe, AppError> {
        let mut tx = db.begin().await?;
        let recipe = fetch_owned(&mut tx, id, acting_pseudonym).await?;
        tx.commit().await?;
        Ok(recipe)
    }

    pub async fn update_owned(
        db: &SqlitePool,
        id: i64,
        acting_pseudonym: &str,
        fields: PersonalRecipeFields<'_>,
    ) -> Result<PersonalRecipe, AppError> {
        let mut tx = db.begin().await?;
        fetch_owned(&mut tx, id, acting_pseudonym).await?;

        let updated = sqlx::query_as::<_, PersonalRecipe>(&format!(
            r#"
            UPDATE personal_recipes
            SET name = ?1, ingredients = ?2, description = ?3
            WHERE id = ?4
            RETURNING {SELECT_COLUMNS}
            "#
        ))
        .bind(fields.name)
        .bind(fields.ingredients)
        .bind(fields.description)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    pub async fn delete_owned(
        db: &SqlitePool,
        id: i64,
        acting_pseudonym: &str,
    ) -> Result<(), AppError> {
        let mut tx = db.begin().await?;
        fetch_owned(&mut tx, id, acting_pseudonym).await?;

        sqlx::query(r#"DELETE FROM personal_recipes WHERE id = ?1"#)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::test_pool;

    const OWNER: &str = "aaaaaaaaaaaaaaaa";
    const STRANGER: &str = "ffffffffffffffff";

    fn fields<'a>(name: &'a str) -> PersonalRecipeFields<'a> {
        PersonalRecipeFields {
            name,
            ingredients: "яйца, мука, молоко",
            description: "Смешать и жарить.",
        }
    }

    #[tokio::test]
    async fn create_and_list_newest_first() {
        let db = test_pool().await;
        let first = PersonalRecipe::create(&db, OWNER, fields("Блины")).await.expect("create");
        let second = PersonalRecipe::create(&db, OWNER, fields("Сырники")).await.expect("create");
        PersonalRecipe::create(&db, STRANGER, fields("Чужой рецепт"))
            .await
            .expect("create");

        let menu = PersonalRecipe::list_by_owner(&db, OWNER).await.expect("list");
        assert_eq!(menu.len(), 2);
        assert_eq!(menu[0].id, second.id);
        assert_eq!(menu[1].id, first.id);
    }

    #[tokio::test]
    async fn non_owner_is_forbidden_not_hidden() {
        let db = test_pool().await;
        let recipe = PersonalRecipe::create(&db, OWNER, fields("Секретный суп"))
            .await
            .expect("create");

        let err = PersonalRecipe::get_owned(&db, recipe.id, STRANGER)
            .await
            .expect_err("foreign read");
        assert!(matches!(err, AppError::Forbidden));

        let err = PersonalRecipe::update_owned(&db, recipe.id, STRANGER, fields("Взлом"))
            .await
            .expect_err("foreign update");
        assert!(matches!(err, AppError::Forbidden));

        let err = PersonalRecipe::delete_owned(&db, recipe.id, STRANGER)
            .await
            .expect_err("foreign delete");
        assert!(matches!(err, AppError::Forbidden));

        // Still intact and readable by its owner.
        let kept = PersonalRecipe::get_owned(&db, recipe.id, OWNER)
            .await
            .expect("owner read");
        assert_eq!(kept.name, "Секретный суп");
    }

    #[tokio::test]
    async fn missing_recipe_is_not_found() {
        let db = test_pool().await;
        let err = PersonalRecipe::get_owned(&db, 404, OWNER)
            .await
            .expect_err("missing");
        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn update_replaces_all_fields() {
        let db = test_pool().await;
        let recipe = PersonalRecipe::create(&db, OWNER, fields("Черновик"))
            .await
            .expect("create");

        let updated = PersonalRecipe::update_owned(
            &db,
            recipe.id,
            OWNER,
            PersonalRecipeFields {
                name: "Готовый рецепт",
                ingredients: "всё новое",
                description: "Совсем другой текст.",
            },
        )
        .await
        .expect("update");

        assert_eq!(updated.id, recipe.id);
        assert_eq!(updated.name, "Готовый рецепт");
        assert_eq!(updated.ingredients, "всё новое");
        assert_eq!(updated.description, "Совсем другой текст.");
        assert_eq!(updated.owner, OWNER);
    }

    #[tokio::test]
    async fn delete_removes_the_row() {
        let db = test_pool().await;
        let recipe = PersonalRecipe::create(&db, OWNER, fields("Временный"))
            .await
            .expect("create");

        PersonalRecipe::delete_owned(&db, recipe.id, OWNER)
            .await
            .expect("delete");
        let err = PersonalRecipe::get_owned(&db, recipe.id, OWNER)
            .await
            .expect_err("gone");
        assert!(matches!(err, AppError::NotFound));
    }
}
