use sqlx::SqlitePool;
use time::OffsetDateTime;
use tracing::info;

use crate::catalog::repo::PublicRecipe;
use crate::error::AppError;

/// Records a like and bumps the recipe counter, all inside one
/// transaction. The composite primary key on (user_id, recipe_id) makes
/// the insert the single authority on "has this user liked this recipe":
/// of two concurrent calls with the same identity, exactly one insert
/// takes effect and only that caller increments the counter. The insert
/// is deliberately the first statement, so the transaction grabs the
/// write lock up front and concurrent callers queue instead of failing
/// on a read-to-write lock upgrade.
pub async fn like_recipe(db: &SqlitePool, user_id: i64, recipe_id: i64) -> Result<i64, AppError> {
    let mut tx = db.begin().await?;

    let inserted = sqlx::query(
        r#"
        INSERT INTO recipe_likes (user_id, recipe_id, created_at)
        VALUES (?1, ?2, ?3)
        ON CONFLICT (user_id, recipe_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(recipe_id)
    .bind(OffsetDateTime::now_utc())
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if inserted == 0 {
        // Dropping the transaction rolls back; nothing was changed.
        return Err(AppError::AlreadyLiked);
    }

    let new_count: Option<i64> = sqlx::query_scalar(
        r#"UPDATE recipes SET likes = likes + 1 WHERE id = ?1 RETURNING likes"#,
    )
    .bind(recipe_id)
    .fetch_optional(&mut *tx)
    .await?;
    // Unknown recipe: the rollback also discards the like row above.
    let new_count = new_count.ok_or(AppError::NotFound)?;

    tx.commit().await?;
    info!(user_id, recipe_id, likes = new_count, "recipe liked");
    Ok(new_count)
}

/// Every public recipe the user has liked, in storage order. Like rows
/// whose recipe no longer exists are skipped, not treated as errors.
pub async fn likes_for_user(db: &SqlitePool, user_id: i64) -> Result<Vec<PublicRecipe>, AppError> {
    let recipe_ids: Vec<i64> =
        sqlx::query_scalar(r#"SELECT recipe_id FROM recipe_likes WHERE user_id = ?1"#)
            .bind(user_id)
            .fetch_all(db)
            .await?;

    let mut recipes = Vec::with_capacity(recipe_ids.len());
    for id in recipe_ids {
        if let Some(recipe) = PublicRecipe::get(db, id).await? {
            recipes.push(recipe);
        }
    }
    Ok(recipes)
}
