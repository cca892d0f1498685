use sqlx::SqlitePool;

use crate::catalog::categories;
use crate::catalog::dto::Page;
use crate::catalog::repo::{PublicRecipe, SearchRow, NAME_SEP};
use crate::error::AppError;

pub const DEFAULT_PAGE_SIZE: i64 = 12;
const MAX_PAGE_SIZE: i64 = 100;

fn normalize_paging(page: i64, per_page: i64) -> (i64, i64) {
    let page = page.max(1);
    let per_page = if per_page < 1 {
        DEFAULT_PAGE_SIZE
    } else {
        per_page.min(MAX_PAGE_SIZE)
    };
    (page, per_page)
}

/// Row offset of a 1-indexed page. Page numbers come straight from the
/// query string, so the multiplication must saturate instead of wrapping.
fn page_offset(page: i64, per_page: i64) -> i64 {
    (page - 1).saturating_mul(per_page)
}

fn total_pages(total: i64, per_page: i64) -> i64 {
    (total + per_page - 1) / per_page
}

/// One page of a category, most-liked first. A page past the end yields an
/// empty item list, not an error.
pub async fn browse(
    db: &SqlitePool,
    category: &str,
    page: i64,
    per_page: i64,
) -> Result<Page<PublicRecipe>, AppError> {
    if !categories::is_known(category) {
        return Err(AppError::UnknownCategory(category.to_string()));
    }
    let (page, per_page) = normalize_paging(page, per_page);

    let total = PublicRecipe::count_in_category(db, category).await?;
    let items =
        PublicRecipe::page_in_category(db, category, per_page, page_offset(page, per_page)).await?;

    Ok(Page {
        items,
        page,
        total_pages: total_pages(total, per_page),
    })
}

/// Category-scoped free-text search. A recipe matches when its name or any
/// ingredient name contains the trimmed query as a substring,
/// case-insensitively. SQLite only case-folds ASCII, and the catalog is
/// Cyrillic, so matching happens here rather than in SQL.
pub async fn search(
    db: &SqlitePool,
    category: &str,
    query: &str,
    page: i64,
    per_page: i64,
) -> Result<Page<PublicRecipe>, AppError> {
    if !categories::is_known(category) {
        return Err(AppError::UnknownCategory(category.to_string()));
    }
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Err(AppError::EmptyQuery);
    }
    let (page, per_page) = normalize_paging(page, per_page);

    let rows = SearchRow::all_in_category(db, category).await?;
    let matched: Vec<PublicRecipe> = rows
        .into_iter()
        .filter(|row| {
            row.name.to_lowercase().contains(&needle)
                || row
                    .ingredient_names
                    .split(NAME_SEP)
                    .any(|name| name.to_lowercase().contains(&needle))
        })
        .map(SearchRow::into_recipe)
        .collect();

    let total = matched.len() as i64;
    let start = usize::try_from(page_offset(page, per_page)).unwrap_or(usize::MAX);
    let items: Vec<PublicRecipe> = matched
        .into_iter()
        .skip(start)
        .take(per_page as usize)
        .collect();

    Ok(Page {
        items,
        page,
        total_pages: total_pages(total, per_page),
    })
}
