use serde::Deserialize;

/// Request body shared by create and update; all fields are required
/// because update replaces the recipe wholesale.
#[derive(Debug, Deserialize)]
pub struct PersonalRecipeBody {
    pub name: String,
    pub ingredients: String,
    pub description: String,
}
