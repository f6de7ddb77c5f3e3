use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::difficulty::Difficulty;
use super::repo::IngredientLine;

#[derive(Debug, Deserialize)]
pub struct RecipeSearchParams {
    /// Case-insensitive substring match on the recipe name.
    pub name: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}
fn default_limit() -> i64 {
    20
}

#[derive(Debug, Deserialize)]
pub struct CreateRecipeRequest {
    pub name: String,
    #[serde(default)]
    pub cooking_time: i32,
    pub description: Option<String>,
    pub instructions: Option<String>,
}

/// Full replacement of the mutable fields; absent optionals clear the
/// stored value.
#[derive(Debug, Deserialize)]
pub struct UpdateRecipeRequest {
    pub name: String,
    #[serde(default)]
    pub cooking_time: i32,
    pub description: Option<String>,
    pub instructions: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LinkIngredientRequest {
    pub ingredient_id: Uuid,
    /// Free-form quantity text, e.g. "2 cups" or "1/4 tsp".
    pub quantity: String,
}

#[derive(Debug, Deserialize)]
pub struct RecipeChartQuery {
    /// Chart code: "#1" bar, "#2" line, "#3" pie.
    pub kind: String,
}

#[derive(Debug, Serialize)]
pub struct RecipeListItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub cooking_time: i32,
    pub ingredient_count: i64,
    pub difficulty: Difficulty,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct RecipeDetails {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub cooking_time: i32,
    pub description: Option<String>,
    pub instructions: Option<String>,
    pub ingredient_count: i64,
    pub difficulty: Difficulty,
    pub ingredients: Vec<IngredientLine>,
    pub created_at: OffsetDateTime,
}
