use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::charts::ChartRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Recipe {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub cooking_time: i32,
    pub description: Option<String>,
    pub instructions: Option<String>,
    pub created_at: OffsetDateTime,
}

/// A recipe row together with its linked ingredient count, the pair the
/// difficulty classifier runs on.
#[derive(Debug, Clone, FromRow)]
pub struct RecipeWithCount {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub cooking_time: i32,
    pub description: Option<String>,
    pub instructions: Option<String>,
    pub created_at: OffsetDateTime,
    pub ingredient_count: i64,
}

/// One ingredient of a recipe with the association's quantity text.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct IngredientLine {
    pub ingredient_id: Uuid,
    pub name: String,
    pub quantity: String,
}

pub async fn search(
    db: &PgPool,
    name: Option<&str>,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<RecipeWithCount>> {
    let pattern = format!("%{}%", name.unwrap_or_default());
    let rows = sqlx::query_as::<_, RecipeWithCount>(
        r#"
        SELECT r.id, r.user_id, r.name, r.cooking_time, r.description, r.instructions, r.created_at,
               (SELECT COUNT(*) FROM recipe_ingredients ri WHERE ri.recipe_id = r.id) AS ingredient_count
        FROM recipes r
        WHERE r.name ILIKE $1
        ORDER BY r.created_at DESC
        LIMIT $2 OFFSET $3
    "#,
    )
    .bind(pattern)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn get(db: &PgPool, recipe_id: Uuid) -> anyhow::Result<Option<RecipeWithCount>> {
    let row = sqlx::query_as::<_, RecipeWithCount>(
        r#"
        SELECT r.id, r.user_id, r.name, r.cooking_time, r.description, r.instructions, r.created_at,
               (SELECT COUNT(*) FROM recipe_ingredients ri WHERE ri.recipe_id = r.id) AS ingredient_count
        FROM recipes r
        WHERE r.id = $1
        "#,
    )
    .bind(recipe_id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn create(
    db: &PgPool,
    user_id: Uuid,
    name: &str,
    cooking_time: i32,
    description: Option<&str>,
    instructions: Option<&str>,
) -> anyhow::Result<Recipe> {
    let recipe = sqlx::query_as::<_, Recipe>(
        r#"
        INSERT INTO recipes (id, user_id, name, cooking_time, description, instructions)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, user_id, name, cooking_time, description, instructions, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(name)
    .bind(cooking_time)
    .bind(description)
    .bind(instructions)
    .fetch_one(db)
    .await?;
    Ok(recipe)
}

/// Full update, owner-scoped.
pub async fn update(
    db: &PgPool,
    recipe_id: Uuid,
    user_id: Uuid,
    name: &str,
    cooking_time: i32,
    description: Option<&str>,
    instructions: Option<&str>,
) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE recipes
        SET name = $3, cooking_time = $4, description = $5, instructions = $6
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(recipe_id)
    .bind(user_id)
    .bind(name)
    .bind(cooking_time)
    .bind(description)
    .bind(instructions)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Owner-scoped delete; ingredient associations cascade away.
pub async fn delete(db: &PgPool, recipe_id: Uuid, user_id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM recipes WHERE id = $1 AND user_id = $2")
        .bind(recipe_id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn list_ingredients(db: &PgPool, recipe_id: Uuid) -> anyhow::Result<Vec<IngredientLine>> {
    let rows = sqlx::query_as::<_, IngredientLine>(
        r#"
        SELECT i.id AS ingredient_id, i.name, ri.quantity
        FROM recipe_ingredients ri
        JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE ri.recipe_id = $1
        ORDER BY i.name ASC
        "#,
    )
    .bind(recipe_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Links an ingredient to a recipe. Linking the same pair again only
/// replaces the quantity; the composite key keeps the pair unique.
pub async fn upsert_ingredient(
    db: &PgPool,
    recipe_id: Uuid,
    ingredient_id: Uuid,
    quantity: &str,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO recipe_ingredients (recipe_id, ingredient_id, quantity)
        VALUES ($1, $2, $3)
        ON CONFLICT (recipe_id, ingredient_id) DO UPDATE SET quantity = EXCLUDED.quantity
        "#,
    )
    .bind(recipe_id)
    .bind(ingredient_id)
    .bind(quantity)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn remove_ingredient(
    db: &PgPool,
    recipe_id: Uuid,
    ingredient_id: Uuid,
) -> anyhow::Result<bool> {
    let result =
        sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1 AND ingredient_id = $2")
            .bind(recipe_id)
            .bind(ingredient_id)
            .execute(db)
            .await?;
    Ok(result.rows_affected() > 0)
}

/// Chart input for one recipe: every linked ingredient with its price,
/// calories and the association's quantity text, in name order.
pub async fn chart_rows(db: &PgPool, recipe_id: Uuid) -> anyhow::Result<Vec<ChartRow>> {
    let rows = sqlx::query_as::<_, ChartRow>(
        r#"
        SELECT i.name, i.price, i.calories, ri.quantity
        FROM recipe_ingredients ri
        JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE ri.recipe_id = $1
        ORDER BY i.name ASC
        "#,
    )
    .bind(recipe_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}
