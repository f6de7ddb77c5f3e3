use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::charts::ChartRow;

/// Shared catalog entry; `quantity` is the stock count, not a recipe amount.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ingredient {
    pub id: Uuid,
    pub name: String,
    pub calories: i32,
    pub price: f64,
    pub quantity: i32,
    pub supplier: Option<String>,
    pub created_at: OffsetDateTime,
}

pub async fn search(
    db: &PgPool,
    name: Option<&str>,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<Ingredient>> {
    let pattern = format!("%{}%", name.unwrap_or_default());
    let rows = sqlx::query_as::<_, Ingredient>(
        r#"
        SELECT id, name, calories, price, quantity, supplier, created_at
        FROM ingredients
        WHERE name ILIKE $1
        ORDER BY name ASC
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

pub async fn get(db: &PgPool, ingredient_id: Uuid) -> anyhow::Result<Option<Ingredient>> {
    let row = sqlx::query_as::<_, Ingredient>(
        r#"
        SELECT id, name, calories, price, quantity, supplier, created_at
        FROM ingredients
        WHERE id = $1
        "#,
    )
    .bind(ingredient_id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

/// Price is rounded to 2 fractional digits on the way in.
pub async fn create(
    db: &PgPool,
    name: &str,
    calories: i32,
    price: f64,
    quantity: i32,
    supplier: Option<&str>,
) -> anyhow::Result<Ingredient> {
    let ingredient = sqlx::query_as::<_, Ingredient>(
        r#"
        INSERT INTO ingredients (id, name, calories, price, quantity, supplier)
        VALUES ($1, $2, $3, ROUND($4::numeric, 2)::float8, $5, $6)
        RETURNING id, name, calories, price, quantity, supplier, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(calories)
    .bind(price)
    .bind(quantity)
    .bind(supplier)
    .fetch_one(db)
    .await?;
    Ok(ingredient)
}

pub async fn update(
    db: &PgPool,
    ingredient_id: Uuid,
    name: &str,
    calories: i32,
    price: f64,
    quantity: i32,
    supplier: Option<&str>,
) -> anyhow::Result<Option<Ingredient>> {
    let ingredient = sqlx::query_as::<_, Ingredient>(
        r#"
        UPDATE ingredients
        SET name = $2, calories = $3, price = ROUND($4::numeric, 2)::float8,
            quantity = $5, supplier = $6
        WHERE id = $1
        RETURNING id, name, calories, price, quantity, supplier, created_at
        "#,
    )
    .bind(ingredient_id)
    .bind(name)
    .bind(calories)
    .bind(price)
    .bind(quantity)
    .bind(supplier)
    .fetch_optional(db)
    .await?;
    Ok(ingredient)
}

/// Recipe associations referencing the ingredient cascade away.
pub async fn delete(db: &PgPool, ingredient_id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM ingredients WHERE id = $1")
        .bind(ingredient_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Chart input over the catalog: the stock count is cast to text so the pie
/// path runs through the same quantity parser as recipe charts.
pub async fn chart_rows(db: &PgPool, name: Option<&str>) -> anyhow::Result<Vec<ChartRow>> {
    let pattern = format!("%{}%", name.unwrap_or_default());
    let rows = sqlx::query_as::<_, ChartRow>(
        r#"
        SELECT name, price, calories, quantity::text AS quantity
        FROM ingredients
        WHERE name ILIKE $1
        ORDER BY name ASC
        "#,
    )
    .bind(pattern)
    .fetch_all(db)
    .await?;
    Ok(rows)
}
