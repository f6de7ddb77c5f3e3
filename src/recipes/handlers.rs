use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::jwt::AuthUser,
    charts::{prepare_chart, ChartError, ChartKind, ChartResponse},
    ingredients::repo as ingredients_repo,
    state::AppState,
};

use super::difficulty::classify;
use super::dto::{
    CreateRecipeRequest, LinkIngredientRequest, RecipeChartQuery, RecipeDetails, RecipeListItem,
    RecipeSearchParams, UpdateRecipeRequest,
};
use super::repo::{self, IngredientLine, RecipeWithCount};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/recipes", get(search_recipes).post(create_recipe))
        .route(
            "/recipes/:id",
            get(get_recipe).put(update_recipe).delete(delete_recipe),
        )
        .route("/recipes/:id/ingredients", post(link_ingredient))
        .route(
            "/recipes/:id/ingredients/:ingredient_id",
            delete(unlink_ingredient),
        )
        .route("/recipes/:id/chart", get(recipe_chart))
}

#[instrument(skip(state))]
pub async fn search_recipes(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Query(p): Query<RecipeSearchParams>,
) -> Result<Json<Vec<RecipeListItem>>, (StatusCode, String)> {
    let rows = repo::search(&state.db, p.name.as_deref(), p.limit, p.offset)
        .await
        .map_err(internal)?;
    let items = rows
        .into_iter()
        .map(|r| RecipeListItem {
            id: r.id,
            user_id: r.user_id,
            name: r.name,
            cooking_time: r.cooking_time,
            ingredient_count: r.ingredient_count,
            difficulty: classify(r.cooking_time, r.ingredient_count),
            created_at: r.created_at,
        })
        .collect();
    Ok(Json(items))
}

#[instrument(skip(state))]
pub async fn get_recipe(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<RecipeDetails>, (StatusCode, String)> {
    let Some(recipe) = repo::get(&state.db, id).await.map_err(internal)? else {
        warn!(%id, "recipe not found");
        return Err((StatusCode::NOT_FOUND, "Recipe not found".into()));
    };
    let ingredients = repo::list_ingredients(&state.db, id)
        .await
        .map_err(internal)?;
    Ok(Json(details(recipe, ingredients)))
}

#[instrument(skip(state))]
pub async fn create_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<CreateRecipeRequest>,
) -> Result<(StatusCode, HeaderMap, Json<RecipeDetails>), (StatusCode, String)> {
    let name = body.name.trim();
    validate_recipe(name, body.cooking_time)?;

    let recipe = repo::create(
        &state.db,
        user_id,
        name,
        body.cooking_time,
        body.description.as_deref(),
        body.instructions.as_deref(),
    )
    .await
    .map_err(internal)?;

    let mut headers = HeaderMap::new();
    headers.insert(
        axum::http::header::LOCATION,
        format!("/api/v1/recipes/{}", recipe.id)
            .parse()
            .map_err(internal)?,
    );

    info!(recipe_id = %recipe.id, %user_id, "recipe created");
    Ok((
        StatusCode::CREATED,
        headers,
        Json(RecipeDetails {
            id: recipe.id,
            user_id: recipe.user_id,
            name: recipe.name,
            cooking_time: recipe.cooking_time,
            description: recipe.description,
            instructions: recipe.instructions,
            ingredient_count: 0,
            difficulty: classify(recipe.cooking_time, 0),
            ingredients: Vec::new(),
            created_at: recipe.created_at,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn update_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateRecipeRequest>,
) -> Result<Json<RecipeDetails>, (StatusCode, String)> {
    let name = body.name.trim();
    validate_recipe(name, body.cooking_time)?;

    let updated = repo::update(
        &state.db,
        id,
        user_id,
        name,
        body.cooking_time,
        body.description.as_deref(),
        body.instructions.as_deref(),
    )
    .await
    .map_err(internal)?;
    if !updated {
        warn!(%id, %user_id, "update on missing or foreign recipe");
        return Err((StatusCode::NOT_FOUND, "Recipe not found".into()));
    }

    let Some(recipe) = repo::get(&state.db, id).await.map_err(internal)? else {
        return Err((StatusCode::NOT_FOUND, "Recipe not found".into()));
    };
    let ingredients = repo::list_ingredients(&state.db, id)
        .await
        .map_err(internal)?;
    info!(recipe_id = %id, "recipe updated");
    Ok(Json(details(recipe, ingredients)))
}

#[instrument(skip(state))]
pub async fn delete_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    let deleted = repo::delete(&state.db, id, user_id)
        .await
        .map_err(internal)?;
    if !deleted {
        warn!(%id, %user_id, "delete on missing or foreign recipe");
        return Err((StatusCode::NOT_FOUND, "Recipe not found".into()));
    }
    info!(recipe_id = %id, %user_id, "recipe deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /recipes/:id/ingredients
/// Links (or re-links with a new quantity) an ingredient and returns the
/// refreshed ingredient list.
#[instrument(skip(state))]
pub async fn link_ingredient(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<LinkIngredientRequest>,
) -> Result<Json<Vec<IngredientLine>>, (StatusCode, String)> {
    let Some(recipe) = repo::get(&state.db, id).await.map_err(internal)? else {
        warn!(%id, "link on missing recipe");
        return Err((StatusCode::NOT_FOUND, "Recipe not found".into()));
    };
    if recipe.user_id != user_id {
        warn!(%id, %user_id, "link on foreign recipe");
        return Err((StatusCode::NOT_FOUND, "Recipe not found".into()));
    }
    if ingredients_repo::get(&state.db, body.ingredient_id)
        .await
        .map_err(internal)?
        .is_none()
    {
        warn!(ingredient_id = %body.ingredient_id, "link to missing ingredient");
        return Err((StatusCode::NOT_FOUND, "Ingredient not found".into()));
    }

    repo::upsert_ingredient(&state.db, id, body.ingredient_id, body.quantity.trim())
        .await
        .map_err(internal)?;
    info!(recipe_id = %id, ingredient_id = %body.ingredient_id, "ingredient linked");

    let lines = repo::list_ingredients(&state.db, id)
        .await
        .map_err(internal)?;
    Ok(Json(lines))
}

#[instrument(skip(state))]
pub async fn unlink_ingredient(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((id, ingredient_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, (StatusCode, String)> {
    let Some(recipe) = repo::get(&state.db, id).await.map_err(internal)? else {
        warn!(%id, "unlink on missing recipe");
        return Err((StatusCode::NOT_FOUND, "Recipe not found".into()));
    };
    if recipe.user_id != user_id {
        warn!(%id, %user_id, "unlink on foreign recipe");
        return Err((StatusCode::NOT_FOUND, "Recipe not found".into()));
    }

    let removed = repo::remove_ingredient(&state.db, id, ingredient_id)
        .await
        .map_err(internal)?;
    if !removed {
        warn!(recipe_id = %id, %ingredient_id, "unlink on unlinked ingredient");
        return Err((StatusCode::NOT_FOUND, "Ingredient not linked".into()));
    }
    info!(recipe_id = %id, %ingredient_id, "ingredient unlinked");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /recipes/:id/chart?kind=%231..%233
/// An unknown kind or a recipe without associations yields `{"chart": null}`.
#[instrument(skip(state))]
pub async fn recipe_chart(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<Uuid>,
    Query(q): Query<RecipeChartQuery>,
) -> Result<Json<ChartResponse>, (StatusCode, String)> {
    if repo::get(&state.db, id).await.map_err(internal)?.is_none() {
        warn!(%id, "chart on missing recipe");
        return Err((StatusCode::NOT_FOUND, "Recipe not found".into()));
    }

    let Some(kind) = ChartKind::from_code(&q.kind) else {
        warn!(kind = %q.kind, "unknown chart kind");
        return Ok(Json(ChartResponse { chart: None }));
    };

    let rows = repo::chart_rows(&state.db, id).await.map_err(internal)?;
    if rows.is_empty() {
        return Ok(Json(ChartResponse { chart: None }));
    }

    let labels: Vec<String> = rows.iter().map(|r| r.name.clone()).collect();
    match prepare_chart(kind, &rows, Some(&labels)) {
        Ok(chart) => Ok(Json(ChartResponse { chart: Some(chart) })),
        Err(ChartError::EmptySeries) => Ok(Json(ChartResponse { chart: None })),
        Err(e) => Err(internal(e)),
    }
}

fn details(recipe: RecipeWithCount, ingredients: Vec<IngredientLine>) -> RecipeDetails {
    RecipeDetails {
        id: recipe.id,
        user_id: recipe.user_id,
        name: recipe.name,
        cooking_time: recipe.cooking_time,
        description: recipe.description,
        instructions: recipe.instructions,
        ingredient_count: recipe.ingredient_count,
        difficulty: classify(recipe.cooking_time, recipe.ingredient_count),
        ingredients,
        created_at: recipe.created_at,
    }
}

fn validate_recipe(name: &str, cooking_time: i32) -> Result<(), (StatusCode, String)> {
    if name.is_empty() {
        warn!("recipe name empty");
        return Err((StatusCode::BAD_REQUEST, "Name must not be empty".into()));
    }
    if cooking_time < 0 {
        warn!(cooking_time, "negative cooking time");
        return Err((
            StatusCode::BAD_REQUEST,
            "Cooking time must not be negative".into(),
        ));
    }
    Ok(())
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    error!(error = %e, "request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipes::difficulty::Difficulty;
    use time::OffsetDateTime;

    fn sample(cooking_time: i32, ingredient_count: i64) -> RecipeWithCount {
        RecipeWithCount {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Stew".into(),
            cooking_time,
            description: None,
            instructions: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
            ingredient_count,
        }
    }

    #[test]
    fn details_derive_difficulty_from_the_row() {
        let d = details(sample(45, 7), Vec::new());
        assert_eq!(d.difficulty, Difficulty::Hard);
        assert_eq!(d.ingredient_count, 7);

        let d = details(sample(10, 2), Vec::new());
        assert_eq!(d.difficulty, Difficulty::Easy);
    }

    #[test]
    fn details_serialize_difficulty_as_a_label() {
        let json = serde_json::to_value(details(sample(45, 2), Vec::new())).unwrap();
        assert_eq!(json["difficulty"], "Intermediate");
        assert_eq!(json["ingredient_count"], 2);
    }

    #[test]
    fn recipe_validation_rules() {
        assert!(validate_recipe("Stew", 0).is_ok());
        assert!(validate_recipe("", 10).is_err());
        assert!(validate_recipe("Stew", -1).is_err());
    }
}
