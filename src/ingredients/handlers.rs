use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::jwt::AuthUser,
    charts::{prepare_chart, ChartError, ChartKind, ChartResponse},
    state::AppState,
};

use super::dto::{
    CreateIngredientRequest, IngredientChartParams, IngredientSearchParams,
    UpdateIngredientRequest,
};
use super::repo::{self, Ingredient};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/ingredients",
            get(search_ingredients).post(create_ingredient),
        )
        .route("/ingredients/chart", get(ingredients_chart))
        .route(
            "/ingredients/:id",
            get(get_ingredient)
                .put(update_ingredient)
                .delete(delete_ingredient),
        )
}

#[instrument(skip(state))]
pub async fn search_ingredients(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Query(p): Query<IngredientSearchParams>,
) -> Result<Json<Vec<Ingredient>>, (StatusCode, String)> {
    let rows = repo::search(&state.db, p.name.as_deref(), p.limit, p.offset)
        .await
        .map_err(internal)?;
    Ok(Json(rows))
}

#[instrument(skip(state))]
pub async fn get_ingredient(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Ingredient>, (StatusCode, String)> {
    let Some(ingredient) = repo::get(&state.db, id).await.map_err(internal)? else {
        warn!(%id, "ingredient not found");
        return Err((StatusCode::NOT_FOUND, "Ingredient not found".into()));
    };
    Ok(Json(ingredient))
}

#[instrument(skip(state))]
pub async fn create_ingredient(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<CreateIngredientRequest>,
) -> Result<(StatusCode, HeaderMap, Json<Ingredient>), (StatusCode, String)> {
    let name = body.name.trim();
    validate_ingredient(name, body.calories, body.price, body.quantity)?;

    let ingredient = repo::create(
        &state.db,
        name,
        body.calories,
        body.price,
        body.quantity,
        body.supplier.as_deref(),
    )
    .await
    .map_err(internal)?;

    let mut headers = HeaderMap::new();
    headers.insert(
        axum::http::header::LOCATION,
        format!("/api/v1/ingredients/{}", ingredient.id)
            .parse()
            .map_err(internal)?,
    );

    info!(ingredient_id = %ingredient.id, %user_id, "ingredient created");
    Ok((StatusCode::CREATED, headers, Json(ingredient)))
}

#[instrument(skip(state))]
pub async fn update_ingredient(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateIngredientRequest>,
) -> Result<Json<Ingredient>, (StatusCode, String)> {
    let name = body.name.trim();
    validate_ingredient(name, body.calories, body.price, body.quantity)?;

    let Some(ingredient) = repo::update(
        &state.db,
        id,
        name,
        body.calories,
        body.price,
        body.quantity,
        body.supplier.as_deref(),
    )
    .await
    .map_err(internal)?
    else {
        warn!(%id, "update on missing ingredient");
        return Err((StatusCode::NOT_FOUND, "Ingredient not found".into()));
    };

    info!(ingredient_id = %id, "ingredient updated");
    Ok(Json(ingredient))
}

#[instrument(skip(state))]
pub async fn delete_ingredient(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    let deleted = repo::delete(&state.db, id).await.map_err(internal)?;
    if !deleted {
        warn!(%id, "delete on missing ingredient");
        return Err((StatusCode::NOT_FOUND, "Ingredient not found".into()));
    }
    info!(ingredient_id = %id, %user_id, "ingredient deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /ingredients/chart?kind=%231..%233&name=
/// Charts the matching catalog rows; an unknown kind or an empty match
/// yields `{"chart": null}`.
#[instrument(skip(state))]
pub async fn ingredients_chart(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Query(q): Query<IngredientChartParams>,
) -> Result<Json<ChartResponse>, (StatusCode, String)> {
    let Some(kind) = ChartKind::from_code(&q.kind) else {
        warn!(kind = %q.kind, "unknown chart kind");
        return Ok(Json(ChartResponse { chart: None }));
    };

    let rows = repo::chart_rows(&state.db, q.name.as_deref())
        .await
        .map_err(internal)?;
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

fn validate_ingredient(
    name: &str,
    calories: i32,
    price: f64,
    quantity: i32,
) -> Result<(), (StatusCode, String)> {
    if name.is_empty() {
        warn!("ingredient name empty");
        return Err((StatusCode::BAD_REQUEST, "Name must not be empty".into()));
    }
    if calories < 0 {
        warn!(calories, "negative calories");
        return Err((
            StatusCode::BAD_REQUEST,
            "Calories must not be negative".into(),
        ));
    }
    if !price.is_finite() || price < 0.0 {
        warn!(price, "invalid price");
        return Err((
            StatusCode::BAD_REQUEST,
            "Price must be a non-negative number".into(),
        ));
    }
    if quantity < 0 {
        warn!(quantity, "negative quantity");
        return Err((
            StatusCode::BAD_REQUEST,
            "Quantity must not be negative".into(),
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
    use time::OffsetDateTime;

    #[test]
    fn ingredient_validation_rules() {
        assert!(validate_ingredient("Flour", 364, 2.5, 10).is_ok());
        assert!(validate_ingredient("", 0, 0.0, 0).is_err());
        assert!(validate_ingredient("Flour", -1, 2.5, 10).is_err());
        assert!(validate_ingredient("Flour", 364, -0.5, 10).is_err());
        assert!(validate_ingredient("Flour", 364, f64::NAN, 10).is_err());
        assert!(validate_ingredient("Flour", 364, f64::INFINITY, 10).is_err());
        assert!(validate_ingredient("Flour", 364, 2.5, -3).is_err());
    }

    #[test]
    fn ingredient_serializes_all_catalog_fields() {
        let ingredient = Ingredient {
            id: Uuid::new_v4(),
            name: "Flour".into(),
            calories: 364,
            price: 2.5,
            quantity: 10,
            supplier: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        let json = serde_json::to_value(&ingredient).unwrap();
        assert_eq!(json["name"], "Flour");
        assert_eq!(json["calories"], 364);
        assert_eq!(json["price"], 2.5);
        assert_eq!(json["quantity"], 10);
        assert_eq!(json["supplier"], serde_json::Value::Null);
    }
}
