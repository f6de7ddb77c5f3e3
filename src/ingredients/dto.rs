use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct IngredientSearchParams {
    /// Case-insensitive substring match on the ingredient name.
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
pub struct CreateIngredientRequest {
    pub name: String,
    pub calories: i32,
    pub price: f64,
    /// Stock count, not a recipe quantity.
    pub quantity: i32,
    pub supplier: Option<String>,
}

/// Full replacement of the mutable fields.
#[derive(Debug, Deserialize)]
pub struct UpdateIngredientRequest {
    pub name: String,
    pub calories: i32,
    pub price: f64,
    pub quantity: i32,
    pub supplier: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct IngredientChartParams {
    /// Chart code: "#1" bar, "#2" line, "#3" pie.
    pub kind: String,
    /// Optional name filter applied before charting.
    pub name: Option<String>,
}
