use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};

use crate::controllers::connectivity_controller::ConnectivityController;
use crate::dto::connectivity_dto::{
    ConnectivitySummaryResponse, ProblemsQuery, ProblemsResponse, SummaryQuery,
};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_connectivity_router() -> Router<AppState> {
    Router::new()
        .route("/summary", get(get_summary))
        .route("/problems", get(get_problems))
        .route("/refresh", post(refresh))
}

fn controller(state: &AppState) -> ConnectivityController {
    ConnectivityController::new(state.connectivity.clone(), state.config.problem_table_limit)
}

async fn get_summary(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<ConnectivitySummaryResponse>, AppError> {
    let response = controller(&state).summary(query).await?;
    Ok(Json(response))
}

async fn get_problems(
    State(state): State<AppState>,
    Query(query): Query<ProblemsQuery>,
) -> Result<Json<ProblemsResponse>, AppError> {
    let response = controller(&state).problems(query).await?;
    Ok(Json(response))
}

async fn refresh(State(state): State<AppState>) -> Json<serde_json::Value> {
    controller(&state).refresh().await;
    Json(serde_json::json!({
        "success": true,
        "message": "Cache de reporte y roster invalidado"
    }))
}
