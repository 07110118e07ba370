use super::*;

pub(super) async fn health() -> &'static str {
    "ok"
}

pub(super) async fn get_config(State(state): State<AppState>) -> Json<ApiResponse<SynthConfig>> {
    Json(ApiResponse::success(state.config.as_ref().clone()))
}

pub(super) async fn list_constraints() -> Json<ApiResponse<Vec<&'static str>>> {
    Json(ApiResponse::success(
        levelsynth::constraints::ALL_CONSTRAINTS.to_vec(),
    ))
}
