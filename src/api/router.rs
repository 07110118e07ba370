use super::*;

pub(crate) fn build_router(state: AppState, security: ApiSecurity) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/config", get(get_config))
        .route("/generate", post(generate_level))
        .route("/validate", post(validate_scene))
        .route("/constraints", get(list_constraints))
        .with_state(state)
        .layer(middleware::from_fn_with_state(security, api_guard))
}
