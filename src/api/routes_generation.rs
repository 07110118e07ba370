use super::*;
use levelsynth::constraints::{ValidateRequest, ValidateResult};
use levelsynth::{DetectionResponse, Synthesis};

pub(super) async fn generate_level(
    State(state): State<AppState>,
    Json(req): Json<DetectionResponse>,
) -> Json<ApiResponse<Synthesis>> {
    let result = levelsynth::synthesize(&req, &state.config);
    let repair = &result.report.repair;
    log::info!(
        "[levelsynth API] generated level: {} detection(s) -> {} object(s), {} bridge(s), converged={}",
        req.detections.len(),
        result.scene.objects.len(),
        repair.inserted,
        repair.converged
    );
    Json(ApiResponse::success(result))
}

pub(super) async fn validate_scene(
    State(state): State<AppState>,
    Json(req): Json<ValidateRequest>,
) -> Json<ApiResponse<ValidateResult>> {
    let result = levelsynth::constraints::validate(&req.scene, &state.config, &req.constraints);
    Json(ApiResponse::success(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;
    use tower::util::ServiceExt;

    fn app() -> Router {
        let security = ApiSecurity {
            required_token: None,
            rate_limit_per_sec: 1000,
            buckets: Arc::new(Mutex::new(HashMap::new())),
        };
        build_router(AppState::new(SynthConfig::default()), security)
    }

    async fn body_json(res: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json")
    }

    fn post_json(uri: &str, body: serde_json::Value) -> HttpRequest<Body> {
        HttpRequest::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    #[tokio::test]
    async fn generate_returns_scene_and_report() {
        let payload = serde_json::json!({
            "image": { "w": 640, "h": 480 },
            "detections": [
                { "label": "sofa", "category": "furniture", "confidence": 0.9,
                  "bounds_normalized": { "x": 0.1, "y": 0.2, "w": 0.5, "h": 0.3 } },
                { "label": "apple", "category": "food", "confidence": 0.8,
                  "bounds_normalized": { "x": 0.6, "y": 0.6, "w": 0.05, "h": 0.05 } }
            ]
        });
        let res = app().oneshot(post_json("/generate", payload)).await.expect("response");
        assert_eq!(res.status(), StatusCode::OK);
        let json = body_json(res).await;
        assert_eq!(json["ok"], true);
        let scene = &json["data"]["scene"];
        assert_eq!(scene["version"], 1);
        assert_eq!(scene["image"]["w"], 640);
        assert!(scene["image"]["h"].is_u64());
        assert!(scene["rules"].as_array().expect("rules").is_empty());
        assert!(scene["spawns"]["pickups"].as_array().expect("pickups").len() >= 2);
        assert_eq!(json["data"]["report"]["repair"]["converged"], true);
        let objects = scene["objects"].as_array().expect("objects");
        assert!(objects
            .iter()
            .any(|o| o["type"] == "collectible" && o["label"] == "apple"));
    }

    #[tokio::test]
    async fn generate_rejects_malformed_body() {
        let payload = serde_json::json!({ "image": { "w": 640 } });
        let res = app().oneshot(post_json("/generate", payload)).await.expect("response");
        assert!(res.status().is_client_error());
    }

    #[tokio::test]
    async fn validate_round_trips_generated_scene() {
        let cfg = SynthConfig::default();
        let scene = levelsynth::build_scene(
            &DetectionResponse {
                image: levelsynth::ImageSize::new(100, 100),
                detections: vec![],
            },
            &cfg,
        );
        let payload = serde_json::json!({ "scene": scene });
        let res = app().oneshot(post_json("/validate", payload)).await.expect("response");
        assert_eq!(res.status(), StatusCode::OK);
        let json = body_json(res).await;
        assert_eq!(json["data"]["valid"], true);
    }

    #[tokio::test]
    async fn config_and_health_endpoints() {
        let res = app()
            .oneshot(
                HttpRequest::builder()
                    .uri("/config")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        let json = body_json(res).await;
        assert_eq!(json["data"]["max_platforms"], 12);

        let res = app()
            .oneshot(
                HttpRequest::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::OK);
    }
}
