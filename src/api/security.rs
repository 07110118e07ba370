use super::*;
use axum::http::HeaderMap;
use std::time::{Duration, Instant};

const DEFAULT_RATE_LIMIT_PER_SEC: u32 = 180;
const RATE_WINDOW: Duration = Duration::from_secs(1);
const MAX_TRACKED_CLIENTS: usize = 4096;
const STALE_AFTER: Duration = Duration::from_secs(10);

/// Optional shared-token check plus a per-client fixed one-second window.
#[derive(Clone)]
pub(crate) struct ApiSecurity {
    pub required_token: Option<String>,
    pub rate_limit_per_sec: u32,
    pub buckets: Arc<Mutex<HashMap<String, RateBucket>>>,
}

#[derive(Clone)]
pub(crate) struct RateBucket {
    pub window_start: Instant,
    pub count: u32,
}

impl ApiSecurity {
    pub(crate) fn from_env() -> Self {
        let required_token = std::env::var("LEVELSYNTH_API_TOKEN")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        let rate_limit_per_sec = std::env::var("LEVELSYNTH_API_RATE_LIMIT_PER_SEC")
            .ok()
            .and_then(|v| v.trim().parse::<u32>().ok())
            .unwrap_or(DEFAULT_RATE_LIMIT_PER_SEC)
            .max(1);
        Self {
            required_token,
            rate_limit_per_sec,
            buckets: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Accepts `Authorization: Bearer <token>` or `x-api-key: <token>`.
    fn authorized(&self, headers: &HeaderMap) -> bool {
        let Some(expected) = self.required_token.as_deref() else {
            return true;
        };
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .unwrap_or("")
        };
        let auth = header("authorization");
        let bearer = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .unwrap_or(auth);
        bearer == expected || header("x-api-key") == expected
    }

    /// Count one request for `client` at `now`; false once the window is full.
    fn admit(&self, client: &str, now: Instant) -> bool {
        let mut buckets = self
            .buckets
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let bucket = buckets.entry(client.to_string()).or_insert(RateBucket {
            window_start: now,
            count: 0,
        });
        if now.duration_since(bucket.window_start) >= RATE_WINDOW {
            bucket.window_start = now;
            bucket.count = 0;
        }
        bucket.count = bucket.count.saturating_add(1);
        let allowed = bucket.count <= self.rate_limit_per_sec;

        if buckets.len() > MAX_TRACKED_CLIENTS {
            buckets.retain(|_, b| now.duration_since(b.window_start) < STALE_AFTER);
        }
        allowed
    }
}

fn client_key(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .or_else(|| headers.get("x-real-ip"))
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("local")
        .to_string()
}

pub(super) async fn api_guard(
    State(security): State<ApiSecurity>,
    req: Request,
    next: Next,
) -> axum::response::Response {
    if !security.authorized(req.headers()) {
        log::warn!("[levelsynth API] rejected unauthorized request to {}", req.uri().path());
        return (
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::err(
                "Unauthorized: send Authorization: Bearer <LEVELSYNTH_API_TOKEN> or x-api-key",
            )),
        )
            .into_response();
    }

    let client = client_key(req.headers());
    if !security.admit(&client, Instant::now()) {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(ApiResponse::err("Rate limit exceeded")),
        )
            .into_response();
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::Request as HttpRequest, routing::get, Router};
    use tower::util::ServiceExt;

    fn guard(token: Option<&str>, limit: u32) -> ApiSecurity {
        ApiSecurity {
            required_token: token.map(str::to_string),
            rate_limit_per_sec: limit,
            buckets: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn guarded_app(security: ApiSecurity) -> Router {
        async fn ok_handler() -> &'static str {
            "ok"
        }
        Router::new()
            .route("/", get(ok_handler))
            .layer(middleware::from_fn_with_state(security, api_guard))
    }

    #[tokio::test]
    async fn missing_or_wrong_token_is_unauthorized() {
        let app = guarded_app(guard(Some("secret"), 100));

        let req = HttpRequest::builder()
            .uri("/")
            .body(axum::body::Body::empty())
            .expect("request");
        let res = app.clone().oneshot(req).await.expect("response");
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let req_bad = HttpRequest::builder()
            .uri("/")
            .header("authorization", "Bearer nope")
            .body(axum::body::Body::empty())
            .expect("request");
        let res_bad = app.oneshot(req_bad).await.expect("response");
        assert_eq!(res_bad.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn api_key_header_is_accepted_then_rate_limited() {
        let app = guarded_app(guard(Some("secret"), 1));
        let request = || {
            HttpRequest::builder()
                .uri("/")
                .header("x-api-key", "secret")
                .header("x-real-ip", "10.0.0.7")
                .body(axum::body::Body::empty())
                .expect("request")
        };
        let first = app.clone().oneshot(request()).await.expect("response");
        assert_eq!(first.status(), StatusCode::OK);
        let second = app.oneshot(request()).await.expect("response");
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn no_token_configured_allows_everything() {
        assert!(guard(None, 1).authorized(&HeaderMap::new()));
    }

    #[test]
    fn window_resets_after_a_second() {
        let security = guard(None, 2);
        let t0 = Instant::now();
        assert!(security.admit("a", t0));
        assert!(security.admit("a", t0));
        assert!(!security.admit("a", t0));
        // other clients have their own window
        assert!(security.admit("b", t0));
        assert!(security.admit("a", t0 + Duration::from_millis(1_001)));
    }

    #[test]
    fn forwarded_for_uses_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.9, 10.0.0.1".parse().expect("header"));
        assert_eq!(client_key(&headers), "203.0.113.9");
        assert_eq!(client_key(&HeaderMap::new()), "local");
    }
}
