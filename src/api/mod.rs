use crate::identity::SharedProvider;
use anyhow::{anyhow, Context, Result};
use axum::{
    body::Body,
    extract::{Extension, MatchedPath},
    http::{header::CONTENT_TYPE, HeaderName, HeaderValue, Method, Request},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;
use url::Url;
use utoipa::OpenApi;

pub mod handlers;

pub use handlers::{AjaxConfig, HandlerError, SESSION_COOKIE_NAME};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,
        handlers::login::login,
        handlers::user_info::current_user,
        handlers::register::register,
        handlers::tokens::tokens,
        handlers::widget::widget,
    ),
    components(schemas(
        crate::protocol::Envelope,
        crate::protocol::EnvelopeData,
        crate::protocol::FormTokens,
        handlers::health::Health,
        handlers::types::LoginRequest,
        handlers::types::RegisterRequest,
        handlers::types::WidgetResponse,
    )),
    tags(
        (name = "login", description = "Sign in and refresh the trigger"),
        (name = "register", description = "Email-only registration"),
        (name = "tokens", description = "Per-form security tokens"),
        (name = "widget", description = "Trigger markup"),
        (name = "health", description = "Liveness"),
    )
)]
pub struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

/// Build the application router around an identity provider.
#[must_use]
pub fn router(provider: SharedProvider, config: AjaxConfig) -> Router {
    Router::new()
        .route("/menu-login/login", post(handlers::login::login))
        .route("/menu-login/current-user", post(handlers::user_info::current_user))
        .route("/menu-login/register", post(handlers::register::register))
        .route("/menu-login/tokens", get(handlers::tokens::tokens))
        .route("/menu-login/widget/:widget_id", get(handlers::widget::widget))
        .route("/menu-login/openapi.json", get(|| async { Json(openapi()) }))
        .route(
            "/health",
            get(handlers::health::health).options(handlers::health::health),
        )
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(provider))
                .layer(Extension(Arc::new(config))),
        )
}

/// Start the server
/// # Errors
/// Return error if the origin is invalid or the listener fails
pub async fn new(
    port: u16,
    provider: SharedProvider,
    config: AjaxConfig,
    allowed_origin: Option<String>,
) -> Result<()> {
    let mut app = router(provider, config);

    if let Some(origin) = allowed_origin {
        let cors = CorsLayer::new()
            .allow_headers([CONTENT_TYPE])
            .allow_methods([Method::GET, Method::POST])
            .allow_origin(AllowOrigin::exact(frontend_origin(&origin)?))
            .allow_credentials(true);
        app = app.layer(cors);
    }

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {e}");
            }
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

fn frontend_origin(base_url: &str) -> Result<HeaderValue> {
    let parsed =
        Url::parse(base_url).with_context(|| format!("Invalid allowed origin: {base_url}"))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| anyhow!("Allowed origin must include a valid host: {base_url}"))?;
    let port = parsed
        .port()
        .map_or_else(String::new, |port| format!(":{port}"));
    let origin = format!("{}://{}{}", parsed.scheme(), host, port);
    HeaderValue::from_str(&origin).context("Failed to build allowed origin header")
}
