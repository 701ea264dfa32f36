use axum::{
    http::{header, HeaderName, Method, StatusCode},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use account_lib::repository::{RoleRepository, UserRepository};
use account_lib::user_service::UserService;
use account_lib::util::connect_with_retry;

use admin_api::config::MiddlewareConfig;
use admin_api::constants::{ADMIN_API_PORT, DATABASE_URL, ENV, LOCAL_ENV, SERVICE};
use admin_api::identity::{HttpIdentityProvider, IdentityConfig};
use admin_api::methods::add_user::{__path_add_user, add_user};
use admin_api::methods::delete_user::{__path_delete_user, delete_user};
use admin_api::methods::entities::{
    AddUserRequest, DeletedUserResponse, OperationResponse, ProfileResponse,
    ProfileUpdateResponse, RoleResponse, UpdateProfileRequest, UpdateUserRequest, UserResponse,
    UserWithRolesResponse,
};
use admin_api::methods::get_profile::{__path_get_profile, get_profile};
use admin_api::methods::get_user_by_id::{__path_get_user_by_id, get_user_by_id};
use admin_api::methods::health_check::health_check;
use admin_api::methods::list_roles::{__path_list_roles, list_roles};
use admin_api::methods::list_users::{__path_list_users, list_users};
use admin_api::methods::routes::{
    API_V1_PREFIX, PROFILE_PATH, ROLES_PATH, SERVICE_DOCS_PATH, SERVICE_HEALTH_PATH,
    USERS_BY_ID_PATH, USERS_PATH,
};
use admin_api::methods::update_profile::{__path_update_profile, update_profile};
use admin_api::methods::update_user::{__path_update_user, update_user};
use admin_api::shutdown::shutdown_signal;
use admin_api::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        list_users, get_user_by_id, add_user, update_user, delete_user,
        list_roles, get_profile, update_profile
    ),
    components(schemas(
        AddUserRequest, UpdateUserRequest, UpdateProfileRequest,
        UserResponse, UserWithRolesResponse, RoleResponse,
        OperationResponse, DeletedUserResponse, ProfileResponse,
        ProfileUpdateResponse
    )),
    tags(
        (name = "users", description = "Admin user management endpoints"),
        (name = "roles", description = "Role listing for the admin forms"),
        (name = "profile", description = "Caller-scoped profile endpoints")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    // Setup tracing subscriber
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let env =
        std::env::var(ENV).map_err(|_| format!("{} environment variable must be set", ENV))?;

    let registry = tracing_subscriber::registry().with(filter);

    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true);

    if env == LOCAL_ENV {
        let pretty_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .pretty();
        registry.with(json_layer).with(pretty_layer).init();
    } else {
        registry.with(json_layer).init();
    }

    tracing::info!(service = SERVICE, env = %env, "tracing initialized");

    let middleware_config = MiddlewareConfig::from_env();
    tracing::info!(
        rate_limit_per_minute = middleware_config.rate_limit_per_minute,
        rate_limit_burst = middleware_config.rate_limit_burst,
        request_timeout_secs = middleware_config.request_timeout.as_secs(),
        max_body_size = middleware_config.max_body_size,
        cors_origins = ?middleware_config.cors_allowed_origins,
        "middleware configuration loaded"
    );

    // Setup database pool (read-side user store)
    let database_url = std::env::var(DATABASE_URL)
        .map_err(|_| format!("{} environment variable must be set", DATABASE_URL))?;

    let pool = connect_with_retry(&database_url, 10).await?;

    // Identity provider client + shared service
    let provider = Arc::new(HttpIdentityProvider::new(IdentityConfig::from_env())?);
    let user_service = UserService::new(
        provider,
        Arc::new(UserRepository::new(pool.clone())),
        Arc::new(RoleRepository::new(pool)),
    );

    let app_state = AppState {
        user_service: Arc::new(user_service),
        env: env.clone(),
    };

    // Build versioned API routes (v1)
    let v1_routes = Router::new()
        .route(USERS_PATH, get(list_users).post(add_user))
        .route(
            USERS_BY_ID_PATH,
            get(get_user_by_id).put(update_user).delete(delete_user),
        )
        .route(ROLES_PATH, get(list_roles))
        .route(PROFILE_PATH, get(get_profile).put(update_profile));

    // Build root-level routes (health, docs)
    let root_routes = Router::new()
        .route(SERVICE_HEALTH_PATH, get(health_check))
        .merge(SwaggerUi::new(SERVICE_DOCS_PATH).url("/api-doc/openapi.json", ApiDoc::openapi()));

    let mut app = Router::new()
        .nest(API_V1_PREFIX, v1_routes)
        .merge(root_routes)
        .with_state(app_state);

    // Middleware stack (applied inner to outer)

    // 1. Trace layer (innermost - closest to handler)
    app = app.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(tracing::Level::DEBUG))
            .on_response(DefaultOnResponse::new().level(tracing::Level::DEBUG)),
    );

    // 2. Request ID layers
    let x_request_id = HeaderName::from_static("x-request-id");
    app = app
        .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
        .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid));

    // 3. Body limit layer
    app = app.layer(RequestBodyLimitLayer::new(middleware_config.max_body_size));

    // 4. CORS layer
    let cors_layer = if middleware_config
        .cors_allowed_origins
        .contains(&"*".to_string())
    {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, x_request_id])
    } else {
        let origins: Vec<_> = middleware_config
            .cors_allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([
                header::CONTENT_TYPE,
                header::AUTHORIZATION,
                HeaderName::from_static("x-request-id"),
            ])
    };
    app = app.layer(cors_layer);

    // 5. Timeout layer (returns 408 Request Timeout)
    app = app.layer(TimeoutLayer::with_status_code(
        StatusCode::REQUEST_TIMEOUT,
        middleware_config.request_timeout,
    ));

    // 6. Rate limiting layer (outermost)
    let replenish_interval_ms = 60_000 / middleware_config.rate_limit_per_minute as u64;
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(replenish_interval_ms)
            .burst_size(middleware_config.rate_limit_burst)
            .finish()
            .ok_or("failed to build governor config")?,
    );
    app = app.layer(GovernorLayer {
        config: governor_conf,
    });

    // Read port from env (default to 3333)
    let port: u16 = std::env::var(ADMIN_API_PORT)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3333);

    let addr = format!("0.0.0.0:{}", port);
    let public_url = format!("http://127.0.0.1:{}", port);

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;

    tracing::info!("admin-api is ready to accept requests at: {}", public_url);
    tracing::info!("API v1 endpoints available at: {}/v1", public_url);

    // Serve with graceful shutdown
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(middleware_config.shutdown_timeout))
    .await
    .map_err(|e| format!("Server error: {}", e))?;

    Ok(())
}
