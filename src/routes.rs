// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{delete, get, post, put},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    handlers::{admin, auth, challenge, submission, user},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware, instructor_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, challenges, users, admin).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (store and config).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
        ]))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let require_auth = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let challenge_routes = Router::new()
        .route("/", get(challenge::list_challenges))
        .route("/{id}", get(challenge::get_challenge))
        .route("/{id}/leaderboard", get(submission::get_leaderboard))
        // Any signed-in user
        .merge(
            Router::new()
                .route("/{id}/submit", post(submission::submit))
                .route("/{id}/submission", get(submission::get_my_submission))
                .layer(require_auth.clone()),
        )
        // Authors: Auth first, then role check
        .merge(
            Router::new()
                .route("/", post(challenge::create_challenge))
                .route("/{id}/status", put(challenge::update_challenge_status))
                .layer(middleware::from_fn(instructor_middleware))
                .layer(require_auth.clone()),
        );

    let user_routes = Router::new()
        .route("/{id}/streak", get(user::get_streak))
        .route("/{id}/achievements", get(user::get_achievements))
        .route("/{id}/stats", get(user::get_stats))
        .route("/{id}/submissions", get(user::list_submissions))
        .layer(require_auth.clone());

    let admin_routes = Router::new()
        .route("/users", get(admin::list_users))
        .route("/users/{id}", delete(admin::delete_user))
        .route("/challenges/{id}", delete(admin::delete_challenge))
        // Double middleware protection: Auth first, then Admin check
        .layer(middleware::from_fn(admin_middleware))
        .layer(require_auth);

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/challenges", challenge_routes)
        .nest("/api/users", user_routes)
        .nest("/api/admin", admin_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
