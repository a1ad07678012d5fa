// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, dashboard, quiz},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, quizzes, dashboard).
/// * Applies global middleware (Trace, CORS).
/// * Guards the owner-facing routes with the auth middleware; the play
///   routes stay public, since the share link must work without an account.
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = [
        state.config.base_url.as_str(),
        "http://localhost:3000",
        "http://127.0.0.1:3000",
    ]
    .iter()
    .filter_map(|origin| origin.parse().ok())
    .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let require_auth = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let auth_routes = Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout));

    let quiz_routes = Router::new()
        .route(
            "/",
            post(quiz::create_quiz).route_layer(require_auth.clone()),
        )
        .route(
            "/prepare",
            post(quiz::prepare_quiz).route_layer(require_auth.clone()),
        )
        .route(
            "/owner/{user_id}",
            get(quiz::list_quizzes).route_layer(require_auth.clone()),
        )
        // Public play fetch shares the path with the guarded edit/delete.
        .route(
            "/{id}",
            get(quiz::get_quiz).merge(
                put(quiz::update_quiz)
                    .delete(quiz::delete_quiz)
                    .route_layer(require_auth.clone()),
            ),
        )
        .route(
            "/{id}/questions",
            get(quiz::quiz_analysis).route_layer(require_auth.clone()),
        )
        .route("/{id}/questions/{index}/answer", post(quiz::record_answer))
        .route("/{id}/submit", post(quiz::submit_quiz));

    let dashboard_routes = Router::new()
        .route("/{user_id}", get(dashboard::get_dashboard))
        .route_layer(require_auth);

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/quizzes", quiz_routes)
        .nest("/api/dashboard", dashboard_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
