use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{delete, get, patch, post},
};
use tower_http::cors::CorsLayer;

use crate::{
    api::http::{
        auth as auth_http, comments as comments_http, communities as communities_http,
        events as events_http, questions as questions_http, votes as votes_http,
    },
    app::state::AppState,
    auth::middleware::auth_middleware,
    telemetry,
};

pub fn build_router(state: AppState) -> Router {
    let cors_origin = std::env::var("CORS_ORIGIN")
        .unwrap_or_else(|_| "http://localhost:5173".to_string());
    let cors = CorsLayer::new()
        .allow_origin(
            cors_origin
                .parse::<HeaderValue>()
                .unwrap_or_else(|_| HeaderValue::from_static("http://localhost:5173")),
        )
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    let public_routes = Router::new()
        .route("/auth/register", post(auth_http::register_handle))
        .route("/auth/login", post(auth_http::login_handle))
        .route("/communities", get(communities_http::list_communities_handle));

    let authed_routes = Router::new()
        .route("/users/me", get(auth_http::get_me_handle))
        .route("/users/{user_id}/role", patch(auth_http::update_role_handle))
        .route(
            "/api/questions",
            get(questions_http::list_questions_handle).post(questions_http::create_question_handle),
        )
        .route(
            "/api/questions/{question_id}",
            get(questions_http::get_question_handle)
                .patch(questions_http::update_question_handle)
                .delete(questions_http::delete_question_handle),
        )
        .route(
            "/api/questions/{question_id}/comments",
            get(comments_http::list_question_comments_handle)
                .post(comments_http::create_question_comment_handle),
        )
        .route(
            "/api/comments/{comment_id}",
            delete(comments_http::delete_comment_handle),
        )
        .route("/api/votes", post(votes_http::cast_vote_handle))
        .route(
            "/api/events",
            get(events_http::list_events_handle).post(events_http::create_event_handle),
        )
        .route(
            "/api/events/{event_id}",
            get(events_http::get_event_handle)
                .patch(events_http::update_event_handle)
                .delete(events_http::delete_event_handle),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(authed_routes)
        .layer(middleware::from_fn(telemetry::request_logging_middleware))
        .layer(cors)
        .with_state(state)
}
