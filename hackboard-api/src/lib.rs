use axum::{
    Router, middleware,
    routing::{get, post},
};
use hackboard_domain::app::AppState;
use log::info;

mod account;
mod admin;
mod auth;
mod error;
mod team;
mod views;

pub fn build_router(app: AppState) -> Router {
    Router::new()
        .route("/", get(views::home))
        .route("/register", get(account::register_form).post(account::register))
        .route("/login", get(account::login_form).post(account::login))
        .route("/logout", get(account::logout))
        .route("/dashboard", get(views::dashboard))
        .route("/team/create", get(team::create_form).post(team::create))
        .route("/team/{id}", get(team::view))
        .route("/team/{id}/add_member", post(team::add_member))
        .route("/leaderboard", get(views::leaderboard))
        .route("/admin/login", get(admin::login_form).post(admin::login))
        .route("/admin/logout", get(admin::logout))
        .route("/admin/dashboard", get(admin::dashboard))
        .route("/admin/announce", post(admin::announce))
        .route("/admin/update_score", post(admin::update_score))
        .route("/admin/users", get(admin::users))
        .layer(middleware::from_fn_with_state(
            app.clone(),
            auth::session_middleware,
        ))
        .with_state(app)
}

pub async fn run(
    app: AppState,
    shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
) {
    let router = build_router(app);

    let port = std::env::var("HACKBOARD_HTTP_PORT")
        .expect("HACKBOARD_HTTP_PORT must be set")
        .parse::<u16>()
        .expect("HACKBOARD_HTTP_PORT must be a valid u16");

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port))
        .await
        .unwrap();

    info!("HTTP server listening on port {}", port);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .unwrap();

    info!("HTTP server shut down gracefully");
}
