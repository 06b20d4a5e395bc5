use axum::{Extension, Form, Json, extract::State, response::Redirect};
use hackboard_domain::{app::AppState, session::FlashCategory};
use serde::Deserialize;

use crate::{auth::SessionHandle, error::flash_error_redirect, views::FormView};

#[derive(Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub full_name: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

pub async fn register_form(
    State(app): State<AppState>,
    Extension(session): Extension<SessionHandle>,
) -> Json<FormView> {
    Json(FormView {
        view: "register",
        flashes: app.session_service.take_flashes(&session.0),
    })
}

pub async fn register(
    State(app): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    Form(form): Form<RegisterForm>,
) -> Redirect {
    match app
        .user_service
        .register(&form.email, &form.full_name, &form.password)
        .await
    {
        Ok(_) => {
            app.session_service.push_flash(
                &session.0,
                FlashCategory::Success,
                "Account created. Please log in.",
            );
            Redirect::to("/login")
        }
        Err(e) => flash_error_redirect(&app, &session.0, &e, "/register"),
    }
}

pub async fn login_form(
    State(app): State<AppState>,
    Extension(session): Extension<SessionHandle>,
) -> Json<FormView> {
    Json(FormView {
        view: "login",
        flashes: app.session_service.take_flashes(&session.0),
    })
}

pub async fn login(
    State(app): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    Form(form): Form<LoginForm>,
) -> Redirect {
    match app.user_service.try_login(&form.email, &form.password).await {
        Ok(user_id) => {
            app.session_service.bind_user(&session.0, user_id);
            app.session_service.push_flash(
                &session.0,
                FlashCategory::Success,
                "Logged in successfully.",
            );
            Redirect::to("/dashboard")
        }
        Err(_) => {
            // Generic by design; no hint whether the email exists.
            app.session_service
                .push_flash(&session.0, FlashCategory::Danger, "Invalid credentials.");
            Redirect::to("/login")
        }
    }
}

pub async fn logout(
    State(app): State<AppState>,
    Extension(session): Extension<SessionHandle>,
) -> Redirect {
    app.session_service.clear(&session.0);
    app.session_service
        .push_flash(&session.0, FlashCategory::Info, "Logged out.");
    Redirect::to("/")
}
