use axum::{Extension, Form, Json, extract::State, response::Redirect};
use hackboard_domain::{app::AppState, session::Flash, session::FlashCategory};
use serde::{Deserialize, Serialize};

use crate::{
    auth::{AuthAdmin, SessionHandle},
    error::{ApiError, flash_error_redirect},
    views::{AnnouncementView, FormView, TeamSummary, UserView},
};

#[derive(Deserialize)]
pub struct AdminLoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct AnnounceForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
}

/// Both fields arrive as raw form text; points must parse as an integer
/// before any store access happens.
#[derive(Deserialize)]
pub struct UpdateScoreForm {
    #[serde(default)]
    pub team_id: String,
    #[serde(default)]
    pub points: String,
}

pub async fn login_form(
    State(app): State<AppState>,
    Extension(session): Extension<SessionHandle>,
) -> Json<FormView> {
    Json(FormView {
        view: "admin_login",
        flashes: app.session_service.take_flashes(&session.0),
    })
}

pub async fn login(
    State(app): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    Form(form): Form<AdminLoginForm>,
) -> Redirect {
    match app
        .admin_service
        .try_login(&form.username, &form.password)
        .await
    {
        Ok(admin_id) => {
            app.session_service.bind_admin(&session.0, admin_id);
            app.session_service
                .push_flash(&session.0, FlashCategory::Success, "Admin logged in.");
            Redirect::to("/admin/dashboard")
        }
        Err(_) => {
            app.session_service.push_flash(
                &session.0,
                FlashCategory::Danger,
                "Invalid admin credentials.",
            );
            Redirect::to("/admin/login")
        }
    }
}

pub async fn logout(
    State(app): State<AppState>,
    Extension(session): Extension<SessionHandle>,
) -> Redirect {
    // Only the admin binding goes away; the session itself and its
    // pending flashes survive.
    app.session_service.clear_admin(&session.0);
    app.session_service
        .push_flash(&session.0, FlashCategory::Info, "Admin logged out.");
    Redirect::to("/")
}

#[derive(Serialize)]
pub struct AdminDashboardView {
    pub announcements: Vec<AnnouncementView>,
    pub teams: Vec<TeamSummary>,
    pub users: Vec<UserView>,
    pub flashes: Vec<Flash>,
}

pub async fn dashboard(
    State(app): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    _admin: AuthAdmin,
) -> Result<Json<AdminDashboardView>, ApiError> {
    let announcements = app.announcement_service.list_announcements(None).await?;
    let teams = app.team_service.get_teams().await?;
    let users = app.user_service.get_users().await?;
    Ok(Json(AdminDashboardView {
        announcements: announcements.iter().map(Into::into).collect(),
        teams: teams.iter().map(Into::into).collect(),
        users: users.iter().map(Into::into).collect(),
        flashes: app.session_service.take_flashes(&session.0),
    }))
}

pub async fn announce(
    State(app): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    _admin: AuthAdmin,
    Form(form): Form<AnnounceForm>,
) -> Redirect {
    match app
        .announcement_service
        .post_announcement(&form.title, &form.body)
        .await
    {
        Ok(_) => {
            app.session_service
                .push_flash(&session.0, FlashCategory::Success, "Announcement posted.");
            Redirect::to("/admin/dashboard")
        }
        Err(e) => flash_error_redirect(&app, &session.0, &e, "/admin/dashboard"),
    }
}

pub async fn update_score(
    State(app): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    _admin: AuthAdmin,
    Form(form): Form<UpdateScoreForm>,
) -> Redirect {
    let Ok(points) = form.points.trim().parse::<i64>() else {
        app.session_service.push_flash(
            &session.0,
            FlashCategory::Danger,
            "Invalid points value.",
        );
        return Redirect::to("/admin/dashboard");
    };
    // A non-numeric team id cannot name any team.
    let Ok(team_id) = form.team_id.trim().parse::<i64>() else {
        app.session_service
            .push_flash(&session.0, FlashCategory::Warning, "Team not found.");
        return Redirect::to("/admin/dashboard");
    };
    match app.score_service.update_score(team_id, points).await {
        Ok(()) => {
            app.session_service
                .push_flash(&session.0, FlashCategory::Success, "Score updated.");
            Redirect::to("/admin/dashboard")
        }
        Err(e) => flash_error_redirect(&app, &session.0, &e, "/admin/dashboard"),
    }
}

#[derive(Serialize)]
pub struct AdminUsersView {
    pub users: Vec<UserView>,
    pub flashes: Vec<Flash>,
}

pub async fn users(
    State(app): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    _admin: AuthAdmin,
) -> Result<Json<AdminUsersView>, ApiError> {
    let users = app.user_service.get_users().await?;
    Ok(Json(AdminUsersView {
        users: users.iter().map(Into::into).collect(),
        flashes: app.session_service.take_flashes(&session.0),
    }))
}
