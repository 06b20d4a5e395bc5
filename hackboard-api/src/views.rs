use axum::{Extension, Json, extract::State};
use hackboard_domain::{
    announcement::Announcement,
    app::AppState,
    score::LeaderboardEntry,
    session::Flash,
    team::Team,
    user::User,
};
use serde::Serialize;

use crate::{
    auth::{AuthUser, SessionHandle},
    error::ApiError,
};

#[derive(Serialize)]
pub struct AnnouncementView {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub created_at: String,
}

impl From<&Announcement> for AnnouncementView {
    fn from(a: &Announcement) -> Self {
        Self {
            id: a.id,
            title: a.title.clone(),
            body: a.body.clone(),
            created_at: a.created_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
pub struct LeaderboardRow {
    pub team_id: i64,
    pub name: String,
    pub points: i64,
}

impl From<&LeaderboardEntry> for LeaderboardRow {
    fn from(entry: &LeaderboardEntry) -> Self {
        Self {
            team_id: entry.team.id,
            name: entry.team.name.clone(),
            points: entry.points,
        }
    }
}

/// Never exposes the password hash.
#[derive(Serialize)]
pub struct UserView {
    pub id: i64,
    pub email: String,
    pub full_name: String,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            full_name: user.full_name.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct TeamSummary {
    pub id: i64,
    pub name: String,
    pub leader_id: i64,
    pub created_at: String,
}

impl From<&Team> for TeamSummary {
    fn from(team: &Team) -> Self {
        Self {
            id: team.id,
            name: team.name.clone(),
            leader_id: team.leader_id,
            created_at: team.created_at.to_rfc3339(),
        }
    }
}

/// Shell for the form pages; carries only the pending flashes.
#[derive(Serialize)]
pub struct FormView {
    pub view: &'static str,
    pub flashes: Vec<Flash>,
}

#[derive(Serialize)]
pub struct HomeView {
    pub announcements: Vec<AnnouncementView>,
    pub leaderboard: Vec<LeaderboardRow>,
    pub flashes: Vec<Flash>,
}

pub async fn home(
    State(app): State<AppState>,
    Extension(session): Extension<SessionHandle>,
) -> Result<Json<HomeView>, ApiError> {
    let announcements = app.announcement_service.list_announcements(Some(5)).await?;
    let leaderboard = app.score_service.leaderboard().await?;
    Ok(Json(HomeView {
        announcements: announcements.iter().map(Into::into).collect(),
        leaderboard: leaderboard.iter().map(Into::into).collect(),
        flashes: app.session_service.take_flashes(&session.0),
    }))
}

#[derive(Serialize)]
pub struct LeaderboardView {
    pub leaderboard: Vec<LeaderboardRow>,
    pub flashes: Vec<Flash>,
}

pub async fn leaderboard(
    State(app): State<AppState>,
    Extension(session): Extension<SessionHandle>,
) -> Result<Json<LeaderboardView>, ApiError> {
    let leaderboard = app.score_service.leaderboard().await?;
    Ok(Json(LeaderboardView {
        leaderboard: leaderboard.iter().map(Into::into).collect(),
        flashes: app.session_service.take_flashes(&session.0),
    }))
}

#[derive(Serialize)]
pub struct DashboardView {
    pub user: UserView,
    pub announcements: Vec<AnnouncementView>,
    pub flashes: Vec<Flash>,
}

pub async fn dashboard(
    State(app): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<DashboardView>, ApiError> {
    let user = app.user_service.fetch_user(user_id).await?;
    let announcements = app.announcement_service.list_announcements(None).await?;
    Ok(Json(DashboardView {
        user: UserView::from(&user),
        announcements: announcements.iter().map(Into::into).collect(),
        flashes: app.session_service.take_flashes(&session.0),
    }))
}
