use axum::{
    Extension, Form, Json,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use hackboard_domain::{app::AppState, session::FlashCategory, team::AddMemberOutcome};
use serde::{Deserialize, Serialize};

use crate::{
    auth::{AuthUser, SessionHandle},
    error::{ApiError, flash_error_redirect},
    views::{FormView, TeamSummary, UserView},
};

#[derive(Deserialize)]
pub struct CreateTeamForm {
    pub name: String,
}

#[derive(Deserialize)]
pub struct AddMemberForm {
    pub email: String,
}

#[derive(Serialize)]
pub struct TeamDetailView {
    #[serde(flatten)]
    pub team: TeamSummary,
    pub members: Vec<UserView>,
    pub points: Option<i64>,
    pub flashes: Vec<hackboard_domain::session::Flash>,
}

pub async fn create_form(
    State(app): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    _user: AuthUser,
) -> Json<FormView> {
    Json(FormView {
        view: "create_team",
        flashes: app.session_service.take_flashes(&session.0),
    })
}

pub async fn create(
    State(app): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    AuthUser(user_id): AuthUser,
    Form(form): Form<CreateTeamForm>,
) -> Redirect {
    match app.team_service.create_team(&form.name, user_id).await {
        Ok(team_id) => {
            app.session_service
                .push_flash(&session.0, FlashCategory::Success, "Team created.");
            Redirect::to(&format!("/team/{}", team_id))
        }
        Err(e) => flash_error_redirect(&app, &session.0, &e, "/team/create"),
    }
}

pub async fn view(
    State(app): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    _user: AuthUser,
    Path(team_id): Path<i64>,
) -> Response {
    let (team, members) = match app.team_service.get_team(team_id).await {
        Ok(found) => found,
        Err(e) => return flash_error_redirect(&app, &session.0, &e, "/dashboard").into_response(),
    };
    let points = match app.score_service.team_points(team_id).await {
        Ok(points) => points,
        Err(e) => return ApiError(e).into_response(),
    };
    Json(TeamDetailView {
        team: TeamSummary::from(&team),
        members: members.iter().map(Into::into).collect(),
        points,
        flashes: app.session_service.take_flashes(&session.0),
    })
    .into_response()
}

pub async fn add_member(
    State(app): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    AuthUser(user_id): AuthUser,
    Path(team_id): Path<i64>,
    Form(form): Form<AddMemberForm>,
) -> Redirect {
    let back = format!("/team/{}", team_id);
    match app
        .team_service
        .add_member(team_id, user_id, &form.email)
        .await
    {
        Ok(AddMemberOutcome::Added) => {
            app.session_service
                .push_flash(&session.0, FlashCategory::Success, "Member added.");
        }
        Ok(AddMemberOutcome::AlreadyMember) => {
            app.session_service
                .push_flash(&session.0, FlashCategory::Info, "User already in team.");
        }
        Err(e) => return flash_error_redirect(&app, &session.0, &e, &back),
    }
    Redirect::to(&back)
}
