use std::sync::Arc;

use crate::{
    admin::{AdminServiceImpl, ArcAdminRepository, ArcAdminService},
    announcement::{AnnouncementServiceImpl, ArcAnnouncementRepository, ArcAnnouncementService},
    score::{ArcScoreRepository, ArcScoreService, ScoreServiceImpl},
    session::{ArcSessionService, SessionService},
    team::{ArcTeamRepository, ArcTeamService, TeamServiceImpl},
    user::{ArcUserRepository, ArcUserService, UserServiceImpl},
};

#[derive(Clone)]
pub struct AppState {
    pub user_service: ArcUserService,
    pub admin_service: ArcAdminService,
    pub team_service: ArcTeamService,
    pub score_service: ArcScoreService,
    pub announcement_service: ArcAnnouncementService,
    pub session_service: ArcSessionService,
}

pub fn construct_app(
    user_repository: ArcUserRepository,
    admin_repository: ArcAdminRepository,
    team_repository: ArcTeamRepository,
    score_repository: ArcScoreRepository,
    announcement_repository: ArcAnnouncementRepository,
) -> AppState {
    let user_service: ArcUserService =
        Arc::new(Box::new(UserServiceImpl::new(user_repository.clone())));

    let admin_service: ArcAdminService =
        Arc::new(Box::new(AdminServiceImpl::new(admin_repository)));

    let team_service: ArcTeamService = Arc::new(Box::new(TeamServiceImpl::new(
        team_repository.clone(),
        user_repository,
    )));

    let score_service: ArcScoreService = Arc::new(Box::new(ScoreServiceImpl::new(
        score_repository,
        team_repository,
    )));

    let announcement_service: ArcAnnouncementService = Arc::new(Box::new(
        AnnouncementServiceImpl::new(announcement_repository),
    ));

    let session_service: ArcSessionService = Arc::new(SessionService::new());

    AppState {
        user_service,
        admin_service,
        team_service,
        score_service,
        announcement_service,
        session_service,
    }
}
