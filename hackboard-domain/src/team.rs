use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::info;

use crate::{
    ServiceError, ServiceResult,
    user::{ArcUserRepository, User, UserId},
};

pub type TeamId = i64;

#[derive(Clone, Debug)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub leader_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// Result of an add-member request; adding an existing member is an
/// informational no-op rather than an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddMemberOutcome {
    Added,
    AlreadyMember,
}

pub type ArcTeamRepository = Arc<Box<dyn TeamRepository + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait TeamRepository {
    async fn get_team_by_id(&self, id: TeamId) -> ServiceResult<Option<Team>>;
    async fn get_team_by_name(&self, name: &str) -> ServiceResult<Option<Team>>;
    /// Creates the team row, the leader membership and the zero-point score
    /// row as one atomic unit; on failure nothing may persist.
    async fn create_team_with_leader(
        &self,
        name: &str,
        leader_id: UserId,
        created_at: DateTime<Utc>,
    ) -> ServiceResult<TeamId>;
    async fn get_members(&self, team_id: TeamId) -> ServiceResult<Vec<User>>;
    async fn is_member(&self, team_id: TeamId, user_id: UserId) -> ServiceResult<bool>;
    async fn add_member(&self, team_id: TeamId, user_id: UserId) -> ServiceResult<()>;
    async fn get_teams(&self) -> ServiceResult<Vec<Team>>;
}

pub type ArcTeamService = Arc<Box<dyn TeamService + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait TeamService {
    async fn create_team(&self, name: &str, leader_id: UserId) -> ServiceResult<TeamId>;
    async fn add_member(
        &self,
        team_id: TeamId,
        requester_id: UserId,
        member_email: &str,
    ) -> ServiceResult<AddMemberOutcome>;
    async fn get_team(&self, team_id: TeamId) -> ServiceResult<(Team, Vec<User>)>;
    async fn get_teams(&self) -> ServiceResult<Vec<Team>>;
}

pub struct TeamServiceImpl {
    team_repository: ArcTeamRepository,
    user_repository: ArcUserRepository,
}

impl TeamServiceImpl {
    pub fn new(team_repository: ArcTeamRepository, user_repository: ArcUserRepository) -> Self {
        Self {
            team_repository,
            user_repository,
        }
    }
}

#[async_trait::async_trait]
impl TeamService for TeamServiceImpl {
    async fn create_team(&self, name: &str, leader_id: UserId) -> ServiceResult<TeamId> {
        let name = name.trim();
        if name.is_empty() {
            return ServiceError::bad_request("Team name is required");
        }
        if self.team_repository.get_team_by_name(name).await?.is_some() {
            return ServiceError::conflict("Team name already exists.");
        }
        if self
            .user_repository
            .get_user_by_id(leader_id)
            .await?
            .is_none()
        {
            return ServiceError::not_found("Leader not found");
        }
        let team_id = self
            .team_repository
            .create_team_with_leader(name, leader_id, Utc::now())
            .await?;
        info!("User {} created team {} ({})", leader_id, team_id, name);
        Ok(team_id)
    }

    async fn add_member(
        &self,
        team_id: TeamId,
        requester_id: UserId,
        member_email: &str,
    ) -> ServiceResult<AddMemberOutcome> {
        let Some(team) = self.team_repository.get_team_by_id(team_id).await? else {
            return ServiceError::not_found("Team not found.");
        };
        if team.leader_id != requester_id {
            return ServiceError::unauthorized("Only team leader can add members.");
        }
        let Some(user) = self.user_repository.get_user_by_email(member_email).await? else {
            return ServiceError::not_found("No user with that email.");
        };
        if self.team_repository.is_member(team_id, user.id).await? {
            return Ok(AddMemberOutcome::AlreadyMember);
        }
        self.team_repository.add_member(team_id, user.id).await?;
        info!("User {} joined team {}", user.id, team_id);
        Ok(AddMemberOutcome::Added)
    }

    async fn get_team(&self, team_id: TeamId) -> ServiceResult<(Team, Vec<User>)> {
        let Some(team) = self.team_repository.get_team_by_id(team_id).await? else {
            return ServiceError::not_found("Team not found.");
        };
        let members = self.team_repository.get_members(team_id).await?;
        Ok((team, members))
    }

    async fn get_teams(&self) -> ServiceResult<Vec<Team>> {
        self.team_repository.get_teams().await
    }
}

#[derive(Default)]
struct MockTeamState {
    teams: Vec<Team>,
    members: Vec<(TeamId, UserId)>,
    scores: Vec<(TeamId, i64)>,
    users: Vec<User>,
}

/// In-memory stand-in mirroring the atomicity of the SQLite implementation:
/// creating a team also records the leader membership and a zero score.
#[derive(Default, Clone)]
pub struct MockTeamRepository {
    state: Arc<std::sync::Mutex<MockTeamState>>,
}

impl MockTeamRepository {
    pub fn score_of(&self, team_id: TeamId) -> Option<i64> {
        let state = self.state.lock().unwrap();
        state
            .scores
            .iter()
            .find(|(t, _)| *t == team_id)
            .map(|(_, p)| *p)
    }

    pub fn member_count(&self, team_id: TeamId) -> usize {
        let state = self.state.lock().unwrap();
        state.members.iter().filter(|(t, _)| *t == team_id).count()
    }

    pub fn put_user(&self, user: User) {
        self.state.lock().unwrap().users.push(user);
    }
}

#[async_trait::async_trait]
impl TeamRepository for MockTeamRepository {
    async fn get_team_by_id(&self, id: TeamId) -> ServiceResult<Option<Team>> {
        let state = self.state.lock().unwrap();
        Ok(state.teams.iter().find(|t| t.id == id).cloned())
    }

    async fn get_team_by_name(&self, name: &str) -> ServiceResult<Option<Team>> {
        let state = self.state.lock().unwrap();
        Ok(state.teams.iter().find(|t| t.name == name).cloned())
    }

    async fn create_team_with_leader(
        &self,
        name: &str,
        leader_id: UserId,
        created_at: DateTime<Utc>,
    ) -> ServiceResult<TeamId> {
        let mut state = self.state.lock().unwrap();
        let id = state.teams.len() as TeamId + 1;
        state.teams.push(Team {
            id,
            name: name.to_string(),
            leader_id,
            created_at,
        });
        state.members.push((id, leader_id));
        state.scores.push((id, 0));
        Ok(id)
    }

    async fn get_members(&self, team_id: TeamId) -> ServiceResult<Vec<User>> {
        let state = self.state.lock().unwrap();
        let ids: Vec<UserId> = state
            .members
            .iter()
            .filter(|(t, _)| *t == team_id)
            .map(|(_, u)| *u)
            .collect();
        Ok(state
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn is_member(&self, team_id: TeamId, user_id: UserId) -> ServiceResult<bool> {
        let state = self.state.lock().unwrap();
        Ok(state.members.contains(&(team_id, user_id)))
    }

    async fn add_member(&self, team_id: TeamId, user_id: UserId) -> ServiceResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.members.contains(&(team_id, user_id)) {
            return ServiceError::conflict("Already a member");
        }
        state.members.push((team_id, user_id));
        Ok(())
    }

    async fn get_teams(&self) -> ServiceResult<Vec<Team>> {
        let state = self.state.lock().unwrap();
        Ok(state.teams.clone())
    }
}
