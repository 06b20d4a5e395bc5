use std::sync::Arc;

use log::info;

use crate::{
    ServiceError, ServiceResult,
    team::{ArcTeamRepository, Team, TeamId},
};

pub type ScoreId = i64;

#[derive(Clone, Debug)]
pub struct Score {
    pub id: ScoreId,
    pub team_id: TeamId,
    pub points: i64,
}

#[derive(Clone, Debug)]
pub struct LeaderboardEntry {
    pub team: Team,
    pub points: i64,
}

pub type ArcScoreRepository = Arc<Box<dyn ScoreRepository + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait ScoreRepository {
    async fn get_score_by_team(&self, team_id: TeamId) -> ServiceResult<Option<Score>>;
    /// Create-if-absent-else-overwrite; never increments.
    async fn upsert_score(&self, team_id: TeamId, points: i64) -> ServiceResult<()>;
    /// Teams with a score row, highest points first. Teams without a score
    /// row are excluded (inner-join semantics). No secondary sort key; tie
    /// order is whatever the store yields.
    async fn get_leaderboard(&self) -> ServiceResult<Vec<LeaderboardEntry>>;
}

pub type ArcScoreService = Arc<Box<dyn ScoreService + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait ScoreService {
    async fn update_score(&self, team_id: TeamId, points: i64) -> ServiceResult<()>;
    /// Current points of a team, `None` when no score row exists yet.
    async fn team_points(&self, team_id: TeamId) -> ServiceResult<Option<i64>>;
    async fn leaderboard(&self) -> ServiceResult<Vec<LeaderboardEntry>>;
}

pub struct ScoreServiceImpl {
    score_repository: ArcScoreRepository,
    team_repository: ArcTeamRepository,
}

impl ScoreServiceImpl {
    pub fn new(score_repository: ArcScoreRepository, team_repository: ArcTeamRepository) -> Self {
        Self {
            score_repository,
            team_repository,
        }
    }
}

#[async_trait::async_trait]
impl ScoreService for ScoreServiceImpl {
    async fn update_score(&self, team_id: TeamId, points: i64) -> ServiceResult<()> {
        if self
            .team_repository
            .get_team_by_id(team_id)
            .await?
            .is_none()
        {
            return ServiceError::not_found("Team not found.");
        }
        self.score_repository.upsert_score(team_id, points).await?;
        info!("Set score of team {} to {}", team_id, points);
        Ok(())
    }

    async fn team_points(&self, team_id: TeamId) -> ServiceResult<Option<i64>> {
        Ok(self
            .score_repository
            .get_score_by_team(team_id)
            .await?
            .map(|score| score.points))
    }

    async fn leaderboard(&self) -> ServiceResult<Vec<LeaderboardEntry>> {
        self.score_repository.get_leaderboard().await
    }
}

#[derive(Default, Clone)]
pub struct MockScoreRepository {
    scores: Arc<std::sync::Mutex<Vec<Score>>>,
    teams: Arc<std::sync::Mutex<Vec<Team>>>,
}

impl MockScoreRepository {
    pub fn put_team(&self, team: Team) {
        self.teams.lock().unwrap().push(team);
    }
}

#[async_trait::async_trait]
impl ScoreRepository for MockScoreRepository {
    async fn get_score_by_team(&self, team_id: TeamId) -> ServiceResult<Option<Score>> {
        let scores = self.scores.lock().unwrap();
        Ok(scores.iter().find(|s| s.team_id == team_id).cloned())
    }

    async fn upsert_score(&self, team_id: TeamId, points: i64) -> ServiceResult<()> {
        let mut scores = self.scores.lock().unwrap();
        if let Some(score) = scores.iter_mut().find(|s| s.team_id == team_id) {
            score.points = points;
        } else {
            let id = scores.len() as ScoreId + 1;
            scores.push(Score {
                id,
                team_id,
                points,
            });
        }
        Ok(())
    }

    async fn get_leaderboard(&self) -> ServiceResult<Vec<LeaderboardEntry>> {
        let scores = self.scores.lock().unwrap();
        let teams = self.teams.lock().unwrap();
        let mut entries: Vec<LeaderboardEntry> = scores
            .iter()
            .filter_map(|s| {
                teams
                    .iter()
                    .find(|t| t.id == s.team_id)
                    .map(|team| LeaderboardEntry {
                        team: team.clone(),
                        points: s.points,
                    })
            })
            .collect();
        entries.sort_by(|a, b| b.points.cmp(&a.points));
        Ok(entries)
    }
}
