use chrono::{DateTime, Utc};
use hackboard_domain::{
    ServiceResult,
    score::{LeaderboardEntry, Score, ScoreRepository},
    team::{Team, TeamId},
};
use sqlx::{Pool, Row, Sqlite};

use crate::map_db_err;

pub struct SqliteScoreRepository {
    pool: Pool<Sqlite>,
}

impl SqliteScoreRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ScoreRepository for SqliteScoreRepository {
    async fn get_score_by_team(&self, team_id: TeamId) -> ServiceResult<Option<Score>> {
        let row = sqlx::query("SELECT * FROM scores WHERE team_id = ?")
            .bind(team_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;
        row.map(|row| {
            Ok(Score {
                id: row.try_get("id").map_err(map_db_err)?,
                team_id: row.try_get("team_id").map_err(map_db_err)?,
                points: row.try_get("points").map_err(map_db_err)?,
            })
        })
        .transpose()
    }

    async fn upsert_score(&self, team_id: TeamId, points: i64) -> ServiceResult<()> {
        // Single atomic statement; overwrites any existing value.
        sqlx::query(
            "INSERT INTO scores (team_id, points) VALUES (?, ?)
             ON CONFLICT(team_id) DO UPDATE SET points = excluded.points",
        )
        .bind(team_id)
        .bind(points)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;
        Ok(())
    }

    async fn get_leaderboard(&self) -> ServiceResult<Vec<LeaderboardEntry>> {
        let rows = sqlx::query(
            "SELECT teams.id, teams.name, teams.leader_id, teams.created_at, scores.points
             FROM teams
             INNER JOIN scores ON scores.team_id = teams.id
             ORDER BY scores.points DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;
        rows.iter()
            .map(|row| {
                Ok(LeaderboardEntry {
                    team: Team {
                        id: row.try_get("id").map_err(map_db_err)?,
                        name: row.try_get("name").map_err(map_db_err)?,
                        leader_id: row.try_get("leader_id").map_err(map_db_err)?,
                        created_at: row
                            .try_get::<DateTime<Utc>, _>("created_at")
                            .map_err(map_db_err)?,
                    },
                    points: row.try_get("points").map_err(map_db_err)?,
                })
            })
            .collect()
    }
}
