use chrono::{DateTime, Utc};
use hackboard_domain::{
    ServiceResult,
    team::{Team, TeamId, TeamRepository},
    user::{User, UserId},
};
use sqlx::{Pool, Row, Sqlite, sqlite::SqliteRow};

use crate::map_db_err;

pub struct SqliteTeamRepository {
    pool: Pool<Sqlite>,
}

impl SqliteTeamRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    fn team_from_row(row: &SqliteRow) -> sqlx::Result<Team> {
        Ok(Team {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            leader_id: row.try_get("leader_id")?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        })
    }
}

#[async_trait::async_trait]
impl TeamRepository for SqliteTeamRepository {
    async fn get_team_by_id(&self, id: TeamId) -> ServiceResult<Option<Team>> {
        let row = sqlx::query("SELECT * FROM teams WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;
        row.as_ref()
            .map(Self::team_from_row)
            .transpose()
            .map_err(map_db_err)
    }

    async fn get_team_by_name(&self, name: &str) -> ServiceResult<Option<Team>> {
        let row = sqlx::query("SELECT * FROM teams WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;
        row.as_ref()
            .map(Self::team_from_row)
            .transpose()
            .map_err(map_db_err)
    }

    async fn create_team_with_leader(
        &self,
        name: &str,
        leader_id: UserId,
        created_at: DateTime<Utc>,
    ) -> ServiceResult<TeamId> {
        // Team row, leader membership and zero score commit or roll back
        // together; a team must never exist without its score or leader.
        let mut tx = self.pool.begin().await.map_err(map_db_err)?;

        let res = sqlx::query("INSERT INTO teams (name, leader_id, created_at) VALUES (?, ?, ?)")
            .bind(name)
            .bind(leader_id)
            .bind(created_at)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;
        let team_id = res.last_insert_rowid();

        sqlx::query("INSERT INTO team_members (team_id, user_id) VALUES (?, ?)")
            .bind(team_id)
            .bind(leader_id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;

        sqlx::query("INSERT INTO scores (team_id, points) VALUES (?, 0)")
            .bind(team_id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;

        tx.commit().await.map_err(map_db_err)?;
        Ok(team_id)
    }

    async fn get_members(&self, team_id: TeamId) -> ServiceResult<Vec<User>> {
        let rows = sqlx::query(
            "SELECT users.* FROM users
             INNER JOIN team_members ON team_members.user_id = users.id
             WHERE team_members.team_id = ?
             ORDER BY users.id",
        )
        .bind(team_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;
        rows.iter()
            .map(|row| {
                Ok(User {
                    id: row.try_get("id").map_err(map_db_err)?,
                    email: row.try_get("email").map_err(map_db_err)?,
                    password_hash: row.try_get("password_hash").map_err(map_db_err)?,
                    full_name: row.try_get("full_name").map_err(map_db_err)?,
                })
            })
            .collect()
    }

    async fn is_member(&self, team_id: TeamId, user_id: UserId) -> ServiceResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM team_members WHERE team_id = ? AND user_id = ?",
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_err)?;
        Ok(count > 0)
    }

    async fn add_member(&self, team_id: TeamId, user_id: UserId) -> ServiceResult<()> {
        sqlx::query("INSERT INTO team_members (team_id, user_id) VALUES (?, ?)")
            .bind(team_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(())
    }

    async fn get_teams(&self) -> ServiceResult<Vec<Team>> {
        let rows = sqlx::query("SELECT * FROM teams ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_err)?;
        rows.iter()
            .map(|row| Self::team_from_row(row).map_err(map_db_err))
            .collect()
    }
}
