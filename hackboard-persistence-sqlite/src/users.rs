use hackboard_domain::{
    ServiceResult,
    user::{NewUser, User, UserId, UserRepository},
};
use sqlx::{Pool, Row, Sqlite, sqlite::SqliteRow};

use crate::map_db_err;

pub struct SqliteUserRepository {
    pool: Pool<Sqlite>,
}

impl SqliteUserRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    fn user_from_row(row: &SqliteRow) -> sqlx::Result<User> {
        Ok(User {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            full_name: row.try_get("full_name")?,
        })
    }
}

#[async_trait::async_trait]
impl UserRepository for SqliteUserRepository {
    async fn get_user_by_id(&self, id: UserId) -> ServiceResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;
        row.as_ref()
            .map(Self::user_from_row)
            .transpose()
            .map_err(map_db_err)
    }

    async fn get_user_by_email(&self, email: &str) -> ServiceResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;
        row.as_ref()
            .map(Self::user_from_row)
            .transpose()
            .map_err(map_db_err)
    }

    async fn create_user(&self, user: &NewUser) -> ServiceResult<UserId> {
        let res = sqlx::query(
            "INSERT INTO users (email, password_hash, full_name) VALUES (?, ?, ?)",
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;
        Ok(res.last_insert_rowid())
    }

    async fn get_users(&self) -> ServiceResult<Vec<User>> {
        let rows = sqlx::query("SELECT * FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_err)?;
        rows.iter()
            .map(|row| Self::user_from_row(row).map_err(map_db_err))
            .collect()
    }
}
