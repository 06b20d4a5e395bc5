use hackboard_domain::{
    ServiceResult,
    admin::{Admin, AdminId, AdminRepository, NewAdmin},
};
use sqlx::{Pool, Row, Sqlite};

use crate::map_db_err;

pub struct SqliteAdminRepository {
    pool: Pool<Sqlite>,
}

impl SqliteAdminRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AdminRepository for SqliteAdminRepository {
    async fn get_admin_by_username(&self, username: &str) -> ServiceResult<Option<Admin>> {
        let row = sqlx::query("SELECT * FROM admins WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;
        row.map(|row| {
            Ok(Admin {
                id: row.try_get("id").map_err(map_db_err)?,
                username: row.try_get("username").map_err(map_db_err)?,
                password_hash: row.try_get("password_hash").map_err(map_db_err)?,
            })
        })
        .transpose()
    }

    async fn create_admin(&self, admin: &NewAdmin) -> ServiceResult<AdminId> {
        let res = sqlx::query("INSERT INTO admins (username, password_hash) VALUES (?, ?)")
            .bind(&admin.username)
            .bind(&admin.password_hash)
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(res.last_insert_rowid())
    }
}
