use std::sync::Arc;

use log::info;

use crate::{ServiceError, ServiceResult};

pub type AdminId = i64;

#[derive(Clone, Debug)]
pub struct Admin {
    pub id: AdminId,
    pub username: String,
    pub password_hash: String,
}

#[derive(Clone, Debug)]
pub struct NewAdmin {
    pub username: String,
    pub password_hash: String,
}

pub type ArcAdminRepository = Arc<Box<dyn AdminRepository + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait AdminRepository {
    async fn get_admin_by_username(&self, username: &str) -> ServiceResult<Option<Admin>>;
    async fn create_admin(&self, admin: &NewAdmin) -> ServiceResult<AdminId>;
}

pub type ArcAdminService = Arc<Box<dyn AdminService + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait AdminService {
    async fn try_login(&self, username: &str, password: &str) -> ServiceResult<AdminId>;
}

pub struct AdminServiceImpl {
    admin_repository: ArcAdminRepository,
}

impl AdminServiceImpl {
    pub fn new(admin_repository: ArcAdminRepository) -> Self {
        Self { admin_repository }
    }
}

#[async_trait::async_trait]
impl AdminService for AdminServiceImpl {
    async fn try_login(&self, username: &str, password: &str) -> ServiceResult<AdminId> {
        let Some(admin) = self.admin_repository.get_admin_by_username(username).await? else {
            return ServiceError::unauthorized("Invalid admin credentials.");
        };
        let valid = bcrypt::verify(password, &admin.password_hash)
            .map_err(|e| ServiceError::Internal(format!("Failed to verify password: {}", e)))?;
        if !valid {
            return ServiceError::unauthorized("Invalid admin credentials.");
        }
        info!("Admin {} logged in", admin.username);
        Ok(admin.id)
    }
}

#[derive(Default)]
pub struct MockAdminRepository {
    admins: std::sync::Mutex<Vec<Admin>>,
}

#[async_trait::async_trait]
impl AdminRepository for MockAdminRepository {
    async fn get_admin_by_username(&self, username: &str) -> ServiceResult<Option<Admin>> {
        let admins = self.admins.lock().unwrap();
        Ok(admins.iter().find(|a| a.username == username).cloned())
    }

    async fn create_admin(&self, admin: &NewAdmin) -> ServiceResult<AdminId> {
        let mut admins = self.admins.lock().unwrap();
        let id = admins.len() as AdminId + 1;
        admins.push(Admin {
            id,
            username: admin.username.clone(),
            password_hash: admin.password_hash.clone(),
        });
        Ok(id)
    }
}
