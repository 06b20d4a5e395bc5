use std::sync::Arc;

use log::info;
use validator::Validate;

use crate::{ServiceError, ServiceResult};

pub type UserId = i64;

#[derive(Clone, Debug)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
}

/// A user that has not been persisted yet; the store assigns the id.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
}

pub type ArcUserRepository = Arc<Box<dyn UserRepository + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait UserRepository {
    async fn get_user_by_id(&self, id: UserId) -> ServiceResult<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> ServiceResult<Option<User>>;
    async fn create_user(&self, user: &NewUser) -> ServiceResult<UserId>;
    async fn get_users(&self) -> ServiceResult<Vec<User>>;
}

pub type ArcUserService = Arc<Box<dyn UserService + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait UserService {
    async fn register(&self, email: &str, full_name: &str, password: &str)
    -> ServiceResult<UserId>;
    async fn try_login(&self, email: &str, password: &str) -> ServiceResult<UserId>;
    async fn fetch_user(&self, id: UserId) -> ServiceResult<User>;
    async fn get_users(&self) -> ServiceResult<Vec<User>>;
}

#[derive(Validate)]
struct EmailValidator {
    #[validate(email)]
    email: String,
}

fn validate_email(email: &str) -> ServiceResult<String> {
    let validator = EmailValidator {
        email: email.trim().to_string(),
    };
    if validator.validate().is_err() {
        return ServiceError::bad_request("Invalid email address");
    }
    Ok(validator.email)
}

pub struct UserServiceImpl {
    user_repository: ArcUserRepository,
}

impl UserServiceImpl {
    pub fn new(user_repository: ArcUserRepository) -> Self {
        Self { user_repository }
    }
}

#[async_trait::async_trait]
impl UserService for UserServiceImpl {
    async fn register(
        &self,
        email: &str,
        full_name: &str,
        password: &str,
    ) -> ServiceResult<UserId> {
        let email = validate_email(email)?;
        let full_name = full_name.trim();
        if full_name.is_empty() {
            return ServiceError::bad_request("Full name is required");
        }
        if password.is_empty() {
            return ServiceError::bad_request("Password is required");
        }
        if self
            .user_repository
            .get_user_by_email(&email)
            .await?
            .is_some()
        {
            return ServiceError::conflict("Email already registered.");
        }
        let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)
            .map_err(|e| ServiceError::Internal(format!("Failed to hash password: {}", e)))?;
        let id = self
            .user_repository
            .create_user(&NewUser {
                email: email.clone(),
                full_name: full_name.to_string(),
                password_hash,
            })
            .await?;
        info!("Registered user {} ({})", id, email);
        Ok(id)
    }

    async fn try_login(&self, email: &str, password: &str) -> ServiceResult<UserId> {
        // Same generic message whether the email or the password was wrong.
        let Some(user) = self.user_repository.get_user_by_email(email).await? else {
            return ServiceError::unauthorized("Invalid credentials.");
        };
        let valid = bcrypt::verify(password, &user.password_hash)
            .map_err(|e| ServiceError::Internal(format!("Failed to verify password: {}", e)))?;
        if !valid {
            return ServiceError::unauthorized("Invalid credentials.");
        }
        Ok(user.id)
    }

    async fn fetch_user(&self, id: UserId) -> ServiceResult<User> {
        match self.user_repository.get_user_by_id(id).await? {
            Some(user) => Ok(user),
            None => ServiceError::not_found("User not found"),
        }
    }

    async fn get_users(&self) -> ServiceResult<Vec<User>> {
        self.user_repository.get_users().await
    }
}

#[derive(Default, Clone)]
pub struct MockUserRepository {
    users: Arc<std::sync::Mutex<Vec<User>>>,
}

#[async_trait::async_trait]
impl UserRepository for MockUserRepository {
    async fn get_user_by_id(&self, id: UserId) -> ServiceResult<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> ServiceResult<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn create_user(&self, user: &NewUser) -> ServiceResult<UserId> {
        let mut users = self.users.lock().unwrap();
        let id = users.len() as UserId + 1;
        users.push(User {
            id,
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            password_hash: user.password_hash.clone(),
        });
        Ok(id)
    }

    async fn get_users(&self) -> ServiceResult<Vec<User>> {
        Ok(self.users.lock().unwrap().clone())
    }
}
