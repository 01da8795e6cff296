//! Admin user management and user lookup

use std::sync::Arc;

use atlas_auth::Role;
use atlas_common::{hash_password, Error, Result};
use uuid::Uuid;

use crate::domain::entities::User;
use crate::repository::{UserRepository, UsersRepositories};

/// Admin-supplied account details
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    pub email: String,
    pub name: String,
    pub password: String,
    pub role: Role,
}

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repos: &UsersRepositories) -> Self {
        Self {
            users: repos.users.clone(),
        }
    }

    pub async fn create_user(&self, input: CreateUserInput) -> Result<User> {
        if self.users.find_by_email(&input.email).await?.is_some() {
            return Err(Error::Conflict("User already exists".to_string()));
        }

        let user = User::new(
            input.email,
            input.name,
            hash_password(&input.password)?,
            input.role,
        )?;
        let user = self.users.create(&user).await?;

        tracing::info!(user_id = %user.id, role = %user.role, "User created");
        Ok(user)
    }

    /// Create the bootstrap admin unless an account with that email exists.
    ///
    /// Returns the new user, or `None` when nothing was created.
    pub async fn ensure_admin(
        &self,
        email: String,
        name: String,
        password: String,
    ) -> Result<Option<User>> {
        if let Some(existing) = self.users.find_by_email(&email).await? {
            if existing.role != Role::Admin {
                tracing::warn!(
                    user_id = %existing.id,
                    "Bootstrap admin email belongs to a non-admin account"
                );
            }
            return Ok(None);
        }

        let user = self
            .create_user(CreateUserInput {
                email,
                name,
                password,
                role: Role::Admin,
            })
            .await?;
        Ok(Some(user))
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))
    }
}
