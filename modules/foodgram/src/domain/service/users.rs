use chrono::Utc;
use tracing::{debug, info, instrument};

use super::{page_of, page_window, Service};
use crate::contract::model::{NewUser, Page, PageRequest, Principal, User, UserId};
use crate::domain::error::DomainError;
use crate::domain::permissions::{authorize, Operation};
use crate::domain::repo::RepoError;
use crate::domain::validation;

impl Service {
    /// Resolve a token key to its owner. Unknown keys are rejected, not downgraded
    /// to an anonymous principal.
    #[instrument(name = "foodgram.service.authenticate", skip_all)]
    pub async fn authenticate(&self, token: &str) -> Result<Principal, DomainError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(DomainError::Unauthorized);
        }
        match self.repo.user_for_token(token).await? {
            Some(id) => Ok(Principal::User(id)),
            None => {
                debug!("unknown auth token");
                Err(DomainError::Unauthorized)
            }
        }
    }

    #[instrument(
        name = "foodgram.service.register_user",
        skip(self, new_user),
        fields(username = %new_user.username)
    )]
    pub async fn register_user(&self, new_user: NewUser) -> Result<User, DomainError> {
        validation::validate_new_user(&new_user)?;

        // The unique indexes decide; the clashing field is looked up afterwards.
        let (email, username) = (new_user.email.clone(), new_user.username.clone());
        let user = match self.repo.insert_user(new_user, Utc::now()).await {
            Ok(user) => user,
            Err(RepoError::UniqueViolation(_)) => {
                return Err(self.user_clash(email, username).await?);
            }
            Err(other) => return Err(other.into()),
        };

        info!(user_id = user.id, "registered user");
        Ok(user)
    }

    /// Name the field a rejected registration collided on, email first.
    async fn user_clash(&self, email: String, username: String) -> Result<DomainError, DomainError> {
        if !self.repo.email_exists(&email).await? && self.repo.username_exists(&username).await? {
            return Ok(DomainError::user_exists("username", username));
        }
        Ok(DomainError::user_exists("email", email))
    }

    #[instrument(name = "foodgram.service.get_user", skip(self), fields(viewer = ?viewer.user_id()))]
    pub async fn get_user(&self, viewer: Principal, id: UserId) -> Result<User, DomainError> {
        let access = authorize(Operation::GetUser, viewer)?;
        self.repo
            .find_user(id, access.user_id())
            .await?
            .ok_or_else(|| DomainError::user_not_found(id))
    }

    #[instrument(name = "foodgram.service.list_users", skip(self), fields(viewer = ?viewer.user_id()))]
    pub async fn list_users(
        &self,
        viewer: Principal,
        page: PageRequest,
    ) -> Result<Page<User>, DomainError> {
        let access = authorize(Operation::ListUsers, viewer)?;
        let (page, limit, offset) = page_window(&self.config, page);
        let (users, total) = self.repo.list_users(access.user_id(), offset, limit).await?;
        debug!(count = users.len(), total, "listed users");
        Ok(page_of(users, total, page, limit))
    }

    #[instrument(name = "foodgram.service.me", skip(self), fields(viewer = ?viewer.user_id()))]
    pub async fn me(&self, viewer: Principal) -> Result<User, DomainError> {
        let uid = authorize(Operation::Me, viewer)?.user()?;
        self.repo
            .find_user(uid, Some(uid))
            .await?
            .ok_or_else(|| DomainError::user_not_found(uid))
    }

    /// Store a validated base64 data URI as the caller's avatar and return it.
    #[instrument(name = "foodgram.service.set_avatar", skip(self, data_uri), fields(viewer = ?viewer.user_id()))]
    pub async fn set_avatar(&self, viewer: Principal, data_uri: String) -> Result<String, DomainError> {
        let uid = authorize(Operation::SetAvatar, viewer)?.user()?;
        validation::validate_image("avatar", &data_uri, self.config.max_image_bytes)?;

        if !self.repo.set_avatar(uid, Some(data_uri.clone())).await? {
            return Err(DomainError::user_not_found(uid));
        }
        info!(user_id = uid, "avatar updated");
        Ok(data_uri)
    }

    #[instrument(name = "foodgram.service.remove_avatar", skip(self), fields(viewer = ?viewer.user_id()))]
    pub async fn remove_avatar(&self, viewer: Principal) -> Result<(), DomainError> {
        let uid = authorize(Operation::RemoveAvatar, viewer)?.user()?;
        if !self.repo.set_avatar(uid, None).await? {
            return Err(DomainError::user_not_found(uid));
        }
        info!(user_id = uid, "avatar removed");
        Ok(())
    }
}
