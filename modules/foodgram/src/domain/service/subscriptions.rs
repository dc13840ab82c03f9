use chrono::Utc;
use tracing::{debug, info, instrument};

use super::{page_of, page_window, Service};
use crate::contract::model::{Page, PageRequest, Principal, Subscription, User, UserId};
use crate::domain::error::DomainError;
use crate::domain::permissions::{authorize, Operation};
use crate::domain::repo::RepoError;

impl Service {
    /// Follow `author_id`. Following yourself fails before any state is read.
    #[instrument(name = "foodgram.service.subscribe", skip(self), fields(viewer = ?viewer.user_id()))]
    pub async fn subscribe(
        &self,
        viewer: Principal,
        author_id: UserId,
        recipes_limit: Option<u64>,
    ) -> Result<Subscription, DomainError> {
        let uid = authorize(Operation::Subscribe, viewer)?.user()?;
        if uid == author_id {
            return Err(DomainError::SelfSubscription);
        }

        let mut author = self
            .repo
            .find_user(author_id, Some(uid))
            .await?
            .ok_or_else(|| DomainError::user_not_found(author_id))?;
        if author.is_subscribed {
            return Err(DomainError::AlreadySubscribed { author_id });
        }

        self.repo
            .add_subscription(uid, author_id, Utc::now())
            .await
            .map_err(|e| match e {
                RepoError::UniqueViolation(_) => DomainError::AlreadySubscribed { author_id },
                other => other.into(),
            })?;
        info!(author_id, "subscribed");

        author.is_subscribed = true;
        let mut subs = self.with_recipes(vec![author], recipes_limit).await?;
        subs.pop()
            .ok_or_else(|| DomainError::user_not_found(author_id))
    }

    #[instrument(name = "foodgram.service.unsubscribe", skip(self), fields(viewer = ?viewer.user_id()))]
    pub async fn unsubscribe(&self, viewer: Principal, author_id: UserId) -> Result<(), DomainError> {
        let uid = authorize(Operation::Unsubscribe, viewer)?.user()?;
        if self.repo.find_user(author_id, None).await?.is_none() {
            return Err(DomainError::user_not_found(author_id));
        }
        if !self.repo.remove_subscription(uid, author_id).await? {
            return Err(DomainError::SubscriptionNotFound { author_id });
        }
        info!(author_id, "unsubscribed");
        Ok(())
    }

    /// Followed authors with their recipe count and up to `recipes_limit`
    /// newest recipes each (all of them when `None`).
    #[instrument(name = "foodgram.service.list_subscriptions", skip(self), fields(viewer = ?viewer.user_id()))]
    pub async fn list_subscriptions(
        &self,
        viewer: Principal,
        page: PageRequest,
        recipes_limit: Option<u64>,
    ) -> Result<Page<Subscription>, DomainError> {
        let uid = authorize(Operation::ListSubscriptions, viewer)?.user()?;
        let (page, limit, offset) = page_window(&self.config, page);
        let (authors, total) = self.repo.list_followed(uid, offset, limit).await?;
        debug!(count = authors.len(), total, "listed subscriptions");

        let subs = self.with_recipes(authors, recipes_limit).await?;
        Ok(page_of(subs, total, page, limit))
    }

    async fn with_recipes(
        &self,
        authors: Vec<User>,
        recipes_limit: Option<u64>,
    ) -> Result<Vec<Subscription>, DomainError> {
        let ids: Vec<UserId> = authors.iter().map(|a| a.id).collect();
        let counts = self.repo.recipe_counts(&ids).await?;

        let mut out = Vec::with_capacity(authors.len());
        for author in authors {
            let recipes = self.repo.recent_recipes(author.id, recipes_limit).await?;
            let recipes_count = counts.get(&author.id).copied().unwrap_or(0);
            out.push(Subscription {
                author,
                recipes,
                recipes_count,
            });
        }
        Ok(out)
    }
}
