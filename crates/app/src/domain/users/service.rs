//! Users service.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use tracing::{info, warn};

use roster::users::{User, UserDraft, UserFilter, UserId};

use crate::{
    clock::{Clock, SystemClock},
    domain::users::{
        errors::UsersServiceError,
        store::{UsersStore, UsersTransaction},
    },
};

/// Users service running every call in one store transaction.
#[derive(Clone)]
pub struct StoreUsersService {
    store: Arc<dyn UsersStore>,
    clock: Arc<dyn Clock>,
}

impl StoreUsersService {
    /// Service over `store`, stamping records with the system clock.
    #[must_use]
    pub fn new(store: Arc<dyn UsersStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    /// Service over `store`, stamping records with `clock`.
    #[must_use]
    pub fn with_clock(store: Arc<dyn UsersStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }
}

fn require_id(id: &UserId) -> Result<(), UsersServiceError> {
    if id.is_blank() {
        return Err(UsersServiceError::InvalidArgument("user id is required"));
    }

    Ok(())
}

async fn find_one(
    tx: &mut dyn UsersTransaction,
    id: &UserId,
) -> Result<User, UsersServiceError> {
    tx.select_by_key(id)
        .await?
        .ok_or(UsersServiceError::NotFound)
}

#[async_trait]
impl UsersService for StoreUsersService {
    async fn get_user(&self, id: UserId) -> Result<User, UsersServiceError> {
        require_id(&id)?;

        let mut tx = self.store.begin().await?;

        let user = find_one(tx.as_mut(), &id).await?;

        tx.commit().await?;

        Ok(user)
    }

    async fn list_users(&self, filter: UserFilter) -> Result<Vec<User>, UsersServiceError> {
        let mut tx = self.store.begin().await?;

        let users = tx.select_by_filter(&filter).await?;

        tx.commit().await?;

        Ok(users)
    }

    async fn create_user(&self, draft: UserDraft) -> Result<User, UsersServiceError> {
        require_id(&draft.id)?;

        let mut tx = self.store.begin().await?;

        if tx.select_by_key(&draft.id).await?.is_some() {
            warn!(user_id = %draft.id, "user already registered");

            return Err(UsersServiceError::DuplicateKey);
        }

        let user = User::created(draft, self.clock.now());

        tx.insert(&user).await?;

        let created = find_one(tx.as_mut(), &user.id).await?;

        tx.commit().await?;

        info!(user_id = %created.id, "created user");

        Ok(created)
    }

    async fn update_user(&self, draft: UserDraft) -> Result<User, UsersServiceError> {
        require_id(&draft.id)?;

        let mut tx = self.store.begin().await?;

        let existing = find_one(tx.as_mut(), &draft.id).await?;
        let user = existing.updated(draft, self.clock.now());

        let rows_affected = tx.update_by_key(&user).await?;

        if rows_affected == 0 {
            return Err(UsersServiceError::NotFound);
        }

        let updated = find_one(tx.as_mut(), &user.id).await?;

        tx.commit().await?;

        info!(user_id = %updated.id, "updated user");

        Ok(updated)
    }

    async fn delete_user(&self, id: UserId) -> Result<(), UsersServiceError> {
        require_id(&id)?;

        let mut tx = self.store.begin().await?;

        let rows_affected = tx.delete_by_key(&id).await?;

        if rows_affected == 0 {
            return Err(UsersServiceError::NotFound);
        }

        tx.commit().await?;

        info!(user_id = %id, "deleted user");

        Ok(())
    }
}

/// User record operations. Each call runs in its own store transaction.
#[automock]
#[async_trait]
pub trait UsersService: Send + Sync {
    /// Retrieve a single user.
    async fn get_user(&self, id: UserId) -> Result<User, UsersServiceError>;

    /// Retrieve every user matching the filter, ordered by id.
    async fn list_users(&self, filter: UserFilter) -> Result<Vec<User>, UsersServiceError>;

    /// Create an active user from the draft and return it as stored.
    async fn create_user(&self, draft: UserDraft) -> Result<User, UsersServiceError>;

    /// Overwrite a user's fields with the draft, keeping its `active` flag, and return it as
    /// stored.
    async fn update_user(&self, draft: UserDraft) -> Result<User, UsersServiceError>;

    /// Delete a user.
    async fn delete_user(&self, id: UserId) -> Result<(), UsersServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::users::store::{MemoryUsersStore, StoreError},
        test::{TestContext, draft},
    };

    use super::*;

    #[tokio::test]
    async fn create_user_is_active_with_equal_timestamps() -> TestResult {
        let ctx = TestContext::new();

        let user = ctx.users.create_user(draft("u1", "Alice")).await?;

        assert_eq!(user.id, UserId::new("u1"));
        assert_eq!(user.display_name, "Alice");
        assert_eq!(user.secret, "p");
        assert_eq!(user.contact, "a@x.com");
        assert!(user.active, "new users start active");
        assert_eq!(user.created_at, user.updated_at);

        Ok(())
    }

    #[tokio::test]
    async fn get_user_returns_created_user() -> TestResult {
        let ctx = TestContext::new();

        let created = ctx.users.create_user(draft("u1", "Alice")).await?;
        let fetched = ctx.users.get_user(UserId::new("u1")).await?;

        assert_eq!(fetched, created);

        Ok(())
    }

    #[tokio::test]
    async fn get_user_unknown_id_returns_not_found() {
        let ctx = TestContext::new();

        let result = ctx.users.get_user(UserId::new("ghost")).await;

        assert!(
            matches!(result, Err(UsersServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn blank_ids_are_invalid_arguments() {
        let ctx = TestContext::new();

        let get = ctx.users.get_user(UserId::new("")).await;
        let create = ctx.users.create_user(draft(" ", "Alice")).await;
        let update = ctx.users.update_user(draft("", "Alice")).await;
        let delete = ctx.users.delete_user(UserId::new("")).await;

        assert!(matches!(get, Err(UsersServiceError::InvalidArgument(_))), "{get:?}");
        assert!(matches!(create, Err(UsersServiceError::InvalidArgument(_))), "{create:?}");
        assert!(matches!(update, Err(UsersServiceError::InvalidArgument(_))), "{update:?}");
        assert!(matches!(delete, Err(UsersServiceError::InvalidArgument(_))), "{delete:?}");
    }

    #[tokio::test]
    async fn list_users_empty_when_none_created() -> TestResult {
        let ctx = TestContext::new();

        let users = ctx.users.list_users(UserFilter::all()).await?;

        assert!(users.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn list_users_applies_filter() -> TestResult {
        let ctx = TestContext::new();

        ctx.users.create_user(draft("u1", "Alice")).await?;
        ctx.users.create_user(draft("u2", "Bob")).await?;
        ctx.users.create_user(draft("x1", "Alicia")).await?;

        let all = ctx.users.list_users(UserFilter::all()).await?;
        let alices = ctx
            .users
            .list_users(UserFilter::all().with_name_containing("Ali"))
            .await?;

        assert_eq!(all.len(), 3);
        assert_eq!(
            alices.iter().map(|u| u.id.as_str()).collect::<Vec<_>>(),
            vec!["u1", "x1"]
        );

        Ok(())
    }

    #[tokio::test]
    async fn create_user_duplicate_id_returns_duplicate_key() -> TestResult {
        let ctx = TestContext::new();

        let original = ctx.users.create_user(draft("u1", "Alice")).await?;

        let result = ctx.users.create_user(draft("u1", "Mallory")).await;

        assert!(
            matches!(result, Err(UsersServiceError::DuplicateKey)),
            "expected DuplicateKey, got {result:?}"
        );
        assert_eq!(ctx.users.get_user(UserId::new("u1")).await?, original);

        Ok(())
    }

    #[tokio::test]
    async fn create_user_overlong_field_returns_constraint_violation() -> TestResult {
        let ctx = TestContext::new();
        let mut overlong = draft("u1", "Alice");
        overlong.note = Some("c".repeat(1001));

        let result = ctx.users.create_user(overlong).await;

        assert!(
            matches!(result, Err(UsersServiceError::ConstraintViolation(_))),
            "expected ConstraintViolation, got {result:?}"
        );
        assert!(ctx.users.list_users(UserFilter::all()).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn update_user_refreshes_fields_and_preserves_active() -> TestResult {
        let ctx = TestContext::new();

        let created = ctx.users.create_user(draft("u1", "Alice")).await?;

        ctx.deactivate("u1").await?;

        let updated = ctx.users.update_user(draft("u1", "Alice2")).await?;
        let fetched = ctx.users.get_user(UserId::new("u1")).await?;

        assert_eq!(updated, fetched);
        assert_eq!(fetched.display_name, "Alice2");
        assert!(!fetched.active, "active flag must survive updates");
        assert_eq!(fetched.created_at, created.created_at);
        assert!(fetched.updated_at > fetched.created_at);

        Ok(())
    }

    #[tokio::test]
    async fn update_user_unknown_id_returns_not_found() {
        let ctx = TestContext::new();

        let result = ctx.users.update_user(draft("ghost", "Nobody")).await;

        assert!(
            matches!(result, Err(UsersServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn delete_user_twice_returns_not_found() -> TestResult {
        let ctx = TestContext::new();

        ctx.users.create_user(draft("u1", "Alice")).await?;
        ctx.users.delete_user(UserId::new("u1")).await?;

        let second = ctx.users.delete_user(UserId::new("u1")).await;
        let fetched = ctx.users.get_user(UserId::new("u1")).await;

        assert!(
            matches!(second, Err(UsersServiceError::NotFound)),
            "expected NotFound, got {second:?}"
        );
        assert!(
            matches!(fetched, Err(UsersServiceError::NotFound)),
            "expected NotFound after deletion, got {fetched:?}"
        );

        Ok(())
    }

    /// Store whose key lookups miss, as if a concurrent writer inserted between check and write.
    #[derive(Debug, Default)]
    struct RacingStore {
        inner: MemoryUsersStore,
    }

    struct RacingTransaction {
        inner: Box<dyn UsersTransaction>,
    }

    #[async_trait]
    impl UsersStore for RacingStore {
        async fn begin(&self) -> Result<Box<dyn UsersTransaction>, StoreError> {
            Ok(Box::new(RacingTransaction {
                inner: self.inner.begin().await?,
            }))
        }
    }

    #[async_trait]
    impl UsersTransaction for RacingTransaction {
        async fn select_by_key(&mut self, _id: &UserId) -> Result<Option<User>, StoreError> {
            Ok(None)
        }

        async fn select_by_filter(
            &mut self,
            filter: &UserFilter,
        ) -> Result<Vec<User>, StoreError> {
            self.inner.select_by_filter(filter).await
        }

        async fn insert(&mut self, user: &User) -> Result<u64, StoreError> {
            self.inner.insert(user).await
        }

        async fn update_by_key(&mut self, user: &User) -> Result<u64, StoreError> {
            self.inner.update_by_key(user).await
        }

        async fn delete_by_key(&mut self, id: &UserId) -> Result<u64, StoreError> {
            self.inner.delete_by_key(id).await
        }

        async fn commit(self: Box<Self>) -> Result<(), StoreError> {
            self.inner.commit().await
        }
    }

    #[tokio::test]
    async fn unique_key_rejection_after_passed_pre_check_is_a_duplicate_key() -> TestResult {
        let store = RacingStore::default();

        let mut tx = store.inner.begin().await?;
        tx.insert(&User::created(draft("u1", "Alice"), jiff::Timestamp::UNIX_EPOCH))
            .await?;
        tx.commit().await?;

        let service = StoreUsersService::new(Arc::new(store));

        let result = service.create_user(draft("u1", "Mallory")).await;

        assert!(
            matches!(result, Err(UsersServiceError::DuplicateKey)),
            "expected DuplicateKey, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn update_of_row_vanished_after_read_returns_not_found() -> TestResult {
        let store = VanishingStore::default();
        store.seed("u1").await?;

        let service = StoreUsersService::new(Arc::new(store));

        let result = service.update_user(draft("u1", "Alice2")).await;

        assert!(
            matches!(result, Err(UsersServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    /// Store whose updates never find their row, as if it were deleted after the existence read.
    #[derive(Debug, Default)]
    struct VanishingStore {
        inner: MemoryUsersStore,
    }

    impl VanishingStore {
        async fn seed(&self, id: &str) -> Result<(), StoreError> {
            let mut tx = self.inner.begin().await?;
            tx.insert(&User::created(draft(id, "Seed"), jiff::Timestamp::UNIX_EPOCH))
                .await?;
            tx.commit().await
        }
    }

    struct VanishingTransaction {
        inner: Box<dyn UsersTransaction>,
    }

    #[async_trait]
    impl UsersStore for VanishingStore {
        async fn begin(&self) -> Result<Box<dyn UsersTransaction>, StoreError> {
            Ok(Box::new(VanishingTransaction {
                inner: self.inner.begin().await?,
            }))
        }
    }

    #[async_trait]
    impl UsersTransaction for VanishingTransaction {
        async fn select_by_key(&mut self, id: &UserId) -> Result<Option<User>, StoreError> {
            self.inner.select_by_key(id).await
        }

        async fn select_by_filter(
            &mut self,
            filter: &UserFilter,
        ) -> Result<Vec<User>, StoreError> {
            self.inner.select_by_filter(filter).await
        }

        async fn insert(&mut self, user: &User) -> Result<u64, StoreError> {
            self.inner.insert(user).await
        }

        async fn update_by_key(&mut self, _user: &User) -> Result<u64, StoreError> {
            Ok(0)
        }

        async fn delete_by_key(&mut self, id: &UserId) -> Result<u64, StoreError> {
            self.inner.delete_by_key(id).await
        }

        async fn commit(self: Box<Self>) -> Result<(), StoreError> {
            self.inner.commit().await
        }
    }
}
