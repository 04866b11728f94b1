//! In-memory Users Store
//!
//! Transactions take an exclusive lock on the table and work on a private copy, so they are fully
//! serialized. The column bounds and checks of the `users` migration are enforced on write.

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use roster::{
    users::{User, UserFilter, UserId},
    validation::{CONTACT_MAX_LEN, DISPLAY_NAME_MAX_LEN, ID_MAX_LEN, NOTE_MAX_LEN, SECRET_MAX_LEN},
};

use crate::domain::users::store::{StoreError, UsersStore, UsersTransaction};

type Rows = BTreeMap<UserId, User>;

/// Users store backed by a process-local map.
#[derive(Debug, Clone, Default)]
pub struct MemoryUsersStore {
    rows: Arc<Mutex<Rows>>,
}

impl MemoryUsersStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UsersStore for MemoryUsersStore {
    async fn begin(&self) -> Result<Box<dyn UsersTransaction>, StoreError> {
        let guard = Arc::clone(&self.rows).lock_owned().await;
        let staged = guard.clone();

        Ok(Box::new(MemoryUsersTransaction { guard, staged }))
    }
}

#[derive(Debug)]
struct MemoryUsersTransaction {
    guard: OwnedMutexGuard<Rows>,
    staged: Rows,
}

#[async_trait]
impl UsersTransaction for MemoryUsersTransaction {
    async fn select_by_key(&mut self, id: &UserId) -> Result<Option<User>, StoreError> {
        Ok(self.staged.get(id).cloned())
    }

    async fn select_by_filter(&mut self, filter: &UserFilter) -> Result<Vec<User>, StoreError> {
        Ok(self
            .staged
            .values()
            .filter(|user| filter.matches(user))
            .cloned()
            .collect())
    }

    async fn insert(&mut self, user: &User) -> Result<u64, StoreError> {
        check_columns(user)?;

        if self.staged.contains_key(&user.id) {
            return Err(StoreError::UniqueViolation(format!(
                "duplicate key value violates unique constraint \"users_pkey\": id={}",
                user.id
            )));
        }

        self.staged.insert(user.id.clone(), user.clone());

        Ok(1)
    }

    async fn update_by_key(&mut self, user: &User) -> Result<u64, StoreError> {
        let Some(row) = self.staged.get_mut(&user.id) else {
            return Ok(0);
        };

        let updated = User {
            created_at: row.created_at,
            ..user.clone()
        };

        check_columns(&updated)?;

        *row = updated;

        Ok(1)
    }

    async fn delete_by_key(&mut self, id: &UserId) -> Result<u64, StoreError> {
        Ok(u64::from(self.staged.remove(id).is_some()))
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let Self { mut guard, staged } = *self;

        *guard = staged;

        Ok(())
    }
}

fn check_columns(user: &User) -> Result<(), StoreError> {
    check_length("id", user.id.as_str(), ID_MAX_LEN)?;
    check_length("display_name", &user.display_name, DISPLAY_NAME_MAX_LEN)?;
    check_length("secret", &user.secret, SECRET_MAX_LEN)?;
    check_length("contact", &user.contact, CONTACT_MAX_LEN)?;

    if let Some(note) = &user.note {
        check_length("note", note, NOTE_MAX_LEN)?;
    }

    if user.created_at > user.updated_at {
        return Err(StoreError::Constraint(
            "new row for relation \"users\" violates check constraint \"users_timestamps_ordered\""
                .to_string(),
        ));
    }

    Ok(())
}

fn check_length(column: &str, value: &str, max: usize) -> Result<(), StoreError> {
    if value.chars().count() > max {
        return Err(StoreError::Constraint(format!(
            "value too long for type character varying({max}) in column \"{column}\""
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use testresult::TestResult;

    use roster::users::UserDraft;

    use super::*;

    fn make_user(id: &str) -> User {
        User::created(
            UserDraft {
                id: UserId::new(id),
                display_name: format!("name {id}"),
                secret: "secret".to_string(),
                contact: "test@example.com".to_string(),
                note: None,
            },
            Timestamp::UNIX_EPOCH,
        )
    }

    #[tokio::test]
    async fn committed_writes_are_visible_to_later_transactions() -> TestResult {
        let store = MemoryUsersStore::new();

        let mut tx = store.begin().await?;
        tx.insert(&make_user("u1")).await?;
        tx.commit().await?;

        let mut tx = store.begin().await?;

        assert!(tx.select_by_key(&UserId::new("u1")).await?.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn dropped_transaction_rolls_back() -> TestResult {
        let store = MemoryUsersStore::new();

        {
            let mut tx = store.begin().await?;
            tx.insert(&make_user("u1")).await?;
        }

        let mut tx = store.begin().await?;

        assert!(tx.select_by_key(&UserId::new("u1")).await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn duplicate_insert_is_a_unique_violation() -> TestResult {
        let store = MemoryUsersStore::new();

        let mut tx = store.begin().await?;
        tx.insert(&make_user("u1")).await?;

        let result = tx.insert(&make_user("u1")).await;

        assert!(
            matches!(result, Err(StoreError::UniqueViolation(_))),
            "expected UniqueViolation, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn overlong_column_is_a_constraint_violation() -> TestResult {
        let store = MemoryUsersStore::new();
        let mut user = make_user("u1");
        user.display_name = "n".repeat(DISPLAY_NAME_MAX_LEN + 1);

        let mut tx = store.begin().await?;
        let result = tx.insert(&user).await;

        assert!(
            matches!(result, Err(StoreError::Constraint(_))),
            "expected Constraint, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn update_keeps_creation_time_and_reports_missing_rows() -> TestResult {
        let store = MemoryUsersStore::new();
        let user = make_user("u1");

        let mut tx = store.begin().await?;
        tx.insert(&user).await?;

        let mut changed = user.clone();
        changed.display_name = "changed".to_string();
        changed.created_at = Timestamp::MIN;

        assert_eq!(tx.update_by_key(&changed).await?, 1);
        assert_eq!(tx.update_by_key(&make_user("ghost")).await?, 0);

        let stored = tx.select_by_key(&user.id).await?;

        assert_eq!(
            stored.as_ref().map(|u| (u.display_name.as_str(), u.created_at)),
            Some(("changed", user.created_at))
        );

        Ok(())
    }

    #[tokio::test]
    async fn delete_reports_rows_removed() -> TestResult {
        let store = MemoryUsersStore::new();

        let mut tx = store.begin().await?;
        tx.insert(&make_user("u1")).await?;

        assert_eq!(tx.delete_by_key(&UserId::new("u1")).await?, 1);
        assert_eq!(tx.delete_by_key(&UserId::new("u1")).await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn select_by_filter_orders_by_id() -> TestResult {
        let store = MemoryUsersStore::new();

        let mut tx = store.begin().await?;
        tx.insert(&make_user("u2")).await?;
        tx.insert(&make_user("u1")).await?;
        tx.insert(&make_user("x1")).await?;

        let users = tx
            .select_by_filter(&UserFilter::all().with_id_prefix("u"))
            .await?;
        let ids: Vec<&str> = users.iter().map(|user| user.id.as_str()).collect();

        assert_eq!(ids, vec!["u1", "u2"]);

        Ok(())
    }
}
