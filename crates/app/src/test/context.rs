//! Test context for service-level tests.

use std::sync::Arc;

use roster::users::UserId;

use crate::domain::users::{
    StoreUsersService,
    store::{MemoryUsersStore, StoreError, UsersStore},
};

use super::TickingClock;

pub(crate) struct TestContext {
    pub store: MemoryUsersStore,
    pub users: StoreUsersService,
}

impl TestContext {
    pub(crate) fn new() -> Self {
        let store = MemoryUsersStore::new();

        Self {
            users: StoreUsersService::with_clock(Arc::new(store.clone()), TickingClock::new()),
            store,
        }
    }

    /// Clear a user's `active` flag directly in the store, which no service operation does.
    pub(crate) async fn deactivate(&self, id: &str) -> Result<(), StoreError> {
        let mut tx = self.store.begin().await?;

        if let Some(mut user) = tx.select_by_key(&UserId::new(id)).await? {
            user.active = false;
            tx.update_by_key(&user).await?;
        }

        tx.commit().await
    }
}
