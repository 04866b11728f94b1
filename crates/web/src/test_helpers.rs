//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*};

use roster::users::{User, UserForm, UserId};
use roster_app::{
    context::{AppContext, StorageKind},
    domain::users::MockUsersService,
};

use crate::state::State;

/// Mock that fails the test on any call.
pub(crate) fn strict_users_mock() -> MockUsersService {
    let mut users = MockUsersService::new();

    users.expect_get_user().never();
    users.expect_list_users().never();
    users.expect_create_user().never();
    users.expect_update_user().never();
    users.expect_delete_user().never();

    users
}

pub(crate) fn users_service(users: MockUsersService, route: Router) -> Service {
    let app = AppContext::from_users_service(Arc::new(users), StorageKind::Memory);

    Service::new(
        Router::new()
            .hoop(inject(State::from_app_context(app)))
            .push(route),
    )
}

pub(crate) fn make_user(id: &str, display_name: &str) -> User {
    User {
        id: UserId::new(id),
        display_name: display_name.to_string(),
        secret: "p".to_string(),
        contact: "a@x.com".to_string(),
        note: None,
        active: true,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

/// A form passing every field check.
pub(crate) fn valid_form(id: &str) -> UserForm {
    UserForm {
        id: Some(id.to_string()),
        display_name: Some("Alice".to_string()),
        secret: Some("p".to_string()),
        contact: Some("a@x.com".to_string()),
        note: None,
    }
}
