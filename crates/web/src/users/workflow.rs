//! User Form Workflow
//!
//! Each request runs one step of a form workflow. Nothing is kept on the server between steps:
//! the submitted form travels back and forth with the client until it is committed.
//!
//! ```text
//! Initial --form--> FormShown --confirm--> Confirmed --commit--> Complete
//!                      ^  |                   |
//!                      |  +--invalid----------+
//!                      +------redo------------+
//! ```

use roster::{
    users::{UserDraft, UserFilter, UserForm, UserId},
    validation::{Field, ViolationKind, Violations},
};
use roster_app::domain::users::{UsersService, UsersServiceError};
use tracing::{info, warn};

use crate::users::{
    errors::WorkflowError,
    views::{self, View, codes, keys},
};

/// Workflow step, selected by the presence of a request parameter of the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    Form,
    Confirm,
    Redo,
    /// Selected when no other step is named.
    Commit,
    Complete,
}

impl Step {
    const NAMED: [Step; 4] = [Step::Form, Step::Confirm, Step::Redo, Step::Complete];

    /// The first named step `is_present` reports, or [`Step::Commit`].
    pub(crate) fn select(is_present: impl Fn(&str) -> bool) -> Self {
        Self::NAMED
            .into_iter()
            .find(|step| is_present(step.as_str()))
            .unwrap_or(Step::Commit)
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Step::Form => "form",
            Step::Confirm => "confirm",
            Step::Redo => "redo",
            Step::Commit => "commit",
            Step::Complete => "complete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WorkflowState {
    Initial,
    FormShown,
    Confirmed,
    Complete,
}

impl WorkflowState {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            WorkflowState::Initial => "initial",
            WorkflowState::FormShown => "form_shown",
            WorkflowState::Confirmed => "confirmed",
            WorkflowState::Complete => "complete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operation {
    Create,
    Update,
    Delete,
}

impl Operation {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }

    /// Delete has no screens of its own and falls back to the update form.
    fn form_view(self) -> &'static str {
        match self {
            Operation::Create => views::CREATE_FORM,
            Operation::Update | Operation::Delete => views::UPDATE_FORM,
        }
    }

    fn confirm_view(self) -> &'static str {
        match self {
            Operation::Create => views::CREATE_CONFIRM,
            Operation::Update | Operation::Delete => views::UPDATE_CONFIRM,
        }
    }

    fn complete_view(self) -> &'static str {
        match self {
            Operation::Create => views::CREATE_COMPLETE,
            Operation::Update => views::UPDATE_COMPLETE,
            Operation::Delete => views::DELETE_COMPLETE,
        }
    }

    fn complete_location(self) -> String {
        format!("/user/{}?complete", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Outcome {
    Render(View),
    Redirect(String),
}

/// Where a step left the submission, and what to answer with.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Transition {
    pub(crate) state: WorkflowState,
    pub(crate) outcome: Outcome,
}

impl Transition {
    fn render(state: WorkflowState, view: View) -> Self {
        Self {
            state,
            outcome: Outcome::Render(view),
        }
    }

    fn redirect(state: WorkflowState, location: String) -> Self {
        Self {
            state,
            outcome: Outcome::Redirect(location),
        }
    }
}

/// Location of the list view carrying a not-found banner for `id`.
pub(crate) fn list_not_found_location(id: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(id.as_bytes()).collect();

    format!("/user/list?notFound={encoded}")
}

pub(crate) async fn create(
    users: &dyn UsersService,
    step: Step,
    form: UserForm,
) -> Result<Transition, WorkflowError> {
    let operation = Operation::Create;

    match step {
        Step::Form => show_form(operation, &UserForm::default()),
        Step::Confirm => confirm(users, operation, &form).await,
        Step::Redo => show_form(operation, &form),
        Step::Commit => {
            let draft = match check(users, operation, &form).await? {
                Checked::Valid(draft) => draft,
                Checked::Invalid(violations) => return redisplay(operation, &form, &violations),
            };

            match users.create_user(draft).await {
                Ok(user) => {
                    info!(user_id = %user.id, "user registration committed");

                    Ok(committed(operation))
                }
                Err(error) => rejected(operation, &form, error),
            }
        }
        Step::Complete => Ok(complete(operation)),
    }
}

pub(crate) async fn update(
    users: &dyn UsersService,
    step: Step,
    form: UserForm,
) -> Result<Transition, WorkflowError> {
    let operation = Operation::Update;

    match step {
        Step::Form => {
            let id = UserId::new(form.id.unwrap_or_default());

            match users.get_user(id.clone()).await {
                Ok(user) => show_form(operation, &UserForm::from_user(&user)),
                Err(UsersServiceError::NotFound) => {
                    warn!(user_id = %id, "user to update not found");

                    Ok(Transition::redirect(
                        WorkflowState::Initial,
                        list_not_found_location(id.as_str()),
                    ))
                }
                Err(error) => Err(error.into()),
            }
        }
        Step::Confirm => confirm(users, operation, &form).await,
        Step::Redo => show_form(operation, &form),
        Step::Commit => {
            let draft = match check(users, operation, &form).await? {
                Checked::Valid(draft) => draft,
                Checked::Invalid(violations) => return redisplay(operation, &form, &violations),
            };

            match users.update_user(draft).await {
                Ok(user) => {
                    info!(user_id = %user.id, "user update committed");

                    Ok(committed(operation))
                }
                Err(error) => rejected(operation, &form, error),
            }
        }
        Step::Complete => Ok(complete(operation)),
    }
}

/// Delete needs only the id and skips validation. Every step but `complete` commits.
pub(crate) async fn delete(
    users: &dyn UsersService,
    step: Step,
    form: UserForm,
) -> Result<Transition, WorkflowError> {
    let operation = Operation::Delete;

    if step == Step::Complete {
        return Ok(complete(operation));
    }

    let id = UserId::new(form.id.clone().unwrap_or_default());

    match users.delete_user(id.clone()).await {
        Ok(()) => {
            info!(user_id = %id, "user deletion committed");

            Ok(committed(operation))
        }
        Err(error) => rejected(operation, &form, error),
    }
}

/// List view of every user matching `filter`.
pub(crate) async fn list(
    users: &dyn UsersService,
    filter: &UserFilter,
) -> Result<View, WorkflowError> {
    let user_list = users.list_users(filter.clone()).await?;

    Ok(View::new(views::LIST)
        .with(keys::USER_LIST, &user_list)?
        .with(keys::FILTER, filter)?)
}

/// Detail view of one user; an unknown id falls back to the full list with a not-found message.
pub(crate) async fn detail(users: &dyn UsersService, id: UserId) -> Result<View, WorkflowError> {
    match users.get_user(id.clone()).await {
        Ok(user) => Ok(View::new(views::DETAIL)
            .with(keys::USER, &user)?
            .with(keys::USER_FORM, &UserForm {
                id: Some(id.into_string()),
                ..UserForm::default()
            })?),
        Err(UsersServiceError::NotFound) => {
            warn!(user_id = %id, "user to show not found");

            Ok(list(users, &UserFilter::all())
                .await?
                .with_error(codes::NOT_FOUND, &[id.as_str()]))
        }
        Err(error) => Err(error.into()),
    }
}

enum Checked {
    Valid(UserDraft),
    Invalid(Violations),
}

/// Field validation, plus the id uniqueness pre-check when creating.
async fn check(
    users: &dyn UsersService,
    operation: Operation,
    form: &UserForm,
) -> Result<Checked, WorkflowError> {
    let mut violations = form.validate();

    if operation == Operation::Create
        && !violations.has(Field::Id)
        && let Some(id) = form.user_id()
    {
        match users.get_user(id).await {
            Ok(_) => violations.push(Field::Id, ViolationKind::Duplicate),
            Err(UsersServiceError::NotFound) => {}
            Err(error) => return Err(error.into()),
        }
    }

    if !violations.is_empty() {
        return Ok(Checked::Invalid(violations));
    }

    Ok(match form.to_draft() {
        Ok(draft) => Checked::Valid(draft),
        Err(violations) => Checked::Invalid(violations),
    })
}

fn show_form(operation: Operation, form: &UserForm) -> Result<Transition, WorkflowError> {
    let view = View::new(operation.form_view()).with(keys::USER_FORM, form)?;

    Ok(Transition::render(WorkflowState::FormShown, view))
}

async fn confirm(
    users: &dyn UsersService,
    operation: Operation,
    form: &UserForm,
) -> Result<Transition, WorkflowError> {
    match check(users, operation, form).await? {
        Checked::Valid(_) => {
            let view = View::new(operation.confirm_view()).with(keys::USER_FORM, form)?;

            Ok(Transition::render(WorkflowState::Confirmed, view))
        }
        Checked::Invalid(violations) => redisplay(operation, form, &violations),
    }
}

fn redisplay(
    operation: Operation,
    form: &UserForm,
    violations: &Violations,
) -> Result<Transition, WorkflowError> {
    let view = View::new(operation.form_view())
        .with(keys::USER_FORM, form)?
        .with(keys::FIELD_ERRORS, &violations.messages_by_field())?;

    Ok(Transition::render(WorkflowState::FormShown, view))
}

/// Back to the form with a message for rejections the user can act on.
fn rejected(
    operation: Operation,
    form: &UserForm,
    error: UsersServiceError,
) -> Result<Transition, WorkflowError> {
    let id = form.id.as_deref().unwrap_or_default();

    let (code, detail) = match &error {
        UsersServiceError::DuplicateKey => (codes::DUPLICATE_KEY, id.to_string()),
        UsersServiceError::NotFound => (codes::NOT_FOUND, id.to_string()),
        UsersServiceError::ConstraintViolation(detail) => (codes::SQL_ERROR, detail.clone()),
        UsersServiceError::InvalidArgument(_) | UsersServiceError::Storage(_) => {
            return Err(error.into());
        }
    };

    warn!(
        operation = operation.as_str(),
        user_id = id,
        "user change rejected: {error}"
    );

    let view = View::new(operation.form_view())
        .with(keys::USER_FORM, form)?
        .with_error(code, &[detail.as_str()]);

    Ok(Transition::render(WorkflowState::FormShown, view))
}

fn committed(operation: Operation) -> Transition {
    Transition::redirect(WorkflowState::Complete, operation.complete_location())
}

fn complete(operation: Operation) -> Transition {
    Transition::render(
        WorkflowState::Complete,
        View::new(operation.complete_view()),
    )
}
