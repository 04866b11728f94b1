//! User Handlers

use std::sync::Arc;

use salvo::{
    http::{Method, header::LOCATION},
    prelude::*,
};
use tracing::warn;

use roster::users::UserId;

use crate::{
    extensions::*,
    observability::observe_transition,
    state::State,
    users::{
        errors::into_status_error,
        params::{NOT_FOUND_PARAM, Submission, list_filter},
        views::codes,
        workflow::{self, Operation, Outcome, Step, Transition},
    },
};

/// User List Handler
#[handler]
pub(crate) async fn list(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<(), StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let mut view = workflow::list(state.app.users.as_ref(), &list_filter(req))
        .await
        .map_err(into_status_error)?;

    if let Some(id) = req.query::<String>(NOT_FOUND_PARAM) {
        view = view.with_error(codes::NOT_FOUND, &[id.as_str()]);
    }

    state.views.render(view, res);

    Ok(())
}

/// User Detail Handler
#[handler]
pub(crate) async fn detail(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<(), StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let id = UserId::new(req.param::<String>("id").unwrap_or_default());

    let view = workflow::detail(state.app.users.as_ref(), id)
        .await
        .map_err(into_status_error)?;

    state.views.render(view, res);

    Ok(())
}

/// Create User Handler
#[handler]
pub(crate) async fn create(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<(), StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let Submission { step, form } = Submission::read(req).await;

    require_post(req, Operation::Create, step)?;

    let transition = workflow::create(state.app.users.as_ref(), step, form)
        .await
        .map_err(into_status_error)?;

    respond(state, Operation::Create, step, transition, res)
}

/// Update User Handler
#[handler]
pub(crate) async fn update(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<(), StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let Submission { step, form } = Submission::read(req).await;

    require_post(req, Operation::Update, step)?;

    let transition = workflow::update(state.app.users.as_ref(), step, form)
        .await
        .map_err(into_status_error)?;

    respond(state, Operation::Update, step, transition, res)
}

/// Delete User Handler
#[handler]
pub(crate) async fn delete(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<(), StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let Submission { step, form } = Submission::read(req).await;

    let step = if step == Step::Complete {
        step
    } else {
        Step::Commit
    };

    require_post(req, Operation::Delete, step)?;

    let transition = workflow::delete(state.app.users.as_ref(), step, form)
        .await
        .map_err(into_status_error)?;

    respond(state, Operation::Delete, step, transition, res)
}

/// Only `form` and `complete` render without side effects; every other step must be POSTed.
fn require_post(req: &Request, operation: Operation, step: Step) -> Result<(), StatusError> {
    if req.method() == Method::POST || matches!(step, Step::Form | Step::Complete) {
        return Ok(());
    }

    warn!(
        operation = operation.as_str(),
        step = step.as_str(),
        "rejected workflow step sent with {}",
        req.method()
    );

    Err(StatusError::method_not_allowed())
}

fn respond(
    state: &State,
    operation: Operation,
    step: Step,
    transition: Transition,
    res: &mut Response,
) -> Result<(), StatusError> {
    observe_transition(operation.as_str(), step.as_str(), transition.state.as_str());

    match transition.outcome {
        Outcome::Render(view) => state.views.render(view, res),
        Outcome::Redirect(location) => {
            res.add_header(LOCATION, location, true)
                .or_500("failed to set location header")?
                .status_code(StatusCode::FOUND);
        }
    }

    Ok(())
}
