//! App Router

use salvo::Router;

use crate::users::handlers;

/// User routes. Workflow routes answer GET only for the `form` and `complete` steps; the
/// handlers reject every other step unless it is POSTed.
pub fn app_router() -> Router {
    Router::with_path("user")
        .push(
            Router::with_path("list")
                .get(handlers::list)
                .post(handlers::list),
        )
        .push(Router::with_path("detail/{id}").get(handlers::detail))
        .push(
            Router::with_path("create")
                .get(handlers::create)
                .post(handlers::create),
        )
        .push(
            Router::with_path("update")
                .get(handlers::update)
                .post(handlers::update),
        )
        .push(
            Router::with_path("delete")
                .get(handlers::delete)
                .post(handlers::delete),
        )
}
