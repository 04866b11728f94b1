//! State

use std::sync::Arc;

use roster_app::context::AppContext;

use crate::users::views::{JsonViewRenderer, ViewRenderer};

#[derive(Clone)]
pub(crate) struct State {
    pub(crate) app: AppContext,
    pub(crate) views: Arc<dyn ViewRenderer>,
}

impl State {
    #[must_use]
    pub(crate) fn new(app: AppContext, views: Arc<dyn ViewRenderer>) -> Self {
        Self { app, views }
    }

    /// Shared state rendering views as JSON.
    #[must_use]
    pub(crate) fn from_app_context(app: AppContext) -> Arc<Self> {
        Arc::new(Self::new(app, Arc::new(JsonViewRenderer)))
    }
}
