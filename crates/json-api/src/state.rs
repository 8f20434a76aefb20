//! State

use std::sync::Arc;

use larder_app::{
    context::AppContext,
    domain::{
        orders::{OrderingPolicy, SubmissionConfig},
        profiles::models::UserUuid,
    },
};

#[derive(Clone)]
pub(crate) struct State {
    pub(crate) app: AppContext,
    pub(crate) ordering: OrderingPolicy,
}

impl State {
    #[must_use]
    pub(crate) fn new(app: AppContext, ordering: OrderingPolicy) -> Self {
        Self { app, ordering }
    }

    #[must_use]
    pub(crate) fn from_app_context(app: AppContext, ordering: OrderingPolicy) -> Arc<Self> {
        Arc::new(Self::new(app, ordering))
    }

    /// Policy for one call. The restaurant always comes from the request body.
    pub(crate) fn submission_config(&self, user: Option<UserUuid>) -> SubmissionConfig {
        self.ordering.config_for(None, user)
    }
}
