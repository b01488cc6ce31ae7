use std::sync::Arc;

use rdl_daily::{SelectionScope, StreakPolicy};
use rdl_db::{PgStore, RiddleStore};
use sqlx::PgPool;

use crate::{ApiConfig, auth::JwtVerifier, config::Environment};

/// Rules of the daily riddle workflow
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DailySettings {
    pub streak_policy: StreakPolicy,
    pub selection_scope: SelectionScope,
}

#[derive(Clone, Debug)]
pub struct ApiState {
    pub store: Arc<dyn RiddleStore>,
    pub daily: DailySettings,
    /// Bearer token verification, `None` when no secret is configured
    pub auth: Option<JwtVerifier>,
    pub environment: Environment,
}

impl ApiState {
    pub fn new(config: &ApiConfig, pool: PgPool) -> Self {
        Self::with_store(config, Arc::new(PgStore::new(pool)))
    }

    /// Build the state around any store, e.g. an in-memory one.
    pub fn with_store(config: &ApiConfig, store: Arc<dyn RiddleStore>) -> Self {
        let auth = config
            .jwt_secret
            .as_deref()
            .map(|secret| JwtVerifier::new(secret, &config.jwt_audience));

        if auth.is_none() {
            tracing::warn!("JWT_SECRET not set, bearer tokens will not be verified");
        }

        Self {
            store,
            daily: DailySettings {
                streak_policy: config.streak_policy,
                selection_scope: config.selection_scope,
            },
            auth,
            environment: config.env,
        }
    }
}
