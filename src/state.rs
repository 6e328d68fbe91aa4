use std::sync::Arc;

use chrono::{NaiveDateTime, Utc};
use diesel::{
    pg::PgConnection,
    r2d2::{ConnectionManager, PooledConnection},
};

use crate::{
    auth::jwt::JwtService,
    cache::ListCaches,
    config::AppConfig,
    db::PgPool,
    error::AppResult,
};

type PgPooledConnection = PooledConnection<ConnectionManager<PgConnection>>;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
    pub jwt: JwtService,
    pub cache: Arc<ListCaches>,
}

impl AppState {
    pub fn new(pool: PgPool, config: AppConfig, jwt: JwtService) -> Self {
        let cache = Arc::new(ListCaches::new(config.list_cache_ttl));
        Self {
            pool,
            config: Arc::new(config),
            jwt,
            cache,
        }
    }

    pub fn db(&self) -> AppResult<PgPooledConnection> {
        Ok(self.pool.get()?)
    }

    /// Wall-clock instant used for status derivation and new timestamps.
    pub fn now(&self) -> NaiveDateTime {
        Utc::now().naive_utc()
    }
}
