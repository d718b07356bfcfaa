mod schema;
pub mod queries;

pub use schema::init_db;

use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::payments::PaddleClient;

pub type DbPool = Pool<SqliteConnectionManager>;

/// Application state holding the database pool and long-lived clients.
///
/// Constructed once at startup and handed to the routers - there is no
/// lazily-initialized global state, so every handler sees a ready client.
#[derive(Clone)]
pub struct AppState {
    /// Account database pool
    pub db: DbPool,
    /// Payment provider client (webhook verification + API calls)
    pub paddle: Arc<PaddleClient>,
    /// Service key for portal routes (None = portal routes reject everything)
    pub portal_api_key: Option<String>,
}

pub fn create_pool(database_path: &str) -> Result<DbPool, r2d2::Error> {
    let manager = SqliteConnectionManager::file(database_path);
    Pool::builder().max_size(10).build(manager)
}
