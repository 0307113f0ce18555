pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod policy;
pub mod repo;
pub mod routes;
pub mod utils;

use sea_orm::DatabaseConnection;

pub use config::Config;
pub use error::{AppError, AppResult};

#[cfg_attr(not(test), derive(Clone))]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Config,
}

// The test build enables sea-orm's `mock` feature, which removes the `Clone`
// derive from `DatabaseConnection`, so clone field-wise by hand there. This is
// the same clone the derive produces for non-mock builds.
#[cfg(test)]
impl Clone for AppState {
    fn clone(&self) -> Self {
        let db = match &self.db {
            DatabaseConnection::SqlxPostgresPoolConnection(conn) => {
                DatabaseConnection::SqlxPostgresPoolConnection(conn.clone())
            }
            DatabaseConnection::MockDatabaseConnection(conn) => {
                DatabaseConnection::MockDatabaseConnection(conn.clone())
            }
            DatabaseConnection::Disconnected => DatabaseConnection::Disconnected,
        };
        Self {
            db,
            config: self.config.clone(),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use sea_orm::DatabaseConnection;

    use crate::{AppState, Config};

    pub fn state(db: DatabaseConnection) -> AppState {
        AppState {
            db,
            config: Config::for_tests(),
        }
    }
}
