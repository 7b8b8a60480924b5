//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{
    Error,
    config::{Config, ConfigStore},
    db::initialize,
};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,

    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,

    /// Where the user settings are persisted.
    pub config_store: ConfigStore,

    /// The user settings, loaded once at startup and written through on every change.
    pub config: Arc<Mutex<Config>>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection and the settings in `config_store`.
    ///
    /// This function will initialize the database by adding the tables for the domain models,
    /// and load the settings, creating the settings file if it does not exist yet.
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Pacific/Auckland".
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized or the settings cannot be loaded.
    pub fn new(
        db_connection: Connection,
        config_store: ConfigStore,
        local_timezone: &str,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;
        let config = config_store.load()?;

        Ok(Self {
            local_timezone: local_timezone.to_owned(),
            db_connection: Arc::new(Mutex::new(db_connection)),
            config_store,
            config: Arc::new(Mutex::new(config)),
        })
    }
}
