use std::time::Duration;

use mongodb::{Client, Database, bson::doc};
use tracing::debug;

use super::{
    config::MongoConfig,
    error::{MongoDaoError, MongoResult},
};

/// Server selection budget for each ping unless the URI sets its own.
const SELECTION_TIMEOUT: Duration = Duration::from_secs(3);
/// Pings tried before the connection attempt is reported as failed. Longer
/// outages are retried by the storage supervisor.
const PING_ATTEMPTS: u32 = 3;
const APP_NAME: &str = "match-tracker-back";

/// Build a client for `config` and return its database once the server
/// answers a ping. The returned handle keeps the client alive.
pub async fn establish_connection(config: &MongoConfig) -> MongoResult<Database> {
    let mut options = config.options.clone();
    options.server_selection_timeout.get_or_insert(SELECTION_TIMEOUT);
    options.app_name.get_or_insert_with(|| APP_NAME.to_owned());

    let client = Client::with_options(options)
        .map_err(|source| MongoDaoError::ClientConstruction { source })?;
    let database = client.database(&config.database_name);

    let mut attempts = 0;
    loop {
        attempts += 1;
        match database.run_command(doc! { "ping": 1 }).await {
            Ok(_) => {
                debug!(attempts, database = %config.database_name, "MongoDB answered ping");
                return Ok(database);
            }
            Err(source) if attempts >= PING_ATTEMPTS => {
                return Err(MongoDaoError::InitialPing { attempts, source });
            }
            Err(err) => debug!(attempts, error = %err, "MongoDB ping failed; retrying"),
        }
    }
}
