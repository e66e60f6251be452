use super::error::{RealtimeDaoError, RealtimeResult};

/// Runtime configuration describing how to reach the realtime database.
#[derive(Debug, Clone)]
pub struct RealtimeConfig {
    pub database_url: String,
    /// Database secret or ID token appended as the `auth` query parameter.
    pub auth: Option<String>,
}

impl RealtimeConfig {
    /// Construct a configuration from an explicit database URL.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            auth: None,
        }
    }

    /// Attach the `auth` query parameter sent with every request.
    pub fn with_auth(mut self, auth: impl Into<String>) -> Self {
        self.auth = Some(auth.into());
        self
    }

    /// Build a configuration by reading the expected environment variables.
    pub fn from_env() -> RealtimeResult<Self> {
        let database_url = std::env::var("FIREBASE_DATABASE_URL").map_err(|_| {
            RealtimeDaoError::MissingEnvVar {
                var: "FIREBASE_DATABASE_URL",
            }
        })?;

        let mut config = Self::new(database_url);
        if let Some(auth) = std::env::var("FIREBASE_DATABASE_AUTH")
            .ok()
            .filter(|value| !value.is_empty())
        {
            config = config.with_auth(auth);
        }

        Ok(config)
    }
}
