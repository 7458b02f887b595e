use thiserror::Error;

pub const DEFAULT_HOST: &str = "ord.c8trc.mongodb.net";
pub const DEFAULT_DATABASE: &str = "ord";
pub const DEFAULT_COLLECTION: &str = "ord";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("missing store credential: {0} (set it in the environment or pass it on the command line)")]
    MissingCredential(&'static str),

    #[error("store namespace is incomplete: empty {0} name")]
    EmptyNamespace(&'static str),

    #[error("bulk write rejected")]
    Bulk(#[source] mongodb::error::Error),

    #[error("server does not support client bulk writes; MongoDB 8.0 or later is required")]
    BulkUnsupported(#[source] mongodb::error::Error),

    #[error("in-memory store is already borrowed")]
    Busy,
}

/// Where the vocabulary collection lives and how to authenticate.
///
/// Credentials are passed through untouched; nothing else is configurable.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub user: Option<String>,
    pub password: Option<String>,
    pub host: String,
    /// Full connection string. When set, `host` is ignored.
    pub uri: Option<String>,
    pub database: String,
    pub collection: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            user: None,
            password: None,
            host: DEFAULT_HOST.to_string(),
            uri: None,
            database: DEFAULT_DATABASE.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
        }
    }
}

impl StoreConfig {
    /// Connection string without credentials; those are attached separately.
    pub fn connection_string(&self) -> String {
        match &self.uri {
            Some(uri) => uri.clone(),
            None => format!(
                "mongodb+srv://{}/?retryWrites=true&w=majority&appName={}",
                self.host, self.database
            ),
        }
    }

    /// Check the configuration before any connection attempt.
    ///
    /// The hosted cluster needs both credentials. An explicit URI may carry
    /// its own, or none at all for a local server.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.database.is_empty() {
            return Err(StoreError::EmptyNamespace("database"));
        }
        if self.collection.is_empty() {
            return Err(StoreError::EmptyNamespace("collection"));
        }
        if self.uri.is_none() {
            if self.user.as_deref().map_or(true, str::is_empty) {
                return Err(StoreError::MissingCredential("MONGO_USR"));
            }
            if self.password.as_deref().map_or(true, str::is_empty) {
                return Err(StoreError::MissingCredential("MONGO_PWD"));
            }
        }
        Ok(())
    }

    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.user.as_deref(), self.password.as_deref()) {
            (Some(user), Some(password)) if !user.is_empty() => Some((user, password)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hosted() -> StoreConfig {
        StoreConfig {
            user: Some("reader".into()),
            password: Some("s3cret".into()),
            ..StoreConfig::default()
        }
    }

    #[test]
    fn test_default_connection_string() {
        assert_eq!(
            hosted().connection_string(),
            "mongodb+srv://ord.c8trc.mongodb.net/?retryWrites=true&w=majority&appName=ord"
        );
    }

    #[test]
    fn test_connection_string_never_embeds_credentials() {
        assert!(!hosted().connection_string().contains("s3cret"));
    }

    #[test]
    fn test_uri_override() {
        let config = StoreConfig {
            uri: Some("mongodb://localhost:27017".into()),
            ..StoreConfig::default()
        };
        assert_eq!(config.connection_string(), "mongodb://localhost:27017");
        assert!(config.validate().is_ok());
        assert!(config.credentials().is_none());
    }

    #[test]
    fn test_hosted_requires_both_credentials() {
        assert!(hosted().validate().is_ok());

        let no_user = StoreConfig { user: None, ..hosted() };
        assert!(matches!(no_user.validate(), Err(StoreError::MissingCredential("MONGO_USR"))));

        let no_password = StoreConfig { password: Some(String::new()), ..hosted() };
        assert!(matches!(no_password.validate(), Err(StoreError::MissingCredential("MONGO_PWD"))));
    }

    #[test]
    fn test_empty_collection_rejected() {
        let config = StoreConfig { collection: String::new(), ..hosted() };
        assert!(matches!(config.validate(), Err(StoreError::EmptyNamespace("collection"))));
    }
}
