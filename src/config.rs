use serde::Deserialize;

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

fn default_true() -> bool {
    true
}

/// SQLite connection configuration.
///
/// The path is supplied by whoever bootstraps the session; everything else has
/// defaults so a config file only needs `db_path`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SqliteConfig {
    /// Path to the SQLite database file
    pub db_path: String,
    /// How long a statement waits on a locked database before failing
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// Enforce declared foreign keys on writes
    #[serde(default = "default_true")]
    pub foreign_keys: bool,
    /// Create the file when it does not exist yet
    #[serde(default = "default_true")]
    pub create_if_missing: bool,
}

impl SqliteConfig {
    /// Create a config for the given path with default settings
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            foreign_keys: true,
            create_if_missing: true,
        }
    }

    pub fn with_busy_timeout_ms(mut self, busy_timeout_ms: u64) -> Self {
        self.busy_timeout_ms = busy_timeout_ms;
        self
    }

    pub fn with_foreign_keys(mut self, foreign_keys: bool) -> Self {
        self.foreign_keys = foreign_keys;
        self
    }

    pub fn with_create_if_missing(mut self, create_if_missing: bool) -> Self {
        self.create_if_missing = create_if_missing;
        self
    }
}
