/// Output format for the tracing fmt layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    /// Parse a `LOG_FORMAT` value; anything other than `json` is pretty.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Pretty
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// HTTP request timeout in seconds (default: `10`).
    pub request_timeout_secs: u64,
    /// How long shutdown waits for workers to drain (default: `2`).
    pub shutdown_grace_secs: u64,
    /// Number of workers consuming the job queue (default: `1`).
    pub worker_count: usize,
    /// Log output format (default: pretty).
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default   |
    /// |------------------------|-----------|
    /// | `HOST`                 | `0.0.0.0` |
    /// | `PORT`                 | `8080`    |
    /// | `REQUEST_TIMEOUT_SECS` | `10`      |
    /// | `SHUTDOWN_GRACE_SECS`  | `2`       |
    /// | `WORKER_COUNT`         | `1`       |
    /// | `LOG_FORMAT`           | `pretty`  |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".into())
            .parse()
            .expect("PORT must be a valid u16");

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_grace_secs: u64 = std::env::var("SHUTDOWN_GRACE_SECS")
            .unwrap_or_else(|_| "2".into())
            .parse()
            .expect("SHUTDOWN_GRACE_SECS must be a valid u64");

        let worker_count: usize = std::env::var("WORKER_COUNT")
            .unwrap_or_else(|_| "1".into())
            .parse()
            .expect("WORKER_COUNT must be a positive integer");
        assert!(worker_count > 0, "WORKER_COUNT must be at least 1");

        let log_format = LogFormat::parse(
            &std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".into()),
        );

        Self {
            host,
            port,
            request_timeout_secs,
            shutdown_grace_secs,
            worker_count,
            log_format,
        }
    }
}
