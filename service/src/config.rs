use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq)]
pub enum RustEnv {
    Development,
    Production,
    Staging,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RustEnvParseError;

impl FromStr for RustEnv {
    type Err = RustEnvParseError;
    fn from_str(level: &str) -> Result<RustEnv, Self::Err> {
        match level.to_lowercase().as_str() {
            "development" => Ok(RustEnv::Development),
            "production" => Ok(RustEnv::Production),
            "staging" => Ok(RustEnv::Staging),
            _ => Err(RustEnvParseError),
        }
    }
}

impl fmt::Display for RustEnv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RustEnv::Development => write!(f, "development"),
            RustEnv::Production => write!(f, "production"),
            RustEnv::Staging => write!(f, "staging"),
        }
    }
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// The application ID (appID) issued by the platform.
    #[arg(long, env)]
    app_id: Option<String>,

    /// The application secret (appsecret) issued by the platform.
    #[arg(long, env, hide_env_values = true)]
    app_secret: Option<String>,

    /// The shared token configured on the platform for server verification.
    #[arg(long, env, hide_env_values = true)]
    token: Option<String>,

    /// The base URL of the platform API. Defaults to the public platform API.
    /// Override in tests to point at a mock server.
    #[arg(long, env)]
    api_base_url: Option<String>,

    /// Directory holding access_token.json and ticket.json. Defaults to the
    /// current working directory.
    #[arg(long, env)]
    credential_dir: Option<PathBuf>,

    /// Timeout in seconds for each request to the platform API
    #[arg(long, env, default_value_t = 30)]
    pub http_timeout_secs: u64,

    /// Let a single fetch serve concurrent requests for a cold credential
    #[arg(long, env)]
    pub single_flight: bool,

    /// Page URL to sign a JS-SDK configuration for.
    #[arg(long, env)]
    js_api_url: Option<String>,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Set the Rust runtime environment to use.
    #[arg(
    short,
    long,
    env,
    default_value_t = RustEnv::Development,
    value_parser = clap::builder::PossibleValuesParser::new([
        "DEVELOPMENT", "PRODUCTION", "STAGING",
        "development", "production", "staging"
    ])
        .map(|s| s.parse::<RustEnv>().unwrap()),
    )]
    pub runtime_env: RustEnv,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    pub fn app_id(&self) -> Option<String> {
        self.app_id.clone()
    }

    pub fn app_secret(&self) -> Option<String> {
        self.app_secret.clone()
    }

    pub fn token(&self) -> Option<String> {
        self.token.clone()
    }

    /// Returns the platform API base URL override, if any.
    pub fn api_base_url(&self) -> Option<&str> {
        self.api_base_url.as_deref()
    }

    /// Returns the configured credential directory, if any.
    pub fn credential_dir(&self) -> Option<PathBuf> {
        self.credential_dir.clone()
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Returns the page URL to sign a JS-SDK configuration for, if configured.
    pub fn js_api_url(&self) -> Option<String> {
        self.js_api_url.clone()
    }

    pub fn runtime_env(&self) -> RustEnv {
        self.runtime_env.clone()
    }

    pub fn is_production(&self) -> bool {
        self.runtime_env() == RustEnv::Production
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["wechat-server-rs"];
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_credentials_from_flags() {
        let config = parse(&[
            "--app-id",
            "wx123",
            "--app-secret",
            "s3cret",
            "--token",
            "abc",
        ]);
        assert_eq!(config.app_id(), Some("wx123".to_string()));
        assert_eq!(config.app_secret(), Some("s3cret".to_string()));
        assert_eq!(config.token(), Some("abc".to_string()));
    }

    #[test]
    fn test_overrides() {
        let config = parse(&[
            "--api-base-url",
            "http://127.0.0.1:8080",
            "--credential-dir",
            "/var/lib/wechat",
            "--http-timeout-secs",
            "5",
            "--single-flight",
            "--js-api-url",
            "https://example.com/page",
            "--log-level-filter",
            "DEBUG",
            "--runtime-env",
            "production",
        ]);
        assert_eq!(config.api_base_url(), Some("http://127.0.0.1:8080"));
        assert_eq!(config.credential_dir(), Some(PathBuf::from("/var/lib/wechat")));
        assert_eq!(config.http_timeout(), Duration::from_secs(5));
        assert!(config.single_flight);
        assert_eq!(config.js_api_url(), Some("https://example.com/page".to_string()));
        assert_eq!(config.log_level_filter, LevelFilter::Debug);
        assert!(config.is_production());
    }

    #[test]
    fn test_defaults_leave_optional_values_unset() {
        let config = parse(&[]);
        assert_eq!(config.api_base_url(), None);
        assert_eq!(config.credential_dir(), None);
        assert_eq!(config.http_timeout(), Duration::from_secs(30));
        assert!(!config.single_flight);
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        let result = Config::try_parse_from(["wechat-server-rs", "--log-level-filter", "LOUD"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_rust_env_round_trip() {
        for env in [RustEnv::Development, RustEnv::Production, RustEnv::Staging] {
            assert_eq!(env.to_string().parse::<RustEnv>(), Ok(env));
        }
        assert_eq!("nope".parse::<RustEnv>(), Err(RustEnvParseError));
    }
}
