use log::{error, info};
use secrecy::SecretString;
use service::{config::Config, logging::Logger};
use wechat_auth::error::{config_error, ConfigErrorKind};
use wechat_auth::http::ClientBuilder;
use wechat_auth::token::{FileStorage, PlatformClient, DEFAULT_API_BASE_URL};
use wechat_auth::{Error, ServerConfig, WechatServer};

#[tokio::main]
async fn main() {
    let config = Config::new();
    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to start logger: {e}");
    }

    let server = match build_server(&config) {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to configure server: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&server, config.js_api_url()).await {
        error!("Failed to resolve credentials: {e}");
        std::process::exit(1);
    }
}

fn build_server(config: &Config) -> Result<WechatServer, Error> {
    let server_config = ServerConfig {
        app_id: required(config.app_id(), "APP_ID")?,
        app_secret: SecretString::from(required(config.app_secret(), "APP_SECRET")?),
        token: SecretString::from(required(config.token(), "TOKEN")?),
    };

    let storage = match config.credential_dir() {
        Some(dir) => FileStorage::new(dir),
        None => FileStorage::current_dir()?,
    };
    let client = ClientBuilder::new()
        .with_timeout(config.http_timeout())
        .build()?;
    let fetcher = PlatformClient::new(
        client,
        config.api_base_url().unwrap_or(DEFAULT_API_BASE_URL),
    );

    info!(
        "Using credential directory {} against {}",
        storage.dir().display(),
        fetcher.base_url()
    );

    let server = WechatServer::with_parts(server_config, storage, fetcher);
    Ok(if config.single_flight {
        server.with_single_flight()
    } else {
        server
    })
}

fn required(value: Option<String>, name: &str) -> Result<String, Error> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| config_error(ConfigErrorKind::MissingValue, &format!("{name} is not set")))
}

async fn run(
    server: &WechatServer,
    js_api_url: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let access_token = server.fetch_access_token().await?;
    info!(
        "Access token valid until {}",
        format_expiry(access_token.expires_at_millis)
    );

    let ticket = server.fetch_ticket().await?;
    info!(
        "JS API ticket valid until {}",
        format_expiry(ticket.expires_at_millis)
    );

    if let Some(url) = js_api_url {
        let js_config = server.js_api_config(&url).await?;
        println!("{}", serde_json::to_string_pretty(&js_config)?);
    }

    Ok(())
}

fn format_expiry(expires_at_millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(expires_at_millis)
        .map(|at| at.to_rfc3339())
        .unwrap_or_else(|| expires_at_millis.to_string())
}
