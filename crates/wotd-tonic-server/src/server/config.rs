use crate::server::schedule::CronSchedule;
use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use core::{fmt, time::Duration};
use std::{
    net::{Ipv4Addr, SocketAddr},
    path::PathBuf,
};

/// Runtime configuration for the `wotd-tonic-server` binary.
///
/// Every value can be given as a flag or through the environment (a `.env`
/// file in the working directory is loaded first). Flags win over the
/// environment.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "wotd-tonic-server",
    version,
    about = "A gRPC service that stores words and mails one of them on a schedule",
    args_override_self = true
)]
pub struct CliArgs {
    /// Port the gRPC server listens on, on all interfaces.
    ///
    /// Environment variable: `SERVER_PORT`
    #[arg(long, env = "SERVER_PORT", default_value_t = 8080)]
    pub server_port: u16,

    /// Serve the REST gateway under `/api` on a second port.
    ///
    /// Environment variable: `HTTP_PROXY_ENABLED`
    #[arg(long, env = "HTTP_PROXY_ENABLED", default_value_t = false)]
    pub http_proxy_enabled: bool,

    /// Port of the REST gateway.
    ///
    /// Environment variable: `HTTP_PROXY_PORT`
    #[arg(long, env = "HTTP_PROXY_PORT", default_value_t = 8443)]
    pub http_proxy_port: u16,

    /// Environment variable: `DB_HOST`
    #[arg(long, env = "DB_HOST", default_value_t = String::from("localhost"))]
    pub db_host: String,

    /// Environment variable: `DB_PORT`
    #[arg(long, env = "DB_PORT", default_value_t = 5432)]
    pub db_port: u16,

    /// Environment variable: `DB_USERNAME`
    #[arg(long, env = "DB_USERNAME", default_value_t = String::from("mywordoftheday"))]
    pub db_username: String,

    /// Required.
    ///
    /// Environment variable: `DB_PASSWORD`
    #[arg(long, env = "DB_PASSWORD", default_value_t = String::new(), hide_env_values = true)]
    pub db_password: String,

    /// Environment variable: `DB_NAME`
    #[arg(long, env = "DB_NAME", default_value_t = String::from("mywordoftheday"))]
    pub db_name: String,

    /// Mail a random word on `--smtp-schedule`.
    ///
    /// Environment variable: `SMTP_ENABLED`
    #[arg(long, env = "SMTP_ENABLED", default_value_t = false)]
    pub smtp_enabled: bool,

    /// Five-field cron expression: minute, hour, day of month, month, day of
    /// week. Evaluated in the local timezone.
    ///
    /// Example: "0 9 * * MON-FRI"
    ///
    /// Environment variable: `SMTP_SCHEDULE`
    #[arg(long, env = "SMTP_SCHEDULE", default_value_t = String::new())]
    pub smtp_schedule: String,

    /// Environment variable: `SMTP_HOST`
    #[arg(long, env = "SMTP_HOST", default_value_t = String::new())]
    pub smtp_host: String,

    /// Environment variable: `SMTP_PORT`
    #[arg(long, env = "SMTP_PORT", default_value_t = 587)]
    pub smtp_port: u16,

    /// Login name. Falls back to `--smtp-from-address` when empty.
    ///
    /// Environment variable: `SMTP_USERNAME`
    #[arg(long, env = "SMTP_USERNAME", default_value_t = String::new())]
    pub smtp_username: String,

    /// Authentication is skipped when empty.
    ///
    /// Environment variable: `SMTP_PASSWORD`
    #[arg(long, env = "SMTP_PASSWORD", default_value_t = String::new(), hide_env_values = true)]
    pub smtp_password: String,

    /// Environment variable: `SMTP_FROM_ADDRESS`
    #[arg(long, env = "SMTP_FROM_ADDRESS", default_value_t = String::new())]
    pub smtp_from_address: String,

    /// Recipients separated by commas, whitespace, or both.
    ///
    /// Environment variable: `SMTP_TO_ADDRESSES`
    #[arg(long, env = "SMTP_TO_ADDRESSES", value_delimiter = ',')]
    pub smtp_to_addresses: Vec<String>,

    /// HTML template with `{{ word }}` and `{{ definition }}` placeholders.
    /// The built-in template is used when unset.
    ///
    /// Environment variable: `SMTP_TEMPLATE`
    #[arg(long, env = "SMTP_TEMPLATE")]
    pub smtp_template: Option<PathBuf>,

    /// Seconds between database health probes.
    ///
    /// Environment variable: `HEALTH_CHECK_INTERVAL_SECS`
    #[arg(long, env = "HEALTH_CHECK_INTERVAL_SECS", default_value_t = 15)]
    pub health_check_interval: u64,

    /// Environment variable: `LOG_FORMAT`
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub name: String,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .finish()
    }
}

#[derive(Clone)]
pub struct MailConfig {
    pub schedule: CronSchedule,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
    pub to_addresses: Vec<String>,
    pub template: Option<PathBuf>,
}

impl fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailConfig")
            .field("schedule", &self.schedule.to_string())
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("from_address", &self.from_address)
            .field("to_addresses", &self.to_addresses)
            .field("template", &self.template)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub grpc_addr: SocketAddr,
    /// `None` when the gateway is disabled.
    pub gateway_addr: Option<SocketAddr>,
    pub database: DatabaseConfig,
    /// `None` when scheduled mail is disabled.
    pub mail: Option<MailConfig>,
    pub health_check_interval: Duration,
    pub log_format: LogFormat,
}

fn any_addr(port: u16) -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, port))
}

fn require(value: &str, name: &str) -> anyhow::Result<()> {
    if value.trim().is_empty() {
        bail!("{name} must be set");
    }
    Ok(())
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        require(&args.db_host, "DB_HOST")?;
        require(&args.db_username, "DB_USERNAME")?;
        require(&args.db_password, "DB_PASSWORD")?;
        require(&args.db_name, "DB_NAME")?;

        if args.health_check_interval == 0 {
            bail!("HEALTH_CHECK_INTERVAL_SECS must be greater than 0");
        }

        let mail = if args.smtp_enabled {
            let schedule = args
                .smtp_schedule
                .parse::<CronSchedule>()
                .with_context(|| format!("invalid SMTP_SCHEDULE `{}`", args.smtp_schedule))?;
            require(&args.smtp_host, "SMTP_HOST")?;
            require(&args.smtp_from_address, "SMTP_FROM_ADDRESS")?;

            let to_addresses: Vec<String> = args
                .smtp_to_addresses
                .iter()
                .flat_map(|entry| entry.split(|c: char| c == ',' || c.is_whitespace()))
                .filter(|address| !address.is_empty())
                .map(String::from)
                .collect();
            if to_addresses.is_empty() {
                bail!("SMTP_TO_ADDRESSES must contain at least one address");
            }

            Some(MailConfig {
                schedule,
                host: args.smtp_host,
                port: args.smtp_port,
                username: args.smtp_username,
                password: args.smtp_password,
                from_address: args.smtp_from_address,
                to_addresses,
                template: args.smtp_template,
            })
        } else {
            None
        };

        Ok(Self {
            grpc_addr: any_addr(args.server_port),
            gateway_addr: args
                .http_proxy_enabled
                .then(|| any_addr(args.http_proxy_port)),
            database: DatabaseConfig {
                host: args.db_host,
                port: args.db_port,
                username: args.db_username,
                password: args.db_password,
                name: args.db_name,
            },
            mail,
            health_check_interval: Duration::from_secs(args.health_check_interval),
            log_format: args.log_format,
        })
    }
}
