use asan_storage::ConnectOptions;
use asan_telemetry::LogFormat;
use clap::{Parser, ValueEnum};
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const MONGO_URI_ENV: &str = "MONGO_URI";
pub const MONGO_DATABASE_ENV: &str = "ASAN_MONGO_DATABASE";
pub const MONGO_TIMEOUT_ENV: &str = "ASAN_MONGO_TIMEOUT_MS";
pub const DATA_FILE_ENV: &str = "ASAN_DATA_FILE";
pub const STATIC_DIR_ENV: &str = "ASAN_STATIC_DIR";
pub const LOG_FORMAT_ENV: &str = "ASAN_LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DATA_FILE: &str = "data/data.json";
pub const DEFAULT_MONGO_DATABASE: &str = "asan";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    #[value(name = "text")]
    Text,
    #[value(name = "json")]
    Json,
}

impl Display for LogFormatArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormatArg::Text => write!(f, "text"),
            LogFormatArg::Json => write!(f, "json"),
        }
    }
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Text => LogFormat::Text,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "asan-gateway")]
pub struct Cli {
    #[arg(long, env = HOST_ENV, default_value = DEFAULT_HOST)]
    pub host: String,

    #[arg(long, env = PORT_ENV, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Document database connection string. File storage is used when unset
    /// or unreachable.
    #[arg(long, env = MONGO_URI_ENV)]
    pub mongo_uri: Option<String>,

    #[arg(long, env = MONGO_DATABASE_ENV, default_value = DEFAULT_MONGO_DATABASE)]
    pub mongo_database: String,

    #[arg(long, env = MONGO_TIMEOUT_ENV)]
    pub mongo_timeout_ms: Option<u64>,

    #[arg(long, env = DATA_FILE_ENV, default_value = DEFAULT_DATA_FILE)]
    pub data_file: PathBuf,

    #[arg(long, env = STATIC_DIR_ENV)]
    pub static_dir: Option<PathBuf>,

    #[arg(
        long,
        env = LOG_FORMAT_ENV,
        value_enum,
        default_value_t = LogFormatArg::Text
    )]
    pub log_format: LogFormatArg,
}

impl Cli {
    pub fn connect_options(&self) -> ConnectOptions {
        ConnectOptions {
            data_file: self.data_file.clone(),
            remote_uri: self.mongo_uri.clone(),
            default_database: self.mongo_database.clone(),
            server_selection_timeout: self.mongo_timeout_ms.map(Duration::from_millis),
        }
    }
}
