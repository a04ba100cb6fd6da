mod client;
mod server;

use std::process;

use clap::{Parser, Subcommand};
use flagvault_lib::CreateFlagRequest;

use crate::client::{display_value, parse_value, resolve_remote_url, ClientError, FlagClient};
use crate::server::config::{CacheBackend, FvConfig, StorageBackend};
use crate::server::logging::init_logging;

#[derive(Parser, Debug)]
#[command(name = "flagvault")]
#[command(version)]
#[command(about = "Typed feature flags with a write-through cache", long_about = None)]
struct Args {
    /// Path to config file
    #[arg(short = 'c', long = "config", default_value = "fv.toml", global = true)]
    config: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server
    Serve {
        /// Port to listen on
        #[arg(short = 'p', long = "port")]
        port: Option<u16>,

        /// Address to bind
        #[arg(long = "hostname")]
        hostname: Option<String>,

        /// Durable store backend
        #[arg(long = "storage", value_enum)]
        storage: Option<StorageBackend>,

        /// Cache backend
        #[arg(long = "cache", value_enum)]
        cache: Option<CacheBackend>,
    },
    /// Create a flag on a running server
    Create {
        name: String,

        /// boolean or numeric
        #[arg(short = 't', long = "type")]
        flag_type: String,

        /// Initial value: true, false or a number
        value: String,

        #[arg(short = 'd', long = "description", default_value = "")]
        description: String,

        /// Server URL (overrides FV_REMOTE and [remote] url)
        #[arg(long = "remote")]
        remote: Option<String>,
    },
    /// Show the full flag record
    Get {
        name: String,

        #[arg(long = "remote")]
        remote: Option<String>,
    },
    /// Show only the current value (served from cache when possible)
    Value {
        name: String,

        #[arg(long = "remote")]
        remote: Option<String>,
    },
    /// Replace a flag's value
    Set {
        name: String,

        /// New value: true, false or a number
        value: String,

        #[arg(long = "remote")]
        remote: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Args::parse();

    let mut config = match FvConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };
    if let Err(e) = config.apply_env_overrides() {
        eprintln!("{}", e);
        process::exit(1);
    }
    if let Err(e) = init_logging(&config.log) {
        eprintln!("{}", e);
        process::exit(1);
    }

    match cli.cmd {
        Command::Serve {
            port,
            hostname,
            storage,
            cache,
        } => {
            // CLI args override env vars, which override config file values
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(hostname) = hostname {
                config.server.hostname = hostname;
            }
            if let Some(storage) = storage {
                config.storage.backend = storage;
            }
            if let Some(cache) = cache {
                config.cache.backend = cache;
            }
            server::run_serve(config).await;
        }
        Command::Create {
            name,
            flag_type,
            value,
            description,
            remote,
        } => {
            let client = connect(remote.as_deref(), &config);
            exit_on_error(run_create(&client, name, flag_type, &value, description).await);
        }
        Command::Get { name, remote } => {
            let client = connect(remote.as_deref(), &config);
            exit_on_error(run_get(&client, &name).await);
        }
        Command::Value { name, remote } => {
            let client = connect(remote.as_deref(), &config);
            exit_on_error(run_value(&client, &name).await);
        }
        Command::Set {
            name,
            value,
            remote,
        } => {
            let client = connect(remote.as_deref(), &config);
            exit_on_error(run_set(&client, &name, &value).await);
        }
    }
}

fn connect(remote_arg: Option<&str>, config: &FvConfig) -> FlagClient {
    FlagClient::new(&resolve_remote_url(remote_arg, &config.remote))
}

fn exit_on_error(result: Result<(), ClientError>) {
    if let Err(e) = result {
        eprintln!("{}", e);
        process::exit(1);
    }
}

async fn run_create(
    client: &FlagClient,
    name: String,
    flag_type: String,
    value: &str,
    description: String,
) -> Result<(), ClientError> {
    let req = CreateFlagRequest {
        name,
        flag_type,
        description,
        value: parse_value(value)?,
    };
    let flag = client.create(&req).await?;
    println!(
        "Created {} ({}) = {}",
        flag.name,
        flag.flag_type,
        display_value(&flag.value)
    );
    Ok(())
}

async fn run_get(client: &FlagClient, name: &str) -> Result<(), ClientError> {
    let flag = client.get(name).await?;
    match serde_json::to_string_pretty(&flag) {
        Ok(json) => println!("{}", json),
        Err(_) => println!("{:?}", flag),
    }
    Ok(())
}

async fn run_value(client: &FlagClient, name: &str) -> Result<(), ClientError> {
    let value = client.value(name).await?;
    println!("{}", display_value(&value.value));
    Ok(())
}

async fn run_set(client: &FlagClient, name: &str, value: &str) -> Result<(), ClientError> {
    let flag = client.set(name, parse_value(value)?).await?;
    println!("{} = {}", flag.name, display_value(&flag.value));
    Ok(())
}
