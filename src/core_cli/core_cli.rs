use crate::config::ServerConfig;
use crate::constants::{DEFAULT_HOST, DEFAULT_PORT};
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments of the server
#[derive(Parser, Debug)]
#[command(name = "netshare", about = "A shared-directory file server.")]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Directory exposed to clients
    #[arg(short, long)]
    pub shared: Option<PathBuf>,

    /// Shared password clients must send with AUTH
    #[arg(long)]
    pub password: Option<String>,

    /// Print a bcrypt hash of the given password for `password_hash` and exit
    #[arg(long, value_name = "PASSWORD")]
    pub hash_password: Option<String>,

    /// Enable verbose mode
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Flags given on the command line win over the configuration file.
    pub fn apply_overrides(&self, config: &mut ServerConfig) {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(shared) = &self.shared {
            config.shared_dir = shared.clone();
        }
        if let Some(password) = &self.password {
            config.password = password.clone();
            // An explicit plaintext password replaces any configured hash
            config.password_hash = None;
        }
    }
}

/// Command-line arguments of the interactive client
#[derive(Parser, Debug)]
#[command(name = "netshare-client", about = "Interactive client for a netshare server.")]
pub struct ClientCli {
    /// Server host
    #[arg(long, default_value = DEFAULT_HOST)]
    pub host: String,

    /// Server port
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Where DOWNLOAD stores files
    #[arg(short, long, default_value = ".")]
    pub download_dir: PathBuf,

    /// Enable verbose mode
    #[arg(short, long)]
    pub verbose: bool,
}
