use anyhow::{Context, Result};
use clap::Parser;
use netshare::config::Config;
use netshare::core_auth::secret::hash_password;
use netshare::core_cli::Cli;
use netshare::core_log::{default_level, init_logger};
use netshare::server;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Cli::parse();

    if let Some(password) = &args.hash_password {
        println!("{}", hash_password(password)?);
        return Ok(());
    }

    init_logger(default_level(args.verbose, "info"));

    // The configuration file is optional; every field has a default
    let mut config = match &args.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Unable to load {}", path.display()))?,
        None => Config::default(),
    };
    args.apply_overrides(&mut config.server);

    // Run the file-sharing server
    server::run(config).await?;

    Ok(())
}
