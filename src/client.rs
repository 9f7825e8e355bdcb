use anyhow::{Context, Result};
use clap::Parser;
use netshare::core_cli::ClientCli;
use netshare::core_client::{Client, Driver};
use netshare::core_log::{default_level, init_logger};
use tokio::io::{self, BufReader};

#[tokio::main]
async fn main() -> Result<()> {
    let args = ClientCli::parse();

    // Keep log output out of the way of the prompt
    init_logger(default_level(args.verbose, "warn"));

    let address = format!("{}:{}", args.host, args.port);
    let (client, greeting) = Client::connect(&address)
        .await
        .with_context(|| format!("Unable to connect to {}", address))?;
    println!("Connected to {}", address);
    println!("Server: {}", greeting);

    let mut driver = Driver::new(client, args.download_dir);
    driver.run(BufReader::new(io::stdin())).await?;

    Ok(())
}
