use crate::core_command::error::CommandError;
use crate::core_command::Flow;
use crate::core_protocol::Connection;
use log::info;
use tokio::io::{AsyncRead, AsyncWrite};

/// Handles the QUIT command: says `BYE` and asks the session to close.
pub async fn handle_quit_command<S>(conn: &mut Connection<S>) -> Result<Flow, CommandError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    info!("Received QUIT command. Closing connection.");
    conn.write_line("BYE").await?;
    Ok(Flow::Close)
}
