use crate::core_command::error::CommandError;
use crate::core_command::Flow;
use crate::core_protocol::{Command, Connection, Transfer};
use crate::core_session::SessionSettings;
use crate::helpers::{format_bytes, shared_path};
use log::info;
use std::io::ErrorKind;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncWrite};

/// Handles the DOWNLOAD command.
///
/// Replies `FILESIZE <n>`, writes exactly `n` raw bytes, then `EOF`.
/// Until `FILESIZE` is sent every failure is an ordinary `ERR` reply and the
/// connection stays in line mode. After it, a short read from disk leaves
/// the peer waiting for bytes that will never come, so the session ends.
///
/// # Arguments
///
/// * `conn` - The client connection the header, payload and trailer go to.
/// * `settings` - Shared directory and transfer buffer size.
/// * `command` - The parsed request; its first argument is the file name.
///
/// # Returns
///
/// `Flow::Continue` after `EOF`, or a `CommandError` describing the refusal.
pub async fn handle_download_command<S>(
    conn: &mut Connection<S>,
    settings: &SessionSettings,
    command: &Command,
) -> Result<Flow, CommandError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let name = command.arg(0).ok_or(CommandError::MissingFilename)?;
    let path = shared_path(&settings.shared_dir, name)
        .ok_or_else(|| CommandError::InvalidFilename(name.to_string()))?;

    let mut file = match File::open(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(CommandError::FileNotFound(name.to_string()))
        }
        Err(e) => return Err(CommandError::Storage(e)),
    };
    let metadata = file.metadata().await?;
    if !metadata.is_file() {
        return Err(CommandError::FileNotFound(name.to_string()));
    }

    let mut transfer = Transfer::new(name, metadata.len());
    conn.write_line(&format!("FILESIZE {}", transfer.declared()))
        .await?;
    conn.send_raw_from(&mut file, &mut transfer, settings.transfer_buffer_size, |_| {})
        .await?;
    conn.write_line("EOF").await?;

    info!(
        "Sent file {} ({})",
        transfer.filename(),
        format_bytes(transfer.transferred())
    );
    Ok(Flow::Continue)
}
