use crate::core_command::error::CommandError;
use crate::core_command::Flow;
use crate::core_protocol::{Command, Connection, ProtocolError, Transfer};
use crate::core_session::SessionSettings;
use crate::helpers::{format_bytes, shared_path};
use log::{debug, error, info, warn};
use std::io;
use std::path::Path;
use tokio::fs::{self, File};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

/// Handles the UPLOAD command.
///
/// Arguments are validated and the target file created before `READY` is
/// sent, so every refusal leaves the client in line mode with nothing
/// written. After `READY` exactly `size` raw bytes belong to the upload:
///
/// * a local write failure keeps draining the declared bytes so the next
///   command is read from the right place, then replies with a storage error;
/// * an early close from the peer removes the incomplete file and reports a
///   partial upload instead of pretending the upload succeeded.
///
/// # Arguments
///
/// * `conn` - The client connection, in line mode on entry and on return.
/// * `settings` - Shared directory, upload size limit and buffer size.
/// * `command` - The parsed request; `<filename> <filesize>` are its arguments.
///
/// # Returns
///
/// `Flow::Continue` once `OK Upload complete` has been sent. A `CommandError`
/// otherwise; `PartialUpload` is fatal and the session closes after replying.
pub async fn handle_upload_command<S>(
    conn: &mut Connection<S>,
    settings: &SessionSettings,
    command: &Command,
) -> Result<Flow, CommandError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (Some(name), Some(size_arg)) = (command.arg(0), command.arg(1)) else {
        return Err(CommandError::UploadUsage);
    };
    let size: u64 = size_arg
        .parse()
        .map_err(|_| CommandError::InvalidFilesize(size_arg.to_string()))?;
    let path = shared_path(&settings.shared_dir, name)
        .ok_or_else(|| CommandError::InvalidFilename(name.to_string()))?;
    if let Some(limit) = settings.max_upload_size {
        if size > limit {
            return Err(CommandError::TooLarge { size, limit });
        }
    }

    let mut file = File::create(&path).await?;
    conn.write_line("READY").await?;

    let mut transfer = Transfer::new(name, size);
    conn.begin_raw(size)?;

    let mut buffer = vec![0; settings.transfer_buffer_size.max(1)];
    let mut write_error: Option<io::Error> = None;
    while !transfer.is_complete() {
        let n = match conn.read_raw(&mut buffer).await {
            Ok(n) => n,
            Err(e) => {
                drop(file);
                remove_incomplete(&path).await;
                return Err(match e {
                    ProtocolError::PartialTransfer { expected, received } => {
                        CommandError::PartialUpload { expected, received }
                    }
                    other => CommandError::Protocol(other),
                });
            }
        };

        if write_error.is_none() {
            if let Err(e) = file.write_all(&buffer[..n]).await {
                error!("Error writing to {:?}: {}", path, e);
                write_error = Some(e);
            }
        }
        transfer.advance(n);
    }

    if write_error.is_none() {
        if let Err(e) = file.flush().await {
            write_error = Some(e);
        }
    }
    drop(file);

    if let Some(e) = write_error {
        remove_incomplete(&path).await;
        return Err(CommandError::Storage(e));
    }

    conn.write_line("OK Upload complete").await?;
    info!(
        "Received file {} ({})",
        transfer.filename(),
        format_bytes(transfer.transferred())
    );
    Ok(Flow::Continue)
}

async fn remove_incomplete(path: &Path) {
    match fs::remove_file(path).await {
        Ok(()) => debug!("Removed incomplete upload {:?}", path),
        Err(e) => warn!("Could not remove incomplete upload {:?}: {}", path, e),
    }
}
