use crate::core_command::error::CommandError;
use crate::core_command::Flow;
use crate::core_protocol::Connection;
use crate::core_session::SessionSettings;
use log::{debug, warn};
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWrite};

/// Handles the LIST command.
///
/// Replies `OK <count>`, then one `<name>\t<size>` line per file in the
/// order the filesystem enumerates them, then `END`. Subdirectories are
/// not part of the namespace and are skipped. An entry that disappears
/// before its size can be read is listed with size 0.
///
/// # Arguments
///
/// * `conn` - The client connection the listing is written to.
/// * `settings` - Provides the shared directory to enumerate.
///
/// # Returns
///
/// `Flow::Continue`, or `CommandError::Storage` if the directory cannot be read.
pub async fn handle_list_command<S>(
    conn: &mut Connection<S>,
    settings: &SessionSettings,
) -> Result<Flow, CommandError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let entries = collect_entries(settings).await?;

    conn.write_line(&format!("OK {}", entries.len())).await?;
    for (name, size) in &entries {
        conn.write_line(&format!("{}\t{}", name, size)).await?;
    }
    conn.write_line("END").await?;

    debug!("Listed {} entries", entries.len());
    Ok(Flow::Continue)
}

async fn collect_entries(settings: &SessionSettings) -> Result<Vec<(String, u64)>, CommandError> {
    let mut entries = Vec::new();
    let mut dir = fs::read_dir(&settings.shared_dir).await?;

    while let Some(entry) = dir.next_entry().await? {
        if let Ok(file_type) = entry.file_type().await {
            if file_type.is_dir() {
                continue;
            }
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        if name.contains(['\n', '\t']) {
            // Would corrupt the line framing of the listing
            warn!("Skipping unlistable file name {:?}", name);
            continue;
        }

        let size = match entry.metadata().await {
            Ok(metadata) => metadata.len(),
            Err(e) => {
                debug!("Could not stat {:?}, reporting size 0: {}", name, e);
                0
            }
        };
        entries.push((name, size));
    }

    Ok(entries)
}
