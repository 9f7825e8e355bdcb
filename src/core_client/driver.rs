use crate::core_client::client::Client;
use crate::core_client::error::ClientError;
use crate::core_client::input::{parse_input, UserCommand};
use crate::core_client::progress::TransferProgress;
use crate::helpers::is_valid_filename;
use colored::Colorize;
use log::{debug, warn};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::{self as tokio_io, AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite};

/// Whether the prompt loop keeps going after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Stop,
}

/// Interactive command loop on top of a [`Client`].
///
/// One user command at a time: it is sent, its reply is read in full and
/// rendered, and only then is the next line of input read.
pub struct Driver<S> {
    client: Client<S>,
    download_dir: PathBuf,
    show_progress: bool,
}

impl<S> Driver<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(client: Client<S>, download_dir: PathBuf) -> Self {
        Self {
            client,
            download_dir,
            show_progress: true,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Runs until QUIT, end of input, or a connection-level failure.
    pub async fn run<R>(&mut self, input: R) -> Result<(), ClientError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        loop {
            prompt();
            let Some(line) = lines.next_line().await? else {
                debug!("End of input");
                break;
            };
            let Some(command) = parse_input(&line) else {
                continue;
            };

            match self.execute(command).await {
                Ok(Step::Continue) => {}
                Ok(Step::Stop) => break,
                Err(e) if e.is_fatal() => {
                    render_error(&e);
                    return Err(e);
                }
                Err(e) => render_error(&e),
            }
        }
        Ok(())
    }

    pub async fn execute(&mut self, command: UserCommand) -> Result<Step, ClientError> {
        match command {
            UserCommand::Auth(password) => {
                let reply = self.client.auth(&password).await?;
                render_reply(&reply);
            }
            UserCommand::List => {
                let files = self.client.list().await?;
                render_reply(&format!("OK {}", files.len()));
                for file in files {
                    println!("{}\t{}", file.name, file.size);
                }
            }
            UserCommand::Download(name) => self.download(&name).await?,
            UserCommand::Upload(path) => self.upload(&path).await?,
            UserCommand::Quit => {
                let reply = self.client.quit().await?;
                render_reply(&reply);
                return Ok(Step::Stop);
            }
            UserCommand::Usage(usage) => println!("{}", usage),
            UserCommand::Unknown => println!("Unknown. Use AUTH/LIST/DOWNLOAD/UPLOAD/QUIT"),
        }
        Ok(Step::Continue)
    }

    async fn download(&mut self, name: &str) -> Result<(), ClientError> {
        let local_name = Path::new(name)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| ClientError::InvalidName(name.to_string()))?;
        let target = self.download_dir.join(&local_name);

        let mut transfer = self.client.begin_download(name).await?;
        println!(
            "Downloading {} ({} bytes)...",
            transfer.filename(),
            transfer.declared()
        );
        let progress = self.progress(transfer.declared(), transfer.filename());

        let mut file = match File::create(&target).await {
            Ok(file) => file,
            Err(e) => {
                // The payload is on its way regardless; consume it to stay in sync
                warn!("Cannot create {:?}: {}", target, e);
                self.client
                    .finish_download(&mut transfer, &mut tokio_io::sink(), |_| {})
                    .await?;
                progress.abandon();
                return Err(e.into());
            }
        };

        let result = self
            .client
            .finish_download(&mut transfer, &mut file, |t| progress.update(t.transferred()))
            .await;
        drop(file);

        match result {
            Ok(()) => {
                progress.finish();
                println!("Download finished: {}", target.display());
                Ok(())
            }
            Err(e) => {
                progress.abandon();
                if let Err(rm) = fs::remove_file(&target).await {
                    debug!("Could not remove partial download {:?}: {}", target, rm);
                }
                Err(e)
            }
        }
    }

    async fn upload(&mut self, path: &Path) -> Result<(), ClientError> {
        let metadata = match fs::metadata(path).await {
            Ok(metadata) if metadata.is_file() => metadata,
            _ => return Err(ClientError::LocalFileNotFound(path.to_path_buf())),
        };
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .filter(|n| is_valid_filename(n) && !n.contains(char::is_whitespace))
            .ok_or_else(|| ClientError::InvalidName(path.display().to_string()))?;

        let mut file = File::open(path).await?;
        let mut transfer = self.client.begin_upload(&name, metadata.len()).await?;
        println!("Uploading {} ({} bytes)...", name, transfer.declared());
        let progress = self.progress(transfer.declared(), &name);

        let result = self
            .client
            .finish_upload(&mut transfer, &mut file, |t| progress.update(t.transferred()))
            .await;
        match result {
            Ok(reply) => {
                progress.finish();
                render_reply(&reply);
                Ok(())
            }
            Err(e) => {
                progress.abandon();
                Err(e)
            }
        }
    }

    fn progress(&self, total: u64, filename: &str) -> TransferProgress {
        if self.show_progress {
            TransferProgress::new(total, filename)
        } else {
            TransferProgress::hidden()
        }
    }
}

fn prompt() {
    print!(">> ");
    // A prompt that fails to show is not worth aborting over
    let _ = std::io::stdout().flush();
}

fn render_reply(line: &str) {
    if line.starts_with("OK") {
        println!("{}", line.green());
    } else {
        println!("{}", line);
    }
}

fn render_error(e: &ClientError) {
    println!("{}", e.to_string().red());
}
