use crate::constants::DEFAULT_TRANSFER_BUFFER_SIZE;
use crate::core_client::error::ClientError;
use crate::core_protocol::{Command, Connection, Transfer, Verb};
use log::debug;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpStream, ToSocketAddrs};

/// One entry of a LIST reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub name: String,
    pub size: u64,
}

/// Protocol-level client: one request in flight at a time, every reply
/// read completely before the method returns.
pub struct Client<S> {
    conn: Connection<S>,
    buffer_size: usize,
}

impl Client<TcpStream> {
    /// Connects and consumes the `WELCOME` line, returning its text.
    pub async fn connect<A: ToSocketAddrs>(addr: A) -> Result<(Self, String), ClientError> {
        let stream = TcpStream::connect(addr).await?;
        let mut client = Client::new(stream);
        let greeting = client.read_greeting().await?;
        Ok((client, greeting))
    }
}

impl<S> Client<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self {
            conn: Connection::new(stream),
            buffer_size: DEFAULT_TRANSFER_BUFFER_SIZE,
        }
    }

    pub async fn read_greeting(&mut self) -> Result<String, ClientError> {
        let line = self.read_reply().await?;
        match line.strip_prefix("WELCOME") {
            Some(text) => Ok(text.trim().to_string()),
            None => Err(ClientError::Unexpected(line)),
        }
    }

    pub async fn auth(&mut self, password: &str) -> Result<String, ClientError> {
        self.send(Command::new(Verb::Auth, [password])).await?;
        self.read_reply().await
    }

    pub async fn list(&mut self) -> Result<Vec<RemoteFile>, ClientError> {
        self.send(Command::new(Verb::List, Vec::<String>::new()))
            .await?;
        let header = self.read_reply().await?;
        let count: usize = header
            .strip_prefix("OK ")
            .and_then(|n| n.trim().parse().ok())
            .ok_or_else(|| ClientError::Unexpected(header.clone()))?;

        // Entries are file names, so a name like `ERRATA.txt` is not an error
        let mut files = Vec::with_capacity(count);
        loop {
            let line = self.read_line().await?;
            if line == "END" {
                break;
            }
            files.push(parse_list_entry(&line)?);
        }
        if files.len() != count {
            debug!("LIST announced {} entries but sent {}", count, files.len());
        }
        Ok(files)
    }

    /// Sends DOWNLOAD and reads the `FILESIZE` header.
    pub async fn begin_download(&mut self, name: &str) -> Result<Transfer, ClientError> {
        self.send(Command::new(Verb::Download, [name])).await?;
        let header = self.read_reply().await?;
        let size = header
            .strip_prefix("FILESIZE ")
            .and_then(|n| n.trim().parse::<u64>().ok())
            .ok_or_else(|| ClientError::Unexpected(header.clone()))?;
        Ok(Transfer::new(name, size))
    }

    /// Receives the payload announced by `begin_download` and the trailing `EOF`.
    pub async fn finish_download<W, F>(
        &mut self,
        transfer: &mut Transfer,
        sink: &mut W,
        on_progress: F,
    ) -> Result<(), ClientError>
    where
        W: AsyncWrite + Unpin,
        F: FnMut(&Transfer),
    {
        self.conn
            .recv_raw_into(sink, transfer, self.buffer_size, on_progress)
            .await?;
        let trailer = self.read_reply().await?;
        if trailer != "EOF" {
            return Err(ClientError::Unexpected(trailer));
        }
        Ok(())
    }

    /// Sends UPLOAD and waits for `READY`.
    pub async fn begin_upload(&mut self, name: &str, size: u64) -> Result<Transfer, ClientError> {
        self.send(Command::new(Verb::Upload, [name.to_string(), size.to_string()]))
            .await?;
        let reply = self.read_reply().await?;
        if reply != "READY" {
            return Err(ClientError::Unexpected(reply));
        }
        Ok(Transfer::new(name, size))
    }

    /// Streams the payload for `begin_upload` and returns the server's verdict.
    pub async fn finish_upload<R, F>(
        &mut self,
        transfer: &mut Transfer,
        source: &mut R,
        on_progress: F,
    ) -> Result<String, ClientError>
    where
        R: AsyncRead + Unpin,
        F: FnMut(&Transfer),
    {
        self.conn
            .send_raw_from(source, transfer, self.buffer_size, on_progress)
            .await?;
        self.read_reply().await
    }

    pub async fn quit(&mut self) -> Result<String, ClientError> {
        self.send(Command::new(Verb::Quit, Vec::<String>::new()))
            .await?;
        self.read_reply().await
    }

    async fn send(&mut self, command: Command) -> Result<(), ClientError> {
        self.conn.write_line(&command.to_string()).await?;
        Ok(())
    }

    /// Next reply line; `ERR` lines come back as `ClientError::Server`.
    async fn read_reply(&mut self) -> Result<String, ClientError> {
        let line = self.read_line().await?;
        if line.starts_with("ERR") {
            return Err(ClientError::Server(line));
        }
        Ok(line)
    }

    async fn read_line(&mut self) -> Result<String, ClientError> {
        self.conn
            .read_line()
            .await?
            .ok_or(ClientError::Disconnected)
    }
}

fn parse_list_entry(line: &str) -> Result<RemoteFile, ClientError> {
    let (name, size) = line
        .rsplit_once('\t')
        .ok_or_else(|| ClientError::Unexpected(line.to_string()))?;
    let size = size
        .parse()
        .map_err(|_| ClientError::Unexpected(line.to_string()))?;
    Ok(RemoteFile {
        name: name.to_string(),
        size,
    })
}
