use crate::core_command::{auth, download, list, quit, upload, CommandError, Flow};
use crate::core_protocol::{Command, Connection, ProtocolError, Verb};
use crate::core_session::SessionSettings;
use log::{debug, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated,
    Closed,
}

/// Server side of one client connection.
///
/// Strictly sequential: read a command, answer it completely, read the next.
/// Owned by a single task, so nothing in here is locked.
pub struct Session<S> {
    peer: SocketAddr,
    state: SessionState,
    settings: Arc<SessionSettings>,
    conn: Connection<S>,
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, peer: SocketAddr, settings: Arc<SessionSettings>) -> Self {
        let conn = Connection::new(stream)
            .with_max_line_length(settings.max_line_length)
            .with_timeout(settings.idle_timeout);
        Self {
            peer,
            state: SessionState::Unauthenticated,
            settings,
            conn,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Drives the session until QUIT, disconnection, or a transport error.
    pub async fn run(mut self) -> Result<(), ProtocolError> {
        let banner = format!("WELCOME {}", self.settings.banner);
        self.conn.write_line(&banner).await?;

        while self.state != SessionState::Closed {
            let line = match self.conn.read_line().await? {
                Some(line) => line,
                None => {
                    info!("[{}] disconnected", self.peer);
                    break;
                }
            };
            let Some(command) = Command::parse(&line) else {
                continue;
            };
            debug!("[{}] received {}", self.peer, loggable(&command));

            if self.dispatch(&command).await? == Flow::Close {
                self.state = SessionState::Closed;
            }
        }

        if let Err(e) = self.conn.shutdown().await {
            debug!("[{}] shutdown after close failed: {}", self.peer, e);
        }
        Ok(())
    }

    async fn dispatch(&mut self, command: &Command) -> Result<Flow, ProtocolError> {
        let result = if command.verb.requires_auth() && self.state != SessionState::Authenticated
        {
            Err(CommandError::NotAuthenticated)
        } else {
            match &command.verb {
                Verb::Auth => {
                    auth::handle_auth_command(
                        &mut self.conn,
                        &self.settings,
                        &mut self.state,
                        command,
                    )
                    .await
                }
                Verb::Quit => quit::handle_quit_command(&mut self.conn).await,
                Verb::List => list::handle_list_command(&mut self.conn, &self.settings).await,
                Verb::Download => {
                    download::handle_download_command(&mut self.conn, &self.settings, command)
                        .await
                }
                Verb::Upload => {
                    upload::handle_upload_command(&mut self.conn, &self.settings, command).await
                }
                Verb::Unknown(verb) => Err(CommandError::UnknownCommand(verb.clone())),
            }
        };

        match result {
            Ok(flow) => Ok(flow),
            Err(CommandError::Protocol(e)) => Err(e),
            Err(e) if e.is_fatal() => {
                warn!("[{}] {} aborted: {}", self.peer, command.verb.as_str(), e);
                // The peer is most likely gone already
                if let Err(write_err) = self.conn.write_line(&e.to_response()).await {
                    debug!("[{}] could not report failure: {}", self.peer, write_err);
                }
                Ok(Flow::Close)
            }
            Err(e) => {
                warn!("[{}] {} refused: {}", self.peer, command.verb.as_str(), e);
                self.conn.write_line(&e.to_response()).await?;
                Ok(Flow::Continue)
            }
        }
    }
}

fn loggable(command: &Command) -> String {
    match command.verb {
        Verb::Auth => "AUTH <redacted>".to_string(),
        _ => command.to_string(),
    }
}
