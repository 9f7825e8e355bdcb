use crate::core_auth::SharedSecret;
use crate::core_command::error::CommandError;
use crate::core_command::Flow;
use crate::core_protocol::{Command, Connection};
use crate::core_session::{SessionSettings, SessionState};
use log::{error, info};
use tokio::io::{AsyncRead, AsyncWrite};

/// Handles the AUTH command.
///
/// A matching password moves the session to `Authenticated`. A wrong one
/// leaves the state untouched, so an already authenticated session stays
/// authenticated. Retries are unlimited.
///
/// # Arguments
///
/// * `conn` - The client connection the verdict is written to.
/// * `settings` - Holds the shared secret.
/// * `state` - The session state, updated on success.
/// * `command` - The parsed request; its first argument is the password.
pub async fn handle_auth_command<S>(
    conn: &mut Connection<S>,
    settings: &SessionSettings,
    state: &mut SessionState,
    command: &Command,
) -> Result<Flow, CommandError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let password = command.arg(0).ok_or(CommandError::MissingPassword)?;

    if !check_secret(&settings.secret, password).await {
        return Err(CommandError::AuthenticationFailed);
    }

    *state = SessionState::Authenticated;
    conn.write_line("OK Authenticated").await?;
    info!("Client authenticated");
    Ok(Flow::Continue)
}

async fn check_secret(secret: &SharedSecret, candidate: &str) -> bool {
    match secret {
        SharedSecret::Plain(_) => secret.verify(candidate),
        SharedSecret::Bcrypt(_) => {
            // bcrypt is deliberately slow; keep it off the async workers
            let secret = secret.clone();
            let candidate = candidate.to_string();
            tokio::task::spawn_blocking(move || secret.verify(&candidate))
                .await
                .unwrap_or_else(|e| {
                    error!("Password check task failed: {}", e);
                    false
                })
        }
    }
}
