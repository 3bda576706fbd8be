use std::process::Stdio;

use tokio::process::Command;

use courtside_core::AppConfig;
use courtside_reddit::{AuthorizationCoordinator, AuthorizationSession, OAuthSettings};

/// Runs the browser handshake and returns an authorized session.
///
/// The authorization URL is always printed so the user can open it by hand
/// when `no_browser` is set or the launcher fails.
///
/// # Errors
///
/// Returns an error if the settings are invalid, the listener cannot bind,
/// the user denies access, no callback arrives in time, or the token
/// exchange fails.
pub(crate) async fn authorize(
    config: &AppConfig,
    no_browser: bool,
) -> anyhow::Result<AuthorizationSession> {
    let settings = OAuthSettings::from_app_config(config)?;
    let coordinator = AuthorizationCoordinator::new(settings)?;

    let session = coordinator
        .authorize(|url| {
            println!("Authorize courtside in your browser:\n  {url}");
            if no_browser {
                return;
            }
            if let Err(e) = open_in_browser(url.as_str()) {
                tracing::warn!(error = %e, "could not launch a browser; open the URL manually");
            }
        })
        .await?;

    tracing::info!(
        expires_at = ?session.expires_at,
        scopes = ?session.scopes,
        "authorized"
    );
    Ok(session)
}

fn browser_command(url: &str) -> Command {
    #[cfg(target_os = "macos")]
    {
        let mut cmd = Command::new("open");
        cmd.arg(url);
        cmd
    }
    #[cfg(target_os = "windows")]
    {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", "", url]);
        cmd
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        let mut cmd = Command::new("xdg-open");
        cmd.arg(url);
        cmd
    }
}

fn open_in_browser(url: &str) -> std::io::Result<()> {
    launch_detached(browser_command(url))
}

/// Starts `cmd` without waiting for it; the launcher may keep running for as
/// long as the browser does. A failed exit is only logged.
fn launch_detached(mut cmd: Command) -> std::io::Result<()> {
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    tokio::spawn(async move {
        match child.wait().await {
            Ok(status) if !status.success() => {
                tracing::warn!(%status, "browser launcher failed; open the URL manually");
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "could not wait for the browser launcher"),
        }
    });
    Ok(())
}
