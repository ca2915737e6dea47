//! Watch navigation: player page URLs and launching the browser or an
//! external media player

use std::process::{Child, Command, Stdio};
use std::thread;

use crate::api::{live_m3u8_url, vod_m3u8_url};
use crate::error::{HubError, Result};
use crate::models::StreamRecord;
use crate::session::WalletSession;

#[derive(Debug, Clone, PartialEq)]
pub enum WatchTarget {
    Live(String),
    Vod(String),
}

impl WatchTarget {
    /// A VOD index wins over a stream key
    pub fn for_record(record: &StreamRecord) -> Result<Self> {
        if let Some(index) = record.index.as_deref().filter(|i| !i.is_empty()) {
            return Ok(WatchTarget::Vod(index.to_string()));
        }
        if let Some(url) = record.url.as_deref().filter(|u| !u.is_empty()) {
            return Ok(WatchTarget::Live(url.to_string()));
        }
        Err(HubError::NothingToWatch)
    }

    /// Backend endpoint serving this stream's m3u8 playlist
    pub fn playlist_url(&self, backend_prefix: &str) -> String {
        match self {
            WatchTarget::Live(name) => live_m3u8_url(backend_prefix, name),
            WatchTarget::Vod(index) => vod_m3u8_url(backend_prefix, index),
        }
    }
}

/// Player page with the playlist endpoint as its `view` parameter
pub fn player_url(player_page: &str, backend_prefix: &str, target: &WatchTarget) -> String {
    let separator = if player_page.contains('?') { '&' } else { '?' };
    format!(
        "{}{}view={}",
        player_page,
        separator,
        urlencoding::encode(&target.playlist_url(backend_prefix))
    )
}

/// Gate on the wallet, then resolve the page to open
pub fn watch_url(
    session: &WalletSession,
    player_page: &str,
    backend_prefix: &str,
    record: &StreamRecord,
) -> Result<String> {
    session.require_account()?;
    let target = WatchTarget::for_record(record)?;
    Ok(player_url(player_page, backend_prefix, &target))
}

fn opener_command(url: &str) -> Command {
    if cfg!(target_os = "windows") {
        let mut cmd = Command::new("rundll32");
        cmd.arg("url.dll,FileProtocolHandler").arg(url);
        cmd
    } else if cfg!(target_os = "macos") {
        let mut cmd = Command::new("open");
        cmd.arg(url);
        cmd
    } else {
        let mut cmd = Command::new("xdg-open");
        cmd.arg(url);
        cmd
    }
}

/// Open `url` in the default browser as a detached process
pub fn open_in_browser(url: &str) -> Result<()> {
    let mut cmd = opener_command(url);
    cmd.stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::null());

    let program = cmd.get_program().to_string_lossy().into_owned();
    let mut child = cmd.spawn().map_err(|source| HubError::Launch { program, source })?;

    // Reap the opener so it doesn't linger as a zombie
    thread::spawn(move || {
        let _ = child.wait();
    });
    Ok(())
}

/// Start an external media player on the playlist URL, stderr piped for logging
pub fn launch_player(program: &str, playlist_url: &str) -> Result<Child> {
    let mut cmd = Command::new(program);
    cmd.arg(playlist_url);
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::null());
    cmd.stderr(Stdio::piped());
    cmd.spawn().map_err(|source| HubError::Launch {
        program: program.to_string(),
        source,
    })
}
