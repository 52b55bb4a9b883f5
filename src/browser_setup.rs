use anyhow::{Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use futures::StreamExt;
use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;
use tokio::task::{self, JoinHandle};
use tracing::{error, info, trace, warn};

/// Flags passed to every launch. The results page serves a degraded
/// document to clients it identifies as automated, so the browser has to
/// look like an ordinary desktop install.
const STEALTH_ARGS: &[&str] = &[
    "--disable-blink-features=AutomationControlled",
    "--disable-infobars",
    "--disable-notifications",
    "--disable-print-preview",
    "--disable-desktop-notifications",
    "--disable-software-rasterizer",
    "--disable-setuid-sandbox",
    "--no-first-run",
    "--no-default-browser-check",
    "--no-sandbox",
    "--ignore-certificate-errors",
    "--disable-extensions",
    "--disable-popup-blocking",
    "--disable-background-networking",
    "--disable-background-timer-throttling",
    "--disable-backgrounding-occluded-windows",
    "--disable-breakpad",
    "--disable-hang-monitor",
    "--disable-ipc-flooding-protection",
    "--disable-prompt-on-repost",
    "--metrics-recording-only",
    "--password-store=basic",
    "--use-mock-keychain",
    "--hide-scrollbars",
    "--mute-audio",
];

/// Locate a Chrome or Chromium executable.
///
/// `CHROME_EXECUTABLE` wins when set; otherwise the conventional install
/// locations for the current platform are probed, then `PATH`.
pub fn find_browser_executable() -> Result<PathBuf> {
    if let Ok(overridden) = std::env::var("CHROME_EXECUTABLE") {
        let overridden = PathBuf::from(overridden);
        if overridden.exists() {
            info!("Using browser from CHROME_EXECUTABLE: {}", overridden.display());
            return Ok(overridden);
        }
        warn!(
            "CHROME_EXECUTABLE points to a missing file, ignoring it: {}",
            overridden.display()
        );
    }

    for candidate in installation_candidates() {
        if candidate.exists() {
            info!("Found browser at {}", candidate.display());
            return Ok(candidate);
        }
    }

    if let Some(found) = probe_system_path() {
        info!("Found browser on PATH: {}", found.display());
        return Ok(found);
    }

    Err(anyhow::anyhow!(
        "Chrome/Chromium executable not found; install Chrome or set CHROME_EXECUTABLE"
    ))
}

/// Conventional install locations for the current platform, in probe order.
fn installation_candidates() -> Vec<PathBuf> {
    if cfg!(target_os = "windows") {
        let mut candidates = vec![
            PathBuf::from(r"C:\Program Files\Google\Chrome\Application\chrome.exe"),
            PathBuf::from(r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe"),
            PathBuf::from(r"C:\Program Files\Chromium\Application\chrome.exe"),
        ];
        if let Ok(local) = std::env::var("LOCALAPPDATA") {
            candidates.push(PathBuf::from(local).join(r"Google\Chrome\Application\chrome.exe"));
        }
        candidates
    } else if cfg!(target_os = "macos") {
        let mut candidates = vec![
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome"),
            PathBuf::from("/Applications/Chromium.app/Contents/MacOS/Chromium"),
            PathBuf::from("/opt/homebrew/bin/chromium"),
        ];
        if let Some(home) = dirs::home_dir() {
            candidates.push(
                home.join("Applications/Google Chrome.app/Contents/MacOS/Google Chrome"),
            );
        }
        candidates
    } else {
        vec![
            PathBuf::from("/usr/bin/google-chrome"),
            PathBuf::from("/usr/bin/google-chrome-stable"),
            PathBuf::from("/usr/bin/chromium"),
            PathBuf::from("/usr/bin/chromium-browser"),
            PathBuf::from("/snap/bin/chromium"),
            PathBuf::from("/usr/local/bin/chromium"),
            PathBuf::from("/opt/google/chrome/chrome"),
        ]
    }
}

/// Ask `which` for any of the usual binary names. Unix only.
fn probe_system_path() -> Option<PathBuf> {
    if cfg!(target_os = "windows") {
        return None;
    }
    for name in ["chromium", "chromium-browser", "google-chrome", "chrome"] {
        let Ok(output) = Command::new("which").arg(name).output() else {
            continue;
        };
        if !output.status.success() {
            continue;
        }
        let resolved = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !resolved.is_empty() {
            return Some(PathBuf::from(resolved));
        }
    }
    None
}

/// Chrome emits CDP events chromiumoxide has no variant for; the resulting
/// deserialization failures are harmless noise.
/// Reference: https://github.com/mattsse/chromiumoxide/issues/167
fn is_benign_cdp_noise(message: &str) -> bool {
    message.contains("data did not match any variant of untagged enum Message")
        || message.contains("Failed to deserialize WS response")
}

/// Launch Chrome/Chromium configured for scraping the results page.
///
/// Returns the browser handle, the CDP handler task, and the profile
/// directory the browser runs in. The caller owns all three: the handler
/// task must be aborted and the profile directory removed once the
/// browser is closed.
///
/// # Profile Isolation
/// When `chrome_data_dir` is `None`, a unique throwaway profile directory
/// is created under the system temp dir, so concurrent sessions never
/// contend on a profile lock.
pub async fn launch_browser(
    headless: bool,
    user_agent: &str,
    chrome_data_dir: Option<PathBuf>,
    proxy: Option<&str>,
) -> Result<(Browser, JoinHandle<()>, PathBuf)> {
    let chrome_path = find_browser_executable()?;

    let user_data_dir = chrome_data_dir.unwrap_or_else(|| {
        std::env::temp_dir().join(format!("iget_chrome_{}", uuid::Uuid::new_v4()))
    });
    std::fs::create_dir_all(&user_data_dir).context("Failed to create user data directory")?;

    let mut config_builder = BrowserConfigBuilder::default()
        .chrome_executable(chrome_path)
        .user_data_dir(user_data_dir.clone())
        .window_size(1920, 1080)
        .request_timeout(Duration::from_secs(30))
        .arg(format!("--user-agent={user_agent}"));

    if let Some(proxy) = proxy {
        config_builder = config_builder.arg(format!("--proxy-server={proxy}"));
    }

    for flag in STEALTH_ARGS {
        config_builder = config_builder.arg(*flag);
    }

    config_builder = if headless {
        config_builder.headless_mode(HeadlessMode::default())
    } else {
        config_builder.with_head()
    };

    let browser_config = config_builder
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build browser config: {e}"))?;

    info!("Launching browser with profile {}", user_data_dir.display());
    let (browser, mut handler) = Browser::launch(browser_config)
        .await
        .context("Failed to launch browser")?;

    let handler_task = task::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                let message = e.to_string();
                if is_benign_cdp_noise(&message) {
                    trace!("Ignoring CDP deserialization noise: {message}");
                } else {
                    error!("Browser handler error: {e:?}");
                }
            }
        }
        info!("Browser handler loop ended");
    });

    Ok((browser, handler_task, user_data_dir))
}
