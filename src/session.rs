//! Browser session management
//!
//! A [`Session`] owns one launched browser for the length of one listing
//! fetch. The browser is closed on every exit path: explicitly through
//! [`Session::close`] on success, and from `Drop` when an error unwinds early.

use std::ffi::OsStr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use headless_chrome::{Browser, LaunchOptions};
use tracing::{debug, info, warn};

use crate::page::{ChromePage, Page, DEFAULT_VISIBLE_TIMEOUT};

/// Something that can start a browser
pub trait BrowserLauncher {
    type Browser: BrowserHandle;

    fn launch(&self) -> Result<Self::Browser>;
}

/// A running browser
pub trait BrowserHandle {
    type Page: Page;

    fn new_page(&self) -> Result<Self::Page>;

    /// Shut the browser down. Called at most once per session.
    fn close(&mut self) -> Result<()>;
}

/// Scoped ownership of a launched browser
pub struct Session<B: BrowserHandle> {
    browser: Option<B>,
}

impl<B: BrowserHandle> Session<B> {
    pub fn open<L>(launcher: &L) -> Result<Self>
    where
        L: BrowserLauncher<Browser = B>,
    {
        let browser = launcher.launch().context("Failed to launch browser")?;
        debug!("Browser session opened");
        Ok(Self {
            browser: Some(browser),
        })
    }

    pub fn new_page(&self) -> Result<B::Page> {
        match &self.browser {
            Some(browser) => browser.new_page(),
            None => anyhow::bail!("Browser session already closed"),
        }
    }

    /// Close the browser and report a failure to do so
    pub fn close(mut self) -> Result<()> {
        match self.browser.take() {
            Some(mut browser) => {
                browser.close()?;
                debug!("Browser session closed");
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl<B: BrowserHandle> Drop for Session<B> {
    fn drop(&mut self) {
        if let Some(mut browser) = self.browser.take() {
            debug!("Closing browser session on early exit");
            if let Err(e) = browser.close() {
                warn!("⚠️ Failed to close browser: {}", e);
            }
        }
    }
}

// ============================================================================
// Headless Chrome
// ============================================================================

/// Launch settings for headless Chrome
#[derive(Debug, Clone)]
pub struct ChromeLauncher {
    pub headless: bool,
    pub window_size: (u32, u32),
    /// Chrome/Chromium binary; auto-detected when `None`
    pub executable: Option<PathBuf>,
    /// How long `wait_for_visible` polls before giving up
    pub visible_timeout: Duration,
    pub idle_timeout: Duration,
}

impl Default for ChromeLauncher {
    fn default() -> Self {
        Self {
            headless: true,
            window_size: (1920, 1080),
            executable: None,
            visible_timeout: DEFAULT_VISIBLE_TIMEOUT,
            idle_timeout: Duration::from_secs(120),
        }
    }
}

impl BrowserLauncher for ChromeLauncher {
    type Browser = ChromeBrowser;

    fn launch(&self) -> Result<ChromeBrowser> {
        let args = vec![
            OsStr::new("--no-sandbox"),
            OsStr::new("--disable-dev-shm-usage"),
            OsStr::new("--disable-gpu"),
            OsStr::new("--disable-blink-features=AutomationControlled"),
        ];

        info!(
            "🚀 Launching Chrome (headless: {}, binary: {})",
            self.headless,
            self.executable
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "auto".to_string())
        );

        let browser = Browser::new(LaunchOptions {
            headless: self.headless,
            window_size: Some(self.window_size),
            path: self.executable.clone(),
            idle_browser_timeout: self.idle_timeout,
            args,
            ..Default::default()
        })?;

        Ok(ChromeBrowser {
            browser: Some(browser),
            visible_timeout: self.visible_timeout,
        })
    }
}

pub struct ChromeBrowser {
    browser: Option<Browser>,
    visible_timeout: Duration,
}

impl BrowserHandle for ChromeBrowser {
    type Page = ChromePage;

    fn new_page(&self) -> Result<ChromePage> {
        let browser = self
            .browser
            .as_ref()
            .context("Browser already closed")?;
        let tab = browser.new_tab()?;
        Ok(ChromePage::new(tab, self.visible_timeout))
    }

    fn close(&mut self) -> Result<()> {
        // Dropping the Browser kills the Chrome process
        drop(self.browser.take());
        Ok(())
    }
}
