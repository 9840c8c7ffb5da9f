//! Infinite-scroll driver
//!
//! Scrolls a page until the number of elements matching an item selector
//! stops growing, or until a fixed number of scrolls has been issued.
//!
//! ```text
//! Polling --count grew / first poll--> Scrolling --> Waiting --> Polling
//! Polling --count unchanged--> Stabilized
//! Polling --scroll limit reached--> Bounded
//! ```

use std::time::Duration;

use anyhow::Result;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::page::Page;

pub const MAX_SCROLL: u32 = 20;
pub const SCROLL_DELAY: Duration = Duration::from_millis(2000);

/// Scroll to 90% of the document height with a smooth animation
const SCROLL_SCRIPT: &str = r#"
    (() => {
        const height = document.body.scrollHeight;
        window.scrollTo({
            top: height - height * 0.1,
            behavior: "smooth",
        });
    })()
"#;

#[derive(Debug, Clone, Copy)]
pub struct ScrollOptions {
    pub max_scrolls: u32,
    /// Time given to lazy content to render after each scroll
    pub delay: Duration,
}

impl Default for ScrollOptions {
    fn default() -> Self {
        Self {
            max_scrolls: MAX_SCROLL,
            delay: SCROLL_DELAY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Polling,
    Scrolling,
    Waiting,
    Stabilized,
    Bounded,
}

impl Phase {
    fn is_terminal(self) -> bool {
        matches!(self, Phase::Stabilized | Phase::Bounded)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ScrollState {
    /// High-water mark, never decreases
    previous_item_count: usize,
    scroll_count: u32,
}

struct ScrollDriver<'p, P: Page> {
    page: &'p P,
    item_selector: &'p str,
    options: ScrollOptions,
    state: ScrollState,
    phase: Phase,
}

impl<'p, P: Page> ScrollDriver<'p, P> {
    fn new(page: &'p P, item_selector: &'p str, options: ScrollOptions) -> Self {
        Self {
            page,
            item_selector,
            options,
            state: ScrollState::default(),
            phase: Phase::Polling,
        }
    }

    /// Perform one transition
    async fn step(&mut self) -> Result<()> {
        self.phase = match self.phase {
            Phase::Polling => self.poll()?,
            Phase::Scrolling => {
                self.page.evaluate(SCROLL_SCRIPT)?;
                Phase::Waiting
            }
            Phase::Waiting => {
                sleep(self.options.delay).await;
                self.state.scroll_count += 1;
                Phase::Polling
            }
            terminal => terminal,
        };
        Ok(())
    }

    fn poll(&mut self) -> Result<Phase> {
        if self.state.scroll_count >= self.options.max_scrolls {
            return Ok(Phase::Bounded);
        }

        let current = self.page.count(self.item_selector)?;
        debug!(
            "Scroll {}: {} items (previous {})",
            self.state.scroll_count, current, self.state.previous_item_count
        );

        if current == self.state.previous_item_count && self.state.scroll_count > 0 {
            return Ok(Phase::Stabilized);
        }
        if current > self.state.previous_item_count {
            self.state.previous_item_count = current;
        }
        Ok(Phase::Scrolling)
    }

    async fn drive(&mut self) -> Result<()> {
        while !self.phase.is_terminal() {
            self.step().await?;
        }

        match self.phase {
            Phase::Stabilized => info!(
                "📜 {} stabilized at {} items after {} scrolls",
                self.item_selector, self.state.previous_item_count, self.state.scroll_count
            ),
            _ => info!(
                "📜 {} hit the scroll limit ({}) with {} items",
                self.item_selector, self.options.max_scrolls, self.state.previous_item_count
            ),
        }
        Ok(())
    }
}

/// Scroll until `item_selector` stops matching new elements or [`MAX_SCROLL`]
/// scrolls have been issued, waiting [`SCROLL_DELAY`] after each one.
pub async fn infinite_scroll<P: Page>(page: &P, item_selector: &str) -> Result<()> {
    infinite_scroll_with(page, item_selector, ScrollOptions::default()).await
}

pub async fn infinite_scroll_with<P: Page>(
    page: &P,
    item_selector: &str,
    options: ScrollOptions,
) -> Result<()> {
    ScrollDriver::new(page, item_selector, options).drive().await
}
