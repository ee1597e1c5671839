//! Full-page loading overlay
//!
//! The overlay is shown or hidden through deferred callbacks registered with a
//! [`TimerHost`]. A pending show can be pre-empted by a later hide; a pending
//! hide is never cancelled.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Element id of the overlay on the management page
pub const LOADING_OVERLAY_ID: &str = "loading-overlay";

/// CSS display style of a page element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayStyle {
    Block,
    None,
}

/// Elements of the management page whose display style can be toggled
#[derive(Debug, Clone, Default)]
pub struct Page {
    styles: Arc<Mutex<HashMap<String, DisplayStyle>>>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an element with its initial display style
    pub fn with_element(self, id: &str, style: DisplayStyle) -> Self {
        self.lock().insert(id.to_string(), style);
        self
    }

    /// Set the display style of `id`. Returns false if no such element exists.
    pub fn set_display(&self, id: &str, style: DisplayStyle) -> bool {
        match self.lock().get_mut(id) {
            Some(current) => {
                *current = style;
                true
            }
            None => {
                tracing::debug!("No element '{}' on page, ignoring display change", id);
                false
            }
        }
    }

    pub fn display(&self, id: &str) -> Option<DisplayStyle> {
        self.lock().get(id).copied()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, DisplayStyle>> {
        // A panicked callback must not wedge the page
        self.styles.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Deferred callback registered with a timer host
pub type Callback = Box<dyn FnOnce() + Send + 'static>;

/// "Run this after N ms" and "cancel by handle"
pub trait TimerHost {
    type Handle;

    fn schedule(&self, delay: Duration, callback: Callback) -> Self::Handle;

    /// Cancelling a handle whose callback already ran is a no-op
    fn cancel(&self, handle: Self::Handle);
}

/// Timer host backed by the tokio runtime.
///
/// Must be used from within a runtime context.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

impl TimerHost for TokioTimer {
    type Handle = tokio::task::JoinHandle<()>;

    fn schedule(&self, delay: Duration, callback: Callback) -> Self::Handle {
        tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            callback();
        })
    }

    fn cancel(&self, handle: Self::Handle) {
        handle.abort();
    }
}

/// Loading overlay owning its single pending-show handle
pub struct LoadingOverlay<H: TimerHost = TokioTimer> {
    page: Page,
    timer: H,
    element_id: String,
    pending_show: Option<H::Handle>,
}

impl<H: TimerHost> LoadingOverlay<H> {
    pub fn new(page: Page, timer: H) -> Self {
        Self::with_element_id(page, timer, LOADING_OVERLAY_ID)
    }

    pub fn with_element_id(page: Page, timer: H, element_id: impl Into<String>) -> Self {
        Self {
            page,
            timer,
            element_id: element_id.into(),
            pending_show: None,
        }
    }

    /// Show the overlay after `delay_ms`.
    ///
    /// Replaces the remembered handle without cancelling the previous show.
    pub fn show(&mut self, delay_ms: u64) {
        tracing::trace!("Scheduling overlay show in {}ms", delay_ms);
        let handle = self.schedule_style(delay_ms, DisplayStyle::Block);
        self.pending_show = Some(handle);
    }

    /// Cancel the remembered show, then hide the overlay after `delay_ms`
    pub fn hide(&mut self, delay_ms: u64) {
        if let Some(handle) = self.pending_show.take() {
            self.timer.cancel(handle);
        }
        tracing::trace!("Scheduling overlay hide in {}ms", delay_ms);
        // Hides are fire-and-forget
        let _ = self.schedule_style(delay_ms, DisplayStyle::None);
    }

    pub fn has_pending_show(&self) -> bool {
        self.pending_show.is_some()
    }

    pub fn element_id(&self) -> &str {
        &self.element_id
    }

    fn schedule_style(&self, delay_ms: u64, style: DisplayStyle) -> H::Handle {
        let page = self.page.clone();
        let id = self.element_id.clone();
        self.timer.schedule(
            Duration::from_millis(delay_ms),
            Box::new(move || {
                page.set_display(&id, style);
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Virtual clock timer: callbacks only run inside `advance`
    #[derive(Clone, Default)]
    struct ManualTimer {
        state: Arc<Mutex<ManualState>>,
    }

    #[derive(Default)]
    struct ManualState {
        now: u64,
        next_id: u64,
        queue: Vec<(u64, u64, Callback)>,
    }

    impl ManualTimer {
        fn advance(&self, ms: u64) {
            let target = self.state.lock().unwrap().now + ms;
            loop {
                let next = {
                    let mut state = self.state.lock().unwrap();
                    let due = state
                        .queue
                        .iter()
                        .enumerate()
                        .filter(|(_, (at, _, _))| *at <= target)
                        .min_by_key(|(_, (at, id, _))| (*at, *id))
                        .map(|(idx, _)| idx);
                    due.map(|idx| {
                        let (at, _, callback) = state.queue.remove(idx);
                        state.now = at;
                        callback
                    })
                };
                match next {
                    Some(callback) => callback(),
                    None => break,
                }
            }
            self.state.lock().unwrap().now = target;
        }

        fn pending(&self) -> usize {
            self.state.lock().unwrap().queue.len()
        }
    }

    impl TimerHost for ManualTimer {
        type Handle = u64;

        fn schedule(&self, delay: Duration, callback: Callback) -> u64 {
            let mut state = self.state.lock().unwrap();
            let id = state.next_id;
            state.next_id += 1;
            let at = state.now + delay.as_millis() as u64;
            state.queue.push((at, id, callback));
            id
        }

        fn cancel(&self, handle: u64) {
            self.state.lock().unwrap().queue.retain(|(_, id, _)| *id != handle);
        }
    }

    fn hidden_page() -> Page {
        Page::new().with_element(LOADING_OVERLAY_ID, DisplayStyle::None)
    }

    #[test]
    fn test_show_after_delay() {
        let page = hidden_page();
        let timer = ManualTimer::default();
        let mut overlay = LoadingOverlay::new(page.clone(), timer.clone());

        overlay.show(100);
        timer.advance(99);
        assert_eq!(page.display(LOADING_OVERLAY_ID), Some(DisplayStyle::None));
        timer.advance(1);
        assert_eq!(page.display(LOADING_OVERLAY_ID), Some(DisplayStyle::Block));
    }

    #[test]
    fn test_hide_before_show_fires_keeps_overlay_hidden() {
        for (show_delay, hide_delay) in [(100, 0), (100, 50), (10, 500), (1, 1)] {
            let page = hidden_page();
            let timer = ManualTimer::default();
            let mut overlay = LoadingOverlay::new(page.clone(), timer.clone());

            overlay.show(show_delay);
            overlay.hide(hide_delay);
            for _ in 0..(show_delay + hide_delay + 10) {
                timer.advance(1);
                assert_eq!(
                    page.display(LOADING_OVERLAY_ID),
                    Some(DisplayStyle::None),
                    "overlay became visible for show={} hide={}",
                    show_delay,
                    hide_delay
                );
            }
            assert!(!overlay.has_pending_show());
        }
    }

    #[test]
    fn test_hide_without_show() {
        let page = Page::new().with_element(LOADING_OVERLAY_ID, DisplayStyle::Block);
        let timer = ManualTimer::default();
        let mut overlay = LoadingOverlay::new(page.clone(), timer.clone());

        overlay.hide(0);
        timer.advance(0);
        assert_eq!(page.display(LOADING_OVERLAY_ID), Some(DisplayStyle::None));
    }

    #[test]
    fn test_hide_only_cancels_latest_show() {
        let page = hidden_page();
        let timer = ManualTimer::default();
        let mut overlay = LoadingOverlay::new(page.clone(), timer.clone());

        overlay.show(100);
        overlay.show(200);
        overlay.hide(0);
        timer.advance(0);
        assert_eq!(page.display(LOADING_OVERLAY_ID), Some(DisplayStyle::None));

        // The first show was never tracked, so it still fires
        timer.advance(100);
        assert_eq!(page.display(LOADING_OVERLAY_ID), Some(DisplayStyle::Block));
        timer.advance(200);
        assert_eq!(timer.pending(), 0);
        assert_eq!(page.display(LOADING_OVERLAY_ID), Some(DisplayStyle::Block));
    }

    #[test]
    fn test_hide_after_show_fired() {
        let page = hidden_page();
        let timer = ManualTimer::default();
        let mut overlay = LoadingOverlay::new(page.clone(), timer.clone());

        overlay.show(0);
        timer.advance(0);
        assert_eq!(page.display(LOADING_OVERLAY_ID), Some(DisplayStyle::Block));

        overlay.hide(30);
        timer.advance(29);
        assert_eq!(page.display(LOADING_OVERLAY_ID), Some(DisplayStyle::Block));
        timer.advance(1);
        assert_eq!(page.display(LOADING_OVERLAY_ID), Some(DisplayStyle::None));
    }

    #[test]
    fn test_missing_element_is_ignored() {
        let page = Page::new();
        let timer = ManualTimer::default();
        let mut overlay = LoadingOverlay::new(page.clone(), timer.clone());

        overlay.show(0);
        overlay.hide(5);
        timer.advance(10);
        assert_eq!(page.display(LOADING_OVERLAY_ID), None);
    }

    #[test]
    fn test_overlays_do_not_share_handles() {
        let page = hidden_page().with_element("other-overlay", DisplayStyle::None);
        let timer = ManualTimer::default();
        let mut first = LoadingOverlay::new(page.clone(), timer.clone());
        let mut second =
            LoadingOverlay::with_element_id(page.clone(), timer.clone(), "other-overlay");

        first.show(50);
        second.show(50);
        first.hide(0);
        timer.advance(50);

        assert_eq!(page.display(LOADING_OVERLAY_ID), Some(DisplayStyle::None));
        assert_eq!(page.display("other-overlay"), Some(DisplayStyle::Block));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_timer_cancels_pending_show() {
        let page = hidden_page();
        let mut overlay = LoadingOverlay::new(page.clone(), TokioTimer);

        overlay.show(100);
        tokio::time::sleep(Duration::from_millis(50)).await;
        overlay.hide(0);
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(page.display(LOADING_OVERLAY_ID), Some(DisplayStyle::None));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_timer_shows_after_delay() {
        let page = hidden_page();
        let mut overlay = LoadingOverlay::new(page.clone(), TokioTimer);

        overlay.show(10);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(page.display(LOADING_OVERLAY_ID), Some(DisplayStyle::Block));

        overlay.hide(10);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(page.display(LOADING_OVERLAY_ID), Some(DisplayStyle::None));
    }
}
