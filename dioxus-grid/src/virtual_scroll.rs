//! Virtual scrolling (windowing) over a grid layout.
//!
//! Only the rows near the viewport are rendered; a spacer reproduces the
//! absolute scroll position. The window math is pure; the standalone
//! [`VirtualScrollManager`] adds scroll-tick coalescing and change-only
//! subscriber notification for callers outside the component layer.

use crate::layout::GridCalculation;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VirtualScrollConfig {
    /// Extra pixels above and below the viewport covered by the row range.
    pub threshold_px: f64,
    /// Whole items added on each side of the computed index range to mask
    /// scroll-induced pop-in.
    pub overscan: usize,
}

impl Default for VirtualScrollConfig {
    fn default() -> Self {
        Self {
            threshold_px: 200.0,
            overscan: 8,
        }
    }
}

/// Derived window state. Invariant: `start_index <= end_index < item_count`,
/// or all zeros when the collection is empty.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VirtualWindow {
    pub start_index: usize,
    pub end_index: usize,
    /// Pixel offset of the first rendered row from the top of the canvas.
    pub offset_y: f64,
    /// Full canvas height for all rows, rendered or not.
    pub total_height: f64,
}

pub fn calculate_window(
    scroll_top: f64,
    viewport_height: f64,
    calc: &GridCalculation,
    gap: f64,
    item_count: usize,
    config: &VirtualScrollConfig,
) -> VirtualWindow {
    if item_count == 0 || calc.items_per_row == 0 {
        return VirtualWindow::default();
    }

    let stride = calc.row_height + gap;
    let total_rows = calc.total_rows.max(1);
    let total_height = (total_rows as f64 * stride - gap).max(0.0);

    let first_px = (scroll_top - config.threshold_px).max(0.0);
    let last_px = scroll_top + viewport_height + config.threshold_px;

    let start_row = ((first_px / stride).floor() as usize).min(total_rows - 1);
    let end_row = ((last_px / stride).ceil() as usize).min(total_rows - 1);

    let start_index = (start_row * calc.items_per_row).saturating_sub(config.overscan);
    let end_index = ((end_row + 1) * calc.items_per_row - 1 + config.overscan).min(item_count - 1);

    // The offset always points at the top of the row containing the first
    // included item, so the spacer height matches what is skipped.
    let offset_y = (start_index / calc.items_per_row) as f64 * stride;

    VirtualWindow {
        start_index,
        end_index,
        offset_y,
        total_height,
    }
}

/// Subscription handle returned by [`VirtualScrollManager::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(usize);

/// Framework-independent window tracker.
///
/// Scroll positions are recorded cheaply on every tick; the window is
/// recomputed at most once per [`flush`](Self::flush) call, and subscribers
/// are notified only when the visible index range actually changed.
pub struct VirtualScrollManager {
    calc: GridCalculation,
    gap: f64,
    item_count: usize,
    config: VirtualScrollConfig,
    viewport_height: f64,
    scroll_top: f64,
    dirty: bool,
    window: VirtualWindow,
    subscribers: Vec<(usize, Box<dyn FnMut(VirtualWindow)>)>,
    next_subscriber: usize,
}

impl VirtualScrollManager {
    pub fn new(calc: GridCalculation, gap: f64, item_count: usize, config: VirtualScrollConfig) -> Self {
        let mut manager = Self {
            calc,
            gap,
            item_count,
            config,
            viewport_height: 0.0,
            scroll_top: 0.0,
            dirty: true,
            window: VirtualWindow::default(),
            subscribers: Vec::new(),
            next_subscriber: 0,
        };
        manager.recompute();
        manager
    }

    pub fn set_layout(&mut self, calc: GridCalculation, gap: f64, item_count: usize) {
        self.calc = calc;
        self.gap = gap;
        self.item_count = item_count;
        self.dirty = true;
    }

    pub fn set_viewport_height(&mut self, height: f64) {
        if (height - self.viewport_height).abs() > f64::EPSILON {
            self.viewport_height = height;
            self.dirty = true;
        }
    }

    /// Records a scroll position. Cheap; call on every tick.
    pub fn on_scroll(&mut self, scroll_top: f64) {
        self.scroll_top = scroll_top;
        self.dirty = true;
    }

    /// Recomputes the window if anything changed since the last flush and
    /// notifies subscribers when the index range moved.
    pub fn flush(&mut self) -> VirtualWindow {
        if !self.dirty {
            return self.window;
        }
        self.dirty = false;

        let previous = self.window;
        self.recompute();

        if self.window.start_index != previous.start_index || self.window.end_index != previous.end_index {
            let window = self.window;
            for (_, subscriber) in &mut self.subscribers {
                subscriber(window);
            }
        }
        self.window
    }

    pub fn window(&self) -> VirtualWindow {
        self.window
    }

    pub fn subscribe(&mut self, subscriber: impl FnMut(VirtualWindow) + 'static) -> SubscriptionId {
        let id = self.next_subscriber;
        self.next_subscriber += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        SubscriptionId(id)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id.0);
        self.subscribers.len() != before
    }

    fn recompute(&mut self) {
        self.window = calculate_window(
            self.scroll_top,
            self.viewport_height,
            &self.calc,
            self.gap,
            self.item_count,
            &self.config,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{calculate_grid, GridConfig};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn calc(columns: usize, row_height: f64, item_count: usize) -> GridCalculation {
        let config = GridConfig {
            columns: Some(columns),
            gap: 0.0,
            lock_aspect_ratio: false,
            item_height: row_height,
            ..GridConfig::default()
        };
        calculate_grid(&config, columns as f64 * 100.0, item_count)
    }

    fn no_overscan() -> VirtualScrollConfig {
        VirtualScrollConfig {
            threshold_px: 0.0,
            overscan: 0,
        }
    }

    #[test]
    fn empty_collection_yields_zero_window() {
        let window = calculate_window(500.0, 600.0, &calc(4, 100.0, 0), 0.0, 0, &no_overscan());
        assert_eq!(window, VirtualWindow::default());
    }

    #[test]
    fn window_indices_stay_in_bounds() {
        let calc = calc(4, 100.0, 103);
        let config = VirtualScrollConfig {
            threshold_px: 150.0,
            overscan: 6,
        };
        for scroll in [0.0, 1.0, 250.0, 999.0, 2000.0, 100000.0] {
            let w = calculate_window(scroll, 600.0, &calc, 0.0, 103, &config);
            assert!(w.start_index <= w.end_index, "at scroll {}", scroll);
            assert!(w.end_index < 103, "at scroll {}", scroll);
        }
    }

    #[test]
    fn consecutive_scroll_positions_never_skip_visible_items() {
        // Scroll down in steps smaller than the covered range; every index
        // inside the true viewport must be rendered at the position where it
        // is visible.
        let calc = calc(3, 120.0, 300);
        let config = no_overscan();
        let viewport = 480.0;
        let mut scroll = 0.0;
        while scroll < 6000.0 {
            let w = calculate_window(scroll, viewport, &calc, 0.0, 300, &config);
            let first_visible_row = (scroll / 120.0).floor() as usize;
            let last_visible_row = ((scroll + viewport) / 120.0).ceil() as usize;
            let first_visible = first_visible_row * 3;
            let last_visible = ((last_visible_row + 1) * 3 - 1).min(299);
            assert!(w.start_index <= first_visible, "under-rendered top at {}", scroll);
            assert!(w.end_index >= last_visible.min(299), "under-rendered bottom at {}", scroll);
            scroll += 173.0;
        }
    }

    #[test]
    fn offset_matches_first_rendered_row() {
        let calc = calc(4, 100.0, 400);
        let w = calculate_window(1000.0, 500.0, &calc, 0.0, 400, &no_overscan());
        assert_eq!(w.start_index % 4, 0);
        let row = w.start_index / 4;
        assert!((w.offset_y - row as f64 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn manager_notifies_only_on_range_change() {
        let notifications = Rc::new(RefCell::new(0usize));
        let seen = notifications.clone();

        let mut manager = VirtualScrollManager::new(calc(4, 100.0, 400), 0.0, 400, no_overscan());
        manager.set_viewport_height(350.0);
        manager.flush();
        manager.subscribe(move |_| *seen.borrow_mut() += 1);

        // Several ticks that keep the covered row range identical recompute
        // once and do not notify at all.
        manager.on_scroll(5.0);
        manager.on_scroll(20.0);
        manager.on_scroll(40.0);
        manager.flush();
        assert_eq!(*notifications.borrow(), 0);

        // Crossing into the next row moves the range and notifies once.
        manager.on_scroll(450.0);
        manager.flush();
        assert_eq!(*notifications.borrow(), 1);

        // Flushing again without new input does nothing.
        manager.flush();
        assert_eq!(*notifications.borrow(), 1);
    }

    #[test]
    fn manager_unsubscribe_stops_notifications() {
        let notifications = Rc::new(RefCell::new(0usize));
        let seen = notifications.clone();

        let mut manager = VirtualScrollManager::new(calc(4, 100.0, 400), 0.0, 400, no_overscan());
        manager.set_viewport_height(400.0);
        manager.flush();
        let id = manager.subscribe(move |_| *seen.borrow_mut() += 1);

        assert!(manager.unsubscribe(id));
        manager.on_scroll(900.0);
        manager.flush();
        assert_eq!(*notifications.borrow(), 0);
    }
}
