//! # Dioxus Grid
//!
//! Reusable building blocks for photo-style grid views:
//! - Responsive column/row layout calculation
//! - Virtual scrolling (windowing) with overscan
//! - Click/shift/ctrl selection handling
//! - Debounce and throttle primitives
//! - A strict-priority, concurrency-capped image load queue
//! - An LRU image memory cache with a pressure monitor
//! - A drag-and-drop state machine with zone registries
//!
//! The core modules are framework-independent and fully unit tested; the
//! Dioxus components live behind the `components` feature so headless
//! consumers do not pull in a UI toolkit.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use dioxus_grid::{calculate_grid, GridConfig};
//!
//! let calc = calculate_grid(&GridConfig::default(), 1024.0, 120);
//! assert!(calc.columns >= 1);
//! ```

pub mod dragdrop;
pub mod layout;
pub mod loader;
pub mod memory;
pub mod rate_limit;
pub mod selection;
pub mod virtual_scroll;

#[cfg(feature = "components")]
pub mod components;

pub use dragdrop::{
    filter_accepted, mime_from_name, DragState, DropZoneConfig, DropZoneRegistry, DroppedFile,
    PickedFile, RegistryError, SortableRegistry,
};
pub use layout::{calculate_grid, GridCalculation, GridConfig, GridItem};
pub use loader::{LoadPriority, LoadQueue, LoaderConfig};
pub use memory::{CleanupHandle, ImageMemoryCache, MemoryConfig, MemoryGauge, MemoryMonitor};
pub use rate_limit::{DebounceTicket, Debouncer, Throttle};
pub use selection::{apply_click, ClickModifiers, SelectionMode, SelectionUpdate};
pub use virtual_scroll::{
    calculate_window, SubscriptionId, VirtualScrollConfig, VirtualScrollManager, VirtualWindow,
};

#[cfg(feature = "components")]
pub use components::{
    DragContext, DragDropProvider, DropHandler, DropZone, FileDropZone, GridLayout, SortableList,
};
