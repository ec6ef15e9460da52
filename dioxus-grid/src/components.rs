//! Dioxus components over the grid engine.
//!
//! `GridLayout` renders a positioned subset of its items (virtual scrolling
//! optional), `DragDropProvider` owns the global drag state and the zone
//! registries, and `FileDropZone`/`DropZone`/`SortableList` are the drop and
//! reorder surfaces registered against it.

use dioxus::html::input_data::keyboard_types::Modifiers;
use dioxus::html::FileData;
use dioxus::prelude::*;
use std::rc::Rc;

use crate::dragdrop::{
    filter_accepted, mime_from_name, DragState, DropZoneConfig, DropZoneRegistry, DroppedFile,
    PickedFile, SortableRegistry,
};
use crate::layout::{calculate_grid, GridConfig, GridItem};
use crate::selection::{apply_click, ClickModifiers, SelectionMode};
use crate::virtual_scroll::{calculate_window, VirtualScrollConfig};

/// Handler a drop zone receives validated files through.
pub type DropHandler = EventHandler<Vec<PickedFile>>;

/// Shared drag state and registries, provided by [`DragDropProvider`].
/// Scoped to one provider instance; components interact with it only through
/// these methods, never by reaching into the registries directly.
#[derive(Clone, Copy)]
pub struct DragContext {
    state: Signal<DragState>,
    zones: Signal<DropZoneRegistry<DropHandler>>,
    sortables: Signal<SortableRegistry>,
}

impl DragContext {
    pub fn is_dragging(&self) -> bool {
        self.state.read().is_dragging()
    }

    pub fn dragged_items(&self) -> Vec<String> {
        self.state.read().dragged_items().to_vec()
    }

    fn enter(&self) {
        let mut state = self.state;
        state.write().enter();
    }

    fn leave(&self) {
        let mut state = self.state;
        state.write().leave();
    }

    fn reset_after_drop(&self) {
        let mut state = self.state;
        state.write().drop_reset();
    }

    pub fn begin_item_drag(&self, items: Vec<String>) {
        let mut state = self.state;
        state.write().begin_item_drag(items);
    }

    pub fn end_item_drag(&self) {
        let mut state = self.state;
        state.write().end_item_drag();
    }

    fn register_zone(&self, id: String, config: DropZoneConfig, handler: DropHandler) {
        let mut zones = self.zones;
        if let Err(e) = zones.write().register(id, config, handler) {
            log::warn!("file drop zone not registered: {}", e);
        }
    }

    fn unregister_zone(&self, id: &str) {
        let mut zones = self.zones;
        zones.write().unregister(id);
    }

    fn register_sortable(&self, id: String) {
        let mut sortables = self.sortables;
        if let Err(e) = sortables.write().register(id) {
            log::warn!("sortable container not registered: {}", e);
        }
    }

    fn unregister_sortable(&self, id: &str) {
        let mut sortables = self.sortables;
        sortables.write().unregister(id);
    }
}

/// Root provider for drag-and-drop. Tracks the global dragging flag with an
/// enter/leave depth counter (drag events bubble up from every descendant
/// boundary, which is exactly the noise the counter absorbs) and delivers
/// background drops to the first-registered zone.
#[component]
pub fn DragDropProvider(children: Element) -> Element {
    let state = use_signal(DragState::default);
    let zones = use_signal(DropZoneRegistry::<DropHandler>::new);
    let sortables = use_signal(SortableRegistry::new);
    let drag = use_context_provider(|| DragContext {
        state,
        zones,
        sortables,
    });

    rsx! {
        div {
            class: if drag.is_dragging() { "dragdrop-root dragging" } else { "dragdrop-root" },
            ondragenter: move |evt| {
                evt.prevent_default();
                drag.enter();
            },
            ondragover: move |evt| evt.prevent_default(),
            ondragleave: move |_| drag.leave(),
            ondrop: move |evt| {
                evt.prevent_default();
                drag.reset_after_drop();
                // Drop outside any zone: fall back to the first-registered
                // zone, if one exists.
                let files = evt.files();
                if files.is_empty() {
                    return;
                }
                let resolved = drag
                    .zones
                    .read()
                    .resolve(None)
                    .map(|(id, config, handler)| (id.to_string(), config.clone(), *handler));
                if let Some((zone_id, config, handler)) = resolved {
                    log::debug!("background drop routed to zone '{}'", zone_id);
                    spawn(async move {
                        let delivered = read_accepted_files(files, &config).await;
                        if !delivered.is_empty() {
                            handler.call(delivered);
                        }
                    });
                }
            },
            {children}
        }
    }
}

/// Validates the offered files against the zone config, then reads the bytes
/// of the survivors. Files that fail validation or reading are dropped with
/// a log line; callers receive only complete files.
async fn read_accepted_files(files: Vec<FileData>, config: &DropZoneConfig) -> Vec<PickedFile> {
    let mut delivered = Vec::new();
    for file in files {
        let name = file.name();
        let size = file.size();
        let candidate = DroppedFile {
            mime: mime_from_name(&name),
            name: name.clone(),
            size,
        };
        if filter_accepted(std::slice::from_ref(&candidate), config).is_empty() {
            log::debug!("dropped file '{}' ({}) rejected by zone filter", name, candidate.mime);
            continue;
        }
        match file.read_bytes().await {
            Ok(bytes) => delivered.push(PickedFile {
                name,
                mime: candidate.mime,
                size,
                bytes: bytes.to_vec(),
            }),
            Err(e) => log::warn!("failed to read dropped file '{}': {:?}", name, e),
        }
    }
    delivered
}

/// A region accepting file drops. Must live under a [`DragDropProvider`].
/// Validation runs before any bytes are read; when no file survives the
/// zone's accept patterns, `on_files` is not called at all.
#[component]
pub fn FileDropZone(
    id: String,
    #[props(default)] accept: Vec<String>,
    #[props(default = None)] max_size: Option<u64>,
    #[props(default = String::new())] class: String,
    on_files: EventHandler<Vec<PickedFile>>,
    children: Element,
) -> Element {
    let drag = use_context::<DragContext>();
    let mut local = use_signal(DragState::default);

    let config = DropZoneConfig {
        accept: accept.clone(),
        max_size,
    };

    // Register for the provider's fallback routing and duplicate-id
    // detection; drop the registration on unmount.
    let zone_id = id.clone();
    let zone_config = config.clone();
    use_hook(move || drag.register_zone(zone_id, zone_config, on_files));
    let zone_id = id.clone();
    use_drop(move || drag.unregister_zone(&zone_id));

    let hovering = local.read().is_dragging();
    let zone_class = if hovering {
        format!("file-drop-zone drag-over {}", class)
    } else {
        format!("file-drop-zone {}", class)
    };

    rsx! {
        div {
            class: "{zone_class}",
            ondragenter: move |evt| {
                evt.prevent_default();
                local.write().enter();
            },
            ondragover: move |evt| evt.prevent_default(),
            ondragleave: move |_| {
                local.write().leave();
            },
            ondrop: move |evt| {
                evt.prevent_default();
                evt.stop_propagation();
                local.write().drop_reset();
                drag.reset_after_drop();
                let files = evt.files();
                if files.is_empty() {
                    return;
                }
                let config = config.clone();
                spawn(async move {
                    let delivered = read_accepted_files(files, &config).await;
                    if !delivered.is_empty() {
                        on_files.call(delivered);
                    }
                });
            },
            {children}
        }
    }
}

/// A drop target for items dragged within the app (not OS files), e.g. an
/// album card receiving selected photos.
#[component]
pub fn DropZone(
    id: String,
    #[props(default = String::new())] class: String,
    on_drop_items: EventHandler<Vec<String>>,
    children: Element,
) -> Element {
    let drag = use_context::<DragContext>();
    let mut local = use_signal(DragState::default);

    let hovering = local.read().is_dragging() && drag.is_dragging();
    let zone_class = if hovering {
        format!("drop-zone drag-over {}", class)
    } else {
        format!("drop-zone {}", class)
    };

    rsx! {
        div {
            class: "{zone_class}",
            ondragenter: move |evt| {
                evt.prevent_default();
                local.write().enter();
            },
            ondragover: move |evt| evt.prevent_default(),
            ondragleave: move |_| {
                local.write().leave();
            },
            ondrop: move |evt| {
                evt.prevent_default();
                evt.stop_propagation();
                local.write().drop_reset();
                let items = drag.dragged_items();
                drag.end_item_drag();
                drag.reset_after_drop();
                if !items.is_empty() {
                    on_drop_items.call(items);
                }
            },
            {children}
        }
    }
}

/// Drag-reorderable list. Gesture start/end mirror into the shared drag
/// state so other components can react; the new order is emitted on drop.
#[component]
pub fn SortableList(
    id: String,
    items: Vec<String>,
    #[props(default = 150)] animation_ms: u32,
    #[props(default = "sortable-ghost".to_string())] ghost_class: String,
    #[props(default = "sortable-drag".to_string())] drag_class: String,
    on_reorder: EventHandler<Vec<String>>,
    render_item: Callback<String, Element>,
) -> Element {
    let drag = use_context::<DragContext>();
    let mut drag_index = use_signal(|| None::<usize>);
    let mut hover_index = use_signal(|| None::<usize>);

    let sortable_id = id.clone();
    use_hook(move || drag.register_sortable(sortable_id));
    let sortable_id = id.clone();
    use_drop(move || drag.unregister_sortable(&sortable_id));

    let order = items.clone();

    rsx! {
        div {
            class: "sortable-list",
            for (index, item_id) in items.iter().cloned().enumerate() {
                div {
                    key: "{item_id}",
                    draggable: "true",
                    class: if drag_index() == Some(index) {
                        format!("sortable-item {}", drag_class)
                    } else if hover_index() == Some(index) && drag_index().is_some() {
                        format!("sortable-item {}", ghost_class)
                    } else {
                        "sortable-item".to_string()
                    },
                    style: "transition: transform {animation_ms}ms ease;",
                    ondragstart: {
                        let item_id = item_id.clone();
                        move |_| {
                            drag_index.set(Some(index));
                            drag.begin_item_drag(vec![item_id.clone()]);
                        }
                    },
                    ondragover: move |evt| {
                        evt.prevent_default();
                        hover_index.set(Some(index));
                    },
                    ondrop: {
                        let order = order.clone();
                        move |evt| {
                            evt.prevent_default();
                            evt.stop_propagation();
                            if let Some(from) = drag_index() {
                                if from != index {
                                    let mut next = order.clone();
                                    let moved = next.remove(from);
                                    next.insert(index.min(next.len()), moved);
                                    on_reorder.call(next);
                                }
                            }
                            drag_index.set(None);
                            hover_index.set(None);
                            drag.end_item_drag();
                            drag.reset_after_drop();
                        }
                    },
                    ondragend: move |_| {
                        drag_index.set(None);
                        hover_index.set(None);
                        drag.end_item_drag();
                    },
                    {render_item.call(item_id.clone())}
                }
            }
        }
    }
}

/// Responsive, optionally virtualized item grid.
///
/// Render states are checked in priority order: loading, then error, then
/// empty, then the grid itself; the first match wins. The empty state shows
/// its action button only when a handler is wired.
#[component]
pub fn GridLayout<T: Clone + PartialEq + 'static>(
    items: Vec<GridItem<T>>,
    #[props(default)] config: GridConfig,
    #[props(default = None)] virtual_scroll: Option<VirtualScrollConfig>,
    #[props(default)] selection_mode: SelectionMode,
    #[props(default = vec![])] selected: Vec<String>,
    #[props(default = None)] on_selection_change: Option<EventHandler<Vec<String>>>,
    #[props(default = None)] on_item_click: Option<EventHandler<String>>,
    #[props(default = false)] loading: bool,
    #[props(default = None)] error: Option<String>,
    #[props(default = "Nothing here yet".to_string())] empty_message: String,
    #[props(default = None)] empty_action_label: Option<String>,
    #[props(default = None)] on_empty_action: Option<EventHandler<()>>,
    render_item: Callback<GridItem<T>, Element>,
) -> Element {
    let mut container_width = use_signal(|| 0.0f64);
    let mut viewport_height = use_signal(|| 600.0f64);
    let mut scroll_top = use_signal(|| 0.0f64);
    let mut container = use_signal(|| None::<Rc<MountedData>>);

    if loading {
        return rsx! {
            div { class: "grid-state grid-loading",
                div { class: "spinner" }
                "Loading…"
            }
        };
    }

    if let Some(message) = error {
        return rsx! {
            div { class: "grid-state grid-error", "{message}" }
        };
    }

    if items.is_empty() {
        return rsx! {
            div { class: "grid-state grid-empty",
                p { "{empty_message}" }
                if let Some(label) = empty_action_label {
                    if on_empty_action.is_some() {
                        button {
                            class: "btn-primary",
                            onclick: move |_| {
                                if let Some(handler) = &on_empty_action {
                                    handler.call(());
                                }
                            },
                            "{label}"
                        }
                    }
                }
            }
        };
    }

    let calc = calculate_grid(&config, container_width(), items.len());
    let window = virtual_scroll
        .as_ref()
        .map(|cfg| calculate_window(scroll_top(), viewport_height(), &calc, config.gap, items.len(), cfg));

    let order: Vec<String> = items.iter().map(|item| item.id.clone()).collect();
    let (start, end) = match window {
        Some(w) => (w.start_index, w.end_index),
        None => (0, items.len() - 1),
    };
    let slice: Vec<GridItem<T>> = items[start..=end].to_vec();

    let cells = rsx! {
        div {
            class: "grid-rows",
            style: "display: grid; grid-template-columns: repeat({calc.columns}, 1fr); gap: {config.gap}px;",
            for item in slice {
                div {
                    key: "{item.id}",
                    class: if selected.contains(&item.id) { "grid-cell selected" } else { "grid-cell" },
                    style: "height: {calc.row_height}px; overflow: hidden;",
                    onclick: {
                        let item_id = item.id.clone();
                        let order = order.clone();
                        let selected = selected.clone();
                        move |evt| {
                            let mods = evt.modifiers();
                            let modifiers = ClickModifiers {
                                shift: mods.contains(Modifiers::SHIFT),
                                toggle: mods.contains(Modifiers::CONTROL) || mods.contains(Modifiers::META),
                            };
                            let update =
                                apply_click(&order, &selected, &item_id, selection_mode, modifiers);
                            if update.plain_click {
                                if let Some(handler) = &on_item_click {
                                    handler.call(item_id.clone());
                                }
                            }
                            if let Some(handler) = &on_selection_change {
                                handler.call(update.selected);
                            }
                        }
                    },
                    {render_item.call(item.clone())}
                }
            }
        }
    };

    // Spacer canvas: the absolute offset keeps scroll geometry identical to
    // rendering every row.
    let body = match window {
        Some(w) => rsx! {
            div {
                class: "grid-canvas",
                style: "position: relative; height: {w.total_height}px;",
                div {
                    style: "position: absolute; top: {w.offset_y}px; left: 0; right: 0;",
                    {cells}
                }
            }
        },
        None => cells,
    };

    rsx! {
        div {
            class: "grid-viewport",
            style: "height: 100%; overflow-y: auto;",
            onmounted: move |evt| {
                let element = evt.data();
                container.set(Some(element.clone()));
                spawn(async move {
                    if let Ok(rect) = element.get_client_rect().await {
                        container_width.set(rect.size.width);
                        viewport_height.set(rect.size.height);
                    }
                });
            },
            onresize: move |evt| {
                if let Ok(size) = evt.data().get_border_box_size() {
                    container_width.set(size.width);
                    viewport_height.set(size.height);
                }
            },
            onscroll: move |_| {
                spawn(async move {
                    let element = container.peek().clone();
                    if let Some(element) = element {
                        if let Ok(offset) = element.get_scroll_offset().await {
                            scroll_top.set(offset.y);
                        }
                    }
                });
            },
            {body}
        }
    }
}
