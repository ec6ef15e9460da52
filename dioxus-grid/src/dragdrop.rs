//! Drag state machine, drop-zone registries and file acceptance rules.
//!
//! Browsers fire a dragenter/dragleave pair for every descendant element the
//! pointer crosses. The state machine absorbs that noise with a depth
//! counter: `dragging` flips on the first enter and only flips back when the
//! counter returns to zero or a drop resets it.

use std::fmt;

/// Global drag state. Owned by one provider instance; other components
/// interact with it only through the provider's methods.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DragState {
    depth: u32,
    item_drag: bool,
    dragged_items: Vec<String>,
}

impl DragState {
    /// Records a dragenter. Returns true on the idle → dragging transition.
    pub fn enter(&mut self) -> bool {
        self.depth += 1;
        self.depth == 1 && !self.item_drag
    }

    /// Records a dragleave. Returns true on the dragging → idle transition.
    pub fn leave(&mut self) -> bool {
        self.depth = self.depth.saturating_sub(1);
        self.depth == 0 && !self.item_drag
    }

    /// A drop resets the counter unconditionally.
    pub fn drop_reset(&mut self) {
        self.depth = 0;
    }

    pub fn is_dragging(&self) -> bool {
        self.depth > 0 || self.item_drag
    }

    /// Mirrors the start of an item-reorder gesture into the shared state so
    /// other components can react.
    pub fn begin_item_drag(&mut self, items: Vec<String>) {
        self.item_drag = true;
        self.dragged_items = items;
    }

    pub fn end_item_drag(&mut self) {
        self.item_drag = false;
        self.dragged_items.clear();
    }

    pub fn dragged_items(&self) -> &[String] {
        &self.dragged_items
    }
}

/// A file offered by a drop, before its bytes are read.
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedFile {
    pub name: String,
    pub mime: String,
    pub size: u64,
}

/// A validated file with its contents, as delivered to drop handlers.
#[derive(Debug, Clone, PartialEq)]
pub struct PickedFile {
    pub name: String,
    pub mime: String,
    pub size: u64,
    pub bytes: Vec<u8>,
}

/// Acceptance rules for a drop zone. An empty `accept` list accepts
/// everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DropZoneConfig {
    /// Patterns: exact MIME (`image/jpeg`), wildcard (`image/*`) or
    /// extension (`.jpg`).
    pub accept: Vec<String>,
    pub max_size: Option<u64>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum RegistryError {
    DuplicateId(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::DuplicateId(id) => write!(f, "id '{}' is already registered", id),
        }
    }
}

impl std::error::Error for RegistryError {}

/// Drop zones registered against one provider instance, in registration
/// order. `H` is the per-zone handler payload (unit in tests, an event
/// handler in the component layer).
pub struct DropZoneRegistry<H> {
    zones: Vec<(String, DropZoneConfig, H)>,
}

impl<H> Default for DropZoneRegistry<H> {
    fn default() -> Self {
        Self { zones: Vec::new() }
    }
}

impl<H> DropZoneRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a zone. A duplicate id is rejected; the first registration
    /// stays in effect.
    pub fn register(&mut self, id: impl Into<String>, config: DropZoneConfig, handler: H) -> Result<(), RegistryError> {
        let id = id.into();
        if self.zones.iter().any(|(existing, _, _)| *existing == id) {
            log::warn!("drop zone '{}' registered twice, rejecting the new registration", id);
            return Err(RegistryError::DuplicateId(id));
        }
        self.zones.push((id, config, handler));
        Ok(())
    }

    pub fn unregister(&mut self, id: &str) -> bool {
        let before = self.zones.len();
        self.zones.retain(|(existing, _, _)| existing != id);
        self.zones.len() != before
    }

    /// Resolves the zone a drop should go to: the preferred (event-owning)
    /// zone when registered, otherwise the first-registered zone as a
    /// fallback. `None` when nothing is registered.
    pub fn resolve(&self, preferred: Option<&str>) -> Option<(&str, &DropZoneConfig, &H)> {
        let entry = preferred
            .and_then(|id| self.zones.iter().find(|(existing, _, _)| existing == id))
            .or_else(|| self.zones.first());
        entry.map(|(id, config, handler)| (id.as_str(), config, handler))
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

/// Sortable containers registered against one provider instance. Carries no
/// payload beyond the id; the same duplicate-id rule applies.
#[derive(Debug, Default)]
pub struct SortableRegistry {
    ids: Vec<String>,
}

impl SortableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: impl Into<String>) -> Result<(), RegistryError> {
        let id = id.into();
        if self.ids.contains(&id) {
            log::warn!("sortable container '{}' registered twice, rejecting the new registration", id);
            return Err(RegistryError::DuplicateId(id));
        }
        self.ids.push(id);
        Ok(())
    }

    pub fn unregister(&mut self, id: &str) -> bool {
        let before = self.ids.len();
        self.ids.retain(|existing| existing != id);
        self.ids.len() != before
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }
}

/// Applies a zone's acceptance rules; returns the surviving subset. With no
/// patterns configured, everything within the size cap passes.
pub fn filter_accepted(files: &[DroppedFile], config: &DropZoneConfig) -> Vec<DroppedFile> {
    files
        .iter()
        .filter(|file| {
            if let Some(max) = config.max_size {
                if file.size > max {
                    return false;
                }
            }
            config.accept.is_empty() || config.accept.iter().any(|pattern| matches_accept(file, pattern))
        })
        .cloned()
        .collect()
}

fn matches_accept(file: &DroppedFile, pattern: &str) -> bool {
    if let Some(extension) = pattern.strip_prefix('.') {
        return file
            .name
            .rsplit('.')
            .next()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
    }
    if let Some(prefix) = pattern.strip_suffix("/*") {
        return file.mime.starts_with(prefix) && file.mime[prefix.len()..].starts_with('/');
    }
    file.mime.eq_ignore_ascii_case(pattern)
}

/// MIME type derived from the file name extension. Drop payloads do not
/// always carry a reliable type, so the name is the source of truth here.
pub fn mime_from_name(name: &str) -> String {
    let extension = name.rsplit('.').next().unwrap_or_default().to_ascii_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "heic" => "image/heic",
        "avif" => "image/avif",
        "txt" => "text/plain",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_enters_and_leaves_keep_dragging_stable() {
        for n in [1u32, 2, 5] {
            let mut state = DragState::default();
            for i in 0..n {
                let transitioned = state.enter();
                assert_eq!(transitioned, i == 0, "n={}", n);
                assert!(state.is_dragging(), "n={}", n);
            }
            for i in 0..n {
                let transitioned = state.leave();
                assert_eq!(transitioned, i == n - 1, "n={}", n);
                // Never flips to idle before the last leave.
                assert_eq!(state.is_dragging(), i != n - 1, "n={}", n);
            }
        }
    }

    #[test]
    fn drop_resets_the_counter_unconditionally() {
        let mut state = DragState::default();
        state.enter();
        state.enter();
        state.enter();
        state.drop_reset();
        assert!(!state.is_dragging());
        // A stray trailing leave stays saturated at zero.
        state.leave();
        assert!(!state.is_dragging());
    }

    #[test]
    fn item_drag_mirrors_into_shared_state() {
        let mut state = DragState::default();
        state.begin_item_drag(vec!["p1".to_string(), "p2".to_string()]);
        assert!(state.is_dragging());
        assert_eq!(state.dragged_items().len(), 2);
        state.end_item_drag();
        assert!(!state.is_dragging());
        assert!(state.dragged_items().is_empty());
    }

    #[test]
    fn duplicate_zone_id_is_rejected() {
        let mut registry: DropZoneRegistry<()> = DropZoneRegistry::new();
        registry.register("gallery", DropZoneConfig::default(), ()).unwrap();
        let err = registry.register("gallery", DropZoneConfig::default(), ());
        assert_eq!(err, Err(RegistryError::DuplicateId("gallery".to_string())));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn resolve_prefers_the_owning_zone_then_falls_back() {
        let mut registry: DropZoneRegistry<u8> = DropZoneRegistry::new();
        assert!(registry.resolve(None).is_none());

        registry.register("first", DropZoneConfig::default(), 1).unwrap();
        registry.register("second", DropZoneConfig::default(), 2).unwrap();

        let (id, _, handler) = registry.resolve(Some("second")).unwrap();
        assert_eq!((id, *handler), ("second", 2));

        // Unknown target falls back to the first-registered zone.
        let (id, _, handler) = registry.resolve(Some("gone")).unwrap();
        assert_eq!((id, *handler), ("first", 1));

        registry.unregister("first");
        let (id, _, _) = registry.resolve(None).unwrap();
        assert_eq!(id, "second");
    }

    #[test]
    fn duplicate_sortable_id_is_rejected() {
        let mut registry = SortableRegistry::new();
        registry.register("album-order").unwrap();
        assert!(registry.register("album-order").is_err());
        assert!(registry.unregister("album-order"));
        assert!(registry.register("album-order").is_ok());
    }

    fn jpeg() -> DroppedFile {
        DroppedFile {
            name: "holiday.jpg".to_string(),
            mime: "image/jpeg".to_string(),
            size: 2048,
        }
    }

    fn text() -> DroppedFile {
        DroppedFile {
            name: "notes.txt".to_string(),
            mime: "text/plain".to_string(),
            size: 100,
        }
    }

    #[test]
    fn image_wildcard_accepts_jpeg_and_rejects_text() {
        let config = DropZoneConfig {
            accept: vec!["image/*".to_string()],
            max_size: None,
        };
        let surviving = filter_accepted(&[jpeg(), text()], &config);
        assert_eq!(surviving, vec![jpeg()]);

        // A drop of only non-matching files yields an empty delivery.
        assert!(filter_accepted(&[text()], &config).is_empty());
    }

    #[test]
    fn extension_and_exact_mime_patterns_match() {
        let by_extension = DropZoneConfig {
            accept: vec![".JPG".to_string()],
            max_size: None,
        };
        assert_eq!(filter_accepted(&[jpeg()], &by_extension).len(), 1);

        let exact = DropZoneConfig {
            accept: vec!["text/plain".to_string()],
            max_size: None,
        };
        assert_eq!(filter_accepted(&[jpeg(), text()], &exact), vec![text()]);
    }

    #[test]
    fn empty_accept_list_passes_everything_within_size() {
        let config = DropZoneConfig {
            accept: Vec::new(),
            max_size: Some(1000),
        };
        let surviving = filter_accepted(&[jpeg(), text()], &config);
        assert_eq!(surviving, vec![text()]);
    }

    #[test]
    fn mime_is_derived_from_the_name() {
        assert_eq!(mime_from_name("a.JPG"), "image/jpeg");
        assert_eq!(mime_from_name("b.webp"), "image/webp");
        assert_eq!(mime_from_name("noext"), "application/octet-stream");
    }
}
