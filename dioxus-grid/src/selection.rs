//! Click-selection model shared by grid components.

/// How a grid reacts to item clicks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// Plain clicks select exactly one item; modifiers are ignored.
    #[default]
    Single,
    /// Ctrl/Cmd toggles membership, Shift extends a contiguous range.
    Multiple,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ClickModifiers {
    pub shift: bool,
    /// Ctrl on Linux/Windows, Cmd on macOS.
    pub toggle: bool,
}

/// Result of applying a click to the current selection.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionUpdate {
    pub selected: Vec<String>,
    /// True when the click should also fire the plain item-click callback
    /// (single select, or an unmodified click in multi-select mode).
    pub plain_click: bool,
}

/// Applies a click to `selected`.
///
/// `order` is the full unfiltered item order; shift ranges are computed over
/// it, inclusive on both ends, and de-duplicated against the existing
/// selection. The anchor for a shift range is the most recently selected
/// item.
pub fn apply_click(
    order: &[String],
    selected: &[String],
    clicked: &str,
    mode: SelectionMode,
    modifiers: ClickModifiers,
) -> SelectionUpdate {
    if mode == SelectionMode::Single || (!modifiers.shift && !modifiers.toggle) {
        return SelectionUpdate {
            selected: vec![clicked.to_string()],
            plain_click: true,
        };
    }

    if modifiers.toggle {
        let mut next: Vec<String> = selected.to_vec();
        if let Some(pos) = next.iter().position(|id| id == clicked) {
            next.remove(pos);
        } else {
            next.push(clicked.to_string());
        }
        return SelectionUpdate {
            selected: next,
            plain_click: false,
        };
    }

    // Shift range from the last selected item to the clicked item.
    let anchor = selected.last().cloned();
    let anchor_pos = anchor.as_deref().and_then(|a| order.iter().position(|id| id == a));
    let clicked_pos = order.iter().position(|id| id == clicked);

    let (from, to) = match (anchor_pos, clicked_pos) {
        (Some(a), Some(c)) => (a.min(c), a.max(c)),
        (None, Some(c)) => (c, c),
        // Clicked item not part of the order; keep the selection untouched.
        _ => {
            return SelectionUpdate {
                selected: selected.to_vec(),
                plain_click: false,
            }
        }
    };

    let mut next: Vec<String> = selected.to_vec();
    for id in &order[from..=to] {
        if !next.iter().any(|existing| existing == id) {
            next.push(id.clone());
        }
    }

    SelectionUpdate {
        selected: next,
        plain_click: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order() -> Vec<String> {
        ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect()
    }

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn plain_click_replaces_selection() {
        let update = apply_click(
            &order(),
            &ids(&["a", "b"]),
            "c",
            SelectionMode::Multiple,
            ClickModifiers::default(),
        );
        assert_eq!(update.selected, ids(&["c"]));
        assert!(update.plain_click);
    }

    #[test]
    fn toggle_click_adds_and_removes() {
        let added = apply_click(
            &order(),
            &ids(&["a"]),
            "c",
            SelectionMode::Multiple,
            ClickModifiers {
                toggle: true,
                ..Default::default()
            },
        );
        assert_eq!(added.selected, ids(&["a", "c"]));
        assert!(!added.plain_click);

        let removed = apply_click(
            &order(),
            &added.selected,
            "a",
            SelectionMode::Multiple,
            ClickModifiers {
                toggle: true,
                ..Default::default()
            },
        );
        assert_eq!(removed.selected, ids(&["c"]));
    }

    #[test]
    fn shift_click_extends_range_from_last_selected() {
        // [a,b,c,d] with selection [a]: shift-click on c selects {a,b,c}.
        let update = apply_click(
            &order(),
            &ids(&["a"]),
            "c",
            SelectionMode::Multiple,
            ClickModifiers {
                shift: true,
                ..Default::default()
            },
        );
        assert_eq!(update.selected, ids(&["a", "b", "c"]));
        assert!(!update.plain_click);
    }

    #[test]
    fn shift_click_backwards_covers_the_range() {
        let update = apply_click(
            &order(),
            &ids(&["d"]),
            "b",
            SelectionMode::Multiple,
            ClickModifiers {
                shift: true,
                ..Default::default()
            },
        );
        assert_eq!(update.selected, ids(&["d", "b", "c"]));
    }

    #[test]
    fn shift_click_deduplicates_against_existing_selection() {
        let update = apply_click(
            &order(),
            &ids(&["b", "a"]),
            "c",
            SelectionMode::Multiple,
            ClickModifiers {
                shift: true,
                ..Default::default()
            },
        );
        assert_eq!(update.selected, ids(&["b", "a", "c"]));
    }

    #[test]
    fn shift_click_without_anchor_selects_clicked_only() {
        let update = apply_click(
            &order(),
            &[],
            "c",
            SelectionMode::Multiple,
            ClickModifiers {
                shift: true,
                ..Default::default()
            },
        );
        assert_eq!(update.selected, ids(&["c"]));
    }

    #[test]
    fn single_mode_ignores_modifiers() {
        let update = apply_click(
            &order(),
            &ids(&["a"]),
            "d",
            SelectionMode::Single,
            ClickModifiers {
                shift: true,
                toggle: true,
            },
        );
        assert_eq!(update.selected, ids(&["d"]));
        assert!(update.plain_click);
    }
}
