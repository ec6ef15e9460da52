//! Grid geometry calculation.
//!
//! Layout state is derived, never stored: [`calculate_grid`] is a pure
//! function of (config, container width, item count) and is recomputed by the
//! component layer whenever one of those inputs changes.

/// A single positionable unit in a grid.
///
/// Identity is the `id`; the insertion order of the surrounding `Vec` defines
/// the layout order. The payload is opaque to the layout engine.
#[derive(Debug, Clone, PartialEq)]
pub struct GridItem<T> {
    pub id: String,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub aspect_ratio: Option<f64>,
    pub data: T,
}

impl<T> GridItem<T> {
    pub fn new(id: impl Into<String>, data: T) -> Self {
        Self {
            id: id.into(),
            width: None,
            height: None,
            aspect_ratio: None,
            data,
        }
    }

    pub fn with_dimensions(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        if height > 0.0 {
            self.aspect_ratio = Some(width / height);
        }
        self
    }

    /// Explicit aspect ratio, falling back to width/height when present.
    pub fn effective_aspect_ratio(&self) -> Option<f64> {
        self.aspect_ratio.or(match (self.width, self.height) {
            (Some(w), Some(h)) if h > 0.0 => Some(w / h),
            _ => None,
        })
    }
}

/// Column sizing configuration for a grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridConfig {
    /// Fixed column count. When set, the min/max column width bounds are
    /// ignored.
    pub columns: Option<usize>,
    pub min_column_width: f64,
    pub max_column_width: f64,
    /// Gap between cells, both axes, in pixels.
    pub gap: f64,
    /// Row height used when aspect-ratio locking is off.
    pub item_height: f64,
    /// Derive the row height from the column width and `aspect_ratio`.
    pub lock_aspect_ratio: bool,
    /// Width / height ratio applied when `lock_aspect_ratio` is set.
    pub aspect_ratio: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: None,
            min_column_width: 160.0,
            max_column_width: 320.0,
            gap: 12.0,
            item_height: 200.0,
            lock_aspect_ratio: true,
            aspect_ratio: 1.0,
        }
    }
}

/// Derived grid geometry. Invariants: `columns >= 1`, and
/// `min_column_width <= column_width <= max_column_width` whenever the
/// container is at least `min_column_width` wide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCalculation {
    pub columns: usize,
    pub column_width: f64,
    pub row_height: f64,
    pub total_rows: usize,
    pub items_per_row: usize,
}

pub fn calculate_grid(config: &GridConfig, container_width: f64, item_count: usize) -> GridCalculation {
    let (columns, column_width) = if container_width <= 0.0 {
        // Unmeasured or zero-width containers get a single column instead of
        // a division by zero.
        (1, config.min_column_width.max(1.0))
    } else {
        match config.columns {
            Some(fixed) => {
                let columns = fixed.max(1);
                let width = (container_width - config.gap * (columns as f64 - 1.0)) / columns as f64;
                (columns, width.max(1.0))
            }
            None => auto_fit(config, container_width),
        }
    };

    let row_height = if config.lock_aspect_ratio {
        column_width / config.aspect_ratio.max(0.01)
    } else {
        config.item_height
    };

    let total_rows = if item_count == 0 {
        0
    } else {
        item_count.div_ceil(columns)
    };

    GridCalculation {
        columns,
        column_width,
        row_height,
        total_rows,
        items_per_row: columns,
    }
}

/// Auto-fit column computation in two passes. The first pass packs as many
/// min-width columns as fit; if that leaves columns wider than the maximum,
/// the second pass clamps to the maximum and recomputes the count from it.
/// The rendered width then never exceeds the configured maximum, at the cost
/// of potentially under-filling the row.
fn auto_fit(config: &GridConfig, container_width: f64) -> (usize, f64) {
    let min = config.min_column_width.max(1.0);
    let max = config.max_column_width.max(min);
    let gap = config.gap.max(0.0);

    let mut columns = (((container_width + gap) / (min + gap)).floor() as usize).max(1);
    let mut width = (container_width - gap * (columns as f64 - 1.0)) / columns as f64;

    if width > max {
        columns = (((container_width + gap) / (max + gap)).floor() as usize).max(1);
        width = ((container_width - gap * (columns as f64 - 1.0)) / columns as f64).min(max);
    }

    (columns, width.max(1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(min: f64, max: f64, gap: f64) -> GridConfig {
        GridConfig {
            columns: None,
            min_column_width: min,
            max_column_width: max,
            gap,
            ..GridConfig::default()
        }
    }

    #[test]
    fn zero_width_falls_back_to_single_column() {
        let calc = calculate_grid(&config(160.0, 320.0, 12.0), 0.0, 10);
        assert_eq!(calc.columns, 1);
        assert!(calc.column_width > 0.0);
    }

    #[test]
    fn column_width_stays_within_bounds() {
        let cfg = config(100.0, 250.0, 10.0);
        for w in [100, 150, 320, 480, 799, 1024, 1440, 2560, 3841] {
            let calc = calculate_grid(&cfg, w as f64, 50);
            assert!(calc.columns >= 1, "columns >= 1 at width {}", w);
            assert!(
                calc.column_width >= cfg.min_column_width - 1e-9,
                "width {} gave column {} below min",
                w,
                calc.column_width
            );
            assert!(
                calc.column_width <= cfg.max_column_width + 1e-9,
                "width {} gave column {} above max",
                w,
                calc.column_width
            );
        }
    }

    #[test]
    fn max_clamp_may_underfill_the_row() {
        // 1000px with 400..450px columns: first pass gives 2 columns of
        // 495px, second pass clamps to 450px and keeps 2 columns.
        let calc = calculate_grid(&config(400.0, 450.0, 10.0), 1000.0, 8);
        assert_eq!(calc.columns, 2);
        assert!((calc.column_width - 450.0).abs() < 1e-9);
    }

    #[test]
    fn fixed_columns_divide_remaining_width() {
        let cfg = GridConfig {
            columns: Some(4),
            gap: 10.0,
            ..GridConfig::default()
        };
        let calc = calculate_grid(&cfg, 430.0, 9);
        assert_eq!(calc.columns, 4);
        assert!((calc.column_width - 100.0).abs() < 1e-9);
        assert_eq!(calc.total_rows, 3);
    }

    #[test]
    fn aspect_ratio_locks_row_height_to_column_width() {
        let cfg = GridConfig {
            columns: Some(2),
            gap: 0.0,
            lock_aspect_ratio: true,
            aspect_ratio: 1.5,
            ..GridConfig::default()
        };
        let calc = calculate_grid(&cfg, 300.0, 4);
        assert!((calc.row_height - 100.0).abs() < 1e-9);
    }

    #[test]
    fn fixed_item_height_used_without_aspect_lock() {
        let cfg = GridConfig {
            lock_aspect_ratio: false,
            item_height: 180.0,
            ..GridConfig::default()
        };
        let calc = calculate_grid(&cfg, 800.0, 4);
        assert!((calc.row_height - 180.0).abs() < 1e-9);
    }

    #[test]
    fn empty_collection_has_zero_rows() {
        let calc = calculate_grid(&GridConfig::default(), 800.0, 0);
        assert_eq!(calc.total_rows, 0);
        assert!(calc.columns >= 1);
    }
}
