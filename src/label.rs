//! Label grid geometry.
//!
//! The screen is divided into an `N × N` grid of equally sized cells.  Every
//! cell carries a two-letter label: the first letter is drawn in the left
//! half of the cell, the second in the right half.  [`LabelGrid`] maps a
//! typed label back to its `(col, row)` and a cell to pixel coordinates.
//!
//! Labels are assigned by [`enumerate_labels`], which is the single source
//! of truth for label placement.  The overlay renderer consumes the same
//! function (see [`crate::overlay::cell_layout`]) so that what is drawn and
//! what is resolved can never disagree.

use std::collections::HashMap;

/// The label alphabet.  Labels cycle through all 26 letters regardless of
/// the grid size.
pub const ALPHABET: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Grid size used when none is configured.
pub const DEFAULT_GRID_SIZE: usize = 26;

/// Error raised when a grid cannot be constructed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    /// The grid has more bands than there are letters to label them.
    #[error("grid size {0} exceeds the 26 letter alphabet")]
    GridTooLarge(usize),
    /// A zero-sized grid has no cells.
    #[error("grid size must be at least 1")]
    EmptyGrid,
}

/// Horizontal bias inside a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Bias {
    /// Cell center.
    #[default]
    None,
    /// Center of the left sub-label.
    Left,
    /// Center of the right sub-label.
    Right,
}

/// A screen position in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

/// A pixel rectangle, `x2`/`y2` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl Rect {
    /// Whether `p` lies inside the rectangle (right and bottom edges
    /// excluded).
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x1 && p.x < self.x2 && p.y >= self.y1 && p.y < self.y2
    }
}

/// Screen dimensions and grid size, fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSpec {
    size: usize,
    cell_width: u32,
    cell_height: u32,
}

impl GridSpec {
    /// Divide a `screen_width × screen_height` screen into `size × size`
    /// cells.  Cell dimensions are floored; leftover pixels on the right and
    /// bottom edges belong to no cell.
    pub fn new(screen_width: u32, screen_height: u32, size: usize) -> Result<Self, ConfigurationError> {
        if size == 0 {
            return Err(ConfigurationError::EmptyGrid);
        }
        if size > ALPHABET.len() {
            return Err(ConfigurationError::GridTooLarge(size));
        }
        Ok(Self {
            size,
            cell_width: screen_width / size as u32,
            cell_height: screen_height / size as u32,
        })
    }

    /// Number of columns (and rows).
    pub fn size(&self) -> usize {
        self.size
    }

    /// Cell dimensions as `(width, height)`.
    pub fn cell_size(&self) -> (u32, u32) {
        (self.cell_width, self.cell_height)
    }
}

/// One entry of the label enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabeledCell {
    pub label: [char; 2],
    pub col: usize,
    pub row: usize,
}

/// Enumerate the label of every cell of a `size × size` grid in row-major
/// order (outer loop rows, inner loop columns).
///
/// Cell `i` gets `ALPHABET[i % 26]` followed by `ALPHABET[(i / 26) % 26]`.
/// Both letters cycle with period 26, not `size`: at `size == 26` the first
/// letter names the column and the second the row, while smaller grids get
/// distinct labels that no longer line up with bands.
pub fn enumerate_labels(size: usize) -> impl Iterator<Item = LabeledCell> {
    let n = ALPHABET.len();
    (0..size * size).map(move |i| LabeledCell {
        label: [
            ALPHABET[i % n] as char,
            ALPHABET[(i / n) % n] as char,
        ],
        col: i % size,
        row: i / size,
    })
}

/// Immutable label table and cell geometry.
#[derive(Debug, Clone)]
pub struct LabelGrid {
    spec: GridSpec,
    /// `label -> (col, row)`
    table: HashMap<[char; 2], (usize, usize)>,
}

impl LabelGrid {
    /// Build the label table for `spec`.
    pub fn new(spec: GridSpec) -> Self {
        let table = enumerate_labels(spec.size)
            .map(|c| (c.label, (c.col, c.row)))
            .collect();
        Self { spec, table }
    }

    /// The geometry this grid was built from.
    pub fn spec(&self) -> &GridSpec {
        &self.spec
    }

    /// Look up the cell for a two-letter label.  Letters must be uppercase.
    pub fn resolve(&self, label: [char; 2]) -> Option<(usize, usize)> {
        self.table.get(&label).copied()
    }

    /// Number of distinct labels in the table.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Pixel rectangle of the cell at `(col, row)`.
    pub fn cell_rect(&self, col: usize, row: usize) -> Rect {
        let (w, h) = self.spec.cell_size();
        let x1 = col as u32 * w;
        let y1 = row as u32 * h;
        Rect {
            x1,
            y1,
            x2: x1 + w,
            y2: y1 + h,
        }
    }

    /// Pointer target inside the cell at `(col, row)`.
    ///
    /// A left or right bias shifts the center by a quarter cell, landing on
    /// the matching sub-label.
    pub fn center_point(&self, col: usize, row: usize, bias: Bias) -> Point {
        let (w, h) = self.spec.cell_size();
        let x = col as u32 * w + w / 2;
        let y = row as u32 * h + h / 2;
        let x = match bias {
            Bias::None => x,
            Bias::Left => x - w / 4,
            Bias::Right => x + w / 4,
        };
        Point { x, y }
    }
}

//  Tests
