//! Overlay rendering support.
//!
//! Drawing the overlay window is the job of an external renderer.  This
//! module gives it everything it needs without touching the selection
//! logic:
//!
//! * [`cell_layout`] lays out every cell and its two sub-labels from the
//!   same enumeration [`LabelGrid`] resolves against, so drawn labels and
//!   typed labels always agree.
//! * [`ChannelOverlay`] implements [`Overlay`] by sending [`OverlayEvent`]s
//!   over an [`mpsc`] channel.  Any listener can own the receiver.

use crate::config::OverlayConfig;
use crate::label::{enumerate_labels, LabelGrid, Point, Rect};
use crate::traits::Overlay;
use std::sync::{mpsc, Arc};

/// One cell as the renderer draws it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellLabel {
    pub col: usize,
    pub row: usize,
    /// Outline of the cell.
    pub rect: Rect,
    /// First label letter, drawn centred on `left_anchor`.
    pub left: char,
    pub left_anchor: Point,
    /// Second label letter, drawn centred on `right_anchor`.
    pub right: char,
    pub right_anchor: Point,
}

/// Lay out every cell of `grid` in enumeration order.
///
/// Sub-labels sit at one and three quarters of the cell width, vertically
/// centred.
pub fn cell_layout(grid: &LabelGrid) -> Vec<CellLabel> {
    let (w, h) = grid.spec().cell_size();
    enumerate_labels(grid.spec().size())
        .map(|cell| {
            let rect = grid.cell_rect(cell.col, cell.row);
            let y = rect.y1 + h / 2;
            CellLabel {
                col: cell.col,
                row: cell.row,
                rect,
                left: cell.label[0],
                left_anchor: Point { x: rect.x1 + w / 4, y },
                right: cell.label[1],
                right_anchor: Point {
                    x: rect.x1 + (3 * w) / 4,
                    y,
                },
            }
        })
        .collect()
}

/// Everything the renderer needs to draw the overlay.
#[derive(Debug, Clone)]
pub struct OverlayShowPayload {
    pub cells: Arc<[CellLabel]>,
    pub appearance: OverlayConfig,
}

/// Events sent from [`ChannelOverlay`] to the renderer.
#[derive(Debug, Clone)]
pub enum OverlayEvent {
    /// Show the overlay (fullscreen, on top, not focus-stealing).
    Show(OverlayShowPayload),
    /// Hide the overlay immediately.  A click follows right after.
    Hide,
}

/// The renderer's receiving end has been dropped.
#[derive(Debug, thiserror::Error)]
#[error("overlay renderer disconnected")]
pub struct OverlayDisconnected;

/// [`Overlay`] that forwards show/hide requests over a channel.
///
/// The cell layout is computed once at construction and shared with every
/// [`OverlayEvent::Show`].
pub struct ChannelOverlay {
    tx: mpsc::Sender<OverlayEvent>,
    cells: Arc<[CellLabel]>,
    appearance: OverlayConfig,
}

impl ChannelOverlay {
    pub fn new(grid: &LabelGrid, appearance: OverlayConfig, tx: mpsc::Sender<OverlayEvent>) -> Self {
        Self {
            tx,
            cells: cell_layout(grid).into(),
            appearance,
        }
    }
}

impl Overlay for ChannelOverlay {
    type Error = OverlayDisconnected;

    fn show(&self) -> Result<(), OverlayDisconnected> {
        self.tx
            .send(OverlayEvent::Show(OverlayShowPayload {
                cells: Arc::clone(&self.cells),
                appearance: self.appearance.clone(),
            }))
            .map_err(|_| OverlayDisconnected)
    }

    fn hide(&self) -> Result<(), OverlayDisconnected> {
        self.tx.send(OverlayEvent::Hide).map_err(|_| OverlayDisconnected)
    }
}
