//! The selection state machine.
//!
//! [`SelectionController`] owns the [`LabelGrid`] and the selection state
//! and reacts to [`KeyEvent`]s by updating that state and driving the
//! [`Pointer`] and [`Overlay`] collaborators.
//!
//! # Key grammar
//!
//! While the overlay is shown, two letters select a cell and warp the
//! pointer to its center.  A third key confirms:
//!
//! * repeating the **first** letter clicks the left half of the cell,
//! * repeating the **second** letter clicks the right half,
//! * space clicks the center,
//! * any other letter drops the selection without clicking.
//!
//! Every click hides the overlay first so it lands on the application
//! underneath.

use crate::event::{Action, KeyEvent, MouseButton};
use crate::label::{Bias, LabelGrid};
use crate::traits::{Overlay, Pointer};
use log::{debug, info, warn};

/// Errors surfaced from collaborators.  The controller's own state is
/// already settled when one of these is returned.
#[derive(Debug, thiserror::Error)]
pub enum SelectorError {
    /// The pointer backend failed to move or click.
    #[error("pointer error: {0}")]
    Pointer(String),
    /// The overlay failed to show or hide.
    #[error("overlay error: {0}")]
    Overlay(String),
}

/// Coarse state of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Overlay hidden; only the toggle hotkey does anything.
    Idle,
    /// Overlay shown, waiting for label letters.
    Armed,
    /// Overlay shown, a resolvable two-letter label is selected and the next
    /// key confirms or drops it.
    LabelComplete,
}

/// The label typed so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Pending {
    #[default]
    Empty,
    One(char),
    Two([char; 2]),
}

/// Interprets key events into pointer moves and clicks.
///
/// Generic over its collaborators so it can be driven by Hyprland, a dry-run
/// logger, or test doubles alike.  Events must be fed one at a time from a
/// single thread; see [`KeySource`](crate::traits::KeySource).
pub struct SelectionController<P: Pointer, O: Overlay> {
    grid: LabelGrid,
    pointer: P,
    overlay: O,
    overlay_active: bool,
    pending: Pending,
}

impl<P: Pointer, O: Overlay> SelectionController<P, O> {
    /// Create a controller with the overlay hidden and nothing typed.
    pub fn new(grid: LabelGrid, pointer: P, overlay: O) -> Self {
        Self {
            grid,
            pointer,
            overlay,
            overlay_active: false,
            pending: Pending::Empty,
        }
    }

    /// The label grid used for resolution.
    pub fn grid(&self) -> &LabelGrid {
        &self.grid
    }

    /// Whether the overlay is currently shown and accepting letters.
    pub fn overlay_active(&self) -> bool {
        self.overlay_active
    }

    /// The uppercase letters typed so far (0 to 2 of them).
    pub fn pending_label(&self) -> String {
        match self.pending {
            Pending::Empty => String::new(),
            Pending::One(a) => a.to_string(),
            Pending::Two([a, b]) => [a, b].iter().collect(),
        }
    }

    /// Current [`Phase`].
    ///
    /// A two-letter label that does not resolve reports [`Phase::Armed`]:
    /// the next letter will drop it.
    pub fn phase(&self) -> Phase {
        if !self.overlay_active {
            return Phase::Idle;
        }
        match self.pending {
            Pending::Two(label) if self.grid.resolve(label).is_some() => Phase::LabelComplete,
            _ => Phase::Armed,
        }
    }

    /// Process a single [`KeyEvent`].
    ///
    /// Returns the action taken, or `None` when the event was ignored.  On
    /// a collaborator error the selection state has already been updated;
    /// it stays consistent whatever the collaborators do.
    pub fn handle(&mut self, event: KeyEvent) -> Result<Option<Action>, SelectorError> {
        match event {
            KeyEvent::Toggle => self.toggle().map(Some),
            _ if !self.overlay_active => {
                debug!("overlay hidden, ignoring {}", event);
                Ok(None)
            }
            KeyEvent::Character(c) => self.character(c),
            KeyEvent::Space => self.space(),
        }
    }

    fn toggle(&mut self) -> Result<Action, SelectorError> {
        self.overlay_active = !self.overlay_active;
        self.pending = Pending::Empty;
        if self.overlay_active {
            info!("overlay shown");
            self.overlay
                .show()
                .map_err(|e| SelectorError::Overlay(e.to_string()))?;
        } else {
            info!("overlay hidden");
            self.overlay
                .hide()
                .map_err(|e| SelectorError::Overlay(e.to_string()))?;
        }
        Ok(Action::SetOverlay(self.overlay_active))
    }

    fn character(&mut self, c: char) -> Result<Option<Action>, SelectorError> {
        if !c.is_ascii_alphabetic() {
            debug!("ignoring non-letter {:?}", c);
            return Ok(None);
        }
        let c = c.to_ascii_uppercase();

        match self.pending {
            Pending::Empty => {
                debug!("label {}", c);
                self.pending = Pending::One(c);
                Ok(None)
            }
            Pending::One(first) => {
                let label = [first, c];
                self.pending = Pending::Two(label);
                let Some((col, row)) = self.grid.resolve(label) else {
                    warn!("label {}{} does not name a cell", first, c);
                    return Ok(None);
                };
                let point = self.grid.center_point(col, row, Bias::None);
                debug!(
                    "label {}{} -> cell ({}, {}), pointer to ({}, {})",
                    first, c, col, row, point.x, point.y
                );
                self.pointer
                    .move_to(point)
                    .map_err(|e| SelectorError::Pointer(e.to_string()))?;
                Ok(Some(Action::MoveOnly { col, row, point }))
            }
            Pending::Two(label) => {
                self.pending = Pending::Empty;
                let Some((col, row)) = self.grid.resolve(label) else {
                    warn!("dropping unresolvable label {}{}", label[0], label[1]);
                    return Ok(None);
                };
                let bias = if c == label[0] {
                    Bias::Left
                } else if c == label[1] {
                    Bias::Right
                } else {
                    debug!("{} matches neither letter of {}{}, selection dropped", c, label[0], label[1]);
                    return Ok(None);
                };
                self.move_and_click(col, row, bias).map(Some)
            }
        }
    }

    fn space(&mut self) -> Result<Option<Action>, SelectorError> {
        let Pending::Two(label) = self.pending else {
            debug!("space without a complete label, ignoring");
            return Ok(None);
        };
        self.pending = Pending::Empty;
        let Some((col, row)) = self.grid.resolve(label) else {
            warn!("dropping unresolvable label {}{}", label[0], label[1]);
            return Ok(None);
        };
        self.move_and_click(col, row, Bias::None).map(Some)
    }

    /// Move into the cell, hide the overlay, then click.
    ///
    /// The overlay is hidden even when the move fails so that its visibility
    /// always matches `overlay_active`; the click only happens if both
    /// earlier steps succeeded.
    fn move_and_click(&mut self, col: usize, row: usize, bias: Bias) -> Result<Action, SelectorError> {
        let button = MouseButton::default();
        let point = self.grid.center_point(col, row, bias);
        info!(
            "{} click in cell ({}, {}) {:?} at ({}, {})",
            button, col, row, bias, point.x, point.y
        );

        self.overlay_active = false;
        let moved = self
            .pointer
            .move_to(point)
            .map_err(|e| SelectorError::Pointer(e.to_string()));
        let hidden = self
            .overlay
            .hide()
            .map_err(|e| SelectorError::Overlay(e.to_string()));
        moved?;
        hidden?;
        self.pointer
            .click(button)
            .map_err(|e| SelectorError::Pointer(e.to_string()))?;

        Ok(Action::MoveAndClick {
            col,
            row,
            bias,
            button,
            point,
        })
    }
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::{GridSpec, Point};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    /// Every collaborator call, in order.
    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Move(Point),
        Click(MouseButton),
        Show,
        Hide,
    }

    type Log = Rc<RefCell<Vec<Call>>>;

    #[derive(Debug, thiserror::Error)]
    #[error("recorder failure")]
    struct RecorderErr;

    /// Pointer double that records calls into a shared log.
    struct RecorderPointer {
        log: Log,
        fail_moves: Rc<Cell<bool>>,
    }

    impl Pointer for RecorderPointer {
        type Error = RecorderErr;

        fn move_to(&self, point: Point) -> Result<(), RecorderErr> {
            if self.fail_moves.get() {
                return Err(RecorderErr);
            }
            self.log.borrow_mut().push(Call::Move(point));
            Ok(())
        }

        fn click(&self, button: MouseButton) -> Result<(), RecorderErr> {
            self.log.borrow_mut().push(Call::Click(button));
            Ok(())
        }
    }

    /// Overlay double that records calls into the same log.
    struct RecorderOverlay {
        log: Log,
    }

    impl Overlay for RecorderOverlay {
        type Error = RecorderErr;

        fn show(&self) -> Result<(), RecorderErr> {
            self.log.borrow_mut().push(Call::Show);
            Ok(())
        }

        fn hide(&self) -> Result<(), RecorderErr> {
            self.log.borrow_mut().push(Call::Hide);
            Ok(())
        }
    }

    struct Harness {
        ctl: SelectionController<RecorderPointer, RecorderOverlay>,
        log: Log,
        fail_moves: Rc<Cell<bool>>,
    }

    impl Harness {
        fn calls(&self) -> Vec<Call> {
            self.log.borrow().clone()
        }

        fn clear(&self) {
            self.log.borrow_mut().clear();
        }

        fn keys(&mut self, s: &str) -> Vec<Option<Action>> {
            s.chars()
                .map(|c| self.ctl.handle(KeyEvent::Character(c)).unwrap())
                .collect()
        }
    }

    fn harness_with(size: usize) -> Harness {
        let log: Log = Rc::default();
        let fail_moves = Rc::new(Cell::new(false));
        let grid = LabelGrid::new(GridSpec::new(1920, 1080, size).unwrap());
        let ctl = SelectionController::new(
            grid,
            RecorderPointer {
                log: log.clone(),
                fail_moves: fail_moves.clone(),
            },
            RecorderOverlay { log: log.clone() },
        );
        Harness {
            ctl,
            log,
            fail_moves,
        }
    }

    fn harness() -> Harness {
        harness_with(26)
    }

    /// Overlay shown and "AB" typed; log cleared.
    fn with_ab() -> Harness {
        let mut h = harness();
        h.ctl.handle(KeyEvent::Toggle).unwrap();
        h.keys("AB");
        h.clear();
        h
    }

    // "AB" is column 0, row 1: cell (0, 41)-(73, 82) at 1920x1080.
    const AB_CENTER: Point = Point { x: 36, y: 61 };
    const AB_LEFT: Point = Point { x: 18, y: 61 };
    const AB_RIGHT: Point = Point { x: 54, y: 61 };

    #[test]
    fn starts_idle() {
        let h = harness();
        assert_eq!(h.ctl.phase(), Phase::Idle);
        assert!(!h.ctl.overlay_active());
        assert_eq!(h.ctl.pending_label(), "");
    }

    #[test]
    fn toggle_shows_and_arms() {
        let mut h = harness();
        let action = h.ctl.handle(KeyEvent::Toggle).unwrap();
        assert_eq!(action, Some(Action::SetOverlay(true)));
        assert_eq!(h.ctl.phase(), Phase::Armed);
        assert_eq!(h.calls(), vec![Call::Show]);
    }

    #[test]
    fn toggle_twice_round_trips_and_clears_label() {
        let mut h = harness();
        h.ctl.handle(KeyEvent::Toggle).unwrap();
        h.keys("Q");
        assert_eq!(h.ctl.pending_label(), "Q");

        h.ctl.handle(KeyEvent::Toggle).unwrap();
        assert!(!h.ctl.overlay_active());
        assert_eq!(h.ctl.pending_label(), "");

        h.ctl.handle(KeyEvent::Toggle).unwrap();
        assert!(h.ctl.overlay_active());
        assert_eq!(h.ctl.pending_label(), "");
        assert_eq!(h.calls(), vec![Call::Show, Call::Hide, Call::Show]);
    }

    #[test]
    fn toggle_from_label_complete_drops_selection() {
        let mut h = with_ab();
        h.ctl.handle(KeyEvent::Toggle).unwrap();
        assert_eq!(h.ctl.phase(), Phase::Idle);
        assert_eq!(h.ctl.pending_label(), "");
        assert_eq!(h.calls(), vec![Call::Hide]);
    }

    #[test]
    fn two_letters_preselect_cell() {
        let mut h = harness();
        h.ctl.handle(KeyEvent::Toggle).unwrap();
        let actions = h.keys("AB");
        assert_eq!(actions[0], None);
        assert_eq!(
            actions[1],
            Some(Action::MoveOnly {
                col: 0,
                row: 1,
                point: AB_CENTER
            })
        );
        assert_eq!(h.ctl.phase(), Phase::LabelComplete);
        assert_eq!(h.ctl.pending_label(), "AB");
        assert!(h.ctl.overlay_active());
        assert_eq!(h.calls(), vec![Call::Show, Call::Move(AB_CENTER)]);
    }

    #[test]
    fn lowercase_letters_are_normalised() {
        let mut h = harness();
        h.ctl.handle(KeyEvent::Toggle).unwrap();
        h.keys("ab");
        assert_eq!(h.ctl.pending_label(), "AB");
        assert_eq!(h.ctl.phase(), Phase::LabelComplete);
    }

    #[test]
    fn repeating_first_letter_clicks_left_half() {
        let mut h = with_ab();
        let action = h.ctl.handle(KeyEvent::Character('a')).unwrap();
        assert_eq!(
            action,
            Some(Action::MoveAndClick {
                col: 0,
                row: 1,
                bias: Bias::Left,
                button: MouseButton::Left,
                point: AB_LEFT,
            })
        );
        assert!(!h.ctl.overlay_active());
        assert_eq!(h.ctl.pending_label(), "");
        assert_eq!(h.ctl.phase(), Phase::Idle);
        assert_eq!(
            h.calls(),
            vec![Call::Move(AB_LEFT), Call::Hide, Call::Click(MouseButton::Left)]
        );
    }

    #[test]
    fn repeating_second_letter_clicks_right_half() {
        let mut h = with_ab();
        let action = h.ctl.handle(KeyEvent::Character('B')).unwrap();
        assert!(matches!(
            action,
            Some(Action::MoveAndClick { bias: Bias::Right, point: AB_RIGHT, .. })
        ));
        assert_eq!(
            h.calls(),
            vec![Call::Move(AB_RIGHT), Call::Hide, Call::Click(MouseButton::Left)]
        );
    }

    #[test]
    fn doubled_label_always_clicks_left() {
        let mut h = harness();
        h.ctl.handle(KeyEvent::Toggle).unwrap();
        h.keys("CC");
        let action = h.ctl.handle(KeyEvent::Character('C')).unwrap();
        assert!(matches!(action, Some(Action::MoveAndClick { bias: Bias::Left, .. })));
    }

    #[test]
    fn space_clicks_center() {
        let mut h = with_ab();
        let action = h.ctl.handle(KeyEvent::Space).unwrap();
        assert!(matches!(
            action,
            Some(Action::MoveAndClick { bias: Bias::None, point: AB_CENTER, .. })
        ));
        assert_eq!(h.ctl.pending_label(), "");
        assert!(!h.ctl.overlay_active());
        assert_eq!(
            h.calls(),
            vec![Call::Move(AB_CENTER), Call::Hide, Call::Click(MouseButton::Left)]
        );
    }

    #[test]
    fn unrelated_letter_drops_selection_without_click() {
        let mut h = with_ab();
        let action = h.ctl.handle(KeyEvent::Character('Z')).unwrap();
        assert_eq!(action, None);
        assert_eq!(h.ctl.pending_label(), "");
        assert_eq!(h.ctl.phase(), Phase::Armed);
        assert!(h.calls().is_empty());
    }

    #[test]
    fn new_label_after_dropped_selection() {
        let mut h = with_ab();
        h.keys("Z");
        let actions = h.keys("BA");
        assert!(matches!(actions[1], Some(Action::MoveOnly { col: 1, row: 0, .. })));
    }

    #[test]
    fn keys_are_ignored_while_hidden() {
        let mut h = harness();
        assert_eq!(h.ctl.handle(KeyEvent::Character('A')).unwrap(), None);
        assert_eq!(h.ctl.handle(KeyEvent::Character('B')).unwrap(), None);
        assert_eq!(h.ctl.handle(KeyEvent::Space).unwrap(), None);
        assert_eq!(h.ctl.phase(), Phase::Idle);
        assert_eq!(h.ctl.pending_label(), "");
        assert!(h.calls().is_empty());
    }

    #[test]
    fn non_letters_are_ignored() {
        let mut h = harness();
        h.ctl.handle(KeyEvent::Toggle).unwrap();
        h.keys("A1-é");
        assert_eq!(h.ctl.pending_label(), "A");
    }

    #[test]
    fn non_letter_does_not_confirm() {
        let mut h = with_ab();
        assert_eq!(h.ctl.handle(KeyEvent::Character('3')).unwrap(), None);
        assert_eq!(h.ctl.pending_label(), "AB");
        assert_eq!(h.ctl.phase(), Phase::LabelComplete);
    }

    #[test]
    fn space_without_complete_label_is_ignored() {
        let mut h = harness();
        h.ctl.handle(KeyEvent::Toggle).unwrap();
        assert_eq!(h.ctl.handle(KeyEvent::Space).unwrap(), None);
        h.keys("A");
        assert_eq!(h.ctl.handle(KeyEvent::Space).unwrap(), None);
        assert_eq!(h.ctl.pending_label(), "A");
        assert!(h.ctl.overlay_active());
    }

    #[test]
    fn unresolvable_label_is_a_no_op() {
        // A 3x3 grid only uses labels AA..IA.
        let mut h = harness_with(3);
        h.ctl.handle(KeyEvent::Toggle).unwrap();
        h.clear();

        let actions = h.keys("ZZ");
        assert_eq!(actions, vec![None, None]);
        assert_eq!(h.ctl.pending_label(), "ZZ");
        assert_eq!(h.ctl.phase(), Phase::Armed);

        assert_eq!(h.ctl.handle(KeyEvent::Character('Z')).unwrap(), None);
        assert_eq!(h.ctl.pending_label(), "");
        assert!(h.ctl.overlay_active());
        assert!(h.calls().is_empty());
    }

    #[test]
    fn space_on_unresolvable_label_is_a_no_op() {
        let mut h = harness_with(3);
        h.ctl.handle(KeyEvent::Toggle).unwrap();
        h.keys("QQ");
        h.clear();
        assert_eq!(h.ctl.handle(KeyEvent::Space).unwrap(), None);
        assert_eq!(h.ctl.pending_label(), "");
        assert!(h.calls().is_empty());
    }

    #[test]
    fn failed_preselect_keeps_label() {
        let mut h = harness();
        h.ctl.handle(KeyEvent::Toggle).unwrap();
        h.keys("A");
        h.fail_moves.set(true);
        assert!(matches!(
            h.ctl.handle(KeyEvent::Character('B')),
            Err(SelectorError::Pointer(_))
        ));
        assert_eq!(h.ctl.pending_label(), "AB");
        assert_eq!(h.ctl.phase(), Phase::LabelComplete);
    }

    #[test]
    fn failed_move_still_hides_but_never_clicks() {
        let mut h = with_ab();
        h.fail_moves.set(true);
        assert!(matches!(
            h.ctl.handle(KeyEvent::Space),
            Err(SelectorError::Pointer(_))
        ));
        assert!(!h.ctl.overlay_active());
        assert_eq!(h.ctl.pending_label(), "");
        assert_eq!(h.calls(), vec![Call::Hide]);
    }
}
