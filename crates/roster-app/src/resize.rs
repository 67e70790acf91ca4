// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::fmt;

use crate::Column;

pub const MIN_COLUMN_WIDTH: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnWidths {
    widths: [u32; Column::COUNT],
}

impl Default for ColumnWidths {
    fn default() -> Self {
        Self {
            widths: Column::ALL.map(Column::default_width),
        }
    }
}

impl ColumnWidths {
    pub fn get(&self, column: Column) -> u32 {
        self.widths[column.index()]
    }

    pub fn set(&mut self, column: Column, width: u32) {
        self.widths[column.index()] = width.max(MIN_COLUMN_WIDTH);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Column, u32)> + '_ {
        Column::ALL.into_iter().map(|column| (column, self.get(column)))
    }
}

/// Host-side pointer move/up subscription held for the length of a drag.
pub trait PointerCapture {
    fn release(&mut self);
}

/// Releases its capture exactly once, when dropped.
pub struct CaptureGuard {
    capture: Option<Box<dyn PointerCapture>>,
}

impl CaptureGuard {
    pub fn new(capture: Box<dyn PointerCapture>) -> Self {
        Self {
            capture: Some(capture),
        }
    }
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        if let Some(mut capture) = self.capture.take() {
            capture.release();
        }
    }
}

impl fmt::Debug for CaptureGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureGuard")
            .field("held", &self.capture.is_some())
            .finish()
    }
}

#[derive(Debug)]
struct DragSession {
    column: Column,
    start_x: i32,
    start_width: u32,
    _capture: CaptureGuard,
}

impl DragSession {
    fn width_at(&self, pointer_x: i32) -> u32 {
        let delta = i64::from(pointer_x) - i64::from(self.start_x);
        let width = (i64::from(self.start_width) + delta).max(i64::from(MIN_COLUMN_WIDTH));
        u32::try_from(width).unwrap_or(u32::MAX)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizePhase {
    Idle,
    Resizing(Column),
}

/// Drag-driven column widths. Leaving `Resizing` by any path drops the
/// session and with it the pointer capture.
#[derive(Debug, Default)]
pub struct ColumnResizer {
    widths: ColumnWidths,
    drag: Option<DragSession>,
}

impl ColumnResizer {
    pub fn widths(&self) -> &ColumnWidths {
        &self.widths
    }

    pub fn phase(&self) -> ResizePhase {
        match &self.drag {
            Some(drag) => ResizePhase::Resizing(drag.column),
            None => ResizePhase::Idle,
        }
    }

    /// A drag already in progress is ended before the new one starts.
    pub fn begin(&mut self, column: Column, pointer_x: i32, capture: Box<dyn PointerCapture>) {
        let guard = CaptureGuard::new(capture);
        self.end();
        self.drag = Some(DragSession {
            column,
            start_x: pointer_x,
            start_width: self.widths.get(column),
            _capture: guard,
        });
    }

    /// New width of the dragged column, or `None` when idle.
    pub fn pointer_move(&mut self, pointer_x: i32) -> Option<(Column, u32)> {
        let drag = self.drag.as_ref()?;
        let column = drag.column;
        let width = drag.width_at(pointer_x);
        self.widths.set(column, width);
        Some((column, width))
    }

    pub fn pointer_up(&mut self) -> Option<Column> {
        self.end()
    }

    /// Abandons a drag without a pointer up; the width keeps its last value.
    pub fn cancel(&mut self) -> Option<Column> {
        self.end()
    }

    fn end(&mut self) -> Option<Column> {
        self.drag.take().map(|drag| drag.column)
    }
}

#[cfg(test)]
mod tests {
    use super::{ColumnResizer, ColumnWidths, MIN_COLUMN_WIDTH, PointerCapture, ResizePhase};
    use crate::Column;
    use proptest::prelude::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Debug, Default, Clone)]
    struct Counter {
        acquired: Rc<Cell<usize>>,
        released: Rc<Cell<usize>>,
    }

    impl Counter {
        fn capture(&self) -> Box<dyn PointerCapture> {
            self.acquired.set(self.acquired.get() + 1);
            Box::new(CountingCapture {
                released: Rc::clone(&self.released),
            })
        }
    }

    struct CountingCapture {
        released: Rc<Cell<usize>>,
    }

    impl PointerCapture for CountingCapture {
        fn release(&mut self) {
            self.released.set(self.released.get() + 1);
        }
    }

    #[test]
    fn defaults_match_column_table() {
        let widths = ColumnWidths::default();
        assert_eq!(widths.get(Column::Client), 220);
        assert_eq!(widths.get(Column::Created), 110);
        assert_eq!(widths.iter().count(), Column::COUNT);
    }

    #[test]
    fn drag_updates_width_live_and_releases_on_pointer_up() {
        let counter = Counter::default();
        let mut resizer = ColumnResizer::default();

        resizer.begin(Column::Contact, 500, counter.capture());
        assert_eq!(resizer.phase(), ResizePhase::Resizing(Column::Contact));

        assert_eq!(resizer.pointer_move(540), Some((Column::Contact, 200)));
        assert_eq!(resizer.pointer_move(520), Some((Column::Contact, 180)));
        assert_eq!(resizer.widths().get(Column::Contact), 180);
        assert_eq!(counter.released.get(), 0);

        assert_eq!(resizer.pointer_up(), Some(Column::Contact));
        assert_eq!(resizer.phase(), ResizePhase::Idle);
        assert_eq!(counter.released.get(), 1);
    }

    #[test]
    fn width_is_clamped_at_minimum() {
        let counter = Counter::default();
        let mut resizer = ColumnResizer::default();
        resizer.begin(Column::Created, 300, counter.capture());

        assert_eq!(
            resizer.pointer_move(i32::MIN),
            Some((Column::Created, MIN_COLUMN_WIDTH))
        );
        assert_eq!(resizer.widths().get(Column::Created), MIN_COLUMN_WIDTH);
    }

    #[test]
    fn moves_after_release_change_nothing() {
        let counter = Counter::default();
        let mut resizer = ColumnResizer::default();
        resizer.begin(Column::Tags, 0, counter.capture());
        resizer.pointer_move(60);
        resizer.pointer_up();

        assert_eq!(resizer.pointer_move(900), None);
        assert_eq!(resizer.widths().get(Column::Tags), 200);
        assert_eq!(resizer.pointer_up(), None);
        assert_eq!(counter.released.get(), 1);
    }

    #[test]
    fn starting_a_second_drag_releases_the_first() {
        let counter = Counter::default();
        let mut resizer = ColumnResizer::default();
        resizer.begin(Column::Client, 0, counter.capture());
        resizer.begin(Column::Tags, 0, counter.capture());

        assert_eq!(counter.acquired.get(), 2);
        assert_eq!(counter.released.get(), 1);
        assert_eq!(resizer.phase(), ResizePhase::Resizing(Column::Tags));
    }

    #[test]
    fn dropping_the_resizer_mid_drag_releases_capture() {
        let counter = Counter::default();
        {
            let mut resizer = ColumnResizer::default();
            resizer.begin(Column::Client, 10, counter.capture());
        }
        assert_eq!(counter.released.get(), 1);
    }

    proptest! {
        #[test]
        fn width_is_monotonic_in_pointer_delta(
            start in -5_000_i32..5_000,
            a in -2_000_i32..2_000,
            b in -2_000_i32..2_000,
        ) {
            let counter = Counter::default();
            let mut resizer = ColumnResizer::default();
            resizer.begin(Column::AssignedTo, start, counter.capture());
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };

            let (_, low_width) = resizer.pointer_move(start + lo).expect("resizing");
            let (_, high_width) = resizer.pointer_move(start + hi).expect("resizing");
            prop_assert!(low_width <= high_width);
            prop_assert!(low_width >= MIN_COLUMN_WIDTH);
        }
    }
}
