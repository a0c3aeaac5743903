//! Scrollbar state machine and hit-testing.
//!
//! Turns raw pointer coordinates into a validated `start <= end` scroll
//! window and repaints its own surface on every pointer move. When a move
//! changes the window, the scroll-changed callback fires before the repaint
//! so listeners never observe a stale window next to a fresh scrollbar
//! frame.

mod surface;

pub use surface::{Cursor, PixelSurface, Rgba, ScrollbarStyle};

/// Which part of the scrollbar a drag is anchored to.
///
/// Offsets keep drags relative: a handle drag stores the pixel gap between
/// pointer and handle position at mouse-down; a bar drag stores the window
/// at mouse-down plus the pointer baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    Idle,
    LeftHandle {
        offset: f32,
    },
    RightHandle {
        offset: f32,
    },
    Bar {
        initial_start: f32,
        initial_end: f32,
        offset: f32,
    },
}

/// Hover flags, recomputed on every pointer move regardless of drag state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HoverState {
    pub left_handle: bool,
    pub right_handle: bool,
    pub bar: bool,
}

/// Derived pixel geometry for the current size and window.
#[derive(Debug, Clone, Copy)]
struct Measurements {
    handle_radius: f32,
    start_x: f32,
    end_x: f32,
}

type ScrollCallback = Box<dyn FnMut(f32, f32)>;

/// Draggable range selector over the full sample sequence.
///
/// Owns the scroll window and its drawable surface exclusively; hosts
/// observe the window through [`Scrollbar::scroll_range`] and the
/// scroll-changed callback, never by mutation.
pub struct Scrollbar {
    width: f32,
    height: f32,
    start: f32,
    end: f32,
    drag: DragState,
    hover: HoverState,
    style: ScrollbarStyle,
    surface: PixelSurface,
    on_scroll: Option<ScrollCallback>,
}

impl Scrollbar {
    /// Create a scrollbar with the default style and a full `(0, 1)` window.
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_style(width, height, ScrollbarStyle::default())
    }

    /// Create a scrollbar with a custom style.
    pub fn with_style(width: u32, height: u32, style: ScrollbarStyle) -> Self {
        let mut scrollbar = Self {
            width: width as f32,
            height: height as f32,
            start: 0.0,
            end: 1.0,
            drag: DragState::Idle,
            hover: HoverState::default(),
            style,
            surface: PixelSurface::new(width, height),
            on_scroll: None,
        };
        scrollbar.redraw();
        scrollbar
    }

    /// Register the scroll-changed callback.
    ///
    /// Invoked with `(start, end)` whenever a pointer move changes the
    /// window, before the scrollbar repaints itself.
    pub fn set_on_scroll(&mut self, callback: impl FnMut(f32, f32) + 'static) {
        self.on_scroll = Some(Box::new(callback));
    }

    /// Current scroll window; `0 <= start <= end <= 1` always holds.
    pub fn scroll_range(&self) -> (f32, f32) {
        (self.start, self.end)
    }

    /// Current drag state.
    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    /// Hover flags from the last pointer move.
    pub fn hover(&self) -> HoverState {
        self.hover
    }

    /// Cursor the host should show.
    pub fn cursor(&self) -> Cursor {
        if self.hover.left_handle || self.hover.right_handle || self.hover.bar {
            Cursor::Pointer
        } else {
            Cursor::Default
        }
    }

    /// The scrollbar's rendered surface, tightly packed RGBA rows.
    pub fn pixels(&self) -> &[u8] {
        self.surface.pixels()
    }

    /// Resize the scrollbar surface and repaint.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width as f32;
        self.height = height as f32;
        self.surface.resize(width, height);
        self.redraw();
    }

    fn measurements(&self) -> Measurements {
        let handle_radius = self.height / 2.0;
        let track_width = self.width - self.height;
        Measurements {
            handle_radius,
            start_x: track_width * self.start + handle_radius,
            end_x: track_width * self.end + handle_radius,
        }
    }

    /// Begin a drag if a handle or the bar is under the pointer.
    ///
    /// Consults the hover flags from the last pointer move; the gesture
    /// source delivers a move for every position change, so they are
    /// current.
    pub fn pointer_down(&mut self, x: f32, _y: f32) {
        let track_width = self.width - self.height;
        if self.hover.left_handle || self.hover.right_handle {
            let grabbed_right = self.hover.right_handle;
            let fraction = if grabbed_right { self.end } else { self.start };
            let offset = x - fraction * track_width;
            self.drag = if grabbed_right {
                DragState::RightHandle { offset }
            } else {
                DragState::LeftHandle { offset }
            };
        } else if self.hover.bar {
            self.drag = DragState::Bar {
                initial_start: self.start,
                initial_end: self.end,
                offset: x,
            };
        }
    }

    /// End any drag. Hover flags keep their last computed values.
    pub fn pointer_up(&mut self, _x: f32, _y: f32) {
        self.drag = DragState::Idle;
    }

    /// Track the pointer: apply the active drag, recompute hover flags, and
    /// repaint. Emits the scroll-changed callback before the repaint when
    /// the window changed.
    pub fn pointer_move(&mut self, x: f32, y: f32) {
        let track_width = self.width - self.height;
        let previous = (self.start, self.end);

        match self.drag {
            DragState::Idle => {}
            DragState::LeftHandle { offset } | DragState::RightHandle { offset } => {
                let fraction = (x - offset) / track_width;
                let dragging_right = matches!(self.drag, DragState::RightHandle { .. });
                if dragging_right {
                    self.end = fraction;
                } else {
                    self.start = fraction;
                }

                // Crossover: the pointer dragged one handle past the other,
                // so the drag continues on the opposite window endpoint.
                if self.end < self.start {
                    std::mem::swap(&mut self.start, &mut self.end);
                    self.drag = if dragging_right {
                        DragState::LeftHandle { offset }
                    } else {
                        DragState::RightHandle { offset }
                    };
                }

                self.start = self.start.max(0.0);
                self.end = self.end.min(1.0);
            }
            DragState::Bar {
                initial_start,
                initial_end,
                offset,
            } => {
                // One shared delta, each end clamped independently; the
                // window may compress against a boundary.
                let delta = (x - offset) / track_width;
                self.start = (initial_start + delta).clamp(0.0, 1.0);
                self.end = (initial_end + delta).clamp(0.0, 1.0);
            }
        }

        if (self.start, self.end) != previous {
            if let Some(callback) = &mut self.on_scroll {
                callback(self.start, self.end);
            }
        }

        self.update_hover(x, y);
        self.redraw();
    }

    fn update_hover(&mut self, x: f32, y: f32) {
        let m = self.measurements();
        self.hover.left_handle =
            (x - m.start_x).hypot(y - m.handle_radius) <= m.handle_radius;
        self.hover.right_handle = !self.hover.left_handle
            && (x - m.end_x).hypot(y - m.handle_radius) <= m.handle_radius;
        self.hover.bar = x >= m.start_x
            && x <= m.end_x
            && y >= 0.0
            && y < self.height
            && !(self.hover.left_handle || self.hover.right_handle);
    }

    fn redraw(&mut self) {
        let m = self.measurements();
        let mid = self.height / 2.0;
        self.surface.clear();

        // Full track.
        self.surface
            .fill_capsule(mid, self.width - mid, mid, mid, self.style.track);

        // Visible window.
        let window = if self.hover.bar {
            self.style.window_hovered
        } else {
            self.style.window
        };
        self.surface
            .fill_capsule(m.start_x, m.end_x, mid, mid, window);

        // Handles, hover-brightened, with an outline ring.
        let handles = [
            (m.start_x, self.hover.left_handle),
            (m.end_x, self.hover.right_handle),
        ];
        for (handle_x, hovered) in handles {
            let fill = if hovered {
                self.style.handle_hovered
            } else {
                self.style.handle
            };
            let radius = mid - self.style.outline_width / 2.0;
            self.surface.fill_disc(handle_x, mid, radius, fill);
            self.surface.stroke_disc(
                handle_x,
                mid,
                radius,
                self.style.outline_width,
                self.style.handle_outline,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_window_is_full() {
        let scrollbar = Scrollbar::new(900, 50);
        assert_eq!(scrollbar.scroll_range(), (0.0, 1.0));
        assert_eq!(scrollbar.drag_state(), DragState::Idle);
    }

    #[test]
    fn test_measurement_geometry() {
        let scrollbar = Scrollbar::new(900, 50);
        let m = scrollbar.measurements();
        assert_eq!(m.handle_radius, 25.0);
        assert_eq!(m.start_x, 25.0);
        assert_eq!(m.end_x, 875.0);
    }

    #[test]
    fn test_left_handle_shadows_right() {
        // Zero track width puts both handle centers on the same point; only
        // the left one reports hovered.
        let mut scrollbar = Scrollbar::new(20, 20);
        scrollbar.pointer_move(10.0, 10.0);
        let hover = scrollbar.hover();
        assert!(hover.left_handle);
        assert!(!hover.right_handle);
        assert!(!hover.bar);
    }

    #[test]
    fn test_handles_shadow_bar() {
        let mut scrollbar = Scrollbar::new(900, 50);
        // On the right handle center: bar spans under it, handle wins.
        scrollbar.pointer_move(875.0, 25.0);
        let hover = scrollbar.hover();
        assert!(hover.right_handle);
        assert!(!hover.bar);

        // Mid-track: only the bar.
        scrollbar.pointer_move(450.0, 25.0);
        let hover = scrollbar.hover();
        assert!(hover.bar);
        assert!(!hover.left_handle && !hover.right_handle);
    }

    #[test]
    fn test_pointer_down_outside_stays_idle() {
        let mut scrollbar = Scrollbar::new(900, 50);
        scrollbar.pointer_move(450.0, 200.0);
        scrollbar.pointer_down(450.0, 200.0);
        assert_eq!(scrollbar.drag_state(), DragState::Idle);
    }

    #[test]
    fn test_cursor_follows_hover() {
        let mut scrollbar = Scrollbar::new(900, 50);
        assert_eq!(scrollbar.cursor(), Cursor::Default);
        scrollbar.pointer_move(25.0, 25.0);
        assert_eq!(scrollbar.cursor(), Cursor::Pointer);
        scrollbar.pointer_move(450.0, 300.0);
        assert_eq!(scrollbar.cursor(), Cursor::Default);
    }

    #[test]
    fn test_surface_matches_dimensions_after_resize() {
        let mut scrollbar = Scrollbar::new(900, 50);
        assert_eq!(scrollbar.pixels().len(), 900 * 50 * 4);
        scrollbar.resize(600, 40);
        assert_eq!(scrollbar.pixels().len(), 600 * 40 * 4);
    }
}
