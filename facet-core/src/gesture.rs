/// Pointer gesture recognition feeding the camera
use crate::camera::Camera;

/// Degrees of orbit per pixel of single-pointer drag.
const ROTATE_SENSITIVITY: f32 = 0.35;
/// Pinch separations below this produce no zoom ratio.
const MIN_PINCH_SEPARATION: f32 = 1e-3;

/// Lifecycle of one pointer contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Started,
    Moved,
    Ended,
    Cancelled,
}

/// One pointer event in surface pixel coordinates.
#[derive(Debug, Clone, Copy)]
pub struct PointerInput {
    pub id: u64,
    pub phase: TouchPhase,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy)]
struct TrackedPointer {
    id: u64,
    x: f32,
    y: f32,
}

/// Folds pointer events into camera mutations.
///
/// One tracked pointer orbits; two or more pan by the midpoint of the
/// first two and zoom by their separation ratio. Every change to the
/// pointer set re-anchors the gesture references, so the first move after
/// a finger lands or lifts never sees a stale delta.
#[derive(Debug, Default)]
pub struct GestureController {
    pointers: Vec<TrackedPointer>,
    anchor: (f32, f32),
    midpoint: (f32, f32),
    separation: f32,
}

impl GestureController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_pointers(&self) -> usize {
        self.pointers.len()
    }

    /// Feeds one event and reports whether the camera changed.
    pub fn handle(
        &mut self,
        input: PointerInput,
        camera: &mut Camera,
        surface_w: f32,
        surface_h: f32,
    ) -> bool {
        match input.phase {
            TouchPhase::Started => {
                self.add_pointer(input);
                false
            }
            TouchPhase::Moved => self.move_pointer(input, camera, surface_w, surface_h),
            TouchPhase::Ended => {
                self.remove_pointer(input.id);
                false
            }
            TouchPhase::Cancelled => {
                self.pointers.clear();
                false
            }
        }
    }

    fn add_pointer(&mut self, input: PointerInput) {
        match self.pointers.iter_mut().find(|p| p.id == input.id) {
            // A repeated Started for a live id is treated as a resync.
            Some(p) => {
                p.x = input.x;
                p.y = input.y;
            }
            None => self.pointers.push(TrackedPointer {
                id: input.id,
                x: input.x,
                y: input.y,
            }),
        }
        self.resync();
    }

    fn remove_pointer(&mut self, id: u64) {
        self.pointers.retain(|p| p.id != id);
        self.resync();
    }

    /// Re-anchors rotate, pan and pinch references to the current pointer
    /// positions.
    fn resync(&mut self) {
        if let Some(first) = self.pointers.first() {
            self.anchor = (first.x, first.y);
        }
        if self.pointers.len() >= 2 {
            self.midpoint = self.current_midpoint();
            self.separation = self.current_separation();
        }
    }

    fn move_pointer(
        &mut self,
        input: PointerInput,
        camera: &mut Camera,
        surface_w: f32,
        surface_h: f32,
    ) -> bool {
        let Some(p) = self.pointers.iter_mut().find(|p| p.id == input.id) else {
            // Moves for ids we never saw a Started for are dropped.
            return false;
        };
        p.x = input.x;
        p.y = input.y;

        if self.pointers.len() >= 2 {
            let mid = self.current_midpoint();
            let (dx, dy) = (mid.0 - self.midpoint.0, mid.1 - self.midpoint.1);
            self.midpoint = mid;
            camera.pan(dx, dy, surface_w, surface_h);

            let sep = self.current_separation();
            if self.separation > MIN_PINCH_SEPARATION && sep > MIN_PINCH_SEPARATION {
                camera.zoom_by(sep / self.separation);
            }
            self.separation = sep;
            true
        } else {
            let (dx, dy) = (input.x - self.anchor.0, input.y - self.anchor.1);
            self.anchor = (input.x, input.y);
            camera.rotate(dx * ROTATE_SENSITIVITY, dy * ROTATE_SENSITIVITY);
            dx != 0.0 || dy != 0.0
        }
    }

    /// Midpoint of the first two pointers; later pointers ride along
    /// without steering.
    fn current_midpoint(&self) -> (f32, f32) {
        let (a, b) = (&self.pointers[0], &self.pointers[1]);
        ((a.x + b.x) * 0.5, (a.y + b.y) * 0.5)
    }

    fn current_separation(&self) -> f32 {
        let (a, b) = (&self.pointers[0], &self.pointers[1]);
        (a.x - b.x).hypot(a.y - b.y)
    }
}
