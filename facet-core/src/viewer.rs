/// Viewer facade: model mailbox, camera, and the per-frame render pass
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::camera::{Camera, ViewPreset};
use crate::gesture::{GestureController, PointerInput};
use crate::mesh::MeshModel;
use crate::projection::{FrameTransform, RenderScratch};
use crate::raster::{self, Canvas, RenderMode, BACKGROUND};

/// Surfaces at or below this many pixels on a side only get cleared.
const MIN_SURFACE: f32 = 2.0;

/// Single-slot hand-off for decoded meshes.
///
/// Publishing replaces whatever is queued, so only the most recent model
/// survives; the viewer drains the slot at the start of each render pass.
/// Clones share the slot and the handle is safe to move across threads.
#[derive(Clone, Default)]
pub struct ModelSlot {
    inner: Arc<Mutex<Option<MeshModel>>>,
}

impl ModelSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, model: MeshModel) {
        *self.inner.lock() = Some(model);
    }

    pub fn take(&self) -> Option<MeshModel> {
        self.inner.lock().take()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_none()
    }
}

/// Owns everything one viewer needs: the displayed model, camera and
/// gesture state, the projection scratch, and the inbox for new models.
///
/// All methods run on the frame thread; only [`ViewerSurface::model_slot`]
/// hands out something other threads may touch.
pub struct ViewerSurface {
    camera: Camera,
    gestures: GestureController,
    scratch: RenderScratch,
    inbox: ModelSlot,
    model: Option<MeshModel>,
    mode: RenderMode,
    axes_visible: bool,
    width: f32,
    height: f32,
}

impl ViewerSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            camera: Camera::new(),
            gestures: GestureController::new(),
            scratch: RenderScratch::new(),
            inbox: ModelSlot::new(),
            model: None,
            mode: RenderMode::Shaded,
            axes_visible: true,
            width: width as f32,
            height: height as f32,
        }
    }

    /// Handle for publishing models from loader threads.
    pub fn model_slot(&self) -> ModelSlot {
        self.inbox.clone()
    }

    /// Queues a model for the next frame. Equivalent to publishing on
    /// [`ViewerSurface::model_slot`].
    pub fn set_model(&mut self, model: MeshModel) {
        self.inbox.publish(model);
    }

    /// The model currently on screen.
    pub fn model(&self) -> Option<&MeshModel> {
        self.model.as_ref()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn render_mode(&self) -> RenderMode {
        self.mode
    }

    pub fn set_render_mode(&mut self, mode: RenderMode) {
        self.mode = mode;
    }

    pub fn axes_visible(&self) -> bool {
        self.axes_visible
    }

    pub fn set_axes_visible(&mut self, visible: bool) {
        self.axes_visible = visible;
    }

    pub fn set_view_preset(&mut self, preset: ViewPreset) {
        self.camera.apply_preset(preset);
    }

    pub fn reset_camera(&mut self) {
        self.camera.reset();
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width as f32;
        self.height = height as f32;
    }

    /// Routes a pointer event through gesture recognition. Returns true
    /// when the camera changed and the surface needs a redraw.
    pub fn pointer_event(&mut self, input: PointerInput) -> bool {
        self.gestures
            .handle(input, &mut self.camera, self.width, self.height)
    }

    /// Renders one frame: swap in any pending model, clear, then draw the
    /// gizmo and the model. Surfaces below the minimum size stay blank.
    pub fn render<C: Canvas>(&mut self, canvas: &mut C) {
        if let Some(model) = self.inbox.take() {
            debug!(triangles = model.triangle_count(), "showing new model");
            self.camera.reset();
            self.model = Some(model);
        }

        canvas.clear(BACKGROUND);
        if self.width <= MIN_SURFACE || self.height <= MIN_SURFACE {
            return;
        }

        let frame = FrameTransform::new(&self.camera, self.width, self.height);
        if self.axes_visible {
            raster::draw_axes(canvas, &frame);
        }
        if let Some(model) = &self.model {
            frame.project_model(model, &mut self.scratch);
            raster::draw_model(canvas, &mut self.scratch, self.mode);
        }
    }
}
