/// Facet Core Library - STL ingestion and the software viewer pipeline
///
/// This library decodes STL buffers into normalized mesh models and renders
/// them through an orbit camera, a perspective projector, and a painter's
/// algorithm rasterizer that draws onto any Canvas implementation. Pointer
/// gestures and the viewer facade live here too; frontends only supply a
/// Canvas and an event source.

pub mod camera;
pub mod gesture;
pub mod mesh;
pub mod projection;
pub mod raster;
pub mod stl;
pub mod viewer;

// Re-export commonly used types
pub use camera::{Camera, ViewPreset, MAX_ZOOM, MIN_ZOOM};
pub use gesture::{GestureController, PointerInput, TouchPhase};
pub use mesh::{Bounds, MeshModel};
pub use projection::{FrameTransform, RenderScratch};
pub use raster::{Canvas, RenderMode, Rgb};
pub use stl::{decode, DecodeError};
pub use viewer::{ModelSlot, ViewerSurface};
