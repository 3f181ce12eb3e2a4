/// Terminal frontend driving a viewer surface with keyboard and mouse
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, MouseButton,
        MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal,
};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

use facet_core::{
    MeshModel, ModelSlot, PointerInput, RenderMode, TouchPhase, ViewPreset, ViewerSurface,
};

pub mod canvas;

pub use canvas::PixelCanvas;

/// Pixel separation of the synthesized pointer pair used for right-drag
/// panning; constant separation means pan without zoom.
const PAN_PAIR_SPACING: f32 = 24.0;
/// Half-width of the synthesized pinch around the cursor.
const PINCH_SPAN: f32 = 20.0;
/// Zoom ratio per scroll-wheel tick.
const SCROLL_ZOOM_STEP: f32 = 1.1;

/// Pointer ids for the synthesized mouse gestures.
const LEFT_POINTER: u64 = 0;
const PAN_POINTER_A: u64 = 1;
const PAN_POINTER_B: u64 = 2;
const PINCH_POINTER_A: u64 = 3;
const PINCH_POINTER_B: u64 = 4;

/// Main application struct for the terminal viewer
pub struct TerminalApp {
    surface: ViewerSurface,
    canvas: PixelCanvas,
    running: bool,
    left_drag: bool,
    right_drag: bool,
    last_fps_sample: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new() -> io::Result<Self> {
        let (cols, rows) = terminal::size()?;
        let canvas = PixelCanvas::new(cols, rows);
        let surface = ViewerSurface::new(canvas.width() as u32, canvas.height() as u32);

        Ok(Self {
            surface,
            canvas,
            running: true,
            left_drag: false,
            right_drag: false,
            last_fps_sample: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    /// Mailbox handle for loader threads.
    pub fn model_slot(&self) -> ModelSlot {
        self.surface.model_slot()
    }

    /// Queues a model for the next frame.
    pub fn set_model(&mut self, model: MeshModel) {
        self.surface.set_model(model);
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            cursor::Hide,
            EnableMouseCapture
        )?;

        let result = self.main_loop();

        // Cleanup
        execute!(
            stdout(),
            DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            // Drain all pending input before drawing
            while event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?);
            }

            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_fps_sample).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_fps_sample).as_secs_f32();
                self.frame_count = 0;
                self.last_fps_sample = now;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, ev: Event) {
        match ev {
            Event::Key(KeyEvent { code, .. }) => self.handle_key(code),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(cols, rows) => {
                self.canvas.resize(cols, rows);
                self.surface
                    .resize(self.canvas.width() as u32, self.canvas.height() as u32);
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.running = false;
            }
            KeyCode::Char('w') => {
                let next = match self.surface.render_mode() {
                    RenderMode::Shaded => RenderMode::Wireframe,
                    RenderMode::Wireframe => RenderMode::Shaded,
                };
                self.surface.set_render_mode(next);
            }
            KeyCode::Char('g') => {
                let visible = self.surface.axes_visible();
                self.surface.set_axes_visible(!visible);
            }
            KeyCode::Char('r') => self.surface.reset_camera(),
            KeyCode::Char('1') => self.surface.set_view_preset(ViewPreset::Isometric),
            KeyCode::Char('2') => self.surface.set_view_preset(ViewPreset::PosX),
            KeyCode::Char('3') => self.surface.set_view_preset(ViewPreset::NegX),
            KeyCode::Char('4') => self.surface.set_view_preset(ViewPreset::PosY),
            KeyCode::Char('5') => self.surface.set_view_preset(ViewPreset::NegY),
            KeyCode::Char('6') => self.surface.set_view_preset(ViewPreset::PosZ),
            KeyCode::Char('7') => self.surface.set_view_preset(ViewPreset::NegZ),
            _ => {}
        }
    }

    /// Maps mouse input onto the pointer vocabulary: left drag is a single
    /// orbiting pointer, right drag a rigid two-pointer pan, and the wheel
    /// a short synthesized pinch.
    fn handle_mouse(&mut self, mouse: MouseEvent) {
        // Cell rows are two pixels tall
        let x = mouse.column as f32;
        let y = mouse.row as f32 * 2.0;
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.left_drag = true;
                self.pointer(LEFT_POINTER, TouchPhase::Started, x, y);
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if self.left_drag {
                    self.pointer(LEFT_POINTER, TouchPhase::Moved, x, y);
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if self.left_drag {
                    self.pointer(LEFT_POINTER, TouchPhase::Ended, x, y);
                }
                self.left_drag = false;
            }
            MouseEventKind::Down(MouseButton::Right) => {
                self.right_drag = true;
                self.pointer(PAN_POINTER_A, TouchPhase::Started, x, y);
                self.pointer(PAN_POINTER_B, TouchPhase::Started, x + PAN_PAIR_SPACING, y);
            }
            MouseEventKind::Drag(MouseButton::Right) => {
                if self.right_drag {
                    self.pointer(PAN_POINTER_A, TouchPhase::Moved, x, y);
                    self.pointer(PAN_POINTER_B, TouchPhase::Moved, x + PAN_PAIR_SPACING, y);
                }
            }
            MouseEventKind::Up(MouseButton::Right) => {
                if self.right_drag {
                    self.pointer(PAN_POINTER_B, TouchPhase::Ended, x + PAN_PAIR_SPACING, y);
                    self.pointer(PAN_POINTER_A, TouchPhase::Ended, x, y);
                }
                self.right_drag = false;
            }
            MouseEventKind::ScrollUp => self.scroll_zoom(x, y, SCROLL_ZOOM_STEP),
            MouseEventKind::ScrollDown => self.scroll_zoom(x, y, 1.0 / SCROLL_ZOOM_STEP),
            _ => {}
        }
    }

    /// Synthesizes a complete pinch around the cursor so wheel zoom rides
    /// the same gesture path as touch input. The pointer pair opens or
    /// closes by `ratio` and lifts again within one event.
    fn scroll_zoom(&mut self, x: f32, y: f32, ratio: f32) {
        if self.left_drag || self.right_drag {
            return;
        }
        self.pointer(PINCH_POINTER_A, TouchPhase::Started, x - PINCH_SPAN, y);
        self.pointer(PINCH_POINTER_B, TouchPhase::Started, x + PINCH_SPAN, y);
        self.pointer(PINCH_POINTER_A, TouchPhase::Moved, x - PINCH_SPAN * ratio, y);
        self.pointer(PINCH_POINTER_B, TouchPhase::Moved, x + PINCH_SPAN * ratio, y);
        self.pointer(PINCH_POINTER_B, TouchPhase::Ended, x + PINCH_SPAN * ratio, y);
        self.pointer(PINCH_POINTER_A, TouchPhase::Ended, x - PINCH_SPAN * ratio, y);
    }

    fn pointer(&mut self, id: u64, phase: TouchPhase, x: f32, y: f32) {
        self.surface.pointer_event(PointerInput { id, phase, x, y });
    }

    fn render(&mut self) -> io::Result<()> {
        self.surface.render(&mut self.canvas);

        let mut stdout = stdout();
        self.canvas.present(&mut stdout)?;

        // Status overlay on the top row
        let mode = match self.surface.render_mode() {
            RenderMode::Shaded => "shaded",
            RenderMode::Wireframe => "wire",
        };
        let triangles = self
            .surface
            .model()
            .map_or(0, |model| model.triangle_count());
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "facet | {triangles} tris | {mode} | {:.1} fps | drag=orbit right=pan wheel=zoom w=mode g=axes r=reset 1-7=views q=quit",
                self.fps
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}
