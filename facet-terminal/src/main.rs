/// Facet terminal viewer
///
/// Usage: facet [path/to/model.stl]
///
/// With no argument a demo cube is shown. STL files load on a background
/// thread and appear as soon as they decode; the most recent load wins.
/// Logging goes to stderr via RUST_LOG so the drawing screen stays clean.
///
/// Controls:
///   - Left drag: orbit, Right drag: pan, Wheel: zoom
///   - w: shaded/wireframe, g: axes, r: reset view, 1-7: view presets
///   - Q/ESC: Quit

use std::{env, fs, io, thread};

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use facet_core::MeshModel;
use facet_terminal::TerminalApp;

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let mut app = TerminalApp::new()?;

    match env::args().nth(1) {
        Some(path) => {
            let slot = app.model_slot();
            thread::spawn(move || match fs::read(&path) {
                Ok(data) => match facet_core::decode(&data) {
                    Ok(model) => {
                        info!(
                            path = %path,
                            triangles = model.triangle_count(),
                            "loaded STL"
                        );
                        slot.publish(model);
                    }
                    Err(err) => error!(path = %path, %err, "could not decode STL"),
                },
                Err(err) => error!(path = %path, %err, "could not read STL"),
            });
        }
        None => app.set_model(MeshModel::cube(2.0)),
    }

    app.run()
}
