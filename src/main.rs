use anyhow::{Context, Result};
use splat_sim::{
    divergence_into, render_rgba, Field2, FieldKind, FluidEngine, SimConfig, Vec2, Vec3,
};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const SIM_RESOLUTION: usize = 128;
const DYE_RESOLUTION: usize = 256;
const FRAMES: usize = 600;
const DT: f32 = 1.0 / 60.0;
const LOG_EVERY: usize = 60;

/// Scripted drag path covering the whole domain, so the demo exercises the
/// same injection route an interactive pointer would.
fn pointer_pos(frame: usize) -> Vec2 {
    let t = frame as f32 * DT;
    Vec2::new(
        0.5 + 0.35 * (1.7 * t).sin(),
        0.5 + 0.35 * (2.3 * t + 1.0).sin(),
    )
}

fn log_diagnostics(frame: usize, engine: &FluidEngine, scratch: &mut Field2) {
    divergence_into(scratch, engine.velocity());
    log::info!(
        "frame {frame}: max speed {:.4}, mean divergence {:.6}, dye total {:.2}",
        engine.velocity().max_abs(),
        scratch.mean_abs(),
        engine.dye().total()
    );
}

fn write_ppm(path: &Path, width: usize, height: usize, rgba: &[u8]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("creating output image {}", path.display()))?;
    let mut out = BufWriter::new(file);
    writeln!(out, "P6\n{width} {height}\n255")?;
    for pixel in rgba.chunks_exact(4) {
        out.write_all(&pixel[..3])?;
    }
    out.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let output = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "dye.ppm".to_string());

    let config = SimConfig::square(SIM_RESOLUTION, DYE_RESOLUTION);
    let mut engine = FluidEngine::configure(config).context("configuring fluid engine")?;
    let mut scratch = Field2::new(engine.sim_grid(), 0.0);

    // Seed a few splats so the very first frame is non-empty.
    engine.splat(
        Vec2::new(0.3, 0.5),
        Vec2::new(4.0, 1.0),
        Vec3::new(0.15, 0.02, 0.02),
    );
    engine.splat(
        Vec2::new(0.7, 0.5),
        Vec2::new(-4.0, -1.0),
        Vec3::new(0.02, 0.02, 0.15),
    );
    engine.splat(
        Vec2::new(0.5, 0.3),
        Vec2::new(0.0, 3.0),
        Vec3::new(0.02, 0.15, 0.02),
    );

    for frame in 0..FRAMES {
        // Lift the pointer now and then to exercise release and re-press.
        let active = frame % 150 < 120;
        engine.on_pointer_sample(pointer_pos(frame), active);
        engine.step(DT);
        if frame % LOG_EVERY == 0 {
            log_diagnostics(frame, &engine, &mut scratch);
        }
    }

    let mut rgba = Vec::new();
    render_rgba(&engine.field(FieldKind::Dye), &mut rgba);
    let grid = engine.dye_grid();
    write_ppm(Path::new(&output), grid.width(), grid.height(), &rgba)?;
    log::info!("wrote {output}");
    Ok(())
}
