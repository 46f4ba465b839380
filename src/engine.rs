use crate::display::{hsv_to_rgb, FieldKind, FieldRef};
use crate::double_buffer::DoubleBuffered;
use crate::splat::{splat_color_into, splat_vector_into, PointerState};
use crate::{stages, ColorField2, Field2, Grid2, Vec2, Vec3, VecField2};
use thiserror::Error;

pub const MAX_RESOLUTION: usize = 4096;
pub const MAX_PRESSURE_ITERATIONS: usize = 1000;

/// Dye splats use a tighter footprint than velocity splats so the injected
/// color reads as a dot inside the pushed region.
const DYE_RADIUS_SCALE: f32 = 0.5;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{label} resolution must be positive, got {width}x{height}")]
    ZeroResolution {
        label: &'static str,
        width: usize,
        height: usize,
    },
    #[error("{label} resolution {width}x{height} exceeds {limit} per axis")]
    ExcessiveResolution {
        label: &'static str,
        width: usize,
        height: usize,
        limit: usize,
    },
    #[error("invalid parameter: {0}")]
    InvalidParameter(#[from] ParamError),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("{param:?} must be in (0, 1], got {value}")]
    DissipationOutOfRange { param: Param, value: f32 },
    #[error("pressure iteration count must be an integer in [0, {MAX_PRESSURE_ITERATIONS}], got {value}")]
    InvalidIterationCount { value: f32 },
    #[error("{param:?} must be positive and finite, got {value}")]
    NotPositive { param: Param, value: f32 },
}

/// The closed set of tunable scalars. An unrecognized parameter name is
/// unrepresentable; `set_parameter` only has to range-check values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Param {
    VelocityDissipation,
    DyeDissipation,
    PressureIterations,
    SplatRadius,
    SplatForce,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimParams {
    /// Per-step retention factor for velocity, in (0, 1].
    pub velocity_dissipation: f32,
    /// Per-step retention factor for dye, in (0, 1].
    pub dye_dissipation: f32,
    /// Jacobi sweeps per step; more sweeps leave less residual divergence.
    pub pressure_iterations: usize,
    /// Splat footprint variance in normalized units.
    pub splat_radius: f32,
    /// Scale from pointer displacement to injected velocity.
    pub splat_force: f32,
}

fn check_dissipation(param: Param, value: f32) -> Result<(), ParamError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ParamError::DissipationOutOfRange { param, value })
    }
}

fn check_positive(param: Param, value: f32) -> Result<(), ParamError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ParamError::NotPositive { param, value })
    }
}

impl SimParams {
    /// Range checks shared by `configure` and `set_parameter`, so values
    /// supplied wholesale at construction obey the same bounds.
    pub fn validate(&self) -> Result<(), ParamError> {
        check_dissipation(Param::VelocityDissipation, self.velocity_dissipation)?;
        check_dissipation(Param::DyeDissipation, self.dye_dissipation)?;
        if self.pressure_iterations > MAX_PRESSURE_ITERATIONS {
            return Err(ParamError::InvalidIterationCount {
                value: self.pressure_iterations as f32,
            });
        }
        check_positive(Param::SplatRadius, self.splat_radius)?;
        check_positive(Param::SplatForce, self.splat_force)
    }
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            velocity_dissipation: 0.99,
            dye_dissipation: 0.98,
            pressure_iterations: 20,
            splat_radius: 0.0025,
            splat_force: 600.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimConfig {
    pub sim_width: usize,
    pub sim_height: usize,
    pub dye_width: usize,
    pub dye_height: usize,
    pub background: Vec3,
    pub params: SimParams,
}

impl SimConfig {
    /// Square simulation grid with a square dye grid, default parameters,
    /// black background.
    pub fn square(sim_resolution: usize, dye_resolution: usize) -> Self {
        Self {
            sim_width: sim_resolution,
            sim_height: sim_resolution,
            dye_width: dye_resolution,
            dye_height: dye_resolution,
            background: Vec3::zero(),
            params: SimParams::default(),
        }
    }
}

/// One engine instance owns every grid and all tuning state. All buffers are
/// allocated once in `configure` and reused for the engine's lifetime.
#[derive(Clone, Debug)]
pub struct FluidEngine {
    sim_grid: Grid2,
    dye_grid: Grid2,
    velocity: DoubleBuffered<VecField2>,
    pressure: DoubleBuffered<Field2>,
    dye: DoubleBuffered<ColorField2>,
    divergence: Field2,
    curl: Field2,
    params: SimParams,
    background: Vec3,
    pointers: Vec<PointerState>,
    paused: bool,
    splat_count: u64,
}

fn validate_resolution(
    label: &'static str,
    width: usize,
    height: usize,
) -> Result<Grid2, ConfigError> {
    if width == 0 || height == 0 {
        return Err(ConfigError::ZeroResolution {
            label,
            width,
            height,
        });
    }
    if width > MAX_RESOLUTION || height > MAX_RESOLUTION {
        return Err(ConfigError::ExcessiveResolution {
            label,
            width,
            height,
            limit: MAX_RESOLUTION,
        });
    }
    Ok(Grid2::new(width, height))
}

impl FluidEngine {
    pub fn configure(config: SimConfig) -> Result<Self, ConfigError> {
        let sim_grid = validate_resolution("simulation", config.sim_width, config.sim_height)?;
        let dye_grid = validate_resolution("dye", config.dye_width, config.dye_height)?;
        config.params.validate()?;
        log::info!(
            "configured fluid engine: sim {}x{}, dye {}x{}",
            sim_grid.width(),
            sim_grid.height(),
            dye_grid.width(),
            dye_grid.height()
        );
        Ok(Self {
            sim_grid,
            dye_grid,
            velocity: DoubleBuffered::filled(VecField2::new(sim_grid, Vec2::zero())),
            pressure: DoubleBuffered::filled(Field2::new(sim_grid, 0.0)),
            dye: DoubleBuffered::filled(ColorField2::new(dye_grid, config.background)),
            divergence: Field2::new(sim_grid, 0.0),
            curl: Field2::new(sim_grid, 0.0),
            params: config.params,
            background: config.background,
            pointers: Vec::new(),
            paused: false,
            splat_count: 0,
        })
    }

    pub fn sim_grid(&self) -> Grid2 {
        self.sim_grid
    }

    pub fn dye_grid(&self) -> Grid2 {
        self.dye_grid
    }

    pub fn params(&self) -> SimParams {
        self.params
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Feed the primary pointer's position and down/up state for this tick.
    pub fn on_pointer_sample(&mut self, pos: Vec2, active: bool) {
        self.on_pointer_sample_id(0, pos, active);
    }

    /// Multi-touch variant; each pointer id carries its own drag state.
    pub fn on_pointer_sample_id(&mut self, id: u64, pos: Vec2, active: bool) {
        match self.pointers.iter_mut().find(|pointer| pointer.id() == id) {
            Some(pointer) => pointer.sample(pos, active),
            None => {
                let mut pointer = PointerState::new(id);
                pointer.sample(pos, active);
                self.pointers.push(pointer);
            }
        }
    }

    pub fn set_parameter(&mut self, param: Param, value: f32) -> Result<(), ParamError> {
        match param {
            Param::VelocityDissipation | Param::DyeDissipation => {
                check_dissipation(param, value)?;
                if param == Param::VelocityDissipation {
                    self.params.velocity_dissipation = value;
                } else {
                    self.params.dye_dissipation = value;
                }
            }
            Param::PressureIterations => {
                let valid = value.is_finite()
                    && value >= 0.0
                    && value.fract() == 0.0
                    && value <= MAX_PRESSURE_ITERATIONS as f32;
                if !valid {
                    return Err(ParamError::InvalidIterationCount { value });
                }
                self.params.pressure_iterations = value as usize;
            }
            Param::SplatRadius | Param::SplatForce => {
                check_positive(param, value)?;
                if param == Param::SplatRadius {
                    self.params.splat_radius = value;
                } else {
                    self.params.splat_force = value;
                }
            }
        }
        log::debug!("parameter {param:?} set to {value}");
        Ok(())
    }

    /// Borrow the current read buffer of one of the displayable fields. The
    /// borrow must end before the next `step`, which the borrow checker
    /// enforces.
    pub fn field(&self, kind: FieldKind) -> FieldRef<'_> {
        match kind {
            FieldKind::Dye => FieldRef::Color(self.dye.read()),
            FieldKind::Velocity => FieldRef::Vector(self.velocity.read()),
            FieldKind::Pressure => FieldRef::Scalar(self.pressure.read()),
            FieldKind::Curl => FieldRef::Scalar(&self.curl),
        }
    }

    pub fn dye(&self) -> &ColorField2 {
        self.dye.read()
    }

    pub fn velocity(&self) -> &VecField2 {
        self.velocity.read()
    }

    pub fn pressure(&self) -> &Field2 {
        self.pressure.read()
    }

    pub fn curl(&self) -> &Field2 {
        &self.curl
    }

    /// Add a localized impulse to velocity and dye at a normalized position.
    /// Pointer injection routes through here; it is also the hook for
    /// scripted or random splats.
    pub fn splat(&mut self, pos: Vec2, velocity: Vec2, color: Vec3) {
        let radius = self.params.splat_radius;
        let aspect = self.sim_grid.aspect();
        {
            let (read, write) = self.velocity.split();
            splat_vector_into(write, read, pos, velocity, radius, aspect);
        }
        self.velocity.swap();
        {
            let (read, write) = self.dye.split();
            splat_color_into(write, read, pos, color, radius * DYE_RADIUS_SCALE, aspect);
        }
        self.dye.swap();
    }

    fn next_dye_color(&mut self) -> Vec3 {
        // Golden-ratio hue hop keeps consecutive splats visually distinct
        // without sampling the wall clock.
        const HUE_STEP: f32 = 0.618_034;
        let hue = (self.splat_count as f32 * HUE_STEP).fract();
        self.splat_count += 1;
        hsv_to_rgb(hue, 1.0, 1.0).scale(0.15)
    }

    fn inject(&mut self) {
        let force = self.params.splat_force;
        let mut impulses = Vec::new();
        for pointer in &mut self.pointers {
            if pointer.active() {
                impulses.push((pointer.pos(), pointer.delta().scale(force)));
            }
            pointer.advance();
        }
        // Released pointers have nothing left to contribute; a re-press
        // under the same id starts a fresh drag anyway.
        self.pointers.retain(|pointer| pointer.active());
        for (pos, impulse) in impulses {
            let color = self.next_dye_color();
            log::trace!("splat at ({:.3}, {:.3})", pos.x, pos.y);
            self.splat(pos, impulse, color);
        }
    }

    /// Advance one tick. Stages run in a fixed order; each consumes the
    /// previous stage's completed output. A paused engine leaves every
    /// buffer untouched.
    pub fn step(&mut self, dt: f32) {
        if self.paused {
            return;
        }
        self.inject();

        // Velocity self-advection.
        {
            let (read, write) = self.velocity.split();
            stages::advect_vector_into(write, read, read, dt, self.params.velocity_dissipation);
        }
        self.velocity.swap();

        // Dye rides the freshly advected velocity.
        {
            let (read, write) = self.dye.split();
            stages::advect_color_into(
                write,
                read,
                self.velocity.read(),
                dt,
                self.params.dye_dissipation,
            );
        }
        self.dye.swap();

        stages::divergence_into(&mut self.divergence, self.velocity.read());

        // No warm start: the solver begins from zero pressure every step.
        self.pressure.read_mut().fill(0.0);
        for _ in 0..self.params.pressure_iterations {
            let (read, write) = self.pressure.split();
            stages::pressure_jacobi_into(write, read, &self.divergence);
            self.pressure.swap();
        }

        {
            let (read, write) = self.velocity.split();
            stages::subtract_gradient_into(write, read, self.pressure.read());
        }
        self.velocity.swap();

        stages::curl_into(&mut self.curl, self.velocity.read());
    }

    /// Reset every field to its neutral value without reallocating.
    pub fn clear(&mut self) {
        let background = self.background;
        let (velocity_read, velocity_write) = self.velocity.both_mut();
        velocity_read.fill(Vec2::zero());
        velocity_write.fill(Vec2::zero());
        let (pressure_read, pressure_write) = self.pressure.both_mut();
        pressure_read.fill(0.0);
        pressure_write.fill(0.0);
        let (dye_read, dye_write) = self.dye.both_mut();
        dye_read.fill(background);
        dye_write.fill(background);
        self.divergence.fill(0.0);
        self.curl.fill(0.0);
        log::debug!("cleared all fields");
    }
}
