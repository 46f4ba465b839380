mod display;
mod double_buffer;
mod engine;
mod field;
mod grid;
mod splat;
mod stages;
mod vec2;
mod vec_field;

pub use display::{diverging_rgba, hsv_to_rgb, render_rgba, FieldKind, FieldRef};
pub use double_buffer::DoubleBuffered;
pub use engine::{
    ConfigError, FluidEngine, Param, ParamError, SimConfig, SimParams, MAX_PRESSURE_ITERATIONS,
    MAX_RESOLUTION,
};
pub use field::Field2;
pub use grid::Grid2;
pub use splat::{splat_color_into, splat_vector_into, PointerState};
pub use stages::{
    advect_color_into, advect_vector_into, curl_into, divergence_into, pressure_jacobi_into,
    subtract_gradient_into,
};
pub use vec2::{Vec2, Vec3};
pub use vec_field::{ColorField2, VecField2};
