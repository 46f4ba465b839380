//! Pointer-driven injection. A splat adds a radially decaying impulse to the
//! velocity field and a colored impulse to the dye field at the pointer
//! position. Footprints are aspect-corrected so they stay circular in screen
//! space on non-square grids.

use crate::{ColorField2, Vec2, Vec3, VecField2};

/// Gaussian-like falloff for a normalized offset from the splat center.
/// `radius` acts as the variance; the x offset is stretched by the grid
/// aspect ratio before measuring distance.
pub(crate) fn splat_falloff(offset: Vec2, radius: f32, aspect: f32) -> f32 {
    let dx = offset.x * aspect;
    let dy = offset.y;
    (-(dx * dx + dy * dy) / radius).exp()
}

/// Write `base` plus a localized velocity impulse into `out`.
pub fn splat_vector_into(
    out: &mut VecField2,
    base: &VecField2,
    center: Vec2,
    delta: Vec2,
    radius: f32,
    aspect: f32,
) {
    let grid = out.grid();
    out.fill_with_index(|x, y| {
        let pos = grid.cell_center(x, y);
        let offset = Vec2::new(pos.0 - center.x, pos.1 - center.y);
        base.get(x, y)
            .add(delta.scale(splat_falloff(offset, radius, aspect)))
    });
}

/// Write `base` plus a localized dye impulse into `out`.
pub fn splat_color_into(
    out: &mut ColorField2,
    base: &ColorField2,
    center: Vec2,
    color: Vec3,
    radius: f32,
    aspect: f32,
) {
    let grid = out.grid();
    out.fill_with_index(|x, y| {
        let pos = grid.cell_center(x, y);
        let offset = Vec2::new(pos.0 - center.x, pos.1 - center.y);
        base.get(x, y)
            .add(color.scale(splat_falloff(offset, radius, aspect)))
    });
}

/// Per-pointer input state, fed once per tick before stepping.
///
/// `prev` only advances after injection consumes the sample, so the next
/// tick's displacement is measured from the post-injection position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerState {
    id: u64,
    pos: Vec2,
    prev: Vec2,
    active: bool,
}

impl PointerState {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            pos: Vec2::zero(),
            prev: Vec2::zero(),
            active: false,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    pub fn active(&self) -> bool {
        self.active
    }

    /// Record the current pointer position and down/up state. A press resets
    /// the previous position so the first frame of a drag has zero delta.
    pub fn sample(&mut self, pos: Vec2, active: bool) {
        if active && !self.active {
            self.prev = pos;
        }
        self.pos = pos;
        self.active = active;
    }

    /// Displacement since the last consumed sample.
    pub fn delta(&self) -> Vec2 {
        self.pos.sub(self.prev)
    }

    /// Consume the sample: the next delta is measured from here.
    pub fn advance(&mut self) {
        self.prev = self.pos;
    }
}
