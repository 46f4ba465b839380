use crate::{ColorField2, Field2, Grid2, Vec3, VecField2};

/// Which field the caller wants to look at. Dye is what an end user normally
/// sees; the rest are diagnostic views.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Dye,
    Velocity,
    Pressure,
    Curl,
}

/// Borrowed view of a displayable field's current read buffer.
pub enum FieldRef<'a> {
    Scalar(&'a Field2),
    Vector(&'a VecField2),
    Color(&'a ColorField2),
}

impl FieldRef<'_> {
    pub fn grid(&self) -> Grid2 {
        match self {
            FieldRef::Scalar(field) => field.grid(),
            FieldRef::Vector(field) => field.grid(),
            FieldRef::Color(field) => field.grid(),
        }
    }
}

pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Vec3 {
    let h = (h.fract() + 1.0).fract() * 6.0;
    let sector = h.floor();
    let f = h - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match sector as u32 % 6 {
        0 => Vec3::new(v, t, p),
        1 => Vec3::new(q, v, p),
        2 => Vec3::new(p, v, t),
        3 => Vec3::new(p, q, v),
        4 => Vec3::new(t, p, v),
        _ => Vec3::new(v, p, q),
    }
}

/// Diverging stops for signed fields: blue for negative, white near zero,
/// red for positive.
const DIVERGING_STOPS: [(f32, f32, f32); 3] = [
    (59.0, 76.0, 192.0),
    (221.0, 221.0, 221.0),
    (180.0, 4.0, 38.0),
];

/// Map a signed value in [-1, 1] onto the diverging palette.
pub fn diverging_rgba(t: f32) -> [u8; 4] {
    let t = t.clamp(-1.0, 1.0);
    let (from, to, s) = if t < 0.0 {
        (DIVERGING_STOPS[0], DIVERGING_STOPS[1], t + 1.0)
    } else {
        (DIVERGING_STOPS[1], DIVERGING_STOPS[2], t)
    };
    [
        (from.0 + s * (to.0 - from.0)) as u8,
        (from.1 + s * (to.1 - from.1)) as u8,
        (from.2 + s * (to.2 - from.2)) as u8,
        255,
    ]
}

fn channel(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0) as u8
}

/// Colorize a field into a row-major RGBA8 buffer, one pixel per cell. Dye
/// channels map directly; velocity shows speed on the warm half of the
/// palette; pressure and curl show sign. Signed and magnitude views are
/// normalized per frame by the field's own peak.
pub fn render_rgba(field: &FieldRef<'_>, out: &mut Vec<u8>) {
    let grid = field.grid();
    out.clear();
    out.reserve(grid.size() * 4);
    match field {
        FieldRef::Color(dye) => {
            for y in 0..grid.height() {
                for x in 0..grid.width() {
                    let color = dye.get(x, y);
                    out.extend_from_slice(&[
                        channel(color.x),
                        channel(color.y),
                        channel(color.z),
                        255,
                    ]);
                }
            }
        }
        FieldRef::Vector(vel) => {
            let peak = vel.max_abs();
            let scale = if peak > 0.0 { 1.0 / peak } else { 0.0 };
            for y in 0..grid.height() {
                for x in 0..grid.width() {
                    let speed = vel.get(x, y).length() * scale;
                    out.extend_from_slice(&diverging_rgba(speed));
                }
            }
        }
        FieldRef::Scalar(values) => {
            let peak = values.max_abs();
            let scale = if peak > 0.0 { 1.0 / peak } else { 0.0 };
            for y in 0..grid.height() {
                for x in 0..grid.width() {
                    out.extend_from_slice(&diverging_rgba(values.get(x, y) * scale));
                }
            }
        }
    }
}
