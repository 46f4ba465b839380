use crate::{Field2, Grid2, Vec2, Vec3};

/// Two-component vector grid stored as separate scalar planes.
#[derive(Clone, Debug, PartialEq)]
pub struct VecField2 {
    u: Field2,
    v: Field2,
}

impl VecField2 {
    pub fn new(grid: Grid2, fill: Vec2) -> Self {
        Self {
            u: Field2::new(grid, fill.x),
            v: Field2::new(grid, fill.y),
        }
    }

    pub fn from_fn(grid: Grid2, f: impl Fn(usize, usize) -> Vec2 + Sync) -> Self {
        let mut field = Self::new(grid, Vec2::zero());
        field.fill_with_index(f);
        field
    }

    pub fn grid(&self) -> Grid2 {
        self.u.grid()
    }

    pub fn get(&self, x: usize, y: usize) -> Vec2 {
        Vec2::new(self.u.get(x, y), self.v.get(x, y))
    }

    pub fn u(&self) -> &Field2 {
        &self.u
    }

    pub fn v(&self) -> &Field2 {
        &self.v
    }

    pub fn sample_linear(&self, pos: (f32, f32)) -> Vec2 {
        Vec2::new(self.u.sample_linear(pos), self.v.sample_linear(pos))
    }

    pub fn fill(&mut self, value: Vec2) {
        self.u.fill(value.x);
        self.v.fill(value.y);
    }

    pub fn fill_with_index(&mut self, f: impl Fn(usize, usize) -> Vec2 + Sync) {
        self.u.fill_with_index(|x, y| f(x, y).x);
        self.v.fill_with_index(|x, y| f(x, y).y);
    }

    pub fn max_abs(&self) -> f32 {
        self.u.max_abs().max(self.v.max_abs())
    }
}

/// Three-component color grid used for the dye tracer.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorField2 {
    r: Field2,
    g: Field2,
    b: Field2,
}

impl ColorField2 {
    pub fn new(grid: Grid2, fill: Vec3) -> Self {
        Self {
            r: Field2::new(grid, fill.x),
            g: Field2::new(grid, fill.y),
            b: Field2::new(grid, fill.z),
        }
    }

    pub fn from_fn(grid: Grid2, f: impl Fn(usize, usize) -> Vec3 + Sync) -> Self {
        let mut field = Self::new(grid, Vec3::zero());
        field.fill_with_index(f);
        field
    }

    pub fn grid(&self) -> Grid2 {
        self.r.grid()
    }

    pub fn get(&self, x: usize, y: usize) -> Vec3 {
        Vec3::new(self.r.get(x, y), self.g.get(x, y), self.b.get(x, y))
    }

    pub fn r(&self) -> &Field2 {
        &self.r
    }

    pub fn g(&self) -> &Field2 {
        &self.g
    }

    pub fn b(&self) -> &Field2 {
        &self.b
    }

    pub fn sample_linear(&self, pos: (f32, f32)) -> Vec3 {
        Vec3::new(
            self.r.sample_linear(pos),
            self.g.sample_linear(pos),
            self.b.sample_linear(pos),
        )
    }

    pub fn fill(&mut self, value: Vec3) {
        self.r.fill(value.x);
        self.g.fill(value.y);
        self.b.fill(value.z);
    }

    pub fn fill_with_index(&mut self, f: impl Fn(usize, usize) -> Vec3 + Sync) {
        self.r.fill_with_index(|x, y| f(x, y).x);
        self.g.fill_with_index(|x, y| f(x, y).y);
        self.b.fill_with_index(|x, y| f(x, y).z);
    }

    /// Total dye mass across all channels and cells.
    pub fn total(&self) -> f32 {
        self.r.sum() + self.g.sum() + self.b.sum()
    }
}
