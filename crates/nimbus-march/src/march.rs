//! Fixed-step raymarch accumulating opacity through a density field.

use nimbus_geom::{Aabb, Ray, Vec3};

/// Anything that can report local density at a world point.
pub trait DensityField: Sync {
    fn density(&self, p: Vec3) -> f32;
}

impl<F: Fn(Vec3) -> f32 + Sync> DensityField for F {
    #[inline]
    fn density(&self, p: Vec3) -> f32 {
        self(p)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarchConfig {
    pub max_iterations: u32,
    /// Step length outside the region.
    pub interval: f32,
    /// Inside the region the step is `interval / inside_step_divisor`.
    pub inside_step_divisor: f32,
    /// Each inside sample adds `density / opacity_divisor`.
    pub opacity_divisor: f32,
}

impl Default for MarchConfig {
    fn default() -> Self {
        Self {
            max_iterations: 256,
            interval: 0.005,
            inside_step_divisor: 4.0,
            opacity_divisor: 5.0,
        }
    }
}

impl MarchConfig {
    #[inline]
    fn inside_step(&self) -> f32 {
        self.interval / self.inside_step_divisor
    }
}

/// Snapshot of a ray after a march iteration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayState {
    pub origin: Vec3,
    pub dir: Vec3,
    pub distance: f32,
    pub opacity: f32,
    pub iteration: u32,
}

impl RayState {
    fn start(ray: &Ray) -> Self {
        Self {
            origin: ray.origin,
            dir: ray.dir,
            distance: 0.0,
            opacity: 0.0,
            iteration: 0,
        }
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        Ray {
            origin: self.origin,
            dir: self.dir,
        }
        .at(self.distance)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MarchOutcome {
    /// Accumulated opacity clamped to [0,1].
    pub opacity: f32,
    pub iterations: u32,
    pub distance: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Raymarcher {
    pub config: MarchConfig,
}

impl Raymarcher {
    pub fn new(config: MarchConfig) -> Self {
        Self { config }
    }

    /// Iterates the march one step at a time. Ends at saturation or the iteration cap.
    pub fn steps<'a, F: DensityField + ?Sized>(
        &self,
        ray: Ray,
        region: Aabb,
        field: &'a F,
    ) -> Steps<'a, F> {
        Steps {
            config: self.config,
            region,
            field,
            state: RayState::start(&ray),
            done: false,
        }
    }

    pub fn march<F: DensityField + ?Sized>(&self, ray: Ray, region: Aabb, field: &F) -> MarchOutcome {
        let last = self
            .steps(ray, region, field)
            .last()
            .unwrap_or_else(|| RayState::start(&ray));
        MarchOutcome {
            opacity: last.opacity.min(1.0),
            iterations: last.iteration,
            distance: last.distance,
        }
    }
}

pub struct Steps<'a, F: ?Sized> {
    config: MarchConfig,
    region: Aabb,
    field: &'a F,
    state: RayState,
    done: bool,
}

impl<F: DensityField + ?Sized> Iterator for Steps<'_, F> {
    type Item = RayState;

    fn next(&mut self) -> Option<RayState> {
        if self.done || self.state.iteration >= self.config.max_iterations {
            return None;
        }
        let s = &mut self.state;
        s.iteration += 1;
        let p = s.position();
        if self.region.contains_strict(p) {
            s.opacity += self.field.density(p) / self.config.opacity_divisor;
            if s.opacity >= 1.0 {
                self.done = true;
                return Some(*s);
            }
            s.distance += self.config.inside_step();
        } else {
            s.distance += self.config.interval;
        }
        Some(*s)
    }
}
