//! Per-pixel camera rays and a rayon-parallel opacity render.

use std::time::Instant;

use nimbus_geom::{Aabb, Ray, Vec3};
use rayon::prelude::*;

use crate::march::{DensityField, Raymarcher};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameSpec {
    pub width: usize,
    pub height: usize,
    pub camera: Vec3,
}

impl Default for FrameSpec {
    fn default() -> Self {
        Self {
            width: 320,
            height: 180,
            camera: Vec3::new(0.0, 0.0, 2.0),
        }
    }
}

/// Camera ray through the center of pixel `(col, row)`, row 0 at the top.
/// Looks down -z with a vertical field of view of 90°.
pub fn pixel_ray(spec: &FrameSpec, col: usize, row: usize) -> Ray {
    let w = spec.width as f32;
    let h = spec.height as f32;
    let fx = col as f32 + 0.5;
    let fy = h - row as f32 - 0.5;
    let u = (2.0 * fx - w) / h;
    let v = (2.0 * fy - h) / h;
    Ray::new(spec.camera, Vec3::new(u, v, -1.0))
}

/// Row-major opacities in [0,1], row 0 at the top.
#[derive(Clone, Debug, PartialEq)]
pub struct OpacityImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
}

impl OpacityImage {
    pub fn mean(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.data.iter().sum::<f32>() / self.data.len() as f32
    }

    /// White cloud darkened by `exp(-absorption·opacity)`, alpha = opacity.
    pub fn to_rgba8(&self, light_absorption: f32) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.data.len() * 4);
        for &o in &self.data {
            let o = o.clamp(0.0, 1.0);
            let gray = (-light_absorption.max(0.0) * o).exp();
            let g = (gray * 255.0).round() as u8;
            out.extend_from_slice(&[g, g, g, (o * 255.0).round() as u8]);
        }
        out
    }
}

pub fn render_frame<F: DensityField + ?Sized>(
    spec: &FrameSpec,
    region: Aabb,
    field: &F,
    marcher: &Raymarcher,
) -> OpacityImage {
    let start = Instant::now();
    let mut data = vec![0.0_f32; spec.width * spec.height];
    if spec.width > 0 {
        data.par_chunks_mut(spec.width)
            .enumerate()
            .for_each(|(row, line)| {
                for (col, px) in line.iter_mut().enumerate() {
                    let ray = pixel_ray(spec, col, row);
                    *px = marcher.march(ray, region, field).opacity;
                }
            });
    }
    log::info!(
        target: "render",
        "rendered {}x{} frame in {:.2?}",
        spec.width,
        spec.height,
        start.elapsed()
    );
    OpacityImage {
        width: spec.width,
        height: spec.height,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_pixel_looks_forward() {
        let spec = FrameSpec {
            width: 3,
            height: 3,
            ..FrameSpec::default()
        };
        let r = pixel_ray(&spec, 1, 1);
        assert_eq!(r.dir, Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(r.origin, spec.camera);
    }

    #[test]
    fn top_row_points_up() {
        let spec = FrameSpec {
            width: 4,
            height: 2,
            ..FrameSpec::default()
        };
        assert!(pixel_ray(&spec, 0, 0).dir.y > 0.0);
        assert!(pixel_ray(&spec, 0, 1).dir.y < 0.0);
        assert!(pixel_ray(&spec, 0, 0).dir.x < 0.0);
        assert!(pixel_ray(&spec, 3, 0).dir.x > 0.0);
        assert!((pixel_ray(&spec, 2, 1).dir.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn dense_box_in_front_of_camera_is_opaque() {
        let spec = FrameSpec {
            width: 8,
            height: 6,
            camera: Vec3::new(0.0, 0.0, 0.5),
        };
        let region = Aabb::new(Vec3::new(-10.0, -10.0, -10.0), Vec3::new(10.0, 10.0, 10.0));
        let img = render_frame(&spec, region, &|_p: Vec3| 5.0_f32, &Raymarcher::default());
        assert_eq!(img.data.len(), 48);
        assert!(img.data.iter().all(|&o| o == 1.0));
        assert_eq!(img.mean(), 1.0);
    }

    #[test]
    fn empty_frame() {
        let spec = FrameSpec {
            width: 0,
            height: 0,
            ..FrameSpec::default()
        };
        let region = Aabb::new(Vec3::ZERO, Vec3::new(1.0, 1.0, 1.0));
        let img = render_frame(&spec, region, &|_p: Vec3| 1.0_f32, &Raymarcher::default());
        assert!(img.data.is_empty());
        assert_eq!(img.mean(), 0.0);
    }

    #[test]
    fn shading_maps_opacity_to_gray_and_alpha() {
        let img = OpacityImage {
            width: 2,
            height: 1,
            data: vec![0.0, 1.0],
        };
        let px = img.to_rgba8(1.0);
        assert_eq!(&px[..4], &[255, 255, 255, 0]);
        // exp(-1) ≈ 0.3679
        assert_eq!(&px[4..], &[94, 94, 94, 255]);
        assert_eq!(&img.to_rgba8(0.0)[4..], &[255, 255, 255, 255]);
    }
}
