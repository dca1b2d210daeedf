//! Deterministic synthetic scenes: one marker on a flat background.
//!
//! Pixel `(x, y)` covers the square `[x - 0.5, x + 0.5] × [y - 0.5, y + 0.5]`
//! and is shaded by supersampling that square, so rotated markers get
//! anti-aliased edges. With the default centre, an axis-aligned marker of
//! integer size covers whole pixels only.
use crate::dictionary::ARUCO_4X4_50;
use image::{Rgb, RgbImage};
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SceneSpec {
    pub width: usize,
    pub height: usize,
    pub marker_id: u16,
    /// Marker edge length in pixels, border included
    pub marker_px: f32,
    /// Marker centre; defaults to the image centre
    pub center: Option<[f32; 2]>,
    /// In-plane rotation, clockwise on screen
    pub rotation_deg: f32,
    pub background: u8,
    pub ink: u8,
    /// Samples per pixel along each axis
    pub supersample: usize,
}

impl Default for SceneSpec {
    fn default() -> Self {
        Self {
            width: 400,
            height: 300,
            marker_id: 0,
            marker_px: 80.0,
            center: None,
            rotation_deg: 0.0,
            background: 255,
            ink: 0,
            supersample: 4,
        }
    }
}

impl SceneSpec {
    pub fn center(&self) -> [f32; 2] {
        self.center.unwrap_or([
            (self.width as f32 - 1.0) / 2.0,
            (self.height as f32 - 1.0) / 2.0,
        ])
    }

    /// Ideal marker corners (continuous coordinates), clockwise from the
    /// marker's top-left.
    pub fn marker_corners(&self) -> [[f32; 2]; 4] {
        let [cx, cy] = self.center();
        let half = self.marker_px / 2.0;
        let (s, c) = self.rotation_deg.to_radians().sin_cos();
        let local = [[-half, -half], [half, -half], [half, half], [-half, half]];
        local.map(|[u, v]| [cx + u * c - v * s, cy + u * s + v * c])
    }
}

/// Render the scene described by `spec`.
pub fn render_scene(spec: &SceneSpec) -> Result<RgbImage, String> {
    if spec.width == 0 || spec.height == 0 {
        return Err("Failed to render scene: empty image".to_string());
    }
    if !(spec.marker_px.is_finite() && spec.marker_px > 0.0) {
        return Err(format!(
            "Failed to render scene: invalid marker size {}",
            spec.marker_px
        ));
    }
    let code = ARUCO_4X4_50
        .code(spec.marker_id)
        .ok_or_else(|| format!("Failed to render scene: unknown marker id {}", spec.marker_id))?;
    let n = ARUCO_4X4_50.marker_bits;
    let cells = ARUCO_4X4_50.total_cells();
    let cell = spec.marker_px / cells as f32;
    let half = spec.marker_px / 2.0;
    let [cx, cy] = spec.center();
    let (sin, cos) = spec.rotation_deg.to_radians().sin_cos();
    let ss = spec.supersample.max(1);
    let bg = spec.background as f32;
    let ink = spec.ink as f32;

    // 1.0 for white, 0.0 for ink, None outside the marker
    let shade = |x: f32, y: f32| -> Option<f32> {
        let (dx, dy) = (x - cx, y - cy);
        let u = dx * cos + dy * sin + half;
        let v = -dx * sin + dy * cos + half;
        if u < 0.0 || v < 0.0 || u >= spec.marker_px || v >= spec.marker_px {
            return None;
        }
        let col = ((u / cell) as usize).min(cells - 1);
        let row = ((v / cell) as usize).min(cells - 1);
        let payload = col >= 1 && row >= 1 && col <= n && row <= n;
        let white = payload && (code >> ((row - 1) * n + (col - 1))) & 1 == 1;
        Some(if white { 1.0 } else { 0.0 })
    };

    let img = RgbImage::from_fn(spec.width as u32, spec.height as u32, |px, py| {
        let mut acc = 0.0f32;
        for j in 0..ss {
            let y = py as f32 - 0.5 + (j as f32 + 0.5) / ss as f32;
            for i in 0..ss {
                let x = px as f32 - 0.5 + (i as f32 + 0.5) / ss as f32;
                acc += match shade(x, y) {
                    Some(t) => ink + t * (bg - ink),
                    None => bg,
                };
            }
        }
        let v = (acc / (ss * ss) as f32 + 0.5).clamp(0.0, 255.0) as u8;
        Rgb([v, v, v])
    });
    Ok(img)
}
