//! Core rendering functions
//! Triangle rasterization with depth test and optional MSAA

use macroquad::logging::{debug, info};
use thiserror::Error;

use super::buffer::Framebuffer;
use super::math::{barycentric, Mat4, Vec3};
use super::params::{ParamError, RenderParams};
use super::transform::{mvp_matrix, DepthRange, Viewport};
use super::types::Triangle;
use crate::scene::{Scene, SceneError};

/// Barycentric weights this far below zero still count as inside, so
/// shared edges don't leave cracks from rounding
const INSIDE_EPSILON: f64 = -1e-9;

/// Below this |signed area| (pixels squared, doubled) nothing is drawn
const DEGENERATE_AREA: f64 = 1e-9;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid render parameters: {0}")]
    Params(#[from] ParamError),

    #[error("invalid scene: {0}")]
    Scene(#[from] SceneError),
}

/// Anti-aliasing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AntiAlias {
    /// One sample at the pixel center
    Off,
    /// n x n samples per pixel
    Msaa(u32),
}

impl AntiAlias {
    /// 0 turns anti-aliasing off, anything else is the grid dimension
    pub fn from_factor(n: u32) -> Self {
        match n {
            0 => AntiAlias::Off,
            n => AntiAlias::Msaa(n),
        }
    }

    pub fn samples_per_pixel(self) -> u64 {
        match self {
            AntiAlias::Off => 1,
            AntiAlias::Msaa(n) => n as u64 * n as u64,
        }
    }

    pub fn label(self) -> String {
        match self {
            AntiAlias::Off => "Off".to_string(),
            AntiAlias::Msaa(_) => format!("MSAA {}x", self.samples_per_pixel()),
        }
    }
}

/// What happened to one triangle during a render pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriangleOutcome {
    /// Rasterized; `pixels` is how many cells it won the depth test for
    Drawn { pixels: usize },
    /// Zero area or zero w; covers nothing
    Degenerate,
    /// A vertex fell outside the near/far depth range
    Rejected,
}

/// Per-pass counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub triangles: usize,
    pub drawn: usize,
    pub degenerate: usize,
    pub rejected: usize,
    pub pixels_written: usize,
    /// Coverage samples taken per scanned pixel
    pub samples_per_pixel: u64,
}

impl RenderStats {
    fn record(&mut self, outcome: TriangleOutcome) {
        self.triangles += 1;
        match outcome {
            TriangleOutcome::Drawn { pixels } => {
                self.drawn += 1;
                self.pixels_written += pixels;
            }
            TriangleOutcome::Degenerate => self.degenerate += 1,
            TriangleOutcome::Rejected => self.rejected += 1,
        }
    }
}

/// Result of a render pass
#[derive(Debug, Clone)]
pub struct Frame {
    pub framebuffer: Framebuffer,
    pub stats: RenderStats,
}

/// Pixel range [start, end) covering `lo..hi`, clamped to `0..limit`
fn span(lo: f64, hi: f64, limit: usize) -> (usize, usize) {
    let start = lo.floor().max(0.0);
    let end = hi.ceil().min(limit as f64);
    if end <= start {
        return (0, 0);
    }
    (start as usize, end as usize)
}

fn is_inside(bc: Vec3) -> bool {
    bc.x >= INSIDE_EPSILON && bc.y >= INSIDE_EPSILON && bc.z >= INSIDE_EPSILON
}

/// Rasterize a screen-space triangle into the framebuffer.
///
/// `background` is what a partially covered MSAA pixel blends with when
/// nothing has been drawn there yet.
pub fn rasterize_triangle(
    fb: &mut Framebuffer,
    tri: &Triangle,
    anti_alias: AntiAlias,
    background: Vec3,
) -> TriangleOutcome {
    let [v1, v2, v3] = tri.vertices;
    if !(v1.is_finite() && v2.is_finite() && v3.is_finite()) {
        return TriangleOutcome::Degenerate;
    }
    if tri.signed_area().abs() < DEGENERATE_AREA {
        return TriangleOutcome::Degenerate;
    }

    // Bounding box
    let (min_x, max_x) = span(v1.x.min(v2.x).min(v3.x), v1.x.max(v2.x).max(v3.x), fb.width());
    let (min_y, max_y) = span(v1.y.min(v2.y).min(v3.y), v1.y.max(v2.y).max(v3.y), fb.height());

    let mut pixels = 0;
    for y in min_y..max_y {
        for x in min_x..max_x {
            let written = match anti_alias {
                AntiAlias::Off => shade_center(fb, tri, x, y),
                AntiAlias::Msaa(n) => shade_multisample(fb, tri, x, y, n.max(1), background),
            };
            if written {
                pixels += 1;
            }
        }
    }

    TriangleOutcome::Drawn { pixels }
}

fn shade_center(fb: &mut Framebuffer, tri: &Triangle, x: usize, y: usize) -> bool {
    let [v1, v2, v3] = tri.vertices;
    let Some(bc) = barycentric(x as f64 + 0.5, y as f64 + 0.5, v1, v2, v3) else {
        return false;
    };
    if !is_inside(bc) {
        return false;
    }
    fb.write_with_depth(x, y, tri.depth_at(bc), tri.color_at(bc))
}

/// Each inside sample contributes its color, uncovered samples keep the
/// prior color. The nearest inside sample is the pixel's depth and the
/// pixel is depth-tested once.
fn shade_multisample(
    fb: &mut Framebuffer,
    tri: &Triangle,
    x: usize,
    y: usize,
    n: u32,
    background: Vec3,
) -> bool {
    let [v1, v2, v3] = tri.vertices;
    let step = 1.0 / n as f64;

    let mut covered = 0u32;
    let mut color_sum = Vec3::ZERO;
    let mut nearest = f64::INFINITY;

    for j in 0..n {
        for i in 0..n {
            let sx = x as f64 + (i as f64 + 0.5) * step;
            let sy = y as f64 + (j as f64 + 0.5) * step;
            let Some(bc) = barycentric(sx, sy, v1, v2, v3) else {
                return false;
            };
            if !is_inside(bc) {
                continue;
            }
            covered += 1;
            color_sum = color_sum + tri.color_at(bc);
            nearest = nearest.min(tri.depth_at(bc));
        }
    }

    if covered == 0 {
        return false;
    }

    let total = n as f64 * n as f64;
    let prior = fb.color.get(x, y).unwrap_or(background);
    let blended = (color_sum + prior * (total - covered as f64)) * (1.0 / total);
    fb.write_with_depth(x, y, nearest, blended)
}

/// Run one triangle through the whole pipeline: MVP, depth range check,
/// viewport mapping, rasterization.
pub fn draw_triangle(
    fb: &mut Framebuffer,
    tri: &Triangle,
    mvp: &Mat4,
    viewport: &Viewport,
    anti_alias: AntiAlias,
    background: Vec3,
) -> TriangleOutcome {
    let Some(clip) = tri.mvp_transform(mvp) else {
        return TriangleOutcome::Degenerate;
    };
    // Vertices at or behind the eye also land outside [-1, 1]
    if !clip.in_depth_range() {
        return TriangleOutcome::Rejected;
    }
    let screen = clip.viewport_transform(viewport);
    rasterize_triangle(fb, &screen, anti_alias, background)
}

/// Render a scene into a fresh framebuffer of the logical raster size.
///
/// Deterministic: the same scene and parameters always give the same frame.
pub fn render(scene: &Scene, params: &RenderParams) -> Result<Frame, RenderError> {
    params.validate()?;
    let triangles = scene.triangles()?;

    let mvp = mvp_matrix(params)?;
    let (width, height) = params.raster_size();
    let viewport = Viewport::new(width, height, DepthRange::new(params.z_near, params.z_far));
    let anti_alias = params.anti_alias();
    let background = params.background_rgb();

    let mut framebuffer = Framebuffer::new(width, height);
    let mut stats = RenderStats { samples_per_pixel: anti_alias.samples_per_pixel(), ..Default::default() };

    for (i, tri) in triangles.iter().enumerate() {
        let outcome = draw_triangle(&mut framebuffer, tri, &mvp, &viewport, anti_alias, background);
        if !matches!(outcome, TriangleOutcome::Drawn { .. }) {
            debug!("triangle {} of '{}': {:?}", i, scene.name, outcome);
        }
        stats.record(outcome);
    }

    info!(
        "rendered '{}' at {}x{} ({}): {} drawn, {} degenerate, {} rejected, {} pixels",
        scene.name,
        width,
        height,
        anti_alias.label(),
        stats.drawn,
        stats.degenerate,
        stats.rejected,
        stats.pixels_written
    );

    Ok(Frame { framebuffer, stats })
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Vec3 = Vec3::new(255.0, 0.0, 0.0);
    const BLUE: Vec3 = Vec3::new(0.0, 0.0, 255.0);

    fn screen_tri(a: (f64, f64), b: (f64, f64), c: (f64, f64), z: f64, color: Vec3) -> Triangle {
        Triangle::flat(
            [Vec3::new(a.0, a.1, z), Vec3::new(b.0, b.1, z), Vec3::new(c.0, c.1, z)],
            color,
        )
    }

    /// Triangle from scene 1 of the demo, alone in its own scene
    fn single_triangle_scene() -> Scene {
        Scene {
            name: "single".to_string(),
            vecs: vec![[2.0, 0.0, -2.0], [0.0, 2.0, -2.0], [-2.0, 0.0, -2.0]],
            inds: vec![[0, 1, 2]],
            cols: vec![[185.0, 217.0, 238.0]],
        }
    }

    #[test]
    fn test_triangle_outside_writes_nothing() {
        let mut fb = Framebuffer::new(20, 20);
        let tri = screen_tri((30.0, 30.0), (40.0, 30.0), (35.0, 40.0), 5.0, RED);
        let outcome = rasterize_triangle(&mut fb, &tri, AntiAlias::Off, Vec3::ZERO);
        assert_eq!(outcome, TriangleOutcome::Drawn { pixels: 0 });
        assert_eq!(fb, Framebuffer::new(20, 20));

        let left = screen_tri((-30.0, 2.0), (-10.0, 2.0), (-20.0, 15.0), 5.0, RED);
        rasterize_triangle(&mut fb, &left, AntiAlias::Msaa(2), Vec3::ZERO);
        assert_eq!(fb, Framebuffer::new(20, 20));
    }

    #[test]
    fn test_partially_visible_triangle_is_clamped() {
        let mut fb = Framebuffer::new(10, 10);
        let tri = screen_tri((-20.0, -20.0), (60.0, -20.0), (-20.0, 60.0), 5.0, RED);
        let outcome = rasterize_triangle(&mut fb, &tri, AntiAlias::Off, Vec3::ZERO);
        assert_eq!(outcome, TriangleOutcome::Drawn { pixels: 100 });
        assert!(fb.color.get(9, 9).unwrap().approx_eq(RED, 1e-9));
    }

    #[test]
    fn test_degenerate_triangle_is_noop() {
        let mut fb = Framebuffer::new(10, 10);
        let line = screen_tri((1.0, 1.0), (5.0, 5.0), (9.0, 9.0), 5.0, RED);
        assert_eq!(rasterize_triangle(&mut fb, &line, AntiAlias::Off, Vec3::ZERO), TriangleOutcome::Degenerate);
        let nan = screen_tri((f64::NAN, 1.0), (5.0, 5.0), (9.0, 1.0), 5.0, RED);
        assert_eq!(rasterize_triangle(&mut fb, &nan, AntiAlias::Msaa(4), Vec3::ZERO), TriangleOutcome::Degenerate);
        assert_eq!(fb.color.written_count(), 0);
    }

    #[test]
    fn test_winding_does_not_matter() {
        let mut ccw = Framebuffer::new(16, 16);
        let mut cw = Framebuffer::new(16, 16);
        rasterize_triangle(&mut ccw, &screen_tri((1.0, 1.0), (14.0, 2.0), (6.0, 13.0), 5.0, RED), AntiAlias::Off, Vec3::ZERO);
        rasterize_triangle(&mut cw, &screen_tri((1.0, 1.0), (6.0, 13.0), (14.0, 2.0), 5.0, RED), AntiAlias::Off, Vec3::ZERO);
        assert!(ccw.color.written_count() > 0);
        assert_eq!(ccw.color, cw.color);
    }

    #[test]
    fn test_closer_triangle_wins_in_either_order() {
        let near = screen_tri((0.0, 0.0), (20.0, 0.0), (0.0, 20.0), 2.0, RED);
        let far = screen_tri((0.0, 0.0), (20.0, 0.0), (20.0, 20.0), 8.0, BLUE);

        for order in [[near, far], [far, near]] {
            let mut fb = Framebuffer::new(20, 20);
            for tri in &order {
                rasterize_triangle(&mut fb, tri, AntiAlias::Off, Vec3::ZERO);
            }
            // (12, 3) is covered by both
            assert!(fb.color.get(12, 3).unwrap().approx_eq(RED, 1e-9));
            assert!((fb.depth.get(12, 3).unwrap() - 2.0).abs() < 1e-9);
            // (18, 15) only by the far one
            assert!(fb.color.get(18, 15).unwrap().approx_eq(BLUE, 1e-9));
        }
    }

    #[test]
    fn test_msaa_half_covered_pixel_blends_with_background() {
        let color = Vec3::new(200.0, 100.0, 50.0);
        // Everything left of x = 10.5 near row 5 is covered
        let tri = screen_tri((-100.0, -100.0), (10.5, -100.0), (10.5, 100.0), 5.0, color);

        let mut fb = Framebuffer::new(20, 20);
        rasterize_triangle(&mut fb, &tri, AntiAlias::Msaa(2), Vec3::ZERO);
        let blended = fb.color.get(10, 5).unwrap();
        assert!(blended.approx_eq(Vec3::new(100.0, 50.0, 25.0), 1e-9));
        // Fully covered neighbor keeps the full color
        assert!(fb.color.get(9, 5).unwrap().approx_eq(color, 1e-9));
        assert!(!fb.color.is_written(11, 5));

        let white = Vec3::new(255.0, 255.0, 255.0);
        let mut fb = Framebuffer::new(20, 20);
        rasterize_triangle(&mut fb, &tri, AntiAlias::Msaa(2), white);
        let blended = fb.color.get(10, 5).unwrap();
        assert!(blended.approx_eq(Vec3::new(227.5, 177.5, 152.5), 1e-9));
    }

    #[test]
    fn test_msaa_blends_with_prior_color() {
        let mut fb = Framebuffer::new(20, 20);
        let back = screen_tri((-50.0, -50.0), (70.0, -50.0), (-50.0, 70.0), 9.0, BLUE);
        rasterize_triangle(&mut fb, &back, AntiAlias::Off, Vec3::ZERO);

        let front = screen_tri((-100.0, -100.0), (10.5, -100.0), (10.5, 100.0), 3.0, RED);
        rasterize_triangle(&mut fb, &front, AntiAlias::Msaa(2), Vec3::ZERO);
        let blended = fb.color.get(10, 5).unwrap();
        assert!(blended.approx_eq(Vec3::new(127.5, 0.0, 127.5), 1e-9));
        assert!((fb.depth.get(10, 5).unwrap() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_render_single_triangle_scene() {
        let frame = render(&single_triangle_scene(), &RenderParams::default()).unwrap();
        let fb = &frame.framebuffer;
        assert_eq!((fb.width(), fb.height()), (100, 100));
        assert_eq!(frame.stats.drawn, 1);

        let expected = Vec3::new(185.0, 217.0, 238.0);
        let written: Vec<_> = fb.color.iter_written().collect();
        assert!(written.len() > 100);
        assert!(written.iter().all(|(_, _, rgb)| rgb.approx_eq(expected, 1e-9)));

        // Centered horizontally, apex above the middle row, base on it
        let min_x = written.iter().map(|w| w.0).min().unwrap();
        let max_x = written.iter().map(|w| w.0).max().unwrap();
        let min_y = written.iter().map(|w| w.1).min().unwrap();
        let max_y = written.iter().map(|w| w.1).max().unwrap();
        assert!(((min_x + max_x) as i64 - 99).abs() <= 1);
        assert!(max_y <= 50 && min_y > 0);
        assert!(fb.color.is_written(50, 45));
        assert!(!fb.color.is_written(50, 60));
        assert!(!fb.color.is_written(5, 5));
    }

    #[test]
    fn test_render_is_deterministic() {
        let scene = Scene::basic_triangles();
        let params = RenderParams { anti_alias: 2, y_rotate: 30.0, ..Default::default() };
        let a = render(&scene, &params).unwrap();
        let b = render(&scene, &params).unwrap();
        assert_eq!(a.framebuffer, b.framebuffer);
        assert_eq!(a.stats, b.stats);
    }

    #[test]
    fn test_full_turn_matches_start() {
        let scene = Scene::pyramid();
        let base = render(&scene, &RenderParams::default()).unwrap().framebuffer;

        for axis in 0..3 {
            let mut params = RenderParams::default();
            for _ in 0..36 {
                match axis {
                    0 => params.x_rotate += 10.0,
                    1 => params.y_rotate += 10.0,
                    _ => params.z_rotate += 10.0,
                }
            }
            let turned = render(&scene, &params).unwrap().framebuffer;

            let mut mismatched = 0;
            for y in 0..base.height() {
                for x in 0..base.width() {
                    let same = match (base.color.get(x, y), turned.color.get(x, y)) {
                        (Some(a), Some(b)) => a.approx_eq(b, 1.0),
                        (None, None) => true,
                        _ => false,
                    };
                    if !same {
                        mismatched += 1;
                    }
                }
            }
            assert!(mismatched <= 5, "axis {} had {} mismatched pixels", axis, mismatched);
        }
    }

    #[test]
    fn test_triangle_behind_eye_is_rejected() {
        let scene = Scene {
            name: "behind".to_string(),
            vecs: vec![[1.0, 0.0, 6.0], [0.0, 1.0, 6.0], [-1.0, 0.0, 6.0]],
            inds: vec![[0, 1, 2]],
            cols: vec![[255.0, 255.0, 255.0]],
        };
        let frame = render(&scene, &RenderParams::default()).unwrap();
        assert_eq!(frame.stats.rejected, 1);
        assert_eq!(frame.framebuffer.color.written_count(), 0);
    }

    #[test]
    fn test_render_rejects_bad_input() {
        let params = RenderParams { eye_fov: 200.0, ..Default::default() };
        assert!(matches!(render(&Scene::basic_triangles(), &params), Err(RenderError::Params(_))));

        let mut scene = single_triangle_scene();
        scene.inds[0][2] = 7;
        assert!(matches!(render(&scene, &RenderParams::default()), Err(RenderError::Scene(_))));
    }

    #[test]
    fn test_anti_alias_factor() {
        assert_eq!(AntiAlias::from_factor(0), AntiAlias::Off);
        assert_eq!(AntiAlias::from_factor(4), AntiAlias::Msaa(4));
        assert_eq!(AntiAlias::Msaa(4).samples_per_pixel(), 16);
        assert_eq!(AntiAlias::Msaa(2).label(), "MSAA 4x");
        assert_eq!(AntiAlias::Msaa(70000).samples_per_pixel(), 4_900_000_000);
    }

    #[test]
    fn test_oversized_anti_alias_is_refused() {
        let empty = Scene { name: "empty".to_string(), vecs: vec![], inds: vec![], cols: vec![] };
        let params = RenderParams { anti_alias: 70000, ..Default::default() };
        assert!(matches!(
            render(&empty, &params),
            Err(RenderError::Params(ParamError::AntiAlias { factor: 70000, .. }))
        ));
    }

    #[test]
    fn test_stats_report_samples_per_pixel() {
        let params = RenderParams { anti_alias: 4, ..Default::default() };
        let frame = render(&Scene::basic_triangles(), &params).unwrap();
        assert_eq!(frame.stats.samples_per_pixel, 16);

        let frame = render(&Scene::basic_triangles(), &RenderParams::default()).unwrap();
        assert_eq!(frame.stats.samples_per_pixel, 1);
    }
}
