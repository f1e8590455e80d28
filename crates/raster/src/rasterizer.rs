//! Scan conversion of clip-space triangles.
//!
//! Coverage uses edge functions with a top-left fill rule, so two triangles
//! sharing an edge never both touch the same pixel. Interpolated varyings are
//! perspective-correct; flat varyings come from the first vertex of each
//! triangle, matching the default provoking vertex of the GPU pipelines.

use std::ops::AddAssign;

use blockshade_core::{CubeVarying, Fragment, ScreenVarying, TextVarying};
use glam::{Vec2, Vec3, Vec4};

use crate::framebuffer::Framebuffer;

/// Triangles with any vertex at or behind this clip `w` are rejected.
pub const NEAR_W_EPSILON: f32 = 1e-5;

/// Output of a vertex stage that the rasterizer can interpolate.
pub trait Varyings: Copy {
    /// Clip-space position of the vertex.
    fn clip_position(&self) -> Vec4;

    /// Blend three vertices with perspective-corrected `weights` (summing to
    /// one). Flat fields must be copied from `triangle[0]`.
    fn interpolate(triangle: &[Self; 3], weights: Vec3) -> Self;
}

fn blend2(values: [Vec2; 3], weights: Vec3) -> Vec2 {
    values[0] * weights.x + values[1] * weights.y + values[2] * weights.z
}

fn blend4(values: [Vec4; 3], weights: Vec3) -> Vec4 {
    values[0] * weights.x + values[1] * weights.y + values[2] * weights.z
}

impl Varyings for CubeVarying {
    fn clip_position(&self) -> Vec4 {
        self.clip_position
    }

    fn interpolate(triangle: &[Self; 3], weights: Vec3) -> Self {
        let [a, b, c] = triangle;
        CubeVarying {
            clip_position: blend4([a.clip_position, b.clip_position, c.clip_position], weights),
            uv: blend2([a.uv, b.uv, c.uv], weights),
            light: a.light,
            highlight: a.highlight,
            layer: a.layer,
        }
    }
}

impl Varyings for ScreenVarying {
    fn clip_position(&self) -> Vec4 {
        self.clip_position
    }

    fn interpolate(triangle: &[Self; 3], weights: Vec3) -> Self {
        let [a, b, c] = triangle;
        ScreenVarying {
            clip_position: blend4([a.clip_position, b.clip_position, c.clip_position], weights),
            uv: blend2([a.uv, b.uv, c.uv], weights),
        }
    }
}

impl Varyings for TextVarying {
    fn clip_position(&self) -> Vec4 {
        self.clip_position
    }

    fn interpolate(triangle: &[Self; 3], weights: Vec3) -> Self {
        let [a, b, c] = triangle;
        TextVarying {
            clip_position: blend4([a.clip_position, b.clip_position, c.clip_position], weights),
            uv: blend2([a.uv, b.uv, c.uv], weights),
            color: a.color,
        }
    }
}

/// Depth handling of a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthMode {
    /// `Less` comparison, write on pass.
    LessWrite,
    /// No test, no write.
    Disabled,
}

/// Color blending of a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// Overwrite the target.
    Replace,
    /// `src * a + dst * (1 - a)` on color; `src + dst * (1 - a)` on alpha.
    Alpha,
}

impl BlendMode {
    fn apply(self, src: Vec4, dst: Vec4) -> Vec4 {
        match self {
            BlendMode::Replace => src,
            BlendMode::Alpha => {
                let a = src.w;
                let rgb = src.truncate() * a + dst.truncate() * (1.0 - a);
                rgb.extend(a + dst.w * (1.0 - a))
            }
        }
    }
}

/// Fixed-function state of a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterState {
    /// Depth handling.
    pub depth: DepthMode,
    /// Color blending.
    pub blend: BlendMode,
}

impl RasterState {
    /// Depth-tested opaque geometry.
    pub const OPAQUE: RasterState = RasterState {
        depth: DepthMode::LessWrite,
        blend: BlendMode::Replace,
    };

    /// Overlay geometry drawn in submission order.
    pub const OVERLAY: RasterState = RasterState {
        depth: DepthMode::Disabled,
        blend: BlendMode::Replace,
    };

    /// Alpha-blended overlay geometry.
    pub const BLENDED_OVERLAY: RasterState = RasterState {
        depth: DepthMode::Disabled,
        blend: BlendMode::Alpha,
    };
}

/// Counters accumulated over a draw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStats {
    /// Triangles submitted.
    pub triangles: u64,
    /// Triangles dropped at the near plane or for having no area.
    pub triangles_rejected: u64,
    /// Fragments that reached the target.
    pub written: u64,
    /// Fragments dropped by the fragment stage.
    pub discarded: u64,
    /// Fragments that failed the depth test.
    pub depth_rejected: u64,
}

impl AddAssign for DrawStats {
    fn add_assign(&mut self, rhs: Self) {
        self.triangles += rhs.triangles;
        self.triangles_rejected += rhs.triangles_rejected;
        self.written += rhs.written;
        self.discarded += rhs.discarded;
        self.depth_rejected += rhs.depth_rejected;
    }
}

/// Edge function: positive when `p` lies to the inner side of `a -> b`.
fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (p.x - a.x) * (b.y - a.y) - (p.y - a.y) * (b.x - a.x)
}

/// Top-left rule for the positive orientation of [`edge`] in a y-down raster.
fn is_top_left(a: Vec2, b: Vec2) -> bool {
    let d = b - a;
    d.y > 0.0 || (d.y == 0.0 && d.x < 0.0)
}

fn covers(weight: f32, a: Vec2, b: Vec2) -> bool {
    weight > 0.0 || (weight == 0.0 && is_top_left(a, b))
}

/// Rasterize one triangle, running `shade` for every covered pixel center.
pub fn rasterize_triangle<V, F>(
    target: &mut Framebuffer,
    triangle: &[V; 3],
    state: RasterState,
    stats: &mut DrawStats,
    mut shade: F,
) where
    V: Varyings,
    F: FnMut(&V) -> Fragment,
{
    stats.triangles += 1;

    let clip = triangle.map(|v| v.clip_position());
    if clip.iter().any(|c| c.w <= NEAR_W_EPSILON) {
        stats.triangles_rejected += 1;
        return;
    }

    let size = Vec2::new(target.width() as f32, target.height() as f32);
    let ndc = clip.map(|c| c.truncate() / c.w);
    let screen = ndc.map(|n| Vec2::new((n.x + 1.0) * 0.5, (1.0 - n.y) * 0.5) * size);

    // Reorder so the winding is positive; `order` maps back to `triangle`.
    let order = if edge(screen[0], screen[1], screen[2]) >= 0.0 {
        [0, 1, 2]
    } else {
        [0, 2, 1]
    };
    let [p0, p1, p2] = order.map(|i| screen[i]);
    let area = edge(p0, p1, p2);
    if area <= 0.0 || !area.is_finite() {
        stats.triangles_rejected += 1;
        return;
    }

    let min = p0.min(p1).min(p2).floor().max(Vec2::ZERO);
    let max = p0.max(p1).max(p2).ceil().min(size);
    if min.x >= max.x || min.y >= max.y {
        return;
    }

    let inv_w = clip.map(|c| 1.0 / c.w);
    for y in min.y as u32..max.y as u32 {
        for x in min.x as u32..max.x as u32 {
            let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            let e0 = edge(p1, p2, p);
            let e1 = edge(p2, p0, p);
            let e2 = edge(p0, p1, p);
            if !(covers(e0, p1, p2) && covers(e1, p2, p0) && covers(e2, p0, p1)) {
                continue;
            }

            let mut screen_weights = [0.0; 3];
            screen_weights[order[0]] = e0 / area;
            screen_weights[order[1]] = e1 / area;
            screen_weights[order[2]] = e2 / area;

            let depth = screen_weights[0] * ndc[0].z
                + screen_weights[1] * ndc[1].z
                + screen_weights[2] * ndc[2].z;
            if !(0.0..=1.0).contains(&depth) {
                continue;
            }

            let Some(index) = target.index(x, y) else {
                continue;
            };
            if state.depth == DepthMode::LessWrite && depth >= target.depth_at(index) {
                stats.depth_rejected += 1;
                continue;
            }

            let corrected = Vec3::new(
                screen_weights[0] * inv_w[0],
                screen_weights[1] * inv_w[1],
                screen_weights[2] * inv_w[2],
            );
            let weights = corrected / (corrected.x + corrected.y + corrected.z);

            match shade(&V::interpolate(triangle, weights)) {
                Fragment::Discard => stats.discarded += 1,
                Fragment::Color(color) => {
                    let blended = state.blend.apply(color, target.color_at(index));
                    target.set_color(index, blended);
                    if state.depth == DepthMode::LessWrite {
                        target.set_depth(index, depth);
                    }
                    stats.written += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen(x: f32, y: f32, z: f32) -> ScreenVarying {
        ScreenVarying {
            clip_position: Vec4::new(x, y, z, 1.0),
            uv: Vec2::new(x, y),
        }
    }

    fn full_quad(z: f32) -> [[ScreenVarying; 3]; 2] {
        let a = screen(-1.0, -1.0, z);
        let b = screen(1.0, -1.0, z);
        let c = screen(-1.0, 1.0, z);
        let d = screen(1.0, 1.0, z);
        [[a, b, d], [d, c, a]]
    }

    #[test]
    fn shared_edges_are_covered_exactly_once() {
        let mut fb = Framebuffer::new(8, 8, Vec4::ZERO);
        let mut stats = DrawStats::default();
        for triangle in full_quad(0.5) {
            rasterize_triangle(&mut fb, &triangle, RasterState::OVERLAY, &mut stats, |_| {
                Fragment::Color(Vec4::ONE)
            });
        }
        assert_eq!(stats.written, 64);
    }

    #[test]
    fn winding_does_not_matter() {
        let mut fb = Framebuffer::new(4, 4, Vec4::ZERO);
        let mut stats = DrawStats::default();
        let [first, _] = full_quad(0.5);
        let reversed = [first[0], first[2], first[1]];
        rasterize_triangle(&mut fb, &reversed, RasterState::OVERLAY, &mut stats, |_| {
            Fragment::Color(Vec4::ONE)
        });
        assert!(stats.written > 0);
        assert_eq!(stats.triangles_rejected, 0);
    }

    #[test]
    fn flat_values_come_from_the_first_vertex() {
        let mut fb = Framebuffer::new(4, 4, Vec4::ZERO);
        let mut stats = DrawStats::default();
        let corners = [
            Vec4::new(-1.0, -1.0, 0.5, 1.0),
            Vec4::new(3.0, -1.0, 0.5, 1.0),
            Vec4::new(-1.0, 3.0, 0.5, 1.0),
        ];
        let triangle = [0.25, 0.5, 1.0].map(|light| CubeVarying {
            clip_position: Vec4::ZERO,
            uv: Vec2::ZERO,
            light,
            highlight: 0.0,
            layer: 0,
        });
        let triangle = [0, 1, 2].map(|i| CubeVarying {
            clip_position: corners[i],
            ..triangle[i]
        });
        let mut seen = Vec::new();
        rasterize_triangle(&mut fb, &triangle, RasterState::OPAQUE, &mut stats, |v| {
            seen.push(v.light);
            Fragment::Color(Vec4::ONE)
        });
        assert_eq!(seen.len(), 16);
        assert!(seen.iter().all(|&light| light == 0.25));
    }

    #[test]
    fn nearer_fragments_win() {
        let mut fb = Framebuffer::new(2, 2, Vec4::ZERO);
        let mut stats = DrawStats::default();
        let red = Vec4::new(1.0, 0.0, 0.0, 1.0);
        let green = Vec4::new(0.0, 1.0, 0.0, 1.0);
        for triangle in full_quad(0.2) {
            rasterize_triangle(&mut fb, &triangle, RasterState::OPAQUE, &mut stats, |_| {
                Fragment::Color(red)
            });
        }
        for triangle in full_quad(0.6) {
            rasterize_triangle(&mut fb, &triangle, RasterState::OPAQUE, &mut stats, |_| {
                Fragment::Color(green)
            });
        }
        assert_eq!(fb.pixel(0, 0), Some(red));
        assert_eq!(stats.written, 4);
        assert_eq!(stats.depth_rejected, 4);
    }

    #[test]
    fn discarded_fragments_keep_depth_untouched() {
        let mut fb = Framebuffer::new(2, 2, Vec4::ZERO);
        let mut stats = DrawStats::default();
        for triangle in full_quad(0.2) {
            rasterize_triangle(&mut fb, &triangle, RasterState::OPAQUE, &mut stats, |_| {
                Fragment::Discard
            });
        }
        assert_eq!(stats.discarded, 4);
        assert_eq!(fb.depth(1, 1), Some(crate::framebuffer::CLEAR_DEPTH));
    }

    #[test]
    fn triangles_behind_the_eye_are_rejected() {
        let mut fb = Framebuffer::new(2, 2, Vec4::ZERO);
        let mut stats = DrawStats::default();
        let mut triangle = full_quad(0.5)[0];
        triangle[1].clip_position.w = 0.0;
        rasterize_triangle(&mut fb, &triangle, RasterState::OPAQUE, &mut stats, |_| {
            Fragment::Color(Vec4::ONE)
        });
        assert_eq!(stats.triangles_rejected, 1);
        assert_eq!(stats.written, 0);
    }

    #[test]
    fn interpolation_is_perspective_correct() {
        // The same screen-space triangle with a deeper third vertex pulls
        // its weight toward the nearer vertices.
        let near = Vec4::new(-1.0, -1.0, 0.5, 1.0);
        let far = Vec4::new(3.0, -1.0, 0.5, 1.0) * 4.0;
        let other = Vec4::new(-1.0, 3.0, 0.5, 1.0);
        let triangle = [(near, 0.0), (far, 1.0), (other, 0.0)].map(|(clip, u)| ScreenVarying {
            clip_position: clip,
            uv: Vec2::new(u, 0.0),
        });
        let mut fb = Framebuffer::new(4, 4, Vec4::ZERO);
        let mut stats = DrawStats::default();
        let mut max_u = 0.0f32;
        rasterize_triangle(&mut fb, &triangle, RasterState::OVERLAY, &mut stats, |v| {
            max_u = max_u.max(v.uv.x);
            Fragment::Color(Vec4::ONE)
        });
        // Screen-linear interpolation would reach 0.4375 in the last column.
        assert!(max_u < 0.4375);
        assert!(max_u > 0.0);
    }

    #[test]
    fn alpha_blend_mixes_with_destination() {
        let dst = Vec4::new(0.0, 0.0, 1.0, 1.0);
        let src = Vec4::new(1.0, 0.0, 0.0, 0.25);
        let out = BlendMode::Alpha.apply(src, dst);
        assert_eq!(out, Vec4::new(0.25, 0.0, 0.75, 1.0));
        assert_eq!(BlendMode::Replace.apply(src, dst), src);
    }
}
