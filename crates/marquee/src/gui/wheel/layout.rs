use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn normalized(self) -> Self {
        let len = self.length();
        if len == 0.0 { self } else { self * (1.0 / len) }
    }
}

impl Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Drawing surface size in pixels. Never smaller than 1x1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    pub fn aspect(&self) -> f64 {
        self.width / self.height
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

/// Tunables of the wheel. Lengths are world units unless noted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelParams {
    pub visible_items: usize,
    /// Fraction of the remaining distance the scroll covers per frame.
    pub smoothing: f64,
    pub arc_radius: f64,
    pub vertical_spread: f64,
    pub depth: f64,
    pub item_width: f64,
    pub item_height: f64,
    /// Gap between the viewport's left edge and the cards, in pixels.
    pub left_margin: f64,
    pub selected_scale: f64,
    pub unselected_opacity: f64,
    /// Vertical field of view in degrees.
    pub camera_fov: f64,
    pub camera_distance: f64,
    pub camera_height: f64,
}

impl Default for WheelParams {
    fn default() -> Self {
        Self {
            visible_items: 9,
            smoothing: 0.15,
            arc_radius: 200.0,
            vertical_spread: 800.0,
            depth: 50.0,
            item_width: 200.0,
            item_height: 100.0,
            left_margin: 10.0,
            selected_scale: 1.25,
            unselected_opacity: 0.6,
            camera_fov: 55.0,
            camera_distance: 800.0,
            camera_height: 0.0,
        }
    }
}

/// Perspective camera aimed at the scene origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub fov: f64,
    pub viewport: Viewport,
}

/// A world point mapped onto the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    pub x: f64,
    pub y: f64,
    /// Pixels per world unit at the point's depth.
    pub scale: f64,
    pub depth: f64,
}

impl Camera {
    pub fn new(params: &WheelParams, viewport: Viewport) -> Self {
        Self {
            eye: Vec3::new(0.0, params.camera_height, params.camera_distance),
            target: Vec3::default(),
            fov: params.camera_fov,
            viewport,
        }
    }

    fn focal(&self) -> f64 {
        self.viewport.height / (2.0 * (self.fov.to_radians() / 2.0).tan())
    }

    /// None for points at or behind the near plane.
    pub fn project(&self, point: Vec3) -> Option<Projected> {
        let forward = (self.target - self.eye).normalized();
        let right = forward.cross(Vec3::new(0.0, 1.0, 0.0)).normalized();
        let up = right.cross(forward);

        let rel = point - self.eye;
        let depth = rel.dot(forward);
        if depth <= 0.1 {
            return None;
        }
        let scale = self.focal() / depth;
        Some(Projected {
            x: self.viewport.width / 2.0 + rel.dot(right) * scale,
            y: self.viewport.height / 2.0 - rel.dot(up) * scale,
            scale,
            depth,
        })
    }
}

/// Where one card sits this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardTransform {
    pub position: Vec3,
    pub scale: f64,
    pub opacity: f64,
    pub visible: bool,
    pub selected: bool,
}

/// Shortest signed distance from the scroll offset to item `index` on a ring
/// of `count` items, in `[-count/2, count/2)`.
pub fn circular_offset(index: usize, offset: f64, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    let n = count as f64;
    (index as f64 - offset + n / 2.0).rem_euclid(n) - n / 2.0
}

/// World x of the card column: the viewport's left edge at the origin plane,
/// pushed in by the margin and half a card.
pub fn left_edge(viewport: Viewport, params: &WheelParams) -> f64 {
    let visible_height = 2.0 * (params.camera_fov.to_radians() / 2.0).tan() * params.camera_distance;
    let visible_width = visible_height * viewport.aspect();
    let units_per_pixel = visible_width / viewport.width;
    -visible_width / 2.0 + params.left_margin * units_per_pixel + params.item_width / 2.0
}

/// Places item `index` for the given scroll offset. Cards outside the
/// visible window are parked on the column and hidden.
pub fn layout(
    index: usize,
    count: usize,
    offset: f64,
    left: f64,
    params: &WheelParams,
) -> CardTransform {
    let off = circular_offset(index, offset, count);
    let window = params.visible_items.max(1).min(count.max(1));
    let half = (window / 2) as f64;

    if off.abs() > half + 0.5 {
        return CardTransform {
            position: Vec3::new(left, 0.0, 0.0),
            scale: 1.0,
            opacity: 0.0,
            visible: false,
            selected: false,
        };
    }

    let t = if window > 1 {
        (off + half) / (window - 1) as f64
    } else {
        0.5
    };
    let curve = 4.0 * t * (1.0 - t);
    let emphasis = 1.0 - off.abs().min(1.0);

    CardTransform {
        position: Vec3::new(
            left + curve * params.arc_radius,
            params.vertical_spread / 2.0 - t * params.vertical_spread,
            curve * params.depth,
        ),
        scale: 1.0 + (params.selected_scale - 1.0) * emphasis,
        opacity: params.unselected_opacity + (1.0 - params.unselected_opacity) * emphasis,
        visible: true,
        selected: off.abs() < 0.1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_circular_offset() {
        assert_eq!(circular_offset(0, 16.0, 17), 1.0);
        assert_eq!(circular_offset(16, 0.0, 17), -1.0);
        assert_eq!(circular_offset(3, 3.0, 17), 0.0);
        assert_eq!(circular_offset(2, 0.0, 4), -2.0);
        assert_eq!(circular_offset(5, 1.0, 0), 0.0);
    }

    #[test]
    fn test_selected_card_is_centered_and_emphasised() {
        let params = WheelParams::default();
        let card = layout(4, 17, 4.0, -300.0, &params);
        assert!(card.visible && card.selected);
        assert_eq!(card.position, Vec3::new(-300.0 + 200.0, 0.0, 50.0));
        assert_eq!(card.scale, 1.25);
        assert!((card.opacity - 1.0).abs() < 1e-12);

        let neighbour = layout(5, 17, 4.0, -300.0, &params);
        assert!(!neighbour.selected);
        assert_eq!(neighbour.scale, 1.0);
        assert!((neighbour.opacity - 0.6).abs() < 1e-12);
        assert!(neighbour.position.y < 0.0);
    }

    #[test]
    fn test_ends_of_window_sit_on_the_column() {
        let params = WheelParams::default();
        let top = layout(0, 17, 4.0, -300.0, &params);
        assert_eq!(top.position, Vec3::new(-300.0, 400.0, 0.0));
        let bottom = layout(8, 17, 4.0, -300.0, &params);
        assert_eq!(bottom.position, Vec3::new(-300.0, -400.0, 0.0));
        let hidden = layout(9, 17, 4.0, -300.0, &params);
        assert!(!hidden.visible);
        assert_eq!(hidden.position, Vec3::new(-300.0, 0.0, 0.0));
    }

    #[test]
    fn test_single_item_is_centered() {
        let params = WheelParams::default();
        let card = layout(0, 1, 0.0, 0.0, &params);
        assert!(card.visible && card.selected);
        assert_eq!(card.position.y, 0.0);
        assert_eq!(card.position.x, params.arc_radius);
    }

    #[test]
    fn test_left_edge_projects_to_margin() {
        let params = WheelParams::default();
        let viewport = Viewport::new(1280.0, 720.0);
        let left = left_edge(viewport, &params);
        let camera = Camera::new(&params, viewport);

        let edge = camera
            .project(Vec3::new(left - params.item_width / 2.0, 0.0, 0.0))
            .unwrap();
        assert!((edge.x - params.left_margin).abs() < 1e-6, "x = {}", edge.x);
        assert!((edge.y - 360.0).abs() < 1e-6);
    }

    #[test]
    fn test_camera_culls_points_behind() {
        let params = WheelParams::default();
        let camera = Camera::new(&params, Viewport::default());
        assert!(camera.project(Vec3::new(0.0, 0.0, 900.0)).is_none());
        let center = camera.project(Vec3::default()).unwrap();
        assert_eq!((center.x, center.y), (640.0, 360.0));
        assert!((center.depth - 800.0).abs() < 1e-9);
    }

    #[test]
    fn test_viewport_clamps_to_one_pixel() {
        let viewport = Viewport::new(0.0, -5.0);
        assert_eq!((viewport.width, viewport.height), (1.0, 1.0));
        assert!(left_edge(viewport, &WheelParams::default()).is_finite());
    }

    proptest! {
        #[test]
        fn prop_window_shows_exactly_nine(count in 9usize..80, selected in 0usize..80) {
            let params = WheelParams::default();
            let selected = selected % count;
            let visible: Vec<i64> = (0..count)
                .filter(|&i| layout(i, count, selected as f64, 0.0, &params).visible)
                .map(|i| circular_offset(i, selected as f64, count) as i64)
                .collect();
            let mut sorted = visible.clone();
            sorted.sort_unstable();
            prop_assert_eq!(sorted, (-4..=4).collect::<Vec<i64>>());
        }

        #[test]
        fn prop_small_lists_show_every_item(count in 1usize..9, selected in 0usize..9) {
            let params = WheelParams::default();
            let offset = (selected % count) as f64;
            prop_assert!((0..count).all(|i| layout(i, count, offset, 0.0, &params).visible));
        }

        #[test]
        fn prop_layout_is_deterministic_and_mirrored(
            count in 9usize..60,
            offset in 0.0f64..60.0,
            step in 1usize..5,
        ) {
            let params = WheelParams::default();
            let offset = offset % count as f64;
            let left = -250.0;
            for i in 0..count {
                prop_assert_eq!(
                    layout(i, count, offset, left, &params),
                    layout(i, count, offset, left, &params)
                );
            }

            // mirrored around an integer selection
            let center = offset.floor() as usize % count;
            let above = layout((center + count - step) % count, count, center as f64, left, &params);
            let below = layout((center + step) % count, count, center as f64, left, &params);
            prop_assert!((above.position.y + below.position.y).abs() < 1e-9);
            prop_assert!((above.position.x - below.position.x).abs() < 1e-9);
            prop_assert_eq!(above.visible, below.visible);
        }
    }
}
