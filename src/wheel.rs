//! Rotation math behind the wheel control.
//!
//! Angles are radians measured from the positive x axis with y growing
//! downwards, the way pointer coordinates arrive. The wheel's visual top
//! (angle −90°) reads as 0%.

use std::f64::consts::TAU;
use std::time::Duration;

use rand::Rng;

use crate::config::WheelOptions;

/// Degrees added so that the top of the wheel maps to 0%.
pub const TOP_OFFSET_DEGREES: f64 = 90.0;

const SEAM_EPSILON_DEGREES: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Position on the wheel in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Percentage(f64);

impl Percentage {
    pub const ZERO: Self = Self(0.0);
    pub const FULL: Self = Self(1.0);

    /// Clamp `value` into `[0, 1]`; NaN becomes 0.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        Self(value.clamp(0.0, 1.0))
    }

    pub const fn value(self) -> f64 {
        self.0
    }

    /// Index selected by this percentage in a set of `count` items.
    ///
    /// `None` when the set is empty; otherwise always in `[0, count - 1]`.
    pub fn index_for(self, count: usize) -> Option<usize> {
        if count == 0 {
            return None;
        }
        let last = count - 1;
        let raw = (self.0 * last as f64).floor();
        Some((raw.max(0.0) as usize).min(last))
    }
}

/// Angle of `pointer` around `center`.
pub fn set_from_drag(pointer: Point, center: Point) -> f64 {
    (pointer.y - center.y).atan2(pointer.x - center.x)
}

/// Fold any angle into `[0, 2π)`.
pub fn normalize(angle: f64) -> f64 {
    let r = angle.rem_euclid(TAU);
    if r >= TAU { 0.0 } else { r }
}

/// Degrees shown on the wheel, in `[0, 360)`, with the top at 0.
pub fn display_degrees(angle: f64) -> f64 {
    let d = (angle.to_degrees() + TOP_OFFSET_DEGREES).rem_euclid(360.0);
    // Rounding noise just below a full turn reads as the top.
    if 360.0 - d < SEAM_EPSILON_DEGREES { 0.0 } else { d }
}

pub fn to_percentage(angle: f64) -> Percentage {
    Percentage::new(display_degrees(angle) / 360.0)
}

/// Whole-degree label rendered on the wheel button.
pub fn degrees_label(angle: f64) -> String {
    format!("{}°", display_degrees(angle).floor() as u32)
}

/// Outcome of a tap: the arc to animate and where the wheel comes to rest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TapRotation {
    /// Arc start, the running angle before the tap.
    pub from: f64,
    /// Arc end, `from + increment` without wrapping so the arc keeps its direction.
    pub to: f64,
    /// Angle stored once the animation settles.
    pub resting: f64,
    pub increment_degrees: f64,
    pub duration: Duration,
}

/// Advance `current` by a random increment in the configured tap range.
pub fn random_tap<R: Rng + ?Sized>(current: f64, options: &WheelOptions, rng: &mut R) -> TapRotation {
    let increment_degrees = rng.random_range(options.min_tap_degrees..=options.max_tap_degrees);
    let to = current + increment_degrees.to_radians();
    TapRotation {
        from: current,
        to,
        resting: to % TAU,
        increment_degrees,
        duration: Duration::from_secs_f64(options.seconds_per_degree * increment_degrees),
    }
}

/// Ring and button dimensions, in wheel-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelGeometry {
    pub diameter: f64,
    pub button_size: f64,
}

impl WheelGeometry {
    pub fn from_options(options: &WheelOptions) -> Self {
        Self {
            diameter: options.diameter,
            button_size: options.button_size,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.diameter / 2.0, self.diameter / 2.0)
    }

    /// Distance from the wheel center to the button center.
    pub fn track_radius(&self) -> f64 {
        (self.diameter - self.button_size / 4.0) / 2.0
    }

    pub fn button_center(&self, angle: f64) -> Point {
        let c = self.center();
        let r = self.track_radius();
        Point::new(c.x + r * angle.cos(), c.y + r * angle.sin())
    }
}

/// What the wheel shows after a gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct WheelUpdate {
    pub angle: f64,
    pub percentage: Percentage,
    pub label: String,
    pub button: Point,
}

/// The running angle of one wheel control.
#[derive(Debug, Clone)]
pub struct WheelState {
    angle: f64,
    geometry: WheelGeometry,
    options: WheelOptions,
}

impl WheelState {
    /// Start with the button at the top of the ring, reading 0°.
    pub fn new(options: WheelOptions) -> Self {
        Self {
            angle: (-TOP_OFFSET_DEGREES).to_radians(),
            geometry: WheelGeometry::from_options(&options),
            options,
        }
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn geometry(&self) -> &WheelGeometry {
        &self.geometry
    }

    pub fn percentage(&self) -> Percentage {
        to_percentage(self.angle)
    }

    /// Follow a pointer dragged to `pointer` (wheel-local coordinates).
    pub fn drag(&mut self, pointer: Point) -> WheelUpdate {
        self.angle = set_from_drag(pointer, self.geometry.center());
        self.update()
    }

    /// Spin by a random increment.
    pub fn tap<R: Rng + ?Sized>(&mut self, rng: &mut R) -> (WheelUpdate, TapRotation) {
        let rotation = random_tap(self.angle, &self.options, rng);
        self.angle = rotation.resting;
        (self.update(), rotation)
    }

    fn update(&self) -> WheelUpdate {
        WheelUpdate {
            angle: self.angle,
            percentage: self.percentage(),
            label: degrees_label(self.angle),
            button: self.geometry.button_center(self.angle),
        }
    }
}
