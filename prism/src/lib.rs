//! Deterministic tracing of laser rays through a plane of point prisms.
//!
//! A ray leaves a [`LaserSource`], travels to the nearest [`Prism`] lying inside
//! a narrow angular cone around its heading, gets deflected by that prism's
//! `angle`, and carries on until it escapes, loops, or runs out of budget.
//!
//! Two engines are provided:
//!
//! - [`trace_one`] follows a single ray and ignores prism kinds. It is the
//!   cheap "dominant path" used by the auto-aim helpers.
//! - [`Engine`] runs a whole population of rays with intensities, splitting,
//!   combining and attenuation. [`trace_all`] drives it once per source.

pub use nalgebra;

use nalgebra::Vector2;

mod aim;
mod config;
mod engine;
mod error;
mod hit;
mod scene;
mod state;
mod trace;

pub use aim::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use hit::*;
pub use scene::*;
pub use trace::*;

pub type Float = f64;

/// A position (or displacement) in the plane.
pub type Point = Vector2<Float>;

pub type PrismId = i64;

pub type SourceId = i64;

/// What a prism does to the rays that reach it, besides deflecting them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PrismKind {
    /// Deflects by `angle`.
    #[default]
    Normal,
    /// Emits two rays at `heading ± angle`, each carrying half the intensity.
    Splitter,
    /// Waits for two rays and merges them into one.
    Combiner,
    /// Scales the intensity down by `intensity_factor`.
    Reducer,
    /// Scales the intensity up by `intensity_factor`, capped at `1.0`.
    Amplifier,
}

impl PrismKind {
    pub const ALL: [Self; 5] = [
        Self::Normal,
        Self::Splitter,
        Self::Combiner,
        Self::Reducer,
        Self::Amplifier,
    ];

    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Splitter => "splitter",
            Self::Combiner => "combiner",
            Self::Reducer => "reducer",
            Self::Amplifier => "amplifier",
        }
    }

    #[inline]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

/// A point obstacle.
#[derive(Clone, Debug, PartialEq)]
pub struct Prism {
    pub id: PrismId,
    pub pos: Point,
    /// Deflection (in degrees) added to the heading of every ray it emits.
    /// This is relative to the incoming ray, not an absolute heading.
    pub angle: Float,
    pub kind: PrismKind,
    pub intensity_factor: Float,
}

impl Prism {
    /// A [`PrismKind::Normal`] prism with an intensity factor of `1.0`
    #[inline]
    #[must_use]
    pub fn new(id: PrismId, pos: impl Into<Point>, angle: Float) -> Self {
        Self {
            id,
            pos: pos.into(),
            angle,
            kind: PrismKind::Normal,
            intensity_factor: 1.0,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_kind(mut self, kind: PrismKind) -> Self {
        self.kind = kind;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_intensity_factor(mut self, factor: Float) -> Self {
        self.intensity_factor = factor;
        self
    }
}

/// Where a ray starts, and its absolute initial heading, in degrees.
#[derive(Clone, Debug, PartialEq)]
pub struct LaserSource {
    pub id: SourceId,
    pub pos: Point,
    pub angle: Float,
}

impl LaserSource {
    #[inline]
    #[must_use]
    pub fn new(id: SourceId, pos: impl Into<Point>, angle: Float) -> Self {
        Self {
            id,
            pos: pos.into(),
            angle,
        }
    }
}

/// One straight leg of a ray, with the intensity it had at both ends.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
    pub start_intensity: Float,
    pub end_intensity: Float,
}

impl Segment {
    #[inline]
    pub fn length(&self) -> Float {
        (self.end - self.start).norm()
    }
}

/// Everything the branching engine computed for one source.
#[derive(Clone, Debug, PartialEq)]
pub struct PathResult {
    pub source: SourceId,
    /// Ids of the prisms hit, in processing order, across all lineages.
    pub sequence: Vec<PrismId>,
    pub segments: Vec<Segment>,
    /// The hit cone each segment was cast with, in the same order as `segments`.
    pub cones: Vec<ToleranceCone>,
    /// The cyclic part of the first lineage found looping, as a closed polyline.
    pub loop_tail: Option<Vec<Point>>,
    pub error: Option<TraceError>,
}

impl PathResult {
    #[inline]
    #[must_use]
    pub fn new(source: SourceId) -> Self {
        Self {
            source,
            sequence: Vec::new(),
            segments: Vec::new(),
            cones: Vec::new(),
            loop_tail: None,
            error: None,
        }
    }

    #[inline]
    pub fn is_looped(&self) -> bool {
        self.loop_tail.is_some()
    }
}

/// Unit vector pointing at `degrees`, measured counterclockwise from the x axis.
#[inline]
pub fn unit_heading(degrees: Float) -> Point {
    let (sin, cos) = degrees.to_radians().sin_cos();
    Point::new(cos, sin)
}

/// Wraps an angle into `[-180, 180)`.
#[inline]
pub fn wrap_degrees(degrees: Float) -> Float {
    (degrees + 180.0).rem_euclid(360.0) - 180.0
}

/// Signed deviation of `bearing` from `heading`, wrapped into `(-180, 180]`.
#[inline]
pub fn signed_deviation(bearing: Float, heading: Float) -> Float {
    let d = wrap_degrees(bearing - heading);
    if d == -180.0 {
        180.0
    } else {
        d
    }
}
