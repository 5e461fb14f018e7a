use log::{trace, warn};

use super::*;
use state::{StateKey, Visited};

/// How a single traced ray stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    /// No prism ahead: the ray goes to infinity.
    Escaped,
    /// The ray came back to a state it was already in.
    Looped,
    /// The step budget ran out first.
    BudgetExceeded,
}

/// The two edges of the tolerance cone around a traced segment, each as long
/// as the segment itself.
#[derive(Clone, Debug, PartialEq)]
pub struct ToleranceCone {
    pub apex: Point,
    pub upper: Point,
    pub lower: Point,
}

impl ToleranceCone {
    #[inline]
    #[must_use]
    pub fn new(apex: Point, heading: Float, length: Float, tolerance: Float) -> Self {
        Self {
            apex,
            upper: apex + unit_heading(heading + tolerance) * length,
            lower: apex + unit_heading(heading - tolerance) * length,
        }
    }
}

/// The path of a single ray, as computed by [`trace_one`].
#[derive(Clone, Debug, PartialEq)]
pub struct TracePath {
    pub source: SourceId,
    pub sequence: Vec<PrismId>,
    /// Starts at the source. When the ray loops, ends where the loop starts.
    pub path: Vec<Point>,
    /// One cone per segment of `path` (and of `loop_tail`).
    pub cones: Vec<ToleranceCone>,
    /// The cyclic part of the path, as a closed polyline.
    pub loop_tail: Option<Vec<Point>>,
    pub error: Option<TraceError>,
}

impl TracePath {
    #[inline]
    pub fn termination(&self) -> Termination {
        if self.error.is_some() {
            Termination::BudgetExceeded
        } else if self.loop_tail.is_some() {
            Termination::Looped
        } else {
            Termination::Escaped
        }
    }

    #[inline]
    pub fn last_hit(&self) -> Option<PrismId> {
        self.sequence.last().copied()
    }
}

/// Follows the ray shot by `source` through `prisms`, ignoring prism kinds and intensities.
///
/// At most `config.max_iterations` hits are resolved. Revisiting a state
/// (see [`TraceConfig::heading_precision`]) ends the trace with a loop, which
/// is not an error.
#[must_use]
pub fn trace_one<P: PrismSet + ?Sized>(
    source: &LaserSource,
    prisms: &P,
    config: &TraceConfig,
) -> TracePath {
    let mut pos = source.pos;
    let mut heading = source.angle;

    let mut out = TracePath {
        source: source.id,
        sequence: Vec::new(),
        path: vec![pos],
        cones: Vec::new(),
        loop_tail: None,
        error: None,
    };

    let mut visited = Visited::default();
    let mut steps = 0;

    loop {
        steps += 1;
        if steps > config.max_iterations {
            warn!(
                "source {}: gave up after {} iterations",
                source.id, config.max_iterations
            );
            out.error = Some(TraceError::BudgetExceeded {
                limit: config.max_iterations,
            });
            break;
        }

        let here = out.path.len() - 1;
        let key = StateKey::new(&pos, heading, config.heading_precision);

        if let Some(start) = visited.first_seen_or_insert(key, here) {
            trace!("source {}: loop back to path point {start}", source.id);
            out.loop_tail = Some(out.path[start..].to_vec());
            out.path.truncate(start + 1);
            break;
        }

        let Some(Hit { prism, distance }) = resolve(pos, heading, prisms, config) else {
            let length = config.escape_length;
            out.cones.push(ToleranceCone::new(
                pos,
                heading,
                length,
                config.angle_tolerance,
            ));
            out.path.push(pos + unit_heading(heading) * length);
            break;
        };

        out.cones.push(ToleranceCone::new(
            pos,
            heading,
            distance,
            config.angle_tolerance,
        ));
        out.sequence.push(prism.id);
        out.path.push(prism.pos);

        pos = prism.pos;
        heading += prism.angle;
    }

    out
}
