use std::{
    collections::{HashMap, VecDeque},
    iter,
};

use log::{debug, trace, warn};

use super::*;
use state::{StateKey, Visited};

/// A live ray: one lineage of the population traced by the [`Engine`].
#[derive(Clone, Debug)]
struct RayState {
    pos: Point,
    heading: Float,
    intensity: Float,
    /// Index of the owning source in the slice given to [`Engine::run`].
    source: usize,
    path: Vec<Point>,
    visited: Visited,
}

impl RayState {
    fn seed(source: usize, laser: &LaserSource) -> Self {
        Self {
            pos: laser.pos,
            heading: laser.angle,
            intensity: 1.0,
            source,
            path: vec![laser.pos],
            visited: Visited::default(),
        }
    }

    /// A copy of this lineage, history included, leaving at `heading` with `intensity`.
    fn branch(&self, heading: Float, intensity: Float) -> Self {
        Self {
            heading,
            intensity,
            ..self.clone()
        }
    }
}

/// Heading (in degrees) of the sum of the unit vectors pointing at `a` and `b`.
#[inline]
pub fn mean_heading(a: Float, b: Float) -> Float {
    let v = unit_heading(a) + unit_heading(b);
    v.y.atan2(v.x).to_degrees()
}

/// Traces populations of rays that split, merge, and fade.
///
/// Rays are processed one segment at a time from a FIFO queue, which makes the
/// output, including which rays a combiner pairs up, fully reproducible.
/// `config.max_iterations` caps the total number of segments processed in one
/// [`run`](Self::run), across all rays.
#[derive(Clone, Copy, Debug)]
pub struct Engine<'a, P: ?Sized> {
    prisms: &'a P,
    config: &'a TraceConfig,
}

/// Mutable state of one [`Engine::run`].
struct Run<'a> {
    results: Vec<PathResult>,
    queue: VecDeque<RayState>,
    /// Rays waiting for a partner, per combiner.
    waiting: HashMap<PrismId, VecDeque<RayState>>,
    config: &'a TraceConfig,
}

impl Run<'_> {
    fn emit(&mut self, ray: RayState) {
        if ray.intensity >= self.config.attenuation_threshold {
            self.queue.push_back(ray);
        } else {
            trace!(
                "source {}: dropped ray of intensity {}",
                self.results[ray.source].source,
                ray.intensity
            );
        }
    }
}

impl<'a, P: PrismSet + ?Sized> Engine<'a, P> {
    #[inline]
    #[must_use]
    pub fn new(prisms: &'a P, config: &'a TraceConfig) -> Self {
        Self { prisms, config }
    }

    /// Traces every ray shot by `sources`, all at once, sharing one budget.
    ///
    /// Returns one result per source, in the same order.
    pub fn run(&self, sources: &[LaserSource]) -> Vec<PathResult> {
        debug!("tracing {} source(s)", sources.len());

        let mut run = Run {
            results: sources.iter().map(|s| PathResult::new(s.id)).collect(),
            queue: sources
                .iter()
                .enumerate()
                .map(|(i, s)| RayState::seed(i, s))
                .collect(),
            waiting: HashMap::new(),
            config: self.config,
        };

        let budget = self.config.max_iterations;
        let mut processed = 0;

        while let Some(ray) = run.queue.pop_front() {
            if processed >= budget {
                warn!("segment budget of {budget} exhausted, {} ray(s) left", run.queue.len() + 1);

                let error = TraceError::BudgetExceeded { limit: budget };
                for source in iter::once(ray.source).chain(run.queue.iter().map(|r| r.source)) {
                    run.results[source].error.get_or_insert(error);
                }
                break;
            }
            processed += 1;

            self.step(&mut run, ray);
        }

        debug!("processed {processed} segment(s)");

        run.results
    }

    /// Traces the rays of a single source, with a budget of its own.
    #[must_use]
    pub fn run_source(&self, source: &LaserSource) -> PathResult {
        self.run(core::slice::from_ref(source))
            .pop()
            .unwrap_or_else(|| PathResult::new(source.id))
    }

    /// Moves `ray` forward by one segment, and queues whatever comes out of it.
    fn step(&self, run: &mut Run, mut ray: RayState) {
        let config = self.config;
        let result = &mut run.results[ray.source];

        let key = StateKey::new(&ray.pos, ray.heading, config.heading_precision);

        if let Some(start) = ray.visited.first_seen_or_insert(key, ray.path.len() - 1) {
            trace!("source {}: lineage looped", result.source);
            result
                .loop_tail
                .get_or_insert_with(|| ray.path[start..].to_vec());
            return;
        }

        let Some(Hit { prism, distance }) = resolve(ray.pos, ray.heading, self.prisms, config)
        else {
            let length = config.escape_distance(ray.intensity);
            result.segments.push(Segment {
                start: ray.pos,
                end: ray.pos + unit_heading(ray.heading) * length,
                start_intensity: ray.intensity,
                end_intensity: config.attenuate(ray.intensity, length),
            });
            result.cones.push(ToleranceCone::new(
                ray.pos,
                ray.heading,
                length,
                config.angle_tolerance,
            ));
            trace!("source {}: ray escaped", result.source);
            return;
        };

        let intensity = config.attenuate(ray.intensity, distance);

        result.segments.push(Segment {
            start: ray.pos,
            end: prism.pos,
            start_intensity: ray.intensity,
            end_intensity: intensity,
        });
        result.cones.push(ToleranceCone::new(
            ray.pos,
            ray.heading,
            distance,
            config.angle_tolerance,
        ));
        result.sequence.push(prism.id);

        trace!(
            "source {}: hit {:?} prism {} at intensity {intensity}",
            result.source,
            prism.kind,
            prism.id
        );

        if intensity < config.attenuation_threshold {
            return;
        }

        ray.pos = prism.pos;
        ray.path.push(prism.pos);
        ray.intensity = intensity;

        match prism.kind {
            PrismKind::Normal => {
                ray.heading += prism.angle;
                run.emit(ray);
            }
            PrismKind::Splitter => {
                let half = ray.intensity / 2.0 * prism.intensity_factor;
                let left = ray.branch(ray.heading + prism.angle, half);
                ray.heading -= prism.angle;
                ray.intensity = half;
                run.emit(left);
                run.emit(ray);
            }
            PrismKind::Reducer | PrismKind::Amplifier => {
                ray.heading += prism.angle;
                ray.intensity = (ray.intensity * prism.intensity_factor).min(1.0);
                run.emit(ray);
            }
            PrismKind::Combiner => {
                let arrivals = run.waiting.entry(prism.id).or_default();
                arrivals.push_back(ray);

                if arrivals.len() < 2 {
                    return;
                }

                // pair the two oldest arrivals, the first one's lineage carries on
                let pair = (arrivals.pop_front(), arrivals.pop_front());
                if let (Some(mut merged), Some(other)) = pair {
                    merged.heading = mean_heading(merged.heading, other.heading) + prism.angle;
                    merged.intensity =
                        ((merged.intensity + other.intensity) * prism.intensity_factor).min(1.0);
                    run.emit(merged);
                }
            }
        }
    }
}
