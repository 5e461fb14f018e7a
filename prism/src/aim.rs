//! Helpers to place prisms along a ray's dominant path.

use super::*;

/// What emits the last leg of a source's dominant path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shooter<'a> {
    Source(&'a LaserSource),
    Prism(&'a Prism),
}

impl Shooter<'_> {
    #[inline]
    pub fn pos(&self) -> Point {
        match self {
            Self::Source(source) => source.pos,
            Self::Prism(prism) => prism.pos,
        }
    }
}

/// The last prism on the dominant path of `source`, ignoring the prisms in `exclude`.
///
/// Falls back to the source itself if nothing is hit, or if the trace runs out of budget.
pub fn active_shooter<'a>(
    source: &'a LaserSource,
    prisms: &'a [Prism],
    config: &TraceConfig,
    exclude: &[PrismId],
) -> Shooter<'a> {
    let candidates: Vec<&Prism> = prisms.iter().filter(|p| !exclude.contains(&p.id)).collect();

    let path = trace_one(source, candidates.as_slice(), config);

    if path.error.is_some() {
        return Shooter::Source(source);
    }

    path.last_hit()
        .and_then(|id| prisms.iter().find(|p| p.id == id))
        .map_or(Shooter::Source(source), Shooter::Prism)
}

/// The angle `shooter` needs so that its ray heads straight for `target`.
///
/// For the source, that's an absolute heading. For a prism, it's the deflection
/// to apply to the ray reaching it along the dominant path of `source`, wrapped
/// into `[-180, 180)`.
pub fn aim_angle(
    source: &LaserSource,
    prisms: &[Prism],
    config: &TraceConfig,
    shooter: Shooter,
    target: Point,
) -> Float {
    let d = target - shooter.pos();
    let desired = d.y.atan2(d.x).to_degrees();

    let Shooter::Prism(shooter) = shooter else {
        return desired;
    };

    let mut incoming = source.angle;

    let path = trace_one(source, prisms, config);
    if path.error.is_none() {
        if let Some(i) = path.sequence.iter().position(|&id| id == shooter.id) {
            incoming += path.sequence[..i]
                .iter()
                .filter_map(|&id| prisms.iter().find(|p| p.id == id))
                .map(|p| p.angle)
                .sum::<Float>();
        }
    }

    wrap_degrees(desired - incoming)
}
