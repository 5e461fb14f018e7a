use super::*;

/// The prism a ray runs into next, and how far away it is.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit<'a> {
    pub prism: &'a Prism,
    pub distance: Float,
}

/// State of one nearest-hit query: the ray being cast, and the best candidate so far.
#[derive(Clone, Debug)]
pub struct HitCtx<'a> {
    origin: Point,
    heading: Float,
    tolerance: Float,
    epsilon: Float,
    tie_break: TieBreak,
    closest: Option<Hit<'a>>,
}

impl<'a> HitCtx<'a> {
    #[inline]
    #[must_use]
    pub fn new(origin: Point, heading: Float, config: &TraceConfig) -> Self {
        Self {
            origin,
            heading,
            tolerance: config.angle_tolerance,
            epsilon: config.self_hit_epsilon,
            tie_break: config.tie_break,
            closest: None,
        }
    }

    /// Offer `prism` as a candidate.
    ///
    /// It is kept if it lies strictly inside the tolerance cone, isn't (almost)
    /// on the ray's origin, and is closer than every candidate offered before.
    #[inline]
    pub fn add_candidate(&mut self, prism: &'a Prism) {
        let d = prism.pos - self.origin;
        let distance = d.norm();

        if distance <= self.epsilon {
            return;
        }

        let bearing = d.y.atan2(d.x).to_degrees();

        if signed_deviation(bearing, self.heading).abs() >= self.tolerance {
            return;
        }

        let closer = self.closest.as_ref().map_or(true, |best| {
            distance < best.distance
                || (distance == best.distance && self.tie_break.prefers(prism, best.prism))
        });

        if closer {
            self.closest = Some(Hit { prism, distance });
        }
    }

    #[inline]
    #[must_use]
    pub fn finish(self) -> Option<Hit<'a>> {
        self.closest
    }
}

/// A collection of prisms a ray can run into.
///
/// Implementors offer each of their prisms to the query with
/// [`ctx.add_candidate(...)`](HitCtx::add_candidate), in a deterministic order:
/// with [`TieBreak::InputOrder`], that order decides between equidistant prisms.
pub trait PrismSet {
    fn add_candidates<'a>(&'a self, ctx: &mut HitCtx<'a>);
}

impl PrismSet for Prism {
    #[inline]
    fn add_candidates<'a>(&'a self, ctx: &mut HitCtx<'a>) {
        ctx.add_candidate(self)
    }
}

impl<T: PrismSet> PrismSet for [T] {
    #[inline]
    fn add_candidates<'a>(&'a self, ctx: &mut HitCtx<'a>) {
        self.iter().for_each(|prisms| prisms.add_candidates(ctx))
    }
}

impl<T: PrismSet, const N: usize> PrismSet for [T; N] {
    #[inline]
    fn add_candidates<'a>(&'a self, ctx: &mut HitCtx<'a>) {
        self.as_slice().add_candidates(ctx)
    }
}

// All these impls go through `Deref`, but a blanket impl over `Deref` would make
// it impossible to implement `PrismSet` for new types downstream.

impl<T: PrismSet> PrismSet for Vec<T> {
    #[inline]
    fn add_candidates<'a>(&'a self, ctx: &mut HitCtx<'a>) {
        self.as_slice().add_candidates(ctx)
    }
}

impl<T: PrismSet + ?Sized> PrismSet for Box<T> {
    #[inline]
    fn add_candidates<'a>(&'a self, ctx: &mut HitCtx<'a>) {
        self.as_ref().add_candidates(ctx)
    }
}

impl<T: PrismSet + ?Sized> PrismSet for &T {
    #[inline]
    fn add_candidates<'a>(&'a self, ctx: &mut HitCtx<'a>) {
        (**self).add_candidates(ctx)
    }
}

/// Returns the nearest prism in `prisms` lying in the tolerance cone
/// of the ray leaving `origin` at `heading` degrees, if any.
#[inline]
#[must_use]
pub fn resolve<'a, P: PrismSet + ?Sized>(
    origin: Point,
    heading: Float,
    prisms: &'a P,
    config: &TraceConfig,
) -> Option<Hit<'a>> {
    let mut ctx = HitCtx::new(origin, heading, config);
    prisms.add_candidates(&mut ctx);
    ctx.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(hit: Option<Hit>) -> Option<PrismId> {
        hit.map(|h| h.prism.id)
    }

    #[test]
    fn picks_nearest_in_cone() {
        let prisms = [
            Prism::new(1, [20., 0.], 0.),
            Prism::new(2, [10., 0.], 0.),
            Prism::new(3, [5., 5.], 0.),
        ];
        let config = TraceConfig::default();

        let hit = resolve(Point::zeros(), 0., &prisms, &config);
        assert_eq!(ids(hit), Some(2));
        assert_eq!(hit.map(|h| h.distance), Some(10.));

        assert_eq!(ids(resolve(Point::zeros(), 45., &prisms, &config)), Some(3));
        assert_eq!(ids(resolve(Point::zeros(), 90., &prisms, &config)), None);
    }

    #[test]
    fn cone_is_strict() {
        // bearing of exactly 1 degree
        let p = Prism::new(1, unit_heading(1.0) * 10., 0.);
        let config = TraceConfig::new().angle_tolerance(1.0 + 1e-9);
        assert_eq!(ids(resolve(Point::zeros(), 0., &p, &config)), Some(1));

        let config = TraceConfig::new().angle_tolerance(0.999);
        assert_eq!(ids(resolve(Point::zeros(), 0., &p, &config)), None);
    }

    #[test]
    fn behind_is_not_in_cone() {
        let prisms = vec![Prism::new(1, [-10., 0.], 0.)];
        assert_eq!(
            ids(resolve(Point::zeros(), 0., &prisms, &TraceConfig::default())),
            None
        );
    }

    #[test]
    fn coincident_prism_is_skipped() {
        let prisms = vec![Prism::new(1, [0., 0.], 0.), Prism::new(2, [3., 0.], 0.)];
        assert_eq!(
            ids(resolve(Point::zeros(), 0., &prisms, &TraceConfig::default())),
            Some(2)
        );
    }

    #[test]
    fn heading_wraps_around() {
        let prisms = [Prism::new(1, [10., 0.], 0.)];
        let config = TraceConfig::default();
        assert_eq!(ids(resolve(Point::zeros(), 360., &prisms, &config)), Some(1));
        assert_eq!(ids(resolve(Point::zeros(), -720., &prisms, &config)), Some(1));
    }

    #[test]
    fn equidistant_prisms_follow_tie_break() {
        let prisms = [Prism::new(7, [10., 0.], 0.), Prism::new(3, [10., 0.], 90.)];

        let config = TraceConfig::default();
        for _ in 0..3 {
            assert_eq!(ids(resolve(Point::zeros(), 0., &prisms, &config)), Some(7));
        }

        let config = config.tie_break(TieBreak::LowestId);
        assert_eq!(ids(resolve(Point::zeros(), 0., &prisms, &config)), Some(3));

        let reversed = [prisms[1].clone(), prisms[0].clone()];
        assert_eq!(ids(resolve(Point::zeros(), 0., &reversed, &config)), Some(3));
    }

    #[test]
    fn works_through_references() {
        let prisms = [Prism::new(1, [10., 0.], 0.), Prism::new(2, [4., 0.], 0.)];
        let filtered: Vec<&Prism> = prisms.iter().filter(|p| p.id != 2).collect();
        assert_eq!(
            ids(resolve(Point::zeros(), 0., filtered.as_slice(), &TraceConfig::default())),
            Some(1)
        );

        let boxed: Box<[Prism]> = prisms.to_vec().into_boxed_slice();
        assert_eq!(
            ids(resolve(Point::zeros(), 0., &boxed, &TraceConfig::default())),
            Some(2)
        );
    }

    #[test]
    fn candidates_can_be_offered_by_hand() {
        let near = Prism::new(1, [5., 8.], 0.);
        let far = Prism::new(2, [5., 12.], 0.);
        let aside = Prism::new(3, [6., 3.], 0.);

        let mut ctx = HitCtx::new(Point::new(5., 2.), 90., &TraceConfig::default());
        for prism in [&far, &aside, &near] {
            ctx.add_candidate(prism);
        }

        let hit = ctx.finish();
        assert_eq!(ids(hit), Some(1));
        assert_eq!(hit.map(|h| h.distance), Some(6.));
    }
}
