use std::collections::HashSet;

use log::debug;

use super::*;

/// Checks the contract every entry point relies on: unique ids, finite numbers.
pub fn validate_snapshot(sources: &[LaserSource], prisms: &[Prism]) -> Result<()> {
    let mut prism_ids = HashSet::with_capacity(prisms.len());
    for prism in prisms {
        if !prism_ids.insert(prism.id) {
            return Err(PrismError::DuplicatePrismId(prism.id));
        }
        let finite = prism.pos.iter().all(|c| c.is_finite())
            && prism.angle.is_finite()
            && prism.intensity_factor.is_finite();
        if !finite {
            return Err(PrismError::NonFinite(format!("prism {}", prism.id)));
        }
    }

    let mut source_ids = HashSet::with_capacity(sources.len());
    for source in sources {
        if !source_ids.insert(source.id) {
            return Err(PrismError::DuplicateSourceId(source.id));
        }
        if !(source.pos.iter().all(|c| c.is_finite()) && source.angle.is_finite()) {
            return Err(PrismError::NonFinite(format!("laser source {}", source.id)));
        }
    }

    Ok(())
}

/// Traces every source through `prisms` with the branching [`Engine`].
///
/// Sources are traced independently (each with a budget of its own), so one
/// of them looping or running out of budget never affects the others.
/// Results come back in the order of `sources`.
pub fn trace_all(
    sources: &[LaserSource],
    prisms: &[Prism],
    config: &TraceConfig,
) -> Result<Vec<PathResult>> {
    config.validate()?;
    validate_snapshot(sources, prisms)?;

    debug!(
        "tracing {} source(s) through {} prism(s)",
        sources.len(),
        prisms.len()
    );

    let engine = Engine::new(prisms, config);

    Ok(sources
        .iter()
        .map(|source| engine.run_source(source))
        .collect())
}

/// An immutable snapshot of everything a collaborator hands to the engines.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    pub prisms: Vec<Prism>,
    pub sources: Vec<LaserSource>,
    pub config: TraceConfig,
}

impl Scene {
    #[inline]
    #[must_use]
    pub fn new(prisms: Vec<Prism>, sources: Vec<LaserSource>, config: TraceConfig) -> Self {
        Self {
            prisms,
            sources,
            config,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.config.validate()?;
        validate_snapshot(&self.sources, &self.prisms)
    }

    pub fn trace_all(&self) -> Result<Vec<PathResult>> {
        trace_all(&self.sources, &self.prisms, &self.config)
    }

    /// Single-ray traces of every source.
    pub fn trace_each(&self) -> Result<Vec<TracePath>> {
        self.validate()?;
        Ok(self
            .sources
            .iter()
            .map(|source| trace_one(source, self.prisms.as_slice(), &self.config))
            .collect())
    }

    #[inline]
    pub fn prism(&self, id: PrismId) -> Option<&Prism> {
        self.prisms.iter().find(|p| p.id == id)
    }

    #[inline]
    pub fn next_prism_id(&self) -> PrismId {
        self.prisms.iter().map(|p| p.id).max().unwrap_or(0) + 1
    }

    #[inline]
    pub fn next_source_id(&self) -> SourceId {
        self.sources.iter().map(|s| s.id).max().unwrap_or(0) + 1
    }
}
