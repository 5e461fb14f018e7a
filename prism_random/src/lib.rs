use prism::*;

use core::iter;
use std::collections::HashMap;

pub use rand;

use rand::seq::SliceRandom;

pub trait Random: Sized {
    /// Generate a randomized version of this object using the provided `rng`
    ///
    /// This method must not fail.
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self;
}

/// Half the side of the square random prisms and sources are placed in.
pub const HALF_EXTENT: i32 = 10;

/// Prism positions are picked on an integer grid and angles are multiples of this,
/// so that random rays actually run into things.
pub const ANGLE_STEP: Float = 45.0;

impl Random for PrismKind {
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

impl Random for Prism {
    /// The id is left at `0`, see [`random_scene`] for numbered prisms.
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        let kind = PrismKind::random(rng);

        let intensity_factor = match kind {
            PrismKind::Reducer => rng.gen_range(0.1..1.0),
            PrismKind::Amplifier => rng.gen_range(1.0..3.0),
            _ => 1.0,
        };

        Self::new(0, rand_grid_point(rng, HALF_EXTENT), rand_angle(rng))
            .with_kind(kind)
            .with_intensity_factor(intensity_factor)
    }
}

impl Random for LaserSource {
    /// The id is left at `0`, see [`random_scene`] for numbered sources.
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        Self::new(0, rand_grid_point(rng, HALF_EXTENT), rand_angle(rng))
    }
}

/// A scene with `num_prisms` prisms and `num_sources` sources, both numbered from `1`.
pub fn random_scene(
    num_prisms: usize,
    num_sources: usize,
    rng: &mut (impl rand::Rng + ?Sized),
) -> Scene {
    let prisms = iter::repeat_with(|| Prism::random(rng))
        .zip(1..)
        .map(|(prism, id)| Prism { id, ..prism })
        .take(num_prisms)
        .collect();

    let sources = iter::repeat_with(|| LaserSource::random(rng))
        .zip(1..)
        .map(|(source, id)| LaserSource { id, ..source })
        .take(num_sources)
        .collect();

    Scene::new(prisms, sources, TraceConfig::default())
}

pub fn rand_grid_point(rng: &mut (impl rand::Rng + ?Sized), half_extent: i32) -> Point {
    let half_extent = half_extent.abs();
    Point::from_fn(|_, _| rng.gen_range(-half_extent..=half_extent) as Float)
}

/// A random multiple of [`ANGLE_STEP`] in `[-180, 180)`.
pub fn rand_angle(rng: &mut (impl rand::Rng + ?Sized)) -> Float {
    let steps = (360.0 / ANGLE_STEP) as i32;
    wrap_degrees(rng.gen_range(0..steps) as Float * ANGLE_STEP)
}

/// Shuffles the order of `prisms`, and hands their ids out again at random.
///
/// Returns the mapping from old to new ids.
pub fn shuffle_ids(
    prisms: &mut [Prism],
    rng: &mut (impl rand::Rng + ?Sized),
) -> HashMap<PrismId, PrismId> {
    shuffle_ids_with(prisms, rng, |p| p.id, |p, id| p.id = id)
}

/// Same as [`shuffle_ids`], for anything carrying a prism id. `id` reads it and
/// `set_id` overwrites it.
pub fn shuffle_ids_with<T>(
    items: &mut [T],
    rng: &mut (impl rand::Rng + ?Sized),
    id: impl Fn(&T) -> PrismId,
    mut set_id: impl FnMut(&mut T, PrismId),
) -> HashMap<PrismId, PrismId> {
    items.shuffle(rng);

    let old_ids: Vec<_> = items.iter().map(id).collect();
    let mut new_ids = old_ids.clone();
    new_ids.shuffle(rng);

    for (item, &id) in items.iter_mut().zip(&new_ids) {
        set_id(item, id);
    }

    old_ids.into_iter().zip(new_ids).collect()
}

/// Rewrites `sequence` through `ids`. Ids missing from the map are left as they are.
pub fn remap_sequence(sequence: &mut [PrismId], ids: &HashMap<PrismId, PrismId>) {
    for id in sequence {
        if let Some(&new) = ids.get(id) {
            *id = new;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn random_scenes_are_numbered_and_valid() {
        let mut rng = StdRng::seed_from_u64(7);
        let scene = random_scene(12, 3, &mut rng);

        assert_eq!(scene.prisms.len(), 12);
        assert_eq!(scene.sources.len(), 3);
        assert_eq!(
            scene.prisms.iter().map(|p| p.id).collect::<Vec<_>>(),
            (1..=12).collect::<Vec<_>>()
        );
        assert_eq!(scene.next_source_id(), 4);
        assert!(scene.validate().is_ok());

        for prism in &scene.prisms {
            assert!(prism.pos.iter().all(|c| c.abs() <= HALF_EXTENT as Float));
            assert!((-180.0..180.0).contains(&prism.angle));
            assert_eq!(prism.angle % ANGLE_STEP, 0.0);
        }

        assert!(scene.trace_all().is_ok());
    }

    #[test]
    fn same_seed_same_scene() {
        let a = random_scene(8, 2, &mut StdRng::seed_from_u64(42));
        let b = random_scene(8, 2, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn shuffled_ids_keep_traces_consistent() {
        let mut prisms = vec![
            Prism::new(1, [10., 0.], 90.),
            Prism::new(2, [10., 10.], 90.),
            Prism::new(3, [0., 10.], -45.),
            Prism::new(4, [-5., -5.], 0.),
        ];
        let source = LaserSource::new(1, [0., 0.], 0.);
        let config = TraceConfig::default();

        let mut expected = trace_one(&source, &prisms, &config).sequence;
        assert_eq!(expected, [1, 2, 3]);

        let ids = shuffle_ids(&mut prisms, &mut StdRng::seed_from_u64(3));
        remap_sequence(&mut expected, &ids);

        let mut new_ids: Vec<_> = ids.values().copied().collect();
        new_ids.sort_unstable();
        assert_eq!(new_ids, [1, 2, 3, 4]);

        assert_eq!(trace_one(&source, &prisms, &config).sequence, expected);
    }

    #[test]
    fn ids_are_dealt_out_again() {
        let original = [(10, 'a'), (20, 'b'), (30, 'c')];
        let mut items = original.to_vec();

        let ids = shuffle_ids_with(
            &mut items,
            &mut StdRng::seed_from_u64(9),
            |&(id, _)| id,
            |item, id| item.0 = id,
        );

        let mut new_ids: Vec<_> = items.iter().map(|&(id, _)| id).collect();
        new_ids.sort_unstable();
        assert_eq!(new_ids, [10, 20, 30]);
        // each item keeps its payload and takes the id it was mapped to
        for (old, label) in original {
            assert!(items.contains(&(ids[&old], label)));
        }
    }

    #[test]
    fn unknown_ids_are_left_alone() {
        let ids = HashMap::from([(1, 2), (2, 1)]);
        let mut sequence = vec![1, 2, 9, 1];
        remap_sequence(&mut sequence, &ids);
        assert_eq!(sequence, [2, 1, 9, 2]);
    }
}
