use std::collections::{hash_map::Entry, HashMap};

use super::*;

/// Loop-detection key of a ray.
///
/// The position is kept exact (bit for bit), the heading is taken modulo 360
/// and rounded to a fixed number of decimals. A cycle whose position drifts by
/// floating point error is therefore never detected as such.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct StateKey {
    x: u64,
    y: u64,
    heading: i64,
}

impl StateKey {
    pub(crate) fn new(pos: &Point, heading: Float, precision: u32) -> Self {
        let scale = 10f64.powi(precision as i32);
        let full_turn = (360.0 * scale).round() as i64;

        let mut heading = (heading.rem_euclid(360.0) * scale).round() as i64;
        if heading == full_turn {
            heading = 0;
        }

        // `+ 0.0` turns -0.0 into 0.0
        Self {
            x: (pos.x + 0.0).to_bits(),
            y: (pos.y + 0.0).to_bits(),
            heading,
        }
    }
}

/// States already visited by one lineage, with the index in its path at
/// which each was first seen.
///
/// Branches get their own copy: sibling rays must not see each other's history.
#[derive(Clone, Debug, Default)]
pub(crate) struct Visited(HashMap<StateKey, usize>);

impl Visited {
    /// Records `key` as first seen at `index`, or returns the index it was first seen at.
    pub(crate) fn first_seen_or_insert(&mut self, key: StateKey, index: usize) -> Option<usize> {
        match self.0.entry(key) {
            Entry::Occupied(seen) => Some(*seen.get()),
            Entry::Vacant(slot) => {
                slot.insert(index);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(x: Float, y: Float, heading: Float) -> StateKey {
        StateKey::new(&Point::new(x, y), heading, 6)
    }

    #[test]
    fn heading_is_taken_modulo_360() {
        assert_eq!(key(1., 2., 10.), key(1., 2., 370.));
        assert_eq!(key(1., 2., -90.), key(1., 2., 270.));
        assert_eq!(key(1., 2., 0.), key(1., 2., 360.));
        assert_eq!(key(1., 2., 0.), key(1., 2., -1e-9));
    }

    #[test]
    fn heading_is_rounded_but_position_is_not() {
        assert_eq!(key(1., 2., 45.), key(1., 2., 45. + 1e-9));
        assert_ne!(key(1., 2., 45.), key(1., 2., 45. + 1e-5));
        assert_ne!(key(1., 2., 45.), key(1. + 1e-12, 2., 45.));
        assert_eq!(key(0., 0., 0.), key(-0., -0., 0.));
    }

    #[test]
    fn remembers_first_index() {
        let mut visited = Visited::default();
        assert_eq!(visited.first_seen_or_insert(key(0., 0., 0.), 0), None);
        assert_eq!(visited.first_seen_or_insert(key(1., 0., 0.), 1), None);
        assert_eq!(visited.first_seen_or_insert(key(0., 0., 0.), 2), Some(0));
        assert_eq!(visited.first_seen_or_insert(key(0., 0., 0.), 3), Some(0));
    }
}
