//! Разбиение суши на связные компоненты
use std::collections::HashSet;

use super::{Landmass, LandmassId, LandmassSettings};
use crate::coordinate::Coordinate;
use crate::random::RandomSource;
use crate::spatial::SpatialIndex;

/// Связные компоненты множества клеток.
///
/// `seeds` задаёт порядок обхода, `neighbours` — соседство, `is_member` —
/// принадлежность множеству. Каждая компонента растёт слоями: фронт → следующий
/// фронт. Общий `visited` гарантирует, что клетка попадёт ровно в одну компоненту.
pub fn connected_components<I, N, M>(seeds: I, neighbours: N, is_member: M) -> Vec<Vec<Coordinate>>
where
    I: IntoIterator<Item = Coordinate>,
    N: Fn(Coordinate) -> Vec<Coordinate>,
    M: Fn(Coordinate) -> bool,
{
    let mut visited = HashSet::new();
    let mut components = Vec::new();

    for start in seeds {
        if !is_member(start) || !visited.insert(start) {
            continue;
        }

        let mut component = vec![start];
        let mut frontier = vec![start];
        while !frontier.is_empty() {
            let mut next = Vec::new();
            for &c in &frontier {
                for n in neighbours(c) {
                    if is_member(n) && visited.insert(n) {
                        component.push(n);
                        next.push(n);
                    }
                }
            }
            frontier = next;
        }
        components.push(component);
    }
    components
}

/// Один материк на каждую компоненту, связную по ортогональному соседству.
pub fn identify_landmasses<T, R>(
    index: &SpatialIndex<T>,
    settings: &LandmassSettings,
    rng: &mut R,
) -> Vec<Landmass>
where
    R: RandomSource,
{
    connected_components(
        index.coordinates(),
        |c| c.adjacent().to_vec(),
        |c| index.contains(c),
    )
    .into_iter()
    .enumerate()
    .map(|(i, points)| Landmass::new(LandmassId(i), points, settings.clone(), &mut *rng))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::growth::GrowthMap;
    use crate::random::{SeededRandom, SequenceRandom};

    fn square(x0: i32, y0: i32, side: i32) -> Vec<(Coordinate, ())> {
        (y0..y0 + side)
            .flat_map(|y| (x0..x0 + side).map(move |x| (Coordinate::new(x, y), ())))
            .collect()
    }

    #[test]
    fn two_separate_squares() {
        let mut entries = square(0, 0, 2);
        entries.extend(square(5, 0, 2));
        let index = SpatialIndex::build(entries);

        let mut rng = SequenceRandom::constant(0.5);
        let landmasses = identify_landmasses(&index, &LandmassSettings::default(), &mut rng);
        assert_eq!(landmasses.len(), 2);
        for landmass in &landmasses {
            assert_eq!(landmass.len(), 4);
        }
        assert_eq!(landmasses[0].id, LandmassId(0));
        assert!(landmasses[1].point(Coordinate::new(5, 1)).is_some());
    }

    #[test]
    fn diagonal_contact_does_not_join() {
        let index = SpatialIndex::build(vec![
            (Coordinate::new(0, 0), ()),
            (Coordinate::new(1, 1), ()),
        ]);
        let mut rng = SequenceRandom::default();
        let landmasses = identify_landmasses(&index, &LandmassSettings::default(), &mut rng);
        assert_eq!(landmasses.len(), 2);
    }

    #[test]
    fn empty_index_gives_no_landmasses() {
        let index: SpatialIndex<()> = SpatialIndex::default();
        let mut rng = SequenceRandom::default();
        assert!(identify_landmasses(&index, &LandmassSettings::default(), &mut rng).is_empty());
    }

    #[test]
    fn components_do_not_depend_on_seed_order() {
        let mut rng = SeededRandom::new(21);
        let mut map = GrowthMap::default();
        map.grow_to_size(1_500, &mut rng);
        map.prune_scaffolding();
        let index = map.load_index();

        let mut forward: Vec<Vec<Coordinate>> = connected_components(
            index.coordinates(),
            |c| c.adjacent().to_vec(),
            |c| index.contains(c),
        );
        let mut reversed_seeds: Vec<_> = index.coordinates().collect();
        reversed_seeds.reverse();
        let mut backward =
            connected_components(reversed_seeds, |c| c.adjacent().to_vec(), |c| index.contains(c));

        for components in [&mut forward, &mut backward] {
            for component in components.iter_mut() {
                component.sort_unstable();
            }
            components.sort();
        }
        assert_eq!(forward, backward);
    }
}
