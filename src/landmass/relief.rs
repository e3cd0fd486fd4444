//! Рельеф: расстояние до воды, горные хребты, расстояние до гор и высота
//!
//! Все расстояния — BFS по ортогональному соседству внутри материка.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use super::partition::connected_components;
use super::{LandType, Landmass, RangeId, Stage};
use crate::coordinate::Coordinate;
use crate::error::PipelineError;

/// Горный хребет: вершины (`snowcapped`) и склоны на уровень ниже (`regular`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountainRange {
    pub id: RangeId,
    pub snowcapped: Vec<Coordinate>,
    pub regular: Vec<Coordinate>,
}

impl Landmass {
    /// BFS от всех береговых точек. Возвращает наибольшее расстояние.
    pub fn distance_to_water(&mut self) -> Result<u32, PipelineError> {
        self.require(Stage::DistanceToWater)?;
        if let Some(highest) = self.highest_distance_to_water {
            if self.is_complete(Stage::DistanceToWater) {
                return Ok(highest);
            }
        }

        for point in self.points.values_mut() {
            point.distance_to_water = None;
        }

        let mut queue = VecDeque::new();
        for &c in &self.coastal_points {
            if let Some(point) = self.points.find_mut(c) {
                point.distance_to_water = Some(0);
                queue.push_back((c, 0));
            }
        }

        let mut highest = 0;
        while let Some((c, distance)) = queue.pop_front() {
            highest = highest.max(distance);
            for n in c.adjacent() {
                if let Some(point) = self.points.find_mut(n) {
                    if point.distance_to_water.is_none() {
                        point.distance_to_water = Some(distance + 1);
                        queue.push_back((n, distance + 1));
                    }
                }
            }
        }

        self.highest_distance_to_water = Some(highest);
        self.complete(Stage::DistanceToWater);
        Ok(highest)
    }

    /// Выделяет горные хребты среди клеток, далёких от воды.
    ///
    /// Клетки с расстоянием до воды больше `mountain_threshold` делятся на
    /// области по соседству Мура. Область становится хребтом, если перепад
    /// расстояний в ней не меньше `min_relief`: клетки с максимумом получают
    /// снежные шапки, на единицу ниже — обычные горы. Остальные области
    /// слишком плоские и отбрасываются.
    pub fn grow_mountains(&mut self) -> Result<&[MountainRange], PipelineError> {
        self.require(Stage::Mountains)?;
        if self.is_complete(Stage::Mountains) {
            return Ok(&self.mountain_ranges);
        }

        let threshold = self.settings.terrain.mountain_threshold;
        let min_relief = self.settings.terrain.min_relief;

        let elevated: HashSet<Coordinate> = self
            .points
            .values()
            .filter(|p| p.distance_to_water.is_some_and(|d| d > threshold))
            .map(|p| p.coordinate)
            .collect();

        // Обход в порядке индекса, чтобы нумерация хребтов не зависела от хеша
        let seeds = self
            .points
            .coordinates()
            .filter(|c| elevated.contains(c));
        let regions = connected_components(seeds, Coordinate::neighborhood, |c| {
            elevated.contains(&c)
        });

        let mut ranges = Vec::new();
        for region in regions {
            let distances: Vec<u32> = region
                .iter()
                .filter_map(|&c| self.points.find(c).and_then(|p| p.distance_to_water))
                .collect();
            let (Some(&low), Some(&high)) = (distances.iter().min(), distances.iter().max())
            else {
                continue;
            };
            if high - low < min_relief {
                continue;
            }

            let mut range = MountainRange {
                id: RangeId(ranges.len()),
                snowcapped: Vec::new(),
                regular: Vec::new(),
            };
            for c in region {
                let Some(point) = self.points.find_mut(c) else {
                    continue;
                };
                if point.land_type != LandType::Land {
                    continue;
                }
                match point.distance_to_water {
                    Some(d) if d == high => {
                        point.land_type = LandType::Snowcapped;
                        range.snowcapped.push(c);
                    }
                    Some(d) if d + 1 == high => {
                        point.land_type = LandType::Mountain;
                        range.regular.push(c);
                    }
                    _ => {}
                }
            }
            ranges.push(range);
        }

        self.mountain_ranges = ranges;
        self.complete(Stage::Mountains);
        Ok(&self.mountain_ranges)
    }

    /// Расстояние до ближайшего обычного горного склона любого хребта.
    pub fn find_distance_to_mountains(&mut self) -> Result<(), PipelineError> {
        self.require(Stage::DistanceToMountains)?;
        if self.is_complete(Stage::DistanceToMountains) {
            return Ok(());
        }

        for point in self.points.values_mut() {
            point.distance_to_mountain = None;
        }

        let sources: Vec<Vec<Coordinate>> = self
            .mountain_ranges
            .iter()
            .map(|range| range.regular.clone())
            .collect();

        for regular in sources {
            let mut visited: HashSet<Coordinate> = HashSet::new();
            let mut queue = VecDeque::new();
            for c in regular {
                if visited.insert(c) {
                    queue.push_back((c, 0));
                }
            }

            while let Some((c, distance)) = queue.pop_front() {
                let Some(point) = self.points.find_mut(c) else {
                    continue;
                };
                if point.distance_to_mountain.is_none_or(|d| distance < d) {
                    point.distance_to_mountain = Some(distance);
                }
                for n in c.adjacent() {
                    if self.points.contains(n) && visited.insert(n) {
                        queue.push_back((n, distance + 1));
                    }
                }
            }
        }

        self.complete(Stage::DistanceToMountains);
        Ok(())
    }

    /// Высота пока равна расстоянию до воды; близость гор не учитывается.
    pub fn calculate_elevation(&mut self) -> Result<(), PipelineError> {
        self.require(Stage::Elevation)?;
        for point in self.points.values_mut() {
            point.elevation = point.distance_to_water;
        }
        self.complete(Stage::Elevation);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmass::tests::block;

    fn prepared(width: i32, height: i32) -> Landmass {
        let mut landmass = block(width, height, &[]);
        landmass.find_coastal_points();
        landmass.distance_to_water().unwrap();
        landmass
    }

    #[test]
    fn three_by_three_distance_to_water() {
        let landmass = prepared(3, 3);
        for point in landmass.points().values() {
            let expected = if point.coordinate == Coordinate::new(1, 1) { 1 } else { 0 };
            assert_eq!(point.distance_to_water, Some(expected), "{}", point.coordinate);
        }
        assert_eq!(landmass.highest_distance_to_water(), Some(1));
    }

    #[test]
    fn distance_is_one_more_than_lowest_neighbour() {
        let landmass = prepared(9, 6);
        for point in landmass.points().values() {
            let d = point.distance_to_water.unwrap();
            assert_eq!(d == 0, point.is_coastal);
            if !point.is_coastal {
                let lowest = point
                    .coordinate
                    .adjacent()
                    .iter()
                    .filter_map(|&n| landmass.point(n).and_then(|p| p.distance_to_water))
                    .min()
                    .unwrap();
                assert_eq!(d, lowest + 1);
            }
        }
    }

    #[test]
    fn square_grows_one_centred_range() {
        let mut landmass = prepared(15, 15);
        assert_eq!(landmass.highest_distance_to_water(), Some(7));

        let ranges = landmass.grow_mountains().unwrap().to_vec();
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].snowcapped, vec![Coordinate::new(7, 7)]);
        assert_eq!(ranges[0].regular.len(), 8);
        for &c in &ranges[0].regular {
            assert_eq!(c.chebyshev_distance(Coordinate::new(7, 7)), 1);
            assert_eq!(landmass.point(c).unwrap().land_type, LandType::Mountain);
        }
        assert_eq!(
            landmass.point(Coordinate::new(7, 7)).unwrap().land_type,
            LandType::Snowcapped
        );
        assert_eq!(
            landmass.point(Coordinate::new(7, 4)).unwrap().land_type,
            LandType::Land
        );
    }

    #[test]
    fn flat_regions_are_not_ranges() {
        // Расстояния внутри не превышают 4: перепад 0
        let mut landmass = prepared(9, 40);
        assert!(landmass.grow_mountains().unwrap().is_empty());
    }

    #[test]
    fn distance_to_mountains_from_regular_slopes() {
        let mut landmass = prepared(15, 15);
        landmass.grow_mountains().unwrap();
        landmass.find_distance_to_mountains().unwrap();

        let at = |x, y| {
            landmass
                .point(Coordinate::new(x, y))
                .unwrap()
                .distance_to_mountain
        };
        assert_eq!(at(6, 6), Some(0));
        assert_eq!(at(7, 7), Some(1));
        assert_eq!(at(0, 0), Some(12));
        assert_eq!(at(7, 0), Some(6));
    }

    #[test]
    fn overlapping_ranges_keep_nearest_distance() {
        use crate::landmass::{LandmassId, LandmassSettings};
        use crate::random::SequenceRandom;

        // Два квадрата 15×15, соединённые перешейком шириной в клетку по y = 7
        let coordinates = (0..15)
            .flat_map(|y| (0..15).chain(25..40).map(move |x| Coordinate::new(x, y)))
            .chain((15..25).map(|x| Coordinate::new(x, 7)));
        let mut landmass = Landmass::new(
            LandmassId(0),
            coordinates,
            LandmassSettings::default(),
            &mut SequenceRandom::default(),
        );
        landmass.find_coastal_points();
        landmass.distance_to_water().unwrap();
        assert_eq!(landmass.grow_mountains().unwrap().len(), 2);
        landmass.find_distance_to_mountains().unwrap();

        let at = |x| {
            landmass
                .point(Coordinate::new(x, 7))
                .unwrap()
                .distance_to_mountain
        };
        // Ближе к левому хребту
        assert_eq!(at(14), Some(5));
        assert_eq!(at(17), Some(8));
        assert_eq!(at(19), Some(10));
        // Ближе к правому
        assert_eq!(at(20), Some(10));
        assert_eq!(at(22), Some(8));
    }

    #[test]
    fn elevation_follows_water_distance() {
        let mut landmass = prepared(6, 6);
        landmass.calculate_elevation().unwrap();
        for point in landmass.points().values() {
            assert_eq!(point.elevation, point.distance_to_water);
        }
    }
}
