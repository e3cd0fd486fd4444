//! Рост суши случайной заливкой
//!
//! Карта растёт слоями от начала координат: каждый вызов [`GrowthMap::grow`]
//! занимает часть свободных соседей текущего фронта, и новый слой становится
//! фронтом. Серии суши чередуются с сериями "лесов" (scaffold) — временных
//! клеток, которые раздвигают будущие материки и удаляются перед анализом.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::GrowthSettings;
use crate::coordinate::Coordinate;
use crate::random::RandomSource;
use crate::spatial::SpatialIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrowthType {
    Land,
    Scaffold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowthPointData {
    pub coordinate: Coordinate,
    pub land_type: GrowthType,
}

#[derive(Debug, Clone)]
pub struct GrowthMap {
    points: Vec<GrowthPointData>,
    occupied: HashSet<Coordinate>,
    growth_points: Vec<Coordinate>,
    settings: GrowthSettings,
}

impl Default for GrowthMap {
    fn default() -> Self {
        Self::new(GrowthSettings::default())
    }
}

impl GrowthMap {
    /// Пустая карта с фронтом в начале координат. Сама точка `(0, 0)` не занята.
    #[must_use]
    pub fn new(settings: GrowthSettings) -> Self {
        Self {
            points: Vec::new(),
            occupied: HashSet::new(),
            growth_points: vec![Coordinate::ORIGIN],
            settings,
        }
    }

    #[must_use]
    pub fn points(&self) -> &[GrowthPointData] {
        &self.points
    }

    #[must_use]
    pub fn growth_points(&self) -> &[Coordinate] {
        &self.growth_points
    }

    #[must_use]
    pub fn contains(&self, coordinate: Coordinate) -> bool {
        self.occupied.contains(&coordinate)
    }

    #[must_use]
    pub fn land_count(&self) -> usize {
        self.points
            .iter()
            .filter(|p| p.land_type == GrowthType::Land)
            .count()
    }

    /// Один слой роста.
    ///
    /// Соседи каждой точки фронта обходятся в случайном порядке, занятые
    /// пропускаются. Первый подходящий кандидат за вызов занимается всегда,
    /// остальные — с вероятностью `probability`. Возвращает новый фронт.
    pub fn grow<R, F>(
        &mut self,
        land_type: GrowthType,
        probability: f64,
        rng: &mut R,
        mut callback: F,
    ) -> Vec<Coordinate>
    where
        R: RandomSource,
        F: FnMut(&GrowthPointData),
    {
        let mut new_growth = Vec::new();

        for point in std::mem::take(&mut self.growth_points) {
            let mut candidates = point.adjacent();
            rng.shuffle(&mut candidates);

            for candidate in candidates {
                if self.occupied.contains(&candidate) {
                    continue;
                }
                if new_growth.is_empty() || rng.uniform_bool(probability) {
                    let data = GrowthPointData {
                        coordinate: candidate,
                        land_type,
                    };
                    self.occupied.insert(candidate);
                    self.points.push(data);
                    callback(&data);
                    new_growth.push(candidate);
                }
            }
        }

        self.growth_points.clone_from(&new_growth);
        new_growth
    }

    /// Растит сушу, пока не наберётся `size` клеток или фронт не иссякнет.
    ///
    /// Возвращает число выращенных клеток суши.
    pub fn grow_to_size<R: RandomSource>(&mut self, size: usize, rng: &mut R) -> usize {
        self.grow_to_size_with(size, rng, |_| {})
    }

    pub fn grow_to_size_with<R, F>(&mut self, size: usize, rng: &mut R, mut callback: F) -> usize
    where
        R: RandomSource,
        F: FnMut(&GrowthPointData),
    {
        let min = i64::from(self.settings.burst_min);
        let max = i64::from(self.settings.burst_max.max(1));
        let land_probability = self.settings.land_probability;
        let scaffold_probability = self.settings.scaffold_probability;

        let mut count = 0;
        while count < size {
            // Серия суши
            let burst = rng.uniform_int(min, max).max(1);
            for _ in 0..burst {
                if count >= size {
                    break;
                }
                let grown = self
                    .grow(GrowthType::Land, land_probability, rng, &mut callback)
                    .len();
                if grown == 0 {
                    // Фронт исчерпан — это нормальная остановка
                    return count;
                }
                count += grown;
            }

            // Серия лесов: без обратного вызова и без выхода по пустому слою
            let burst = rng.uniform_int(min, max).max(1);
            for _ in 0..burst {
                if count >= size {
                    break;
                }
                self.grow(GrowthType::Scaffold, scaffold_probability, rng, |_| {});
            }
        }
        count
    }

    /// Удаляет все временные клетки. Повторный вызов ничего не меняет.
    pub fn prune_scaffolding(&mut self) {
        self.points.retain(|p| p.land_type == GrowthType::Land);
        self.occupied = self.points.iter().map(|p| p.coordinate).collect();
        let occupied = &self.occupied;
        self.growth_points.retain(|c| occupied.contains(c));
    }

    /// Строит индекс по текущим точкам.
    #[must_use]
    pub fn load_index(&self) -> SpatialIndex<GrowthPointData> {
        self.points.iter().map(|p| (p.coordinate, *p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{SeededRandom, SequenceRandom};

    #[test]
    fn first_candidate_is_always_placed() {
        let mut map = GrowthMap::default();
        let mut rng = SequenceRandom::constant(0.99);
        let grown = map.grow(GrowthType::Land, 0.0, &mut rng, |_| {});
        assert_eq!(grown.len(), 1);
        assert!(grown[0].is_adjacent(Coordinate::ORIGIN));
    }

    #[test]
    fn certain_growth_takes_all_neighbours() {
        let mut map = GrowthMap::default();
        let mut rng = SequenceRandom::constant(0.0);
        let grown = map.grow(GrowthType::Land, 1.0, &mut rng, |_| {});
        assert_eq!(grown.len(), 4);

        // Следующий слой не возвращается на занятые клетки
        let next = map.grow(GrowthType::Land, 1.0, &mut rng, |_| {});
        for c in &next {
            assert!(!grown.contains(c));
        }
        assert_eq!(map.points().len(), grown.len() + next.len());
    }

    #[test]
    fn callback_sees_every_land_point() {
        let mut map = GrowthMap::default();
        let mut rng = SeededRandom::new(11);
        let mut seen = Vec::new();
        let grown = map.grow_to_size_with(300, &mut rng, |p| seen.push(p.coordinate));
        assert_eq!(seen.len(), grown);
        assert_eq!(seen.len(), map.land_count());
    }

    #[test]
    fn zero_size_grows_nothing() {
        let mut map = GrowthMap::default();
        let mut rng = SeededRandom::new(1);
        assert_eq!(map.grow_to_size(0, &mut rng), 0);
        assert!(map.points().is_empty());
    }

    #[test]
    fn exhausted_frontier_stops_growth() {
        let mut map = GrowthMap::default();
        let mut rng = SeededRandom::new(5);
        map.growth_points.clear();
        assert_eq!(map.grow_to_size(100, &mut rng), 0);
    }

    #[test]
    fn pruning_is_idempotent() {
        let mut map = GrowthMap::default();
        let mut rng = SeededRandom::new(9);
        map.grow_to_size(2_000, &mut rng);
        map.prune_scaffolding();
        let once: Vec<_> = map.points().to_vec();
        assert!(once.iter().all(|p| p.land_type == GrowthType::Land));

        map.prune_scaffolding();
        assert_eq!(map.points(), once.as_slice());
    }
}
