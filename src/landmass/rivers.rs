//! Реки: спуск по самому крутому склону от подножия гор до воды
//!
//! Истоки — клетки суши, ортогонально соседствующие с обычными горами хребта.
//! На каждом шаге река переходит к самому низкому соседу (ничьи — случайно) и
//! останавливается, когда:
//! - дошла до берега (высота 0) — добавляется синтетическая точка в воде;
//! - следующая клетка уже занята другой рекой — река впадает в неё.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::{LandType, Landmass, RangeId, RingId, RiverId, Stage};
use crate::coordinate::Coordinate;
use crate::error::PipelineError;
use crate::random::RandomSource;

/// Звено пути реки. У первого звена `previous` указывает на соседнюю гору,
/// у последнего `next` пуст.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiverLink {
    pub previous: Option<Coordinate>,
    pub value: Coordinate,
    pub next: Option<Coordinate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiverMouth {
    /// Впадает в воду у береговой точки кольца `ring`
    Water { ring: Option<RingId> },
    /// Впадает в другую реку
    Confluence { river: RiverId },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct River {
    pub id: RiverId,
    pub range: RangeId,
    pub start: Coordinate,
    pub end: Coordinate,
    pub path: Vec<RiverLink>,
    pub mouth: RiverMouth,
    /// Сколько первых звеньев — клетки материка, принадлежащие этой реке
    course_len: usize,
}

impl River {
    /// Звенья, занятые рекой (без конечной точки в воде или в чужой реке).
    #[must_use]
    pub fn course(&self) -> &[RiverLink] {
        &self.path[..self.course_len]
    }

    /// Конечное звено: точка в воде или место слияния.
    #[must_use]
    pub fn terminal(&self) -> Option<&RiverLink> {
        self.path.get(self.course_len)
    }

    #[must_use]
    pub fn link_at(&self, coordinate: Coordinate) -> Option<&RiverLink> {
        self.course().iter().find(|link| link.value == coordinate)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.path.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }
}

impl Landmass {
    /// Прокладывает реки от каждого горного хребта.
    ///
    /// Истоки хребта перемешиваются, берутся первые `min_sources..=max_sources`.
    /// Исток, уже занятый рекой другого хребта, пропускается. Хребет без
    /// подходящих клеток рядом просто остаётся без рек.
    pub fn generate_rivers<R: RandomSource>(
        &mut self,
        rng: &mut R,
    ) -> Result<&[River], PipelineError> {
        self.require(Stage::Rivers)?;
        if self.is_complete(Stage::Rivers) {
            return Ok(&self.rivers);
        }

        let min_sources = i64::from(self.settings.rivers.min_sources);
        let max_sources = i64::from(self.settings.rivers.max_sources);
        let mut claimed: HashMap<Coordinate, RiverId> = HashMap::new();

        for index in 0..self.mountain_ranges.len() {
            let range = &self.mountain_ranges[index];
            let range_id = range.id;
            let regular: HashSet<Coordinate> = range.regular.iter().copied().collect();

            let mut pool = Vec::new();
            let mut seen = HashSet::new();
            for &mountain in &range.regular {
                for n in mountain.adjacent() {
                    let is_land = self
                        .points
                        .find(n)
                        .is_some_and(|p| p.land_type == LandType::Land);
                    if is_land && seen.insert(n) {
                        pool.push(n);
                    }
                }
            }
            if pool.is_empty() {
                continue;
            }

            rng.shuffle(&mut pool);
            let take = rng.uniform_int(min_sources, max_sources).max(0) as usize;
            pool.truncate(take);

            for source in pool {
                if claimed.contains_key(&source) {
                    continue;
                }
                let river = self.descend(source, range_id, &regular, &mut claimed, rng);
                self.rivers.push(river);
            }
        }

        self.complete(Stage::Rivers);
        Ok(&self.rivers)
    }

    fn descend<R: RandomSource>(
        &mut self,
        source: Coordinate,
        range: RangeId,
        regular: &HashSet<Coordinate>,
        claimed: &mut HashMap<Coordinate, RiverId>,
        rng: &mut R,
    ) -> River {
        let id = RiverId(self.rivers.len());

        // Соседняя гора задаёт направление первого звена
        let slopes: Vec<Coordinate> = source
            .adjacent()
            .into_iter()
            .filter(|c| regular.contains(c))
            .collect();
        let mut previous = rng.pick_one(&slopes).copied();

        let mut path: Vec<RiverLink> = Vec::new();
        let mut current = source;

        let mouth = loop {
            claimed.insert(current, id);
            let (elevation, ring) = match self.points.find_mut(current) {
                Some(point) => {
                    point.river = Some(id);
                    (point.elevation.unwrap_or(0), point.coastal_ring)
                }
                None => (0, None),
            };
            if let Some(last) = path.last_mut() {
                last.next = Some(current);
            }
            path.push(RiverLink {
                previous,
                value: current,
                next: None,
            });
            previous = Some(current);

            if elevation == 0 {
                let water: Vec<Coordinate> = current
                    .adjacent()
                    .into_iter()
                    .filter(|c| !self.points.contains(*c))
                    .collect();
                if let Some(&sea) = rng.pick_one(&water) {
                    push_terminal(&mut path, sea);
                }
                break RiverMouth::Water { ring };
            }

            let neighbours: Vec<(Coordinate, u32)> = current
                .adjacent()
                .into_iter()
                .filter_map(|c| self.points.find(c).and_then(|p| p.elevation).map(|e| (c, e)))
                .collect();
            let Some(lowest) = neighbours.iter().map(|&(_, e)| e).min() else {
                break RiverMouth::Water { ring };
            };
            let ties: Vec<Coordinate> = neighbours
                .iter()
                .filter(|&&(_, e)| e == lowest)
                .map(|&(c, _)| c)
                .collect();
            let Some(&next) = rng.pick_one(&ties) else {
                break RiverMouth::Water { ring };
            };

            if let Some(&other) = claimed.get(&next) {
                push_terminal(&mut path, next);
                break RiverMouth::Confluence { river: other };
            }
            current = next;
        };

        let course_len = match mouth {
            RiverMouth::Confluence { .. } => path.len() - 1,
            RiverMouth::Water { .. } => path
                .iter()
                .take_while(|link| self.points.contains(link.value))
                .count(),
        };

        River {
            id,
            range,
            start: source,
            end: path.last().map_or(source, |link| link.value),
            path,
            mouth,
            course_len,
        }
    }
}

fn push_terminal(path: &mut Vec<RiverLink>, value: Coordinate) {
    let previous = path.last().map(|link| link.value);
    if let Some(last) = path.last_mut() {
        last.next = Some(value);
    }
    path.push(RiverLink {
        previous,
        value,
        next: None,
    });
}
