//! Береговая линия: поиск береговых точек, сглаживание и кольца
//!
//! Береговая точка — клетка, у которой хотя бы один ортогональный сосед не
//! принадлежит материку. Береговые точки собираются в кольца по соседству
//! Мура: самое большое кольцо — внешний пляж, остальные окружают озёра.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::Bfs;
use serde::{Deserialize, Serialize};

use super::{LandType, Landmass, LandmassPoint, RingId, Stage, palette_color};
use crate::coordinate::Coordinate;
use crate::error::PipelineError;
use crate::random::RandomSource;
use crate::spatial::{Bounds, SpatialIndex};

/// Вода, запертая внутри материка.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaterBody {
    pub cells: Vec<Coordinate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoastalRing {
    pub id: RingId,
    pub points: Vec<Coordinate>,
    pub is_beach: bool,
    /// Озеро, которое окружает кольцо. У пляжа — открытое море, `None`.
    pub water: Option<WaterBody>,
    pub color: u8,
}

impl CoastalRing {
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn is_lake(&self) -> bool {
        !self.is_beach
    }
}

impl Landmass {
    /// Береговые точки. Повторный вызов без изменений суши возвращает тот же набор.
    pub fn find_coastal_points(&mut self) -> &[Coordinate] {
        if !self.is_complete(Stage::Coastline) {
            self.detect_coast();
        }
        &self.coastal_points
    }

    /// Сбрасывает найденный берег; следующий `find_coastal_points` пересчитает его.
    pub fn clear_coastal_points(&mut self) {
        self.coastal_points.clear();
        for point in self.points.values_mut() {
            point.is_coastal = false;
        }
        self.completed.remove(&Stage::Coastline);
    }

    fn detect_coast(&mut self) {
        let points = &self.points;
        let coastal: Vec<Coordinate> = points
            .coordinates()
            .filter(|c| c.adjacent().iter().any(|n| !points.contains(*n)))
            .collect();

        let coastal_set: HashSet<Coordinate> = coastal.iter().copied().collect();
        for point in self.points.values_mut() {
            point.is_coastal = coastal_set.contains(&point.coordinate);
        }

        self.coastal_points = coastal;
        self.complete(Stage::Coastline);
    }

    /// Заполняет пустые клетки у берега, почти со всех сторон окружённые сушей.
    ///
    /// Береговые точки обходятся в случайном порядке; пустой ортогональный
    /// сосед становится сушей, если в его окрестности Мура занято больше
    /// `soften_threshold` клеток. Точки только добавляются. Индекс и берег
    /// пересчитываются целиком. Возвращает число добавленных клеток.
    pub fn soften<R: RandomSource>(&mut self, rng: &mut R) -> Result<usize, PipelineError> {
        self.require(Stage::Soften)?;
        self.ensure_not_after(
            Stage::Soften,
            &[
                Stage::Rings,
                Stage::DistanceToWater,
                Stage::Mountains,
                Stage::DistanceToMountains,
                Stage::Elevation,
                Stage::Rivers,
            ],
        )?;

        let threshold = self.settings.terrain.soften_threshold;
        let mut present: HashSet<Coordinate> = self.points.coordinates().collect();
        let mut order = self.coastal_points.clone();
        rng.shuffle(&mut order);

        let mut added = Vec::new();
        for point in order {
            for candidate in point.adjacent() {
                if present.contains(&candidate) {
                    continue;
                }
                let filled = candidate
                    .neighborhood()
                    .iter()
                    .filter(|n| present.contains(n))
                    .count();
                if filled > threshold {
                    present.insert(candidate);
                    added.push(candidate);
                }
            }
        }

        if !added.is_empty() {
            let id = self.id;
            let entries = std::mem::take(&mut self.points)
                .into_entries()
                .into_iter()
                .chain(added.iter().map(|&c| (c, LandmassPoint::new(c, id))));
            self.points = SpatialIndex::build(entries);
        }

        // Берег и кольца зависят от набора точек — пересчитываем сразу
        self.coastal_rings.clear();
        self.detect_coast();
        self.complete(Stage::Soften);
        Ok(added.len())
    }

    /// Группирует береговые точки в кольца.
    ///
    /// Две береговые точки соседствуют, если расстояние Чебышёва между ними
    /// равно 1, поэтому кольцо не рвётся на диагональных перешейках. Самое
    /// большое кольцо (при равенстве — первое найденное) становится пляжем.
    pub fn classify_coastal_rings<R: RandomSource>(
        &mut self,
        rng: &mut R,
    ) -> Result<&[CoastalRing], PipelineError> {
        self.require(Stage::Rings)?;
        if self.is_complete(Stage::Rings) {
            return Ok(&self.coastal_rings);
        }

        let groups = self.group_coastal_points();

        let mut beach = None;
        let mut largest = 0;
        for (i, group) in groups.iter().enumerate() {
            if beach.is_none() || group.len() > largest {
                beach = Some(i);
                largest = group.len();
            }
        }

        let bounds = self.points.bounds();
        let mut rings = Vec::with_capacity(groups.len());
        for (i, points) in groups.into_iter().enumerate() {
            let id = RingId(i);
            let is_beach = beach == Some(i);

            for &c in &points {
                if let Some(point) = self.points.find_mut(c) {
                    point.coastal_ring = Some(id);
                    if point.land_type == LandType::Land {
                        point.land_type = LandType::Coast;
                    }
                }
            }

            let water = match bounds {
                Some(bounds) if !is_beach => self.enclosed_water(&points, bounds),
                _ => None,
            };

            rings.push(CoastalRing {
                id,
                points,
                is_beach,
                water,
                color: palette_color(rng),
            });
        }

        self.coastal_rings = rings;
        self.complete(Stage::Rings);
        Ok(&self.coastal_rings)
    }

    fn group_coastal_points(&self) -> Vec<Vec<Coordinate>> {
        let mut graph = UnGraph::<Coordinate, ()>::new_undirected();
        let mut nodes: HashMap<Coordinate, NodeIndex> = HashMap::new();
        for &c in &self.coastal_points {
            nodes.insert(c, graph.add_node(c));
        }

        for &c in &self.coastal_points {
            for n in c.neighborhood() {
                // Каждую пару соединяем один раз
                if c < n {
                    if let Some(&other) = nodes.get(&n) {
                        graph.add_edge(nodes[&c], other, ());
                    }
                }
            }
        }

        let mut visited = HashSet::new();
        let mut groups = Vec::new();
        for start in graph.node_indices() {
            if visited.contains(&start) {
                continue;
            }
            let mut members = Vec::new();
            let mut bfs = Bfs::new(&graph, start);
            while let Some(node) = bfs.next(&graph) {
                visited.insert(node);
                members.push(graph[node]);
            }
            groups.push(members);
        }
        groups
    }

    /// Заливка пустых клеток от кольца. Если заливка выходит за габариты
    /// материка, вода открытая и озера нет.
    fn enclosed_water(&self, ring: &[Coordinate], bounds: Bounds) -> Option<WaterBody> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::new();
        for c in ring {
            for n in c.adjacent() {
                if !self.points.contains(n) && seen.insert(n) {
                    queue.push_back(n);
                }
            }
        }

        let mut cells = Vec::new();
        while let Some(c) = queue.pop_front() {
            if !bounds.contains(c) {
                return None;
            }
            cells.push(c);
            for n in c.adjacent() {
                if !self.points.contains(n) && seen.insert(n) {
                    queue.push_back(n);
                }
            }
        }

        if cells.is_empty() {
            None
        } else {
            Some(WaterBody { cells })
        }
    }
}
