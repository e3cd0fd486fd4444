pub mod coast;
pub mod partition;
pub mod relief;
pub mod rivers;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::{RiverSettings, TerrainSettings};
use crate::coordinate::Coordinate;
use crate::error::PipelineError;
use crate::random::RandomSource;
use crate::spatial::SpatialIndex;

pub use coast::{CoastalRing, WaterBody};
pub use partition::{connected_components, identify_landmasses};
pub use relief::MountainRange;
pub use rivers::{River, RiverLink, RiverMouth};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LandmassId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RingId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RangeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RiverId(pub usize);

/// Тип клетки материка. Меняется только вперёд: `Land` → одно из остальных.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LandType {
    #[default]
    Land,
    Coast,
    Mountain,
    Snowcapped,
}

/// Стадии анализа материка в порядке запуска.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    Coastline,
    Soften,
    Rings,
    DistanceToWater,
    Mountains,
    DistanceToMountains,
    Elevation,
    Rivers,
}

impl Stage {
    /// Стадии, которые должны быть завершены до запуска этой.
    #[must_use]
    pub fn requires(self) -> &'static [Stage] {
        match self {
            Stage::Coastline => &[],
            Stage::Soften | Stage::Rings | Stage::DistanceToWater => &[Stage::Coastline],
            Stage::Mountains | Stage::Elevation => &[Stage::DistanceToWater],
            Stage::DistanceToMountains => &[Stage::Mountains],
            Stage::Rivers => &[Stage::Elevation, Stage::Mountains],
        }
    }
}

/// Клетка материка. Создаётся один раз и дальше только дополняется стадиями.
///
/// Расстояния и высота равны `None`, пока соответствующая стадия не отработала.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandmassPoint {
    pub coordinate: Coordinate,
    pub landmass: LandmassId,
    pub is_coastal: bool,
    pub coastal_ring: Option<RingId>,
    pub elevation: Option<u32>,
    pub distance_to_water: Option<u32>,
    pub distance_to_mountain: Option<u32>,
    pub land_type: LandType,
    pub river: Option<RiverId>,
}

impl LandmassPoint {
    #[must_use]
    pub fn new(coordinate: Coordinate, landmass: LandmassId) -> Self {
        Self {
            coordinate,
            landmass,
            is_coastal: false,
            coastal_ring: None,
            elevation: None,
            distance_to_water: None,
            distance_to_mountain: None,
            land_type: LandType::Land,
            river: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmassSettings {
    pub terrain: TerrainSettings,
    pub rivers: RiverSettings,
}

/// Одна связная компонента суши и всё, что из неё вычислено.
#[derive(Debug, Clone)]
pub struct Landmass {
    pub id: LandmassId,
    /// Цвет из 256-цветной палитры терминала
    pub color: u8,
    points: SpatialIndex<LandmassPoint>,
    coastal_points: Vec<Coordinate>,
    coastal_rings: Vec<CoastalRing>,
    highest_distance_to_water: Option<u32>,
    mountain_ranges: Vec<MountainRange>,
    rivers: Vec<River>,
    completed: HashSet<Stage>,
    settings: LandmassSettings,
}

/// Цвета палитры без системных 16 и градаций серого.
pub(crate) fn palette_color<R: RandomSource>(rng: &mut R) -> u8 {
    rng.uniform_int(16, 231) as u8
}

impl Landmass {
    pub fn new<R, I>(id: LandmassId, coordinates: I, settings: LandmassSettings, rng: &mut R) -> Self
    where
        R: RandomSource,
        I: IntoIterator<Item = Coordinate>,
    {
        let points = coordinates
            .into_iter()
            .map(|c| (c, LandmassPoint::new(c, id)))
            .collect();

        Self {
            id,
            color: palette_color(rng),
            points,
            coastal_points: Vec::new(),
            coastal_rings: Vec::new(),
            highest_distance_to_water: None,
            mountain_ranges: Vec::new(),
            rivers: Vec::new(),
            completed: HashSet::new(),
            settings,
        }
    }

    #[must_use]
    pub fn points(&self) -> &SpatialIndex<LandmassPoint> {
        &self.points
    }

    #[must_use]
    pub fn point(&self, coordinate: Coordinate) -> Option<&LandmassPoint> {
        self.points.find(coordinate)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn settings(&self) -> &LandmassSettings {
        &self.settings
    }

    #[must_use]
    pub fn coastal_points(&self) -> &[Coordinate] {
        &self.coastal_points
    }

    #[must_use]
    pub fn coastal_rings(&self) -> &[CoastalRing] {
        &self.coastal_rings
    }

    #[must_use]
    pub fn ring(&self, id: RingId) -> Option<&CoastalRing> {
        self.coastal_rings.get(id.0)
    }

    /// Кольцо пляжа — самое большое из береговых колец.
    #[must_use]
    pub fn beach(&self) -> Option<&CoastalRing> {
        self.coastal_rings.iter().find(|ring| ring.is_beach)
    }

    #[must_use]
    pub fn highest_distance_to_water(&self) -> Option<u32> {
        self.highest_distance_to_water
    }

    #[must_use]
    pub fn mountain_ranges(&self) -> &[MountainRange] {
        &self.mountain_ranges
    }

    #[must_use]
    pub fn rivers(&self) -> &[River] {
        &self.rivers
    }

    #[must_use]
    pub fn river(&self, id: RiverId) -> Option<&River> {
        self.rivers.get(id.0)
    }

    #[must_use]
    pub fn is_complete(&self, stage: Stage) -> bool {
        self.completed.contains(&stage)
    }

    /// Прогоняет все стадии в обязательном порядке.
    pub fn run_pipeline<R: RandomSource>(&mut self, rng: &mut R) -> Result<(), PipelineError> {
        self.find_coastal_points();
        self.soften(rng)?;
        self.classify_coastal_rings(rng)?;
        self.distance_to_water()?;
        self.grow_mountains()?;
        self.find_distance_to_mountains()?;
        self.calculate_elevation()?;
        self.generate_rivers(rng)?;

        log::debug!(
            "материк {}: {} клеток, {} колец, {} хребтов, {} рек",
            self.id.0,
            self.points.len(),
            self.coastal_rings.len(),
            self.mountain_ranges.len(),
            self.rivers.len()
        );
        Ok(())
    }

    fn require(&self, stage: Stage) -> Result<(), PipelineError> {
        for &requires in stage.requires() {
            if !self.is_complete(requires) {
                return Err(PipelineError::MissingStage { stage, requires });
            }
        }
        Ok(())
    }

    /// Ошибка, если уже отработала стадия, результат которой `stage` испортит.
    fn ensure_not_after(&self, stage: Stage, later: &[Stage]) -> Result<(), PipelineError> {
        match later.iter().find(|&&by| self.is_complete(by)) {
            Some(&by) => Err(PipelineError::Invalidated { stage, by }),
            None => Ok(()),
        }
    }

    fn complete(&mut self, stage: Stage) {
        self.completed.insert(stage);
    }
}
