pub mod config;
pub mod coordinate;
pub mod error;
pub mod growth;
pub mod landmass;
pub mod random;
pub mod render;
pub mod spatial;
pub mod world;

pub use config::{GenerationParams, GrowthSettings, RiverSettings, TerrainSettings};
pub use coordinate::{Coordinate, Direction};
pub use error::{ConfigError, PipelineError};
pub use growth::{GrowthMap, GrowthPointData, GrowthType};
pub use landmass::{LandType, Landmass, LandmassPoint, Stage, identify_landmasses};
pub use random::{RandomSource, SeededRandom, SequenceRandom};
pub use spatial::{Bounds, SpatialIndex};
pub use world::{CellView, World, generate_world};
