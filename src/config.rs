// src/config.rs
//! Конфигурация генерации
//!
//! Этот модуль определяет параметры, управляющие процедурной генерацией суши:
//! - Рост (целевой размер, вероятности, длина серий роста)
//! - Рельеф (порог сглаживания, порог гор, минимальный перепад хребта)
//! - Реки (сколько истоков выбирать на хребет)
//!
//! Все структуры поддерживают сериализацию в TOML/JSON для удобной настройки через конфигурационные файлы.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

/// Параметры заливки суши
///
/// Рост идёт сериями: серия суши, затем серия "лесов" (scaffold), которые
/// разносят будущие материки друг от друга и потом удаляются.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GrowthSettings {
    /// Вероятность занять очередного соседа в фазе суши
    #[serde(default = "default_probability")]
    pub land_probability: f64,

    /// Вероятность занять очередного соседа в фазе лесов
    #[serde(default = "default_probability")]
    pub scaffold_probability: f64,

    /// Минимальная длина серии (в вызовах `grow`)
    #[serde(default = "default_burst_min")]
    pub burst_min: u32,

    /// Максимальная длина серии (включительно)
    #[serde(default = "default_burst_max")]
    pub burst_max: u32,
}

fn default_probability() -> f64 {
    0.5
}
fn default_burst_min() -> u32 {
    25
}
fn default_burst_max() -> u32 {
    100
}

impl Default for GrowthSettings {
    fn default() -> Self {
        Self {
            land_probability: 0.5,
            scaffold_probability: 0.5,
            burst_min: 25,
            burst_max: 100,
        }
    }
}

/// Настройки рельефа
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TerrainSettings {
    /// Пустая клетка у берега становится сушей, если в её окрестности Мура
    /// занято строго больше этого числа клеток (из 8)
    #[serde(default = "default_soften_threshold")]
    pub soften_threshold: usize,

    /// Горами могут стать только клетки с расстоянием до воды строго больше порога
    #[serde(default = "default_mountain_threshold")]
    pub mountain_threshold: u32,

    /// Минимальный перепад расстояний внутри области, чтобы она стала хребтом
    #[serde(default = "default_min_relief")]
    pub min_relief: u32,
}

fn default_soften_threshold() -> usize {
    6
}
fn default_mountain_threshold() -> u32 {
    3
}
fn default_min_relief() -> u32 {
    2
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            soften_threshold: 6,
            mountain_threshold: 3,
            min_relief: 2,
        }
    }
}

/// Настройки рек
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiverSettings {
    /// Минимум истоков на один горный хребет
    #[serde(default = "default_min_sources")]
    pub min_sources: u32,

    /// Максимум истоков на один горный хребет (включительно)
    #[serde(default = "default_max_sources")]
    pub max_sources: u32,
}

fn default_min_sources() -> u32 {
    3
}
fn default_max_sources() -> u32 {
    6
}

impl Default for RiverSettings {
    fn default() -> Self {
        Self {
            min_sources: 3,
            max_sources: 6,
        }
    }
}

/// Основные параметры генерации
///
/// Полная конфигурация одного запуска. Поддерживает загрузку из TOML-файлов.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationParams {
    /// Сид генератора случайных чисел (детерминированная генерация)
    #[serde(default)]
    pub seed: u64,

    /// Сколько клеток суши вырастить (по умолчанию 10000)
    #[serde(default = "default_target_size")]
    pub target_size: usize,

    #[serde(default)]
    pub growth: GrowthSettings,

    #[serde(default)]
    pub terrain: TerrainSettings,

    #[serde(default)]
    pub rivers: RiverSettings,
}

fn default_target_size() -> usize {
    10_000
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            seed: 0,
            target_size: 10_000,
            growth: GrowthSettings::default(),
            terrain: TerrainSettings::default(),
            rivers: RiverSettings::default(),
        }
    }
}

impl GenerationParams {
    /// Загружает параметры из TOML-файла
    ///
    /// # Пример
    /// ```toml
    /// # world.toml
    /// seed = 42
    /// target_size = 5000
    ///
    /// [terrain]
    /// mountain_threshold = 4
    /// ```
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let params: Self = toml::from_str(contents)?;
        params.validate()?;
        Ok(params)
    }

    /// Проверяет согласованность значений.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, p) in [
            ("growth.land_probability", self.growth.land_probability),
            ("growth.scaffold_probability", self.growth.scaffold_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("{p} is outside [0, 1]"),
                });
            }
        }

        if self.growth.burst_min > self.growth.burst_max {
            return Err(ConfigError::Invalid {
                field: "growth.burst_min",
                reason: format!(
                    "{} is greater than burst_max {}",
                    self.growth.burst_min, self.growth.burst_max
                ),
            });
        }

        if self.terrain.soften_threshold > 8 {
            return Err(ConfigError::Invalid {
                field: "terrain.soften_threshold",
                reason: "a cell has only 8 neighbours".to_string(),
            });
        }

        if self.rivers.min_sources > self.rivers.max_sources {
            return Err(ConfigError::Invalid {
                field: "rivers.min_sources",
                reason: format!(
                    "{} is greater than max_sources {}",
                    self.rivers.min_sources, self.rivers.max_sources
                ),
            });
        }

        Ok(())
    }
}
