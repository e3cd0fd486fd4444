//! Целочисленные координаты на бесконечной плоскости
//!
//! Координата — неизменяемое значение с операциями соседства:
//! - 4 ортогональных соседа (`adjacent`)
//! - кольцо радиуса `d` (граница квадрата по Чебышёву, `ring`)
//! - каноническое строковое представление `(x, y)` с обратным разбором

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoordinateParseError;

/// Стороны света. Ось Y направлена вниз, как на экране.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    #[must_use]
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Coordinate {
    pub x: i32,
    pub y: i32,
}

impl Coordinate {
    pub const ORIGIN: Coordinate = Coordinate { x: 0, y: 0 };

    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Четыре ортогональных соседа в порядке: восток, запад, юг, север.
    #[must_use]
    pub fn adjacent(self) -> [Coordinate; 4] {
        [
            Coordinate::new(self.x + 1, self.y),
            Coordinate::new(self.x - 1, self.y),
            Coordinate::new(self.x, self.y + 1),
            Coordinate::new(self.x, self.y - 1),
        ]
    }

    #[must_use]
    pub fn displaced(self, direction: Direction) -> Coordinate {
        let (dx, dy) = direction.offset();
        Coordinate::new(self.x + dx, self.y + dy)
    }

    /// Все клетки на расстоянии Чебышёва ровно `distance`.
    ///
    /// Без повторов: углы квадрата входят один раз. `ring(0)` — сама клетка.
    #[must_use]
    pub fn ring(self, distance: u32) -> Vec<Coordinate> {
        let d = distance as i32;
        if d == 0 {
            return vec![self];
        }

        let mut cells = Vec::with_capacity(8 * distance as usize);
        for x in (self.x - d)..=(self.x + d) {
            cells.push(Coordinate::new(x, self.y - d));
            cells.push(Coordinate::new(x, self.y + d));
        }
        // Верхняя и нижняя строки уже содержат углы
        for y in (self.y - d + 1)..=(self.y + d - 1) {
            cells.push(Coordinate::new(self.x - d, y));
            cells.push(Coordinate::new(self.x + d, y));
        }
        cells
    }

    /// Окрестность Мура: 8 клеток вокруг.
    #[must_use]
    pub fn neighborhood(self) -> Vec<Coordinate> {
        self.ring(1)
    }

    #[must_use]
    pub fn chebyshev_distance(self, other: Coordinate) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    #[must_use]
    pub fn is_adjacent(self, other: Coordinate) -> bool {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y) == 1
    }

    /// Направление на ортогонального соседа, если `other` им является.
    #[must_use]
    pub fn direction_to(self, other: Coordinate) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|&direction| self.displaced(direction) == other)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl FromStr for Coordinate {
    type Err = CoordinateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s
            .trim()
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| CoordinateParseError::Malformed(s.to_string()))?;

        let (x, y) = inner
            .split_once(',')
            .ok_or_else(|| CoordinateParseError::Malformed(s.to_string()))?;

        Ok(Coordinate::new(x.trim().parse()?, y.trim().parse()?))
    }
}

impl From<(i32, i32)> for Coordinate {
    fn from((x, y): (i32, i32)) -> Self {
        Coordinate::new(x, y)
    }
}
