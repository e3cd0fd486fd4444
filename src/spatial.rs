//! Пространственный индекс точек
//!
//! Индекс строится целиком из пачки `(координата, значение)` и после изменения
//! множества точек перестраивается заново, а не обновляется по одной записи.
//! Порядок `all()` совпадает с порядком построения, поэтому обход индекса
//! детерминирован при фиксированном сиде.

use std::collections::HashMap;

use crate::coordinate::Coordinate;

/// Прямоугольник, охватывающий набор точек (границы включены).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min: Coordinate,
    pub max: Coordinate,
}

impl Bounds {
    #[must_use]
    pub fn contains(&self, c: Coordinate) -> bool {
        c.x >= self.min.x && c.x <= self.max.x && c.y >= self.min.y && c.y <= self.max.y
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.min.x.abs_diff(self.max.x) + 1
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.min.y.abs_diff(self.max.y) + 1
    }
}

#[derive(Debug, Clone)]
pub struct SpatialIndex<T> {
    entries: Vec<(Coordinate, T)>,
    slots: HashMap<Coordinate, usize>,
}

impl<T> Default for SpatialIndex<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            slots: HashMap::new(),
        }
    }
}

impl<T> SpatialIndex<T> {
    /// Строит индекс. При повторе координаты побеждает последнее значение,
    /// позиция остаётся от первого вхождения.
    pub fn build<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Coordinate, T)>,
    {
        let iter = entries.into_iter();
        let mut index = Self {
            entries: Vec::with_capacity(iter.size_hint().0),
            slots: HashMap::with_capacity(iter.size_hint().0),
        };

        for (coordinate, value) in iter {
            if let Some(&slot) = index.slots.get(&coordinate) {
                index.entries[slot].1 = value;
            } else {
                index.slots.insert(coordinate, index.entries.len());
                index.entries.push((coordinate, value));
            }
        }
        index
    }

    #[must_use]
    pub fn find(&self, coordinate: Coordinate) -> Option<&T> {
        self.slots
            .get(&coordinate)
            .map(|&slot| &self.entries[slot].1)
    }

    pub fn find_mut(&mut self, coordinate: Coordinate) -> Option<&mut T> {
        self.slots
            .get(&coordinate)
            .map(|&slot| &mut self.entries[slot].1)
    }

    #[must_use]
    pub fn contains(&self, coordinate: Coordinate) -> bool {
        self.slots.contains_key(&coordinate)
    }

    #[must_use]
    pub fn all(&self) -> &[(Coordinate, T)] {
        &self.entries
    }

    pub fn coordinates(&self) -> impl Iterator<Item = Coordinate> + '_ {
        self.entries.iter().map(|(c, _)| *c)
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.entries.iter_mut().map(|(_, v)| v)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn bounds(&self) -> Option<Bounds> {
        let mut coordinates = self.coordinates();
        let first = coordinates.next()?;
        let mut bounds = Bounds {
            min: first,
            max: first,
        };
        for c in coordinates {
            bounds.min.x = bounds.min.x.min(c.x);
            bounds.min.y = bounds.min.y.min(c.y);
            bounds.max.x = bounds.max.x.max(c.x);
            bounds.max.y = bounds.max.y.max(c.y);
        }
        Some(bounds)
    }

    /// Все записи внутри прямоугольника (для окна просмотра).
    pub fn in_rect(&self, rect: Bounds) -> Vec<&(Coordinate, T)> {
        let area = u64::from(rect.width()) * u64::from(rect.height());
        if area <= self.entries.len() as u64 {
            // Окно меньше индекса: проще пройти по клеткам окна
            let mut found = Vec::new();
            for y in rect.min.y..=rect.max.y {
                for x in rect.min.x..=rect.max.x {
                    if let Some(&slot) = self.slots.get(&Coordinate::new(x, y)) {
                        found.push(&self.entries[slot]);
                    }
                }
            }
            found
        } else {
            self.entries
                .iter()
                .filter(|(c, _)| rect.contains(*c))
                .collect()
        }
    }

    pub fn into_entries(self) -> Vec<(Coordinate, T)> {
        self.entries
    }
}

impl<T> FromIterator<(Coordinate, T)> for SpatialIndex<T> {
    fn from_iter<I: IntoIterator<Item = (Coordinate, T)>>(iter: I) -> Self {
        Self::build(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: i32, y: i32) -> Coordinate {
        Coordinate::new(x, y)
    }

    #[test]
    fn find_hits_and_misses() {
        let index = SpatialIndex::build(vec![(c(0, 0), 'a'), (c(2, -1), 'b')]);
        assert_eq!(index.find(c(2, -1)), Some(&'b'));
        assert_eq!(index.find(c(1, 1)), None);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn duplicates_collapse() {
        let index = SpatialIndex::build(vec![(c(0, 0), 1), (c(1, 0), 2), (c(0, 0), 3)]);
        assert_eq!(index.len(), 2);
        assert_eq!(index.find(c(0, 0)), Some(&3));
        assert_eq!(index.all()[0].0, c(0, 0));
    }

    #[test]
    fn bounds_and_rect() {
        let index: SpatialIndex<()> = (0..5).map(|i| (c(i, i * 2), ())).collect();
        let bounds = index.bounds().unwrap();
        assert_eq!(bounds.min, c(0, 0));
        assert_eq!(bounds.max, c(4, 8));

        let window = Bounds {
            min: c(1, 1),
            max: c(3, 4),
        };
        let inside: Vec<_> = index.in_rect(window).iter().map(|(c, _)| *c).collect();
        assert_eq!(inside, vec![c(1, 2), c(2, 4)]);
        assert!(SpatialIndex::<()>::default().bounds().is_none());
    }

    #[test]
    fn find_mut_updates_in_place() {
        let mut index = SpatialIndex::build(vec![(c(5, 5), 0_u32)]);
        *index.find_mut(c(5, 5)).unwrap() += 4;
        assert_eq!(index.find(c(5, 5)), Some(&4));
    }
}
