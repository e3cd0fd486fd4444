//! Источник случайности
//!
//! Вся недетерминированность генератора проходит через [`RandomSource`]:
//! рост, сглаживание, выбор истоков рек и разрешение ничьих. Для воспроизводимых
//! запусков используется [`SeededRandom`], для тестов с точно известным исходом —
//! [`SequenceRandom`].

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub trait RandomSource {
    /// `true` с вероятностью `p`.
    fn uniform_bool(&mut self, p: f64) -> bool;

    /// Равномерное целое из `[lo, hi]` (обе границы включены).
    fn uniform_int(&mut self, lo: i64, hi: i64) -> i64;

    /// Равномерный индекс из `[0, n)`. `n` должно быть больше нуля.
    fn below(&mut self, n: usize) -> usize;

    fn pick_one<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T>
    where
        Self: Sized,
    {
        if items.is_empty() {
            return None;
        }
        Some(&items[self.below(items.len())])
    }

    /// Независимый подпоток, засеянный следующим значением родителя.
    ///
    /// Последовательность подпотоков зависит только от родителя, поэтому
    /// материки можно обрабатывать в любом порядке и параллельно.
    fn fork(&mut self) -> SeededRandom
    where
        Self: Sized,
    {
        SeededRandom::new(self.uniform_int(0, i64::MAX) as u64)
    }

    /// Тасование Фишера–Йетса.
    fn shuffle<T>(&mut self, items: &mut [T])
    where
        Self: Sized,
    {
        for i in (1..items.len()).rev() {
            let j = self.below(i + 1);
            items.swap(i, j);
        }
    }
}

/// Детерминированный источник на ChaCha8.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: ChaCha8Rng,
}

impl SeededRandom {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn uniform_bool(&mut self, p: f64) -> bool {
        self.rng.gen_bool(p.clamp(0.0, 1.0))
    }

    fn uniform_int(&mut self, lo: i64, hi: i64) -> i64 {
        if hi <= lo {
            return lo;
        }
        self.rng.gen_range(lo..=hi)
    }

    fn below(&mut self, n: usize) -> usize {
        self.rng.gen_range(0..n.max(1))
    }
}

/// Проигрывает заданный по кругу список значений из `[0, 1)`.
///
/// Каждое обращение потребляет одно значение `v`:
/// - `uniform_bool(p)` → `v < p`
/// - `uniform_int(lo, hi)` → `lo + ⌊v·(hi − lo + 1)⌋`
/// - `below(n)` → `⌊v·n⌋`
///
/// Пустой список ведёт себя как бесконечная последовательность нулей.
#[derive(Debug, Clone, Default)]
pub struct SequenceRandom {
    samples: Vec<f64>,
    cursor: usize,
}

impl SequenceRandom {
    #[must_use]
    pub fn new(samples: Vec<f64>) -> Self {
        let samples = samples
            .into_iter()
            .map(|v| v.clamp(0.0, 1.0 - f64::EPSILON))
            .collect();
        Self { samples, cursor: 0 }
    }

    /// Одно и то же значение при каждом обращении.
    #[must_use]
    pub fn constant(sample: f64) -> Self {
        Self::new(vec![sample])
    }

    fn next_sample(&mut self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let v = self.samples[self.cursor % self.samples.len()];
        self.cursor += 1;
        v
    }
}

impl RandomSource for SequenceRandom {
    fn uniform_bool(&mut self, p: f64) -> bool {
        self.next_sample() < p
    }

    fn uniform_int(&mut self, lo: i64, hi: i64) -> i64 {
        if hi <= lo {
            self.next_sample();
            return lo;
        }
        // Ширина диапазона может не поместиться в i64: [0, i64::MAX] у fork
        let span = i128::from(hi) - i128::from(lo) + 1;
        let offset = (self.next_sample() * span as f64).floor() as i128;
        (i128::from(lo) + offset).clamp(i128::from(lo), i128::from(hi)) as i64
    }

    fn below(&mut self, n: usize) -> usize {
        let v = self.next_sample();
        ((v * n as f64).floor() as usize).min(n.saturating_sub(1))
    }
}
