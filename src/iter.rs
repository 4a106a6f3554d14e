use rand::{seq::SliceRandom, Rng};

/// Extra adapters for iterators.
pub trait IterExt: Iterator + Sized {
    /// Collects the sequence into a new `Vec` in random order, using the
    /// thread-local generator.
    fn shuffled(self) -> Vec<Self::Item> {
        self.shuffled_with(&mut rand::thread_rng())
    }

    /// Collects the sequence into a new `Vec` in random order, using a
    /// Fisher-Yates shuffle driven by `rng`.
    fn shuffled_with<R: Rng + ?Sized>(self, rng: &mut R) -> Vec<Self::Item> {
        let mut items: Vec<_> = self.collect();
        items.shuffle(rng);
        items
    }
}

impl<I: Iterator> IterExt for I {}
