//! Release hooks: ownership-transfer cleanup for displaced entries.
//!
//! A hook receives every key (or value) the map lets go of: the previous
//! key/value on a replacing `put`, the pair unlinked by `remove`, and every
//! live pair when the map is dropped. Each item reaches its hook exactly
//! once. `take` hands the pair to the caller instead and bypasses hooks.

/// Consumer of items the map releases.
pub trait Release<T> {
    fn release(&mut self, item: T);
}

/// No hook configured. Released items are dropped in place.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoRelease;

impl<T> Release<T> for NoRelease {
    #[inline]
    fn release(&mut self, item: T) {
        drop(item);
    }
}

impl<T, F> Release<T> for F
where
    F: FnMut(T),
{
    #[inline]
    fn release(&mut self, item: T) {
        self(item)
    }
}
