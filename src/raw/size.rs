use core::num::NonZero;

/// Number of nodes in a subtree, including its root.
///
/// A node always counts itself, so the size is never zero and the niche is free
/// for `Option<Size>` (the size of an absent subtree).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(transparent)]
pub(crate) struct Size(NonZero<u32>);

impl Size {
    pub(crate) const ONE: Self = Self(NonZero::<u32>::MIN);

    #[inline]
    pub(crate) const fn from_usize(size: usize) -> Self {
        assert!(size != 0, "`Size::from_usize()` - a subtree holds at least its root!");
        assert!(size <= u32::MAX as usize, "`Size::from_usize()` - `size` > `u32::MAX`!");
        #[allow(clippy::cast_possible_truncation)]
        match NonZero::new(size as u32) {
            Some(raw) => Self(raw),
            None => unreachable!(),
        }
    }

    #[inline]
    pub(crate) const fn get(self) -> usize {
        self.0.get() as usize
    }

    /// The size of an optional subtree; an absent subtree is empty.
    #[inline]
    pub(crate) fn of(size: Option<Self>) -> usize {
        size.map_or(0, Self::get)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use static_assertions::assert_eq_size;

    assert_eq_size!(Size, Option<Size>);
    assert_eq_size!(Size, u32);

    #[test]
    #[should_panic(expected = "`Size::from_usize()` - a subtree holds at least its root!")]
    fn zero_size_panics() {
        let _ = Size::from_usize(0);
    }

    #[test]
    fn absent_subtree_is_empty() {
        assert_eq!(Size::of(None), 0);
        assert_eq!(Size::of(Some(Size::ONE)), 1);
    }

    proptest! {
        #[test]
        fn size_survives_encoding(size in 1..=u32::MAX as usize) {
            prop_assert_eq!(Size::from_usize(size).get(), size);
        }
    }
}
