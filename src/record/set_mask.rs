// ─── SetMask ────────────────────────────────────────────────────────────────

/// One bit per field: was the field explicitly assigned.
///
/// Protos of up to 64 fields keep the bits inline; wider protos spill into a
/// word vector sized once at record creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SetMask {
    Inline(u64),
    Spilled(Vec<u64>),
}

impl SetMask {
    pub(crate) fn new(size: usize) -> Self {
        if size <= 64 {
            SetMask::Inline(0)
        } else {
            SetMask::Spilled(vec![0; size.div_ceil(64)])
        }
    }

    #[inline]
    pub(crate) fn get(&self, i: usize) -> bool {
        match self {
            SetMask::Inline(bits) => i < 64 && bits & (1 << i) != 0,
            SetMask::Spilled(words) => words
                .get(i / 64)
                .is_some_and(|w| w & (1 << (i % 64)) != 0),
        }
    }

    #[inline]
    pub(crate) fn set(&mut self, i: usize) {
        match self {
            SetMask::Inline(bits) => *bits |= 1 << i,
            SetMask::Spilled(words) => words[i / 64] |= 1 << (i % 64),
        }
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        match self {
            SetMask::Inline(bits) => *bits == 0,
            SetMask::Spilled(words) => words.iter().all(|w| *w == 0),
        }
    }

    pub(crate) fn count(&self) -> usize {
        match self {
            SetMask::Inline(bits) => bits.count_ones() as usize,
            SetMask::Spilled(words) => words.iter().map(|w| w.count_ones() as usize).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_mask() {
        let mut mask = SetMask::new(3);
        assert!(mask.is_empty());
        mask.set(2);
        assert!(mask.get(2));
        assert!(!mask.get(0));
        assert!(!mask.get(99));
        assert_eq!(mask.count(), 1);
    }

    #[test]
    fn test_spilled_mask() {
        let mut mask = SetMask::new(130);
        assert!(matches!(mask, SetMask::Spilled(ref w) if w.len() == 3));
        mask.set(0);
        mask.set(64);
        mask.set(129);
        assert!(mask.get(64) && mask.get(129));
        assert!(!mask.get(63));
        assert_eq!(mask.count(), 3);
        assert!(!mask.is_empty());
    }
}
