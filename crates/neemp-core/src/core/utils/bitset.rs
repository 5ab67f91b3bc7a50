const WORD_BITS: usize = u64::BITS as usize;

#[inline]
const fn word_index(bit: usize) -> usize {
    bit / WORD_BITS
}

#[inline]
const fn bit_mask(bit: usize) -> u64 {
    1u64 << (bit % WORD_BITS)
}

/// Fixed-size, word-packed boolean vector used as a molecule selection mask.
///
/// Exactly `len()` logical positions are meaningful. Padding bits in the last
/// word may be touched by [`BitSet::set_all`], but no public accessor ever
/// reads them. Every index is bounds-checked in all build profiles.
///
/// The type is deliberately not `Clone`: copying between masks goes through
/// [`BitSet::set_as`], which requires both sides to have the same size.
#[derive(Debug, PartialEq, Eq)]
pub struct BitSet {
    bits_count: usize,
    words: Vec<u64>,
}

impl BitSet {
    /// Creates a bit set with `count` logical bits, all cleared.
    pub fn new(count: usize) -> Self {
        Self {
            bits_count: count,
            words: vec![0; count.div_ceil(WORD_BITS).max(1)],
        }
    }

    /// Number of logical bits.
    #[inline]
    pub fn len(&self) -> usize {
        self.bits_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits_count == 0
    }

    /// Copies every bit of `src` into `self`.
    ///
    /// # Panics
    ///
    /// Panics if the two sets do not have the same logical size.
    pub fn set_as(&mut self, src: &BitSet) {
        assert_eq!(
            self.bits_count, src.bits_count,
            "cannot copy a bit set of {} bits into one of {} bits",
            src.bits_count, self.bits_count
        );
        self.words.copy_from_slice(&src.words);
    }

    #[inline]
    fn check(&self, bit: usize) {
        assert!(
            bit < self.bits_count,
            "bit index {bit} out of bounds for a bit set of {} bits",
            self.bits_count
        );
    }

    /// Returns the value of bit `bit`.
    #[inline]
    pub fn get(&self, bit: usize) -> bool {
        self.check(bit);
        self.words[word_index(bit)] & bit_mask(bit) != 0
    }

    #[inline]
    pub fn set(&mut self, bit: usize) {
        self.check(bit);
        self.words[word_index(bit)] |= bit_mask(bit);
    }

    #[inline]
    pub fn clear(&mut self, bit: usize) {
        self.check(bit);
        self.words[word_index(bit)] &= !bit_mask(bit);
    }

    /// Toggles bit `bit` and returns its previous value.
    #[inline]
    pub fn flip(&mut self, bit: usize) -> bool {
        let previous = self.get(bit);
        self.words[word_index(bit)] ^= bit_mask(bit);
        previous
    }

    /// Sets every bit, padding included.
    pub fn set_all(&mut self) {
        self.words.fill(u64::MAX);
    }

    /// Clears every bit, padding included.
    pub fn clear_all(&mut self) {
        self.words.fill(0);
    }

    /// Counts set bits among the logical positions only.
    pub fn count_set(&self) -> usize {
        let full_words = self.bits_count / WORD_BITS;
        let mut count: usize = self.words[..full_words]
            .iter()
            .map(|w| w.count_ones() as usize)
            .sum();

        let remaining = self.bits_count % WORD_BITS;
        if remaining != 0 {
            let mask = (1u64 << remaining) - 1;
            count += (self.words[full_words] & mask).count_ones() as usize;
        }
        count
    }

    /// Iterates over the indices of set bits in ascending order.
    pub fn iter_set(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.bits_count).filter(move |&i| self.get(i))
    }
}
