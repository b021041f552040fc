//! Stratifies a sequence of values into per-level chunks and continuation
//! bitmaps in a single linear sweep per level.

use bitm::{n_lowest_bits_1_64, BitAccess, BitArrayWithRank, BitVec};

use crate::error::Error;
use crate::optimizer::plan;
use crate::{Dac, Level};

/// Accumulates values to later build into a [`Dac`].
///
/// Unlike a fixed-width packed array, the level widths of a `Dac` depend
/// on the whole input distribution, so pushed values are buffered and the
/// actual stratification happens in [`Builder::finish`].
pub struct Builder {
    values: Vec<u64>,
    x: f64,
}

impl Builder {
    /// Creates a builder with rank-overhead constant `x`.
    ///
    /// `x` must be in `(0, 1)`; it is the estimated fractional cost,
    /// relative to one payload bit, of one bit of a level's continuation
    /// bitmap once indexed for rank.
    pub fn new(x: f64) -> Result<Self, Error> {
        validate_x(x)?;
        Ok(Self { values: Vec::new(), x })
    }

    /// Pushes a single value.
    #[inline]
    pub fn push(&mut self, value: u64) {
        self.values.push(value);
    }

    /// Pushes all `values`, in order.
    pub fn push_all<I: IntoIterator<Item = u64>>(&mut self, values: I) {
        self.values.extend(values);
    }

    /// Returns the number of values pushed so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns whether no value has been pushed yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Consumes `self` and builds the [`Dac`]. Fails with
    /// [`Error::InvalidInput`] if no value was pushed.
    pub fn finish(self) -> Result<Dac, Error> {
        build(self.values, self.x)
    }
}

pub(crate) fn validate_x(x: f64) -> Result<(), Error> {
    if !(x > 0.0 && x < 1.0) {
        return Err(Error::InvalidInput {
            reason: format!("overhead x={x} must lie in (0, 1)"),
        });
    }
    Ok(())
}

/// Rank-index overhead assumed by [`crate::Dac::bit_length`] for the
/// continuation bitmaps, matching the two-level rank structure reused
/// from the bit-manipulation library (whose actual worst-case overhead is
/// under 3.125%; 0.05 is kept as the conservative default used
/// throughout this crate).
pub(crate) const DEFAULT_RANK_OVERHEAD: f64 = 0.05;

pub(crate) fn build(values: Vec<u64>, x: f64) -> Result<Dac, Error> {
    validate_x(x)?;
    if values.is_empty() {
        return Err(Error::InvalidInput {
            reason: "cannot build a Dac from an empty sequence".into(),
        });
    }

    let len = values.len();
    let max = values.iter().copied().max().unwrap();
    let value_bit_width = bitm::bits_to_store(max).max(1);
    let vbyte_bits: u64 = values
        .iter()
        .map(|&v| 8 * bitm::ceiling_div(bitm::bits_to_store(v) as usize, 7) as u64)
        .sum();

    let widths = plan(&values, x);
    let level_count = widths.len();

    let mut levels = Vec::with_capacity(level_count);
    let mut residual = values;

    for (l, &w) in widths.iter().enumerate() {
        let n_l = residual.len();
        let is_last = l == level_count - 1;

        let mut a = Box::<[u64]>::with_zeroed_bits(n_l * w as usize);
        let mut b_bits = (!is_last).then(|| Box::<[u64]>::with_zeroed_bits(n_l));
        let mut next_residual = Vec::with_capacity(if is_last { 0 } else { n_l });

        let mask = n_lowest_bits_1_64(w);
        for (idx, &v) in residual.iter().enumerate() {
            let low = v & mask;
            a.init_fragment(idx, low, w);
            if let Some(b) = b_bits.as_mut() {
                let high = v >> w;
                if high != 0 {
                    b.init_bit(idx, true);
                    next_residual.push(high);
                }
            }
        }

        let continuation = b_bits.map(|b| {
            let (rank_select, _ones) = bitm::ArrayWithRank101111::build(b);
            rank_select
        });

        levels.push(Level { values: a, len: n_l, continuation });
        residual = next_residual;
    }

    Ok(Dac {
        levels: levels.into_boxed_slice(),
        widths: widths.into_boxed_slice(),
        len,
        x,
        overhead: DEFAULT_RANK_OVERHEAD,
        value_bit_width,
        vbyte_bits,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_x_out_of_range() {
        assert!(matches!(Builder::new(0.0), Err(Error::InvalidInput { .. })));
        assert!(matches!(Builder::new(1.0), Err(Error::InvalidInput { .. })));
        assert!(matches!(Builder::new(-0.1), Err(Error::InvalidInput { .. })));
        assert!(Builder::new(0.05).is_ok());
    }

    #[test]
    fn rejects_empty_input() {
        let b = Builder::new(0.05).unwrap();
        assert!(matches!(b.finish(), Err(Error::InvalidInput { .. })));
    }
}
