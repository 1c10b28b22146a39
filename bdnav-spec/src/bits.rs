//! Fixed-width bit-field packing helpers
//!
//! The disc formats pack flags and small enums into bytes and words,
//! documented MSB-first. `split` and `merge` convert between an integer and
//! its ordered fields: `widths[0]` names the most significant field.
//!
//! ```
//! use bdnav_spec::bits::{merge, split};
//!
//! let [hi, mid, lo] = split(0b101_0011_1, [3, 4, 1]);
//! assert_eq!((hi, mid, lo), (0b101, 0b0011, 0b1));
//! assert_eq!(merge([hi, mid, lo], [3, 4, 1]), 0b101_0011_1);
//! ```

/// Splits `value` into `N` fields, MSB-first.
///
/// The fields together cover the low `widths.sum()` bits of `value`;
/// anything above that is ignored.
pub fn split<const N: usize>(value: u32, widths: [u32; N]) -> [u32; N] {
    let total: u32 = widths.iter().sum();
    debug_assert!(total <= 32);

    let mut out = [0u32; N];
    let mut shift = total;
    for (i, &width) in widths.iter().enumerate() {
        shift -= width;
        out[i] = (value >> shift) & mask(width);
    }
    out
}

/// Packs `fields` back into a single integer, MSB-first.
pub fn merge<const N: usize>(fields: [u32; N], widths: [u32; N]) -> u32 {
    let total: u32 = widths.iter().sum();
    debug_assert!(total <= 32);

    let mut out = 0u32;
    let mut shift = total;
    for (i, &width) in widths.iter().enumerate() {
        shift -= width;
        out |= (fields[i] & mask(width)) << shift;
    }
    out
}

const fn mask(width: u32) -> u32 {
    if width >= 32 {
        u32::MAX
    } else {
        (1 << width) - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_byte_fields() {
        // 0b10_01_1101: two 2-bit fields and a 4-bit field
        let [a, b, c] = split(0b10_01_1101, [2, 2, 4]);
        assert_eq!(a, 0b10);
        assert_eq!(b, 0b01);
        assert_eq!(c, 0b1101);
    }

    #[test]
    fn merge_is_inverse_of_split() {
        let widths = [3, 3, 2, 4, 2, 1, 1, 4, 4, 5, 3];
        for word in [0u32, 1, 0xdead_beef, u32::MAX, 0x8000_0001] {
            let fields = split(word, widths);
            assert_eq!(merge(fields, widths), word);
        }
    }

    #[test]
    fn merge_truncates_oversized_fields() {
        assert_eq!(merge([0xff, 0x1], [2, 1]), 0b111);
    }

    #[test]
    fn full_width_field() {
        assert_eq!(split(u32::MAX, [32]), [u32::MAX]);
        assert_eq!(merge([u32::MAX], [32]), u32::MAX);
    }
}
