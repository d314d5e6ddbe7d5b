//! Helper for computing cyclic redundancy checks.

use core::ops::Range;

const CRC_TABLE: [u16; 16] = [
    0x0000, 0xCC01, 0xD801, 0x1400, 0xF001, 0x3C00, 0x2800, 0xE401, 0xA001, 0x6C00, 0x7800, 0xB401,
    0x5000, 0x9C01, 0x8801, 0x4400,
];

/// Accumulate a slice of bytes into a cyclic redundancy check value, starting
/// from `init`.
pub fn compute_crc(init: u16, r: &[u8]) -> u16 {
    r.iter().fold(init, |crc, b| {
        // Low nibble first, then high.
        [b & 0xF, b >> 4].into_iter().fold(crc, fold_nibble)
    })
}

/// Compute the cyclic redundancy check of a range of a document.
///
/// Returns `None` if the range does not lie within the document.
pub fn checksum_range(r: &[u8], range: Range<usize>) -> Option<u16> {
    r.get(range).map(|r| compute_crc(0, r))
}

fn fold_nibble(crc: u16, nibble: u8) -> u16 {
    let tmp = CRC_TABLE[(crc & 0xF) as usize];
    ((crc >> 4) & 0x0FFF) ^ tmp ^ CRC_TABLE[nibble as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    #[test]
    fn empty_range_is_zero() {
        assert_eq!(compute_crc(0, &[]), 0);
        assert_eq!(checksum_range(b"abc", 2..2), Some(0));
    }

    #[test]
    fn known_header_checksum() {
        // 12-byte header of a document with 0x0A data bytes.
        let header = [
            0x0C, 0x10, 0x64, 0x00, 0x0A, 0x00, 0x00, 0x00, b'.', b'F', b'I', b'T',
        ];
        let crc = compute_crc(0, &header);
        // Appending the checksum little-endian folds the register to zero.
        assert_eq!(compute_crc(crc, &crc.to_le_bytes()), 0);
    }

    #[test]
    fn out_of_bounds_range() {
        assert_eq!(checksum_range(b"abc", 1..4), None);
    }

    proptest! {
        #[test]
        fn deterministic(data in proptest::collection::vec(any::<u8>(), 0..256)) {
            prop_assert_eq!(compute_crc(0, &data), compute_crc(0, &data));
        }

        #[test]
        fn empty_range_anywhere(data in proptest::collection::vec(any::<u8>(), 0..64), s in 0usize..64) {
            let s = s.min(data.len());
            prop_assert_eq!(checksum_range(&data, s..s), Some(0));
        }

        #[test]
        fn split_accumulation(data in proptest::collection::vec(any::<u8>(), 0..128), at in 0usize..128) {
            let at = at.min(data.len());
            let (a, b) = data.split_at(at);
            prop_assert_eq!(compute_crc(compute_crc(0, a), b), compute_crc(0, &data));
        }
    }
}
