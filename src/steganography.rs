//! # LSB 位打包原语
//!
//! 每个像素字节的最低位承载 1 bit 数据，位序为 LSB 优先：
//! 数据的第 `i` 位写入第 `i` 个像素字节。

use crate::constants::{BYTES_PER_CHAR, LENGTH_HIDING_BYTES};

/// 将 `data` 的 8 个比特依次写入 `pix` 中每个字节的最低位，其余位保持不变。
pub fn pack_byte(data: u8, pix: &mut [u8; BYTES_PER_CHAR]) {
    for (i, byte) in pix.iter_mut().enumerate() {
        *byte = (*byte & 0xFE) | ((data >> i) & 1);
    }
}

/// `pack_byte` 的逆操作。
pub fn unpack_byte(pix: &[u8; BYTES_PER_CHAR]) -> u8 {
    pix.iter()
        .enumerate()
        .fold(0, |acc, (i, &byte)| acc | ((byte & 1) << i))
}

/// 将 32 位长度字段写入 32 个像素字节的最低位。
pub fn pack_size(size: u32, pix: &mut [u8; LENGTH_HIDING_BYTES]) {
    for (i, byte) in pix.iter_mut().enumerate() {
        *byte = (*byte & 0xFE) | (((size >> i) & 1) as u8);
    }
}

/// `pack_size` 的逆操作。
pub fn unpack_size(pix: &[u8; LENGTH_HIDING_BYTES]) -> u32 {
    pix.iter()
        .enumerate()
        .fold(0, |acc, (i, &byte)| acc | (u32::from(byte & 1) << i))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_round_trip_over_all_values() {
        let covers = [[0x00u8; 8], [0xFF; 8], [0xA5, 0x5A, 0x01, 0xFE, 0x80, 0x7F, 0x33, 0xCC]];
        for cover in covers {
            for value in 0..=u8::MAX {
                let mut pix = cover;
                pack_byte(value, &mut pix);
                assert_eq!(unpack_byte(&pix), value);
            }
        }
    }

    #[test]
    fn pack_byte_keeps_upper_bits() {
        let cover = [0xA5u8, 0x5A, 0x01, 0xFE, 0x80, 0x7F, 0x33, 0xCC];
        for value in 0..=u8::MAX {
            let mut pix = cover;
            pack_byte(value, &mut pix);
            for (before, after) in cover.iter().zip(pix.iter()) {
                assert_eq!(before & 0xFE, after & 0xFE);
            }
        }
    }

    #[test]
    fn pack_byte_is_lsb_first() {
        let mut pix = [0u8; 8];
        pack_byte(0b0000_0101, &mut pix);
        assert_eq!(pix, [1, 0, 1, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn size_round_trip() {
        for size in [0u32, 1, 4, 0x1234_5678, u32::MAX] {
            let mut pix = [0xAAu8; 32];
            pack_size(size, &mut pix);
            assert_eq!(unpack_size(&pix), size);
            assert!(pix.iter().all(|b| b & 0xFE == 0xAA));
        }
    }

    #[test]
    fn pack_size_is_little_endian() {
        let mut pix = [0u8; 32];
        pack_size(1 << 31 | 1, &mut pix);
        assert_eq!(pix[0], 1);
        assert_eq!(pix[31], 1);
        assert!(pix[1..31].iter().all(|&b| b == 0));
    }
}
