//! # 容量与头部处理
//!
//! 只读取 BMP 头部偏移 18 与 22 处的宽高字段，不依赖头部的其他内容。

use crate::constants::{
    BMP_HEADER_SIZE, BMP_WIDTH_OFFSET, BYTES_PER_PIXEL, LENGTH_FIELD_SIZE, MAGIC_STRING,
};
use crate::error::{Result, Stage, StegoError};
use std::io::{Read, Seek, SeekFrom, Write};

/// 从头部读出的图像尺寸。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
}

impl Geometry {
    /// 像素区字节数 `width * height * 3`，即可嵌入的比特数。
    pub fn capacity(&self) -> u64 {
        u64::from(self.width)
            .saturating_mul(u64::from(self.height))
            .saturating_mul(BYTES_PER_PIXEL)
    }
}

/// 读取图像宽高。头部被截断时返回错误。
pub fn read_geometry<R: Read + Seek>(image: &mut R) -> Result<Geometry> {
    image
        .seek(SeekFrom::Start(BMP_WIDTH_OFFSET))
        .map_err(StegoError::read(Stage::ImageSize))?;

    let mut fields = [0u8; 8];
    image
        .read_exact(&mut fields)
        .map_err(StegoError::read(Stage::ImageSize))?;

    let [w0, w1, w2, w3, h0, h1, h2, h3] = fields;
    Ok(Geometry {
        width: u32::from_le_bytes([w0, w1, w2, w3]),
        height: u32::from_le_bytes([h0, h1, h2, h3]),
    })
}

/// 嵌入完整信封所需的像素字节数 (每个像素字节承载 1 bit)。
pub fn required_bits(extension_len: usize, payload_len: u64) -> u64 {
    let envelope = MAGIC_STRING.len() as u64
        + LENGTH_FIELD_SIZE
        + extension_len as u64
        + LENGTH_FIELD_SIZE
        + payload_len;
    envelope.saturating_mul(8)
}

/// 仅当所需比特数严格小于像素区容量时成功。
pub fn check_capacity(required: u64, available: u64) -> Result<()> {
    if required < available {
        Ok(())
    } else {
        Err(StegoError::Capacity {
            required,
            available,
        })
    }
}

/// 从头开始原样复制 54 字节的头部。
pub fn copy_header<R: Read + Seek, W: Write>(cover: &mut R, stego: &mut W) -> Result<()> {
    cover
        .rewind()
        .map_err(StegoError::read(Stage::BmpHeader))?;

    let mut header = [0u8; BMP_HEADER_SIZE];
    cover
        .read_exact(&mut header)
        .map_err(StegoError::read(Stage::BmpHeader))?;
    stego
        .write_all(&header)
        .map_err(StegoError::write(Stage::BmpHeader))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::io::Cursor;

    /// 构造一个 54 字节头部 + `pixels` 字节像素区的最小 BMP。
    pub(crate) fn fake_bmp(width: u32, height: u32, pixels: usize) -> Vec<u8> {
        let mut bytes = vec![0u8; BMP_HEADER_SIZE];
        bytes[0..2].copy_from_slice(b"BM");
        bytes[18..22].copy_from_slice(&width.to_le_bytes());
        bytes[22..26].copy_from_slice(&height.to_le_bytes());
        bytes.extend((0..pixels).map(|i| (i * 7 % 251) as u8));
        bytes
    }

    #[test]
    fn reads_geometry_from_header() {
        let mut image = Cursor::new(fake_bmp(100, 100, 0));
        let geometry = read_geometry(&mut image).unwrap();
        assert_eq!(geometry, Geometry { width: 100, height: 100 });
        assert_eq!(geometry.capacity(), 30000);
    }

    #[test]
    fn truncated_header_is_an_io_error() {
        let mut image = Cursor::new(vec![0u8; 20]);
        let err = read_geometry(&mut image).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(matches!(err, StegoError::Read { stage: Stage::ImageSize, .. }));
    }

    #[test]
    fn capacity_saturates_instead_of_overflowing() {
        let geometry = Geometry { width: u32::MAX, height: u32::MAX };
        assert_eq!(geometry.capacity(), u64::MAX);
    }

    #[test]
    fn required_bits_counts_every_field() {
        assert_eq!(required_bits(4, 5), 200);
    }

    #[test]
    fn capacity_check_is_strict() {
        assert!(check_capacity(29999, 30000).is_ok());
        let err = check_capacity(30000, 30000).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Capacity);
    }

    #[test]
    fn header_is_copied_verbatim() {
        let source = fake_bmp(4, 4, 48);
        let mut cover = Cursor::new(source.clone());
        cover.seek(SeekFrom::Start(30)).unwrap();
        let mut out = Vec::new();
        copy_header(&mut cover, &mut out).unwrap();
        assert_eq!(out, source[..BMP_HEADER_SIZE]);
    }

    #[test]
    fn short_header_fails() {
        let mut cover = Cursor::new(vec![0u8; 40]);
        let err = copy_header(&mut cover, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, StegoError::Read { stage: Stage::BmpHeader, .. }));
    }
}
