//! # 解码流水线
//!
//! 跳过 BMP 头部后按与编码相同的顺序提取各字段。
//! 魔数不匹配时在读取任何长度字段之前就报错。

use crate::constants::{
    BMP_HEADER_SIZE, BYTES_PER_CHAR, DECODED_FILE_STEM, LENGTH_HIDING_BYTES, MAGIC_STRING,
    MAGIC_STRING_LEN, MAX_EXTENSION_LEN,
};
use crate::error::{Result, Stage, StegoError};
use crate::steganography::{unpack_byte, unpack_size};
use log::info;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::PathBuf;

/// 每解码这么多字节就写出一次。
const PAYLOAD_CHUNK_SIZE: usize = 4096;

/// 一次成功解码的结果。
#[derive(Debug)]
pub struct Decoded<W> {
    pub extension: String,
    pub payload_len: u32,
    pub output: W,
}

/// 未指定输出路径时使用的文件名，例如 `decoded_file.txt`。
pub fn decoded_file_name(extension: &str) -> PathBuf {
    PathBuf::from(format!("{DECODED_FILE_STEM}{extension}"))
}

/// 解码流水线的状态：持有隐写图像的读取端。
pub struct Extractor<R> {
    stego: R,
}

impl<R: Read + Seek> Extractor<R> {
    pub fn new(stego: R) -> Self {
        Self { stego }
    }

    pub fn skip_header(&mut self) -> Result<()> {
        self.stego
            .seek(SeekFrom::Start(BMP_HEADER_SIZE as u64))
            .map(|_| ())
            .map_err(StegoError::read(Stage::BmpHeader))
    }

    fn extract_byte(&mut self, stage: Stage) -> Result<u8> {
        let mut pix = [0u8; BYTES_PER_CHAR];
        self.stego
            .read_exact(&mut pix)
            .map_err(StegoError::read(stage))?;
        Ok(unpack_byte(&pix))
    }

    fn extract_size(&mut self, stage: Stage) -> Result<u32> {
        let mut pix = [0u8; LENGTH_HIDING_BYTES];
        self.stego
            .read_exact(&mut pix)
            .map_err(StegoError::read(stage))?;
        Ok(unpack_size(&pix))
    }

    pub fn decode_magic_string(&mut self) -> Result<()> {
        let mut decoded = [0u8; MAGIC_STRING_LEN];
        for byte in decoded.iter_mut() {
            *byte = self.extract_byte(Stage::MagicString)?;
        }

        if &decoded != MAGIC_STRING {
            return Err(StegoError::NotStego);
        }
        Ok(())
    }

    /// 解码扩展名长度，必须在 (0, 4] 之内，否则视为数据损坏。
    pub fn decode_extension_size(&mut self) -> Result<usize> {
        let size = self.extract_size(Stage::ExtensionSize)?;
        match usize::try_from(size) {
            Ok(len) if len > 0 && len <= MAX_EXTENSION_LEN => Ok(len),
            _ => Err(StegoError::InvalidExtensionSize(size)),
        }
    }

    /// 解码扩展名。解出的内容必须是以 `.` 开头、不含路径分隔符的 UTF-8 字符串。
    pub fn decode_extension(&mut self, size: usize) -> Result<String> {
        let bytes = (0..size)
            .map(|_| self.extract_byte(Stage::Extension))
            .collect::<Result<Vec<u8>>>()?;

        let extension = String::from_utf8(bytes).map_err(|e| {
            StegoError::InvalidExtension(String::from_utf8_lossy(e.as_bytes()).into_owned())
        })?;

        if !extension.starts_with('.') || extension.contains(['/', '\\']) {
            return Err(StegoError::InvalidExtension(extension));
        }
        Ok(extension)
    }

    pub fn decode_payload_size(&mut self) -> Result<u32> {
        let size = self.extract_size(Stage::PayloadSize)?;
        if size == 0 {
            return Err(StegoError::InvalidPayloadSize(size));
        }
        Ok(size)
    }

    /// 逐字节解码秘密文件内容，并分块写入 `output`。
    pub fn decode_payload<W: Write>(&mut self, size: u32, output: &mut W) -> Result<()> {
        let mut chunk = Vec::with_capacity(PAYLOAD_CHUNK_SIZE);

        for _ in 0..size {
            chunk.push(self.extract_byte(Stage::Payload)?);
            if chunk.len() == PAYLOAD_CHUNK_SIZE {
                output
                    .write_all(&chunk)
                    .map_err(StegoError::write(Stage::Payload))?;
                chunk.clear();
            }
        }

        output
            .write_all(&chunk)
            .map_err(StegoError::write(Stage::Payload))
    }
}

/// 执行完整的解码流水线。
///
/// `open_output` 在扩展名解码之后、秘密文件长度解码之前被调用，
/// 参数为解码出的扩展名，返回秘密文件内容的写入端。
///
/// # Errors
///
/// * 图像被截断时返回带有步骤信息的读取错误。
/// * 魔数不匹配、扩展名长度越界或秘密文件长度为 0 时返回格式错误。
/// * `open_output` 或写入失败时返回其错误。
pub fn decode<R, W, F>(stego: R, open_output: F) -> Result<Decoded<W>>
where
    R: Read + Seek,
    W: Write,
    F: FnOnce(&str) -> Result<W>,
{
    let mut extractor = Extractor::new(stego);

    extractor.skip_header()?;

    extractor.decode_magic_string()?;
    info!("Magic string decoded successfully");

    let extension_size = extractor.decode_extension_size()?;
    info!("Secret file extension size decoded successfully");

    let extension = extractor.decode_extension(extension_size)?;
    let mut output = open_output(&extension)?;
    info!("Secret file extension decoded successfully");

    let payload_len = extractor.decode_payload_size()?;
    info!("Secret file size decoded successfully");

    extractor.decode_payload(payload_len, &mut output)?;
    output
        .flush()
        .map_err(StegoError::write(Stage::Finalize))?;
    info!("Secret file data decoded successfully");

    Ok(Decoded {
        extension,
        payload_len,
        output,
    })
}
