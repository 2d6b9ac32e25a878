//! # 编码流水线
//!
//! 依次将魔数、扩展名长度、扩展名、秘密文件长度与秘密文件内容嵌入像素区，
//! 再原样复制剩余的像素数据。每个字段读取多少像素字节就立即写出多少，不做整段缓冲。

use crate::bmp::{self, Geometry};
use crate::constants::{BYTES_PER_CHAR, LENGTH_HIDING_BYTES, MAGIC_STRING, MAX_EXTENSION_LEN};
use crate::error::{Result, Stage, StegoError};
use crate::steganography::{pack_byte, pack_size};
use log::{debug, info};
use std::io::{self, ErrorKind, Read, Seek, Write};
use std::path::Path;

/// 每次从秘密文件读取的块大小。
const SECRET_CHUNK_SIZE: usize = 4096;

/// 一次成功编码的统计信息。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeReport {
    pub geometry: Geometry,
    pub required_bits: u64,
    pub payload_len: u32,
    pub tail_len: u64,
}

/// 返回秘密文件名中从最后一个 `.` 开始的扩展名。
pub fn secret_extension(path: &Path) -> Result<&str> {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            StegoError::Argument(format!("invalid secret file name: {}", path.display()))
        })?;

    name.rfind('.')
        .map(|dot| &name[dot..])
        .ok_or_else(|| StegoError::Argument(format!("secret file '{name}' has no extension")))
}

/// 编码流水线的状态：持有源图像读取端和输出图像写入端。
pub struct Embedder<R, W> {
    cover: R,
    stego: W,
}

impl<R: Read + Seek, W: Write> Embedder<R, W> {
    pub fn new(cover: R, stego: W) -> Self {
        Self { cover, stego }
    }

    pub fn copy_header(&mut self) -> Result<()> {
        bmp::copy_header(&mut self.cover, &mut self.stego)
    }

    fn embed_byte(&mut self, stage: Stage, data: u8) -> Result<()> {
        let mut pix = [0u8; BYTES_PER_CHAR];
        self.cover
            .read_exact(&mut pix)
            .map_err(StegoError::read(stage))?;
        pack_byte(data, &mut pix);
        self.stego.write_all(&pix).map_err(StegoError::write(stage))
    }

    fn embed_size(&mut self, stage: Stage, size: u32) -> Result<()> {
        let mut pix = [0u8; LENGTH_HIDING_BYTES];
        self.cover
            .read_exact(&mut pix)
            .map_err(StegoError::read(stage))?;
        pack_size(size, &mut pix);
        self.stego.write_all(&pix).map_err(StegoError::write(stage))
    }

    pub fn encode_magic_string(&mut self) -> Result<()> {
        MAGIC_STRING
            .iter()
            .try_for_each(|&byte| self.embed_byte(Stage::MagicString, byte))
    }

    pub fn encode_extension_size(&mut self, extension: &str) -> Result<()> {
        // 长度已由 validate_extension 限制在 MAX_EXTENSION_LEN 以内
        self.embed_size(Stage::ExtensionSize, extension.len() as u32)
    }

    pub fn encode_extension(&mut self, extension: &str) -> Result<()> {
        extension
            .bytes()
            .try_for_each(|byte| self.embed_byte(Stage::Extension, byte))
    }

    pub fn encode_payload_size(&mut self, size: u32) -> Result<()> {
        self.embed_size(Stage::PayloadSize, size)
    }

    /// 从 `secret` 流式读取恰好 `size` 字节并逐字节嵌入。
    /// 秘密文件提前结束视为读取错误。
    pub fn encode_payload<S: Read>(&mut self, secret: S, size: u32) -> Result<()> {
        let mut secret = secret.take(u64::from(size));
        let mut chunk = [0u8; SECRET_CHUNK_SIZE];
        let mut remaining = size as usize;

        while remaining > 0 {
            let n = match secret.read(&mut chunk) {
                Ok(0) => {
                    return Err(StegoError::Read {
                        stage: Stage::SecretFile,
                        source: io::Error::new(
                            ErrorKind::UnexpectedEof,
                            format!("secret file ended {remaining} bytes early"),
                        ),
                    });
                }
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(StegoError::read(Stage::SecretFile)(e)),
            };

            chunk[..n]
                .iter()
                .try_for_each(|&byte| self.embed_byte(Stage::Payload, byte))?;
            remaining -= n;
        }

        Ok(())
    }

    /// 原样复制信封之后的所有像素字节，返回复制的字节数。
    pub fn copy_remaining(&mut self) -> Result<u64> {
        let mut buffer = [0u8; SECRET_CHUNK_SIZE];
        let mut copied = 0u64;

        loop {
            let n = match self.cover.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(StegoError::read(Stage::RemainingData)(e)),
            };
            self.stego
                .write_all(&buffer[..n])
                .map_err(StegoError::write(Stage::RemainingData))?;
            copied += n as u64;
        }

        Ok(copied)
    }

    /// 刷新输出并交还写入端。
    pub fn finish(mut self) -> Result<W> {
        self.stego.flush().map_err(StegoError::write(Stage::Finalize))?;
        Ok(self.stego)
    }
}

/// 扩展名必须以 `.` 开头，长度在 (0, 4] 之内。
pub fn validate_extension(extension: &str) -> Result<()> {
    if !extension.starts_with('.') || extension.len() > MAX_EXTENSION_LEN {
        return Err(StegoError::Argument(format!(
            "secret file extension '{extension}' must start with '.' and be at most {MAX_EXTENSION_LEN} bytes"
        )));
    }
    Ok(())
}

/// 执行完整的编码流水线，返回写入端以便调用者决定其去向。
///
/// # Arguments
///
/// * `cover` - 源 BMP 图像。
/// * `secret` - 秘密文件内容，至少包含 `secret_len` 字节。
/// * `secret_len` - 秘密文件的字节数。
/// * `extension` - 秘密文件扩展名，例如 `.txt`。
/// * `stego` - 输出图像的写入端。
///
/// # Errors
///
/// 在写入任何字节之前检查参数和容量；之后任一字段失败都会立即中止。
pub fn encode<R, S, W>(
    cover: R,
    secret: S,
    secret_len: u64,
    extension: &str,
    stego: W,
) -> Result<(EncodeReport, W)>
where
    R: Read + Seek,
    S: Read,
    W: Write,
{
    validate_extension(extension)?;
    if secret_len == 0 {
        return Err(StegoError::Argument("secret file is empty".into()));
    }
    let payload_len = u32::try_from(secret_len).map_err(|_| {
        StegoError::Argument(format!("secret file is too large: {secret_len} bytes"))
    })?;

    let mut embedder = Embedder::new(cover, stego);

    let geometry = bmp::read_geometry(&mut embedder.cover)?;
    debug!("Width = {}, Height = {}", geometry.width, geometry.height);
    let required_bits = bmp::required_bits(extension.len(), secret_len);
    bmp::check_capacity(required_bits, geometry.capacity())?;
    info!("Image has enough capacity to encode the secret data");

    embedder.copy_header()?;
    info!("Copied the BMP header");

    embedder.encode_magic_string()?;
    info!("Encoded the magic string");

    embedder.encode_extension_size(extension)?;
    info!("Encoded the secret file extension size");

    embedder.encode_extension(extension)?;
    info!("Encoded the secret file extension");

    embedder.encode_payload_size(payload_len)?;
    info!("Encoded the secret file size");

    embedder.encode_payload(secret, payload_len)?;
    info!("Encoded the secret file data");

    let tail_len = embedder.copy_remaining()?;
    info!("Copied the remaining image data");

    let stego = embedder.finish()?;

    Ok((
        EncodeReport {
            geometry,
            required_bits,
            payload_len,
            tail_len,
        },
        stego,
    ))
}
