//! # 命令处理逻辑模块
//!
//! 包含处理编码与解码操作的高级业务逻辑。
//! 本模块负责校验参数、打开文件、调用编解码流水线以及向用户报告结果。
//! 流水线失败时，已部分写入的输出文件会被删除。

use crate::cli::{DecodeArgs, EncodeArgs};
use crate::constants::{DEFAULT_STEGO_IMAGE, SUPPORTED_SECRET_EXTENSIONS};
use crate::decode::{decode, decoded_file_name};
use crate::encode::{encode, secret_extension};
use crate::error::StegoError;
use anyhow::{Context, Result, ensure};
use colored::Colorize;
use log::{debug, info};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// 新创建的输出文件。在调用 [`PartialOutput::keep`] 之前被丢弃时会删除该文件。
struct PartialOutput {
    path: PathBuf,
    keep: bool,
}

impl PartialOutput {
    fn create(path: &Path) -> io::Result<(Self, File)> {
        let file = File::create(path)?;
        let output = Self {
            path: path.to_path_buf(),
            keep: false,
        };
        Ok((output, file))
    }

    fn keep(mut self) -> PathBuf {
        self.keep = true;
        std::mem::take(&mut self.path)
    }
}

impl Drop for PartialOutput {
    fn drop(&mut self) {
        if !self.keep {
            debug!("Removing partial output {}", self.path.display());
            let _ = fs::remove_file(&self.path);
        }
    }
}

fn ensure_bmp(path: &Path, role: &str) -> Result<()> {
    let is_bmp = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("bmp"));
    ensure!(
        is_bmp,
        "{} is not a .bmp file: {}",
        role,
        path.to_string_lossy().red().bold()
    );
    Ok(())
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// 处理编码操作的执行逻辑。
///
/// 校验参数后打开源图像与秘密文件，检查容量，将秘密文件嵌入像素区，
/// 最后写入目标图像文件。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径的 `EncodeArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 源图像或输出路径不是 `.bmp` 文件，或秘密文件扩展名不受支持。
/// * 无法打开输入文件或创建输出文件。
/// * 图像没有足够的空间来隐藏秘密文件。
/// * 任一编码步骤读写失败。
pub fn handle_encode(args: EncodeArgs) -> Result<()> {
    ensure_bmp(&args.source, "Source file")?;

    let extension = secret_extension(&args.secret)?;
    ensure!(
        SUPPORTED_SECRET_EXTENSIONS.iter().any(|&ext| ext == extension),
        "Unsupported secret file format: {} (expected one of {})",
        extension.red().bold(),
        SUPPORTED_SECRET_EXTENSIONS.join(", ")
    );

    let dest = args
        .dest
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STEGO_IMAGE));
    ensure_bmp(&dest, "Output file")?;
    ensure!(
        !same_file(&args.source, &dest),
        "Output file must differ from the source image: {}",
        dest.to_string_lossy().red().bold()
    );

    let cover = File::open(&args.source).with_context(|| {
        format!(
            "Unable to open image file: {}",
            args.source.to_string_lossy().red().bold()
        )
    })?;

    let secret = File::open(&args.secret).with_context(|| {
        format!(
            "Unable to open secret file: {}",
            args.secret.to_string_lossy().red().bold()
        )
    })?;
    let secret_len = secret
        .metadata()
        .with_context(|| {
            format!(
                "Unable to read the size of secret file: {}",
                args.secret.to_string_lossy().red().bold()
            )
        })?
        .len();

    let (output, file) = PartialOutput::create(&dest).with_context(|| {
        format!(
            "Unable to create target image file: {}",
            dest.to_string_lossy().red().bold()
        )
    })?;
    info!("Files are opened successfully");

    let (report, _) = encode(
        BufReader::new(cover),
        BufReader::new(secret),
        secret_len,
        extension,
        BufWriter::new(file),
    )
    .with_context(|| {
        format!(
            "Failed to hide {} in {}.",
            args.secret.to_string_lossy().red().bold(),
            args.source.to_string_lossy().red().bold()
        )
    })?;

    let dest = output.keep();

    println!(
        "The secret file has been successfully hidden and saved: {}",
        dest.to_string_lossy().green().bold()
    );
    println!(
        "Used {} of {} pixel bytes ({}x{} image, {} byte payload, {} bytes copied unchanged)",
        report.required_bits.to_string().green(),
        report.geometry.capacity().to_string().green(),
        report.geometry.width,
        report.geometry.height,
        report.payload_len,
        report.tail_len
    );

    Ok(())
}

/// 处理解码操作的执行逻辑。
///
/// 读取隐写图像，校验魔数后恢复扩展名与秘密文件内容，
/// 并将其写入指定路径或默认的 `decoded_file<扩展名>`。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径的 `DecodeArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 输入不是 `.bmp` 文件或无法打开。
/// * 图像中没有隐藏数据，或解码出的长度字段不合法。
/// * 无法创建或写入输出文件。
pub fn handle_decode(args: DecodeArgs) -> Result<()> {
    ensure_bmp(&args.image, "Input file")?;

    let stego = File::open(&args.image).with_context(|| {
        format!(
            "Unable to open image file: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;
    info!("Files are opened successfully");

    let mut output: Option<PartialOutput> = None;
    let decoded = decode(BufReader::new(stego), |extension| {
        let path = args
            .output
            .clone()
            .unwrap_or_else(|| decoded_file_name(extension));
        // 创建输出会截断正在读取的图像
        if same_file(&args.image, &path) {
            return Err(StegoError::Argument(format!(
                "output file must differ from the stego image: {}",
                path.display()
            )));
        }
        let (partial, file) = PartialOutput::create(&path)
            .map_err(|source| StegoError::Open { path, source })?;
        output = Some(partial);
        Ok(BufWriter::new(file))
    })
    .with_context(|| {
        format!(
            "Failed to recover hidden data from '{}'.",
            args.image.to_string_lossy().red().bold()
        )
    })?;
    drop(decoded.output);

    let path = output
        .map(PartialOutput::keep)
        .context("Decoded output file was never created")?;

    println!(
        "The secret file ({} bytes, {}) has been successfully recovered and saved: {}",
        decoded.payload_len,
        decoded.extension,
        path.to_string_lossy().green().bold()
    );

    Ok(())
}
