//! # 命令行接口模块
//!
//! 使用 `clap` 定义了程序的命令行结构：
//! `-e <source.bmp> <secret-file> [output.bmp]` 与 `-d <stego.bmp> [output-file]`。

use anyhow::{Result, bail};
use clap::Parser;
use std::path::PathBuf;

/// 一款基于 LSB (最低有效位) 隐写术的命令行工具，用于在 24 位 BMP 图像中隐藏或恢复文件。
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "一款基于 LSB (最低有效位) 隐写术的命令行工具，用于在 24 位 BMP 图像中隐藏或恢复文件。\n每个像素字节的最低位承载 1 bit 数据。"
)]
pub struct Cli {
    /// 编码：<source.bmp> <secret-file> [output.bmp]，输出默认为 default.bmp。
    #[arg(
        short = 'e',
        long = "encode",
        num_args = 2..=3,
        value_names = ["SOURCE_BMP", "SECRET_FILE", "OUTPUT_BMP"],
        conflicts_with = "decode",
        required_unless_present = "decode"
    )]
    pub encode: Option<Vec<PathBuf>>,

    /// 解码：<stego.bmp> [output-file]，输出默认为 decoded_file<扩展名>。
    #[arg(
        short = 'd',
        long = "decode",
        num_args = 1..=2,
        value_names = ["STEGO_BMP", "OUTPUT_FILE"]
    )]
    pub decode: Option<Vec<PathBuf>>,

    /// 输出每个步骤的调试日志。
    #[arg(short, long)]
    pub verbose: bool,
}

/// 解析后的操作：编码或解码。
#[derive(Debug)]
pub enum Commands {
    Encode(EncodeArgs),
    Decode(DecodeArgs),
}

/// 编码操作所需的参数。
#[derive(Debug, Clone)]
pub struct EncodeArgs {
    /// 源 BMP 图像路径。
    pub source: PathBuf,

    /// 要隐藏的秘密文件路径。
    pub secret: PathBuf,

    /// 隐写结果图像的输出路径，缺省时为 `default.bmp`。
    pub dest: Option<PathBuf>,
}

/// 解码操作所需的参数。
#[derive(Debug, Clone)]
pub struct DecodeArgs {
    /// 已隐藏数据的 BMP 图像路径。
    pub image: PathBuf,

    /// 恢复文件的输出路径，缺省时为 `decoded_file<扩展名>`。
    pub output: Option<PathBuf>,
}

impl Cli {
    /// 将 `-e` / `-d` 的位置值整理为具名参数。
    pub fn command(&self) -> Result<Commands> {
        match (&self.encode, &self.decode) {
            (Some(values), None) => match values.as_slice() {
                [source, secret] | [source, secret, _] => Ok(Commands::Encode(EncodeArgs {
                    source: source.clone(),
                    secret: secret.clone(),
                    dest: values.get(2).cloned(),
                })),
                _ => bail!("-e expects <source.bmp> <secret-file> [output.bmp]"),
            },
            (None, Some(values)) => match values.as_slice() {
                [image] | [image, _] => Ok(Commands::Decode(DecodeArgs {
                    image: image.clone(),
                    output: values.get(1).cloned(),
                })),
                _ => bail!("-d expects <stego.bmp> [output-file]"),
            },
            _ => bail!("Unsupported operation. Please use -e or -d"),
        }
    }
}
