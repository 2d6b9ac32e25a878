//! # 错误类型模块
//!
//! [`StegoError`] 覆盖编码与解码流水线的全部失败情形。
//! 所有 I/O 错误都带有失败所在的 [`Stage`]，便于向用户报告。

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// 流水线中的各个步骤。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ImageSize,
    BmpHeader,
    MagicString,
    ExtensionSize,
    Extension,
    PayloadSize,
    Payload,
    SecretFile,
    RemainingData,
    Finalize,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ImageSize => "image dimensions",
            Self::BmpHeader => "BMP header",
            Self::MagicString => "magic string",
            Self::ExtensionSize => "secret file extension size",
            Self::Extension => "secret file extension",
            Self::PayloadSize => "secret file size",
            Self::Payload => "secret file data",
            Self::SecretFile => "secret file",
            Self::RemainingData => "remaining image data",
            Self::Finalize => "output file",
        };
        f.write_str(name)
    }
}

/// 错误的大类，与命令行层报告的四种失败一一对应。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Argument,
    Io,
    Capacity,
    Format,
}

#[derive(Debug, Error)]
pub enum StegoError {
    /// 参数不合法 (扩展名缺失、秘密文件为空等)。
    #[error("invalid argument: {0}")]
    Argument(String),

    #[error("unable to open {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 读取失败，包括源数据在字段写完之前耗尽。
    #[error("failed to read {stage}")]
    Read {
        stage: Stage,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {stage}")]
    Write {
        stage: Stage,
        #[source]
        source: io::Error,
    },

    /// 图像的像素区不足以容纳整个信封。
    #[error("image doesn't have enough capacity: required {required} bytes, available {available}")]
    Capacity { required: u64, available: u64 },

    #[error("this file doesn't contain any secret data (not a stego file)")]
    NotStego,

    #[error("invalid secret file extension size: {0}")]
    InvalidExtensionSize(u32),

    #[error("invalid secret file extension: {0:?}")]
    InvalidExtension(String),

    #[error("invalid secret file size: {0}")]
    InvalidPayloadSize(u32),
}

impl StegoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Argument(_) => ErrorKind::Argument,
            Self::Open { .. } | Self::Read { .. } | Self::Write { .. } => ErrorKind::Io,
            Self::Capacity { .. } => ErrorKind::Capacity,
            Self::NotStego
            | Self::InvalidExtensionSize(_)
            | Self::InvalidExtension(_)
            | Self::InvalidPayloadSize(_) => ErrorKind::Format,
        }
    }

    /// 用于 `map_err`，将读取错误标记到对应步骤。
    pub(crate) fn read(stage: Stage) -> impl FnOnce(io::Error) -> Self {
        move |source| Self::Read { stage, source }
    }

    pub(crate) fn write(stage: Stage) -> impl FnOnce(io::Error) -> Self {
        move |source| Self::Write { stage, source }
    }
}

pub type Result<T> = std::result::Result<T, StegoError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn io_variants_leave_the_cause_to_source() {
        let err = StegoError::Read {
            stage: Stage::Payload,
            source: io::Error::new(io::ErrorKind::UnexpectedEof, "failed to fill whole buffer"),
        };
        assert_eq!(err.to_string(), "failed to read secret file data");
        assert_eq!(
            err.source().map(|e| e.to_string()),
            Some("failed to fill whole buffer".to_string())
        );

        let chain = format!("{:#}", anyhow::Error::new(err));
        assert_eq!(chain.matches("failed to fill whole buffer").count(), 1);
    }
}
