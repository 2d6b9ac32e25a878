//! # bmp_stego 库
//!
//! 本库包含 BMP LSB 隐写工具的核心逻辑：位打包原语、容量与头部处理、
//! 编解码流水线，以及命令行层使用的参数与处理函数。

// 声明库包含的所有模块。

pub mod bmp;
pub mod cli;
pub mod constants;
pub mod decode;
pub mod encode;
pub mod error;
pub mod handler;
pub mod steganography;
