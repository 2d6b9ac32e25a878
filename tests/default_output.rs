//! 默认输出路径相对于当前工作目录，因此这个测试单独放在一个测试二进制中，
//! 以免切换工作目录影响其他测试。

use bmp_stego::{
    cli::{DecodeArgs, EncodeArgs},
    handler::{handle_decode, handle_encode},
};
use image::{ImageBuffer, Rgb};
use std::env;
use std::fs;
use tempfile::tempdir;

/// 100x100 图像隐藏 5 字节的 "hello"，不指定任何输出路径
#[test]
fn test_default_output_paths() -> anyhow::Result<()> {
    let dir = tempdir()?;
    env::set_current_dir(dir.path())?;

    let img_buf: ImageBuffer<Rgb<u8>, Vec<u8>> =
        ImageBuffer::from_fn(100, 100, |x, y| Rgb([x as u8, y as u8, (x ^ y) as u8]));
    img_buf.save("cover.bmp")?;
    fs::write("secret.txt", "hello")?;

    handle_encode(EncodeArgs {
        source: "cover.bmp".into(),
        secret: "secret.txt".into(),
        dest: None,
    })?;
    assert!(dir.path().join("default.bmp").exists());

    handle_decode(DecodeArgs {
        image: "default.bmp".into(),
        output: None,
    })?;

    let recovered = fs::read(dir.path().join("decoded_file.txt"))?;
    assert_eq!(recovered, b"hello");

    Ok(())
}
