/// BMP 文件的标准头部大小 (字节)。
/// 隐写操作将原样保留这个头部，从像素数据开始嵌入。
pub const BMP_HEADER_SIZE: usize = 54;

/// 头部中图像宽度字段的偏移量，紧随其后 4 字节为高度。
pub const BMP_WIDTH_OFFSET: u64 = 18;

/// 每个像素占用的字节数 (24 位 BGR)。
pub const BYTES_PER_PIXEL: u64 = 3;

/// 嵌入在信封最前面的魔数，用于判断图像是否包含隐藏数据。
pub const MAGIC_STRING: &[u8; MAGIC_STRING_LEN] = b"#*LSBSTG";

/// 魔数的字节数。
pub const MAGIC_STRING_LEN: usize = 8;

/// 隐写单个字节所需的像素字节数。
/// 每个像素字节只存储 1 bit，因此需要 8 个像素字节。
pub const BYTES_PER_CHAR: usize = 8;

/// 隐写一个 `u32` 长度字段所需的像素字节数 (32 bits)。
pub const LENGTH_HIDING_BYTES: usize = 32;

/// 长度字段本身在信封中的字节数。
pub const LENGTH_FIELD_SIZE: u64 = 4;

/// 解码时允许的最大扩展名长度 (包含 `.`)。
pub const MAX_EXTENSION_LEN: usize = 4;

/// 允许隐藏的秘密文件扩展名。
pub const SUPPORTED_SECRET_EXTENSIONS: [&str; 4] = [".h", ".c", ".sh", ".txt"];

/// 未指定输出路径时，隐写结果图像的默认文件名。
pub const DEFAULT_STEGO_IMAGE: &str = "default.bmp";

/// 未指定输出路径时，恢复文件的默认文件名前缀 (后接解码出的扩展名)。
pub const DECODED_FILE_STEM: &str = "decoded_file";
