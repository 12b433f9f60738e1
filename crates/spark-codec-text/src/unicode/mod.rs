//! 固定 Unicode 编码：执行字符集在桥接路径上使用的中间编码。
//!
//! 二者遵循与执行字符集完全相同的结果结构与处理器调用协议，桥接层因此可以把它们的失败原样转述给调用方。

mod utf16;
pub(crate) mod utf8;

pub use utf8::Utf8;
pub use utf16::Utf16;
