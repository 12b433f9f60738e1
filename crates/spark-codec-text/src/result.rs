//! 单元编解码的返回结构。

use core::fmt;

use crate::encoding::Encoding;
use crate::error::EncodingError;

/// `encode_one` 的返回值。
///
/// # 契约说明（What）
/// - `input`：跳过已消费码点后的剩余输入；
/// - `output`：跳过已写入码元后的剩余输出；
/// - `state`：调用方传入的（已被修改的）编码状态；
/// - `error_code`：本次调用的分类码；失败时两个视图只前移到失败点；
/// - `handled_errors`：错误处理器已经吸收（替换后继续）的错误次数。
pub struct EncodeResult<'a, E: Encoding> {
    /// 剩余输入。
    pub input: &'a [E::CodePoint],
    /// 剩余输出。
    pub output: &'a mut [E::CodeUnit],
    /// 编码状态。
    pub state: &'a mut E::EncodeState,
    /// 分类码。
    pub error_code: EncodingError,
    /// 已被处理器吸收的错误次数。
    pub handled_errors: usize,
}

/// `decode_one` 的返回值，字段语义与 [`EncodeResult`] 对称。
pub struct DecodeResult<'a, E: Encoding> {
    /// 剩余输入。
    pub input: &'a [E::CodeUnit],
    /// 剩余输出。
    pub output: &'a mut [E::CodePoint],
    /// 解码状态。
    pub state: &'a mut E::DecodeState,
    /// 分类码。
    pub error_code: EncodingError,
    /// 已被处理器吸收的错误次数。
    pub handled_errors: usize,
}

impl<'a, E: Encoding> EncodeResult<'a, E> {
    /// 以给定分类码组装结果，`handled_errors` 归零。
    pub fn new(
        input: &'a [E::CodePoint],
        output: &'a mut [E::CodeUnit],
        state: &'a mut E::EncodeState,
        error_code: EncodingError,
    ) -> Self {
        Self {
            input,
            output,
            state,
            error_code,
            handled_errors: 0,
        }
    }

    /// 本次调用是否成功。
    pub fn is_ok(&self) -> bool {
        self.error_code.is_ok()
    }
}

impl<'a, E: Encoding> DecodeResult<'a, E> {
    /// 以给定分类码组装结果，`handled_errors` 归零。
    pub fn new(
        input: &'a [E::CodeUnit],
        output: &'a mut [E::CodePoint],
        state: &'a mut E::DecodeState,
        error_code: EncodingError,
    ) -> Self {
        Self {
            input,
            output,
            state,
            error_code,
            handled_errors: 0,
        }
    }

    /// 本次调用是否成功。
    pub fn is_ok(&self) -> bool {
        self.error_code.is_ok()
    }
}

impl<E: Encoding> fmt::Debug for EncodeResult<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodeResult")
            .field("input", &self.input)
            .field("output_remaining", &self.output.len())
            .field("state", &self.state)
            .field("error_code", &self.error_code)
            .field("handled_errors", &self.handled_errors)
            .finish()
    }
}

impl<E: Encoding> fmt::Debug for DecodeResult<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodeResult")
            .field("input", &self.input)
            .field("output_remaining", &self.output.len())
            .field("state", &self.state)
            .field("error_code", &self.error_code)
            .field("handled_errors", &self.handled_errors)
            .finish()
    }
}
