//! 错误处理器契约与调用管线。
//!
//! ## 模块目标（Why）
//! - 编解码原语只负责“分类”失败，恢复策略完全交给调用方提供的处理器；
//! - 处理器可以替换输出后继续、改写错误码，或原样上抛，原语从不覆盖处理器的决定。
//!
//! ## 结构概览（What）
//! - [`ErrorHandler`]：处理器能力契约，`IGNORABLE` 关联常量在编译期声明“无需调用”；
//! - `report_encode_error`/`report_decode_error`：原语内部统一的调用入口，负责短路可忽略处理器并记录 trace 事件；
//! - [`policy`]：内置策略（可忽略、透传、替换）；
//! - `progress`：桥接编码内部使用的问题单元捕获器。
//!
//! ## 实现策略（How）
//! - 通过泛型静态分发处理器，`IGNORABLE` 为常量，`if H::IGNORABLE` 分支在单态化后被完全消除；
//! - 处理器的返回值即为原语的返回值。

pub mod policy;
pub(crate) mod progress;

use crate::encoding::Encoding;
use crate::result::{DecodeResult, EncodeResult};

pub use policy::{AssumeValidHandler, PassThroughHandler, ReplacementHandler};

/// 编解码失败时被调用的恢复策略。
///
/// # 教案式说明
/// - **意图 (Why)**：调用方决定恢复策略，而引擎不依赖任何具体策略类型；
/// - **契约 (What)**：
///   - `encoding`：发生失败的编码对象本身；
///   - `result`：截至失败点的结果，视图只前移到失败位置；
///   - `progress`：触发失败的问题码点（编码方向）或问题码元（解码方向），可能为空；
///   - 返回值原样成为原语的返回值；
/// - **设计权衡 (Trade-offs)**：`IGNORABLE = true` 的处理器永远不会被调用，原语直接返回分类码；
///   此时不会生成任何恢复内容，调用方必须确认错误不可能发生或可以丢弃。
pub trait ErrorHandler<E: Encoding> {
    /// 是否在编译期跳过处理器调用。
    const IGNORABLE: bool = false;

    /// 处理编码方向的失败。
    fn handle_encode_error<'a>(
        &mut self,
        encoding: &E,
        result: EncodeResult<'a, E>,
        progress: &[E::CodePoint],
    ) -> EncodeResult<'a, E>;

    /// 处理解码方向的失败。
    fn handle_decode_error<'a>(
        &mut self,
        encoding: &E,
        result: DecodeResult<'a, E>,
        progress: &[E::CodeUnit],
    ) -> DecodeResult<'a, E>;
}

impl<E, H> ErrorHandler<E> for &mut H
where
    E: Encoding,
    H: ErrorHandler<E> + ?Sized,
{
    const IGNORABLE: bool = H::IGNORABLE;

    fn handle_encode_error<'a>(
        &mut self,
        encoding: &E,
        result: EncodeResult<'a, E>,
        progress: &[E::CodePoint],
    ) -> EncodeResult<'a, E> {
        (**self).handle_encode_error(encoding, result, progress)
    }

    fn handle_decode_error<'a>(
        &mut self,
        encoding: &E,
        result: DecodeResult<'a, E>,
        progress: &[E::CodeUnit],
    ) -> DecodeResult<'a, E> {
        (**self).handle_decode_error(encoding, result, progress)
    }
}

/// 将编码失败交给处理器；可忽略处理器直接返回原结果。
#[inline]
pub(crate) fn report_encode_error<'a, E, H>(
    encoding: &E,
    handler: &mut H,
    result: EncodeResult<'a, E>,
    progress: &[E::CodePoint],
) -> EncodeResult<'a, E>
where
    E: Encoding,
    H: ErrorHandler<E> + ?Sized,
{
    if H::IGNORABLE {
        return result;
    }
    tracing::trace!(
        encoding = encoding.name(),
        direction = "encode",
        error = result.error_code.code(),
        problem_units = progress.len(),
        "routing conversion failure to error handler"
    );
    handler.handle_encode_error(encoding, result, progress)
}

/// 将解码失败交给处理器；可忽略处理器直接返回原结果。
#[inline]
pub(crate) fn report_decode_error<'a, E, H>(
    encoding: &E,
    handler: &mut H,
    result: DecodeResult<'a, E>,
    progress: &[E::CodeUnit],
) -> DecodeResult<'a, E>
where
    E: Encoding,
    H: ErrorHandler<E> + ?Sized,
{
    if H::IGNORABLE {
        return result;
    }
    tracing::trace!(
        encoding = encoding.name(),
        direction = "decode",
        error = result.error_code.code(),
        problem_units = progress.len(),
        "routing conversion failure to error handler"
    );
    handler.handle_decode_error(encoding, result, progress)
}
