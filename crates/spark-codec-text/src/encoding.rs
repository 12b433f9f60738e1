//! 编码对象的统一契约。
//!
//! ## 模块目标（Why）
//! - 以单一 trait 描述“一次完整单元”的双向转换能力，使 UTF-8/UTF-16 辅助编码与执行字符集共享同一调用协议；
//! - 让错误处理器、进度捕获与桥接逻辑只面向 trait 编程，而不关心具体编码。
//!
//! ## 结构概览（What）
//! - [`Encoding`]：码元/码点类型、状态类型、公开常量与 `encode_one`/`decode_one`；
//! - [`EmptyState`]：无状态编码使用的零尺寸状态；
//! - 全局常量 [`MB_LEN_MAX`]、[`REPLACEMENT_CHARACTER`]、[`REPLACEMENT_CODE_UNITS`]。

use core::fmt::Debug;

use crate::handler::ErrorHandler;
use crate::result::{DecodeResult, EncodeResult};

/// 任意区域设置单次完整转换可能产生的最大窄码元数量。
///
/// 与 glibc 的 `MB_LEN_MAX` 保持一致，也是所有后端暂存缓冲的容量。
pub const MB_LEN_MAX: usize = 16;

/// 单次解码可能产生的最大码点数量。
///
/// 已知编码中单个输入最多产生 3 个码点（部分泰米尔编码），这里取保守值 7。
pub const MAX_CODE_POINTS: usize = 7;

/// Unicode 替换字符 U+FFFD。
pub const REPLACEMENT_CHARACTER: char = '\u{FFFD}';

/// 窄编码的默认替换码元序列。
///
/// 绝大多数遗留区域设置无法表示 U+FFFD，而 `?` 几乎在所有区域设置中都有表示。
pub const REPLACEMENT_CODE_UNITS: [u8; 1] = [b'?'];

/// 无状态编码使用的零尺寸状态。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EmptyState;

/// 单元级编码契约。
///
/// # 设计初衷（Why）
/// - 所有编码都以“一次完整单元”为原子：`encode_one` 消费一个码点、`decode_one` 产生一个码点；
///   更高层按需循环即可覆盖整段缓冲；
/// - 状态由调用方持有并以 `&mut` 传入，引擎从不隐式保存流历史。
///
/// # 契约说明（What）
/// - **输入**：`input` 为剩余输入视图，`output` 为剩余输出视图，二者只在本次调用期间被借用；
/// - **前置条件**：`state` 必须由同一编码对象的 [`Encoding::encode_state`]/[`Encoding::decode_state`] 构造；
/// - **后置条件**：返回结果中的输入/输出视图精确前移到已消费/已写入的位置；失败时只前移到失败点；
/// - 空输入永远返回 [`EncodingError::Ok`](crate::EncodingError::Ok) 且不触碰输出。
///
/// # 风险提示（Trade-offs）
/// - 结果中的三个视图共用同一生命周期 `'a`，调用方的借用会收缩到最短者，换取处理器签名的简洁。
pub trait Encoding: Sized {
    /// 编码后的码元类型。
    type CodeUnit: Copy + Default + Debug + 'static;
    /// 解码后的码点类型。
    type CodePoint: Copy + Default + Debug + 'static;
    /// 编码方向的持久状态。
    type EncodeState: Debug;
    /// 解码方向的持久状态。
    type DecodeState: Debug;

    /// 单次 `encode_one` 最多写出的码元数量。
    const MAX_CODE_UNITS: usize;
    /// 单次 `decode_one` 最多写出的码点数量。
    const MAX_CODE_POINTS: usize;
    /// 解码是否保证单射（所有输入都能无歧义地映射为码点）。
    const IS_DECODE_INJECTIVE: bool;
    /// 编码是否保证单射（所有码点都能被表示）。
    const IS_ENCODE_INJECTIVE: bool;

    /// 编码名称，用于日志与诊断。
    fn name(&self) -> &str;

    /// 替换策略优先使用的码元序列；`None` 表示改为编码替换码点。
    fn replacement_code_units(&self) -> Option<&'static [Self::CodeUnit]> {
        None
    }

    /// 替换策略在解码方向写出的码点序列；`None` 表示使用处理器自身的默认值。
    fn replacement_code_points(&self) -> Option<&'static [Self::CodePoint]> {
        None
    }

    /// 构造一个新的编码状态。
    fn encode_state(&self) -> Self::EncodeState;

    /// 构造一个新的解码状态。
    fn decode_state(&self) -> Self::DecodeState;

    /// 将下一个码点编码为一个或多个码元。
    fn encode_one<'a, H>(
        &self,
        input: &'a [Self::CodePoint],
        output: &'a mut [Self::CodeUnit],
        handler: &mut H,
        state: &'a mut Self::EncodeState,
    ) -> EncodeResult<'a, Self>
    where
        H: ErrorHandler<Self> + ?Sized;

    /// 从一个或多个码元解码出恰好一个码点。
    fn decode_one<'a, H>(
        &self,
        input: &'a [Self::CodeUnit],
        output: &'a mut [Self::CodePoint],
        handler: &mut H,
        state: &'a mut Self::DecodeState,
    ) -> DecodeResult<'a, Self>
    where
        H: ErrorHandler<Self> + ?Sized;
}

/// 向非空输出写入一个值，返回剩余输出。
///
/// 调用方必须先确认 `output` 非空。
#[inline]
pub(crate) fn write_one<T>(output: &mut [T], value: T) -> &mut [T] {
    let (slot, rest) = output.split_at_mut(1);
    slot[0] = value;
    rest
}
