#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

//! `spark-codec-text` 提供依赖区域设置的“执行字符集”编解码引擎。
//!
//! # 教案背景（Why）
//! - 文本协议的边界经常出现平台窄编码：C 运行时按 `LC_CTYPE` 解释字节，Windows 按活动代码页解释字节；
//!   这类编码可能带移位状态，也可能一个输入单元产生多个码点，无法用静态查表完成；
//! - 本 crate 把“一次完整单元”的转换做成可组合的原语：每次调用恰好消费一个码点或产生一个码点，
//!   更高层按需循环即可处理整段缓冲；
//! - 错误恢复完全交给调用方提供的处理器，引擎只负责分类与精确的位置推进。
//!
//! # 使用概览（How）
//! - 以 [`Execution::with_runtime`] 包装任意 [`MultibyteRuntime`]（例如 [`CLocale`]、[`Utf8Locale`] 或表驱动区域设置），
//!   或以 [`Execution::with_code_page`] 包装任意 [`WideCodePage`]；[`NativeExecution::native`] 选择当前平台的默认组合；
//! - 通过 [`Encoding::encode_state`]/[`Encoding::decode_state`] 为每个转换流构造一次状态，之后每次调用都传入同一个状态；
//! - 处理器可选 [`AssumeValidHandler`]（零开销、不调用）、[`PassThroughHandler`]（原样上抛）或 [`ReplacementHandler`]（替换后继续）。
//!
//! # 合约说明（What）
//! - 空输入永远返回 `Ok` 且不触碰输出；
//! - 失败时结果中的输入/输出视图只前移到失败点，处理器的返回值原样成为调用结果；
//! - 解码状态中的 `output_pending` 标记待排出的第二个码点，流结束时通过 [`Execution::drain_pending`] 取回。
//!
//! # 风险提示与后续（Trade-offs）
//! - 平台运行时依赖进程全局的区域设置，同一进程内切换区域设置会影响所有 `NativeExecution` 实例；
//! - 状态对象不是并发安全的，每个转换流必须独占自己的状态。

mod encoding;
mod error;
pub mod execution;
pub mod handler;
mod result;
pub mod runtime;
pub mod unicode;

pub use crate::encoding::{
    EmptyState, Encoding, MAX_CODE_POINTS, MB_LEN_MAX, REPLACEMENT_CHARACTER,
    REPLACEMENT_CODE_UNITS,
};
#[cfg(feature = "std")]
pub use crate::error::LocaleError;
pub use crate::error::EncodingError;
pub use crate::execution::{
    Backend, BridgeDecodeState, CodePageBridge, Execution, ExecutionDecodeState, ExecutionEncodeState, Multibyte,
    NativeExecution,
};
pub use crate::handler::{AssumeValidHandler, ErrorHandler, PassThroughHandler, ReplacementHandler};
pub use crate::result::{DecodeResult, EncodeResult};
pub use crate::runtime::{
    CLocale, CodePageError, LocaleCodePage, MbConversion, MultibyteRuntime, ShiftState,
    StatelessShift, Utf8Locale, WideCodePage, Windows1252,
};
#[cfg(feature = "std")]
pub use crate::runtime::{TableLocale, TableShiftState};
