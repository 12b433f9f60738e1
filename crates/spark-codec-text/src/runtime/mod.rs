//! 平台窄字符转换原语的契约与实现。
//!
//! ## 模块目标（Why）
//! - 执行字符集引擎把“区域设置表”视为黑盒：字节导向平台通过 `mbrtoc32`/`c32rtomb` 式原语逐单元转换，
//!   宽字符导向平台通过 `MultiByteToWideChar`/`WideCharToMultiByte` 式缓冲 API 转换；
//! - 本模块把两类原语收敛为两个 trait，并把哨兵返回值（`-1`/`-2`/`-3`/`0`）建模为带标签的枚举，
//!   使引擎以 `match` 分派，而不是在逻辑中散落魔数比较。
//!
//! ## 结构概览（What）
//! - [`MultibyteRuntime`] + [`MbConversion`] + [`ShiftState`]：字节导向原语；
//! - [`WideCodePage`] + [`CodePageError`]：宽字符缓冲原语；
//! - 可移植实现：[`CLocale`]、[`Utf8Locale`]、`TableLocale`（`std`）、[`Windows1252`]、[`LocaleCodePage`]；
//! - 平台实现（`native` 特性）：unix 上的 `NativeRuntime`，windows 上的 `ActiveCodePage`。

mod c_locale;
mod code_page;
#[cfg(all(feature = "native", unix, not(target_vendor = "apple")))]
mod native;
#[cfg(feature = "std")]
pub mod table;
mod utf8_locale;
#[cfg(all(feature = "native", windows))]
mod win32;

use core::fmt::Debug;

use crate::encoding::MB_LEN_MAX;

pub use c_locale::{CLocale, StatelessShift};
pub use code_page::{LocaleCodePage, Windows1252};
#[cfg(all(feature = "native", unix, not(target_vendor = "apple")))]
pub use native::{NativeRuntime, NativeShiftState};
#[cfg(feature = "std")]
pub use table::{TableLocale, TableShiftState};
pub use utf8_locale::Utf8Locale;
#[cfg(all(feature = "native", windows))]
pub use win32::ActiveCodePage;

/// Windows 的 UTF-8 代码页标识。
pub const CP_UTF8: u32 = 65001;

/// 字节导向原语单次解码调用的分类结果。
///
/// # 契约说明（What）
/// - `Produced`：输入构成一个完整字符，写出一个码点，状态中没有待输出内容；
/// - `ProducedWithPending`：写出第一个码点，其余码点保存在移位状态中，等待以空输入排出；
/// - `Incomplete`：输入是合法前缀，需要更多字节；以空输入探测时表示“没有待输出内容”；
/// - `Invalid`：输入无法解释；
/// - `NullTerminator`：输入为 NUL，移位状态回到初始态。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MbConversion {
    /// 完整字符，无待输出内容。
    Produced(char),
    /// 完整字符，状态中仍有待输出码点。
    ProducedWithPending(char),
    /// 需要更多字节，或排出时没有待输出内容。
    Incomplete,
    /// 输入无法解释。
    Invalid,
    /// NUL，状态已复位。
    NullTerminator,
}

/// 窄编码的移位状态（`mbstate_t` 的对应物）。
pub trait ShiftState: Clone + Debug + Default {
    /// 是否处于初始移位状态（`mbsinit` 的对应物）。
    fn is_initial(&self) -> bool;
}

/// 字节导向的平台窄字符转换原语。
///
/// # 设计初衷（Why）
/// - 对应 C 标准库的 `mbrtoc32`/`c32rtomb`：调用方持有移位状态并在每次调用中传入；
/// - 引擎在每次尝试时传入状态的副本，只在成功时提交，因此实现可以自由修改传入的状态。
///
/// # 契约说明（What）
/// - `mbrtoc32`：`input` 为截至目前累积的全部字节；空输入表示排出待输出码点；
/// - `c32rtomb`：写出 0..=`MB_LEN_MAX` 个字节并返回数量，`None` 表示当前区域设置无法表示该码点；
///   对 U+0000 必须先写出恢复初始移位状态所需的字节，再写出 NUL；
/// - **前置条件**：新构造（`Default`）的状态即为初始状态。
pub trait MultibyteRuntime {
    /// 移位状态类型。
    type ShiftState: ShiftState;

    /// 区域设置名称。
    fn name(&self) -> &str;

    /// 将累积的字节解码为一个码点。
    fn mbrtoc32(&self, input: &[u8], state: &mut Self::ShiftState) -> MbConversion;

    /// 将一个码点编码为窄字节。
    fn c32rtomb(
        &self,
        code_point: char,
        output: &mut [u8; MB_LEN_MAX],
        state: &mut Self::ShiftState,
    ) -> Option<usize>;
}

/// 宽字符缓冲 API 的失败原因（`GetLastError` 的对应物）。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CodePageError {
    /// 输出缓冲不足（`ERROR_INSUFFICIENT_BUFFER`）。
    InsufficientBuffer,
    /// 输入无法转换为 Unicode（`ERROR_NO_UNICODE_TRANSLATION`）；截断的多字节字符同样报告此错误。
    NoUnicodeTranslation,
    /// 其他失败（非法参数、非法标志等）。
    Other,
}

/// 宽字符到窄字节转换的成功结果。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NarrowConversion {
    /// 写出的字节数。
    pub written: usize,
    /// 平台是否用默认字符替换了无法表示的字符。
    pub used_default_char: bool,
}

/// 以 16 位码元为中心的平台代码页 API。
///
/// # 契约说明（What）
/// - `to_wide`：严格模式的 `MultiByteToWideChar`，输入必须完整合法，否则返回 `NoUnicodeTranslation`；
/// - `to_narrow`：`WideCharToMultiByte`，无法表示的字符用 `default_char` 替换并置位 `used_default_char`；
/// - 两者都不保存跨调用状态。
pub trait WideCodePage {
    /// 代码页标识。
    fn code_page(&self) -> u32;

    /// 代码页名称。
    fn name(&self) -> &str;

    /// 单个字符的最大字节数（`GetCPInfo` 的 `MaxCharSize`）。
    fn max_char_size(&self) -> usize;

    /// 窄字节到 UTF-16。
    fn to_wide(&self, input: &[u8], output: &mut [u16]) -> Result<usize, CodePageError>;

    /// UTF-16 到窄字节。
    fn to_narrow(
        &self,
        input: &[u16],
        output: &mut [u8],
        default_char: u8,
    ) -> Result<NarrowConversion, CodePageError>;
}
