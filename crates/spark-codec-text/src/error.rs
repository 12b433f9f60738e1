//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 为单元编解码原语提供统一的错误分类，使错误处理器、调用方与观测系统共享同一套语义；
//! - 区分“转换失败”（[`EncodingError`]）与“区域设置表装载失败”（`LocaleError`），前者是热路径返回值，后者只出现在配置阶段。
//!
//! ## 设计要求（What）
//! - [`EncodingError`] 必须是 `Copy` 且零分配，便于在 `no_std` 环境和每次调用结果中携带；
//! - 每个分类提供稳定的点分错误码（`text.*`），便于日志与指标聚合；
//! - `LocaleError` 携带足够的上下文（区域设置名称、字节序列）以定位配置问题。

#[cfg(feature = "std")]
use std::path::PathBuf;

use thiserror::Error;

/// 单元编解码调用的结果分类。
///
/// # 教案式说明
/// - **意图 (Why)**：原语在每次调用中都返回一个分类码，错误处理器据此决定替换、继续或上抛；
///   `Ok` 也是分类的一部分，使结果结构可以在成功与失败路径上保持同一形状。
/// - **契约 (What)**：
///   - `Ok`：输入与输出均精确反映已消费/已写入的单元；
///   - `InvalidSequence`：输入单元无法解释，或码点无法在目标编码中表示；
///   - `IncompleteSequence`：已看到合法前缀，但输入耗尽前未凑齐完整单元；
///   - `InsufficientOutputSpace`：输出目标在写完一个完整单元之前耗尽。
/// - **设计权衡 (Trade-offs)**：使用单一枚举而非 `Result<(), E>`，是为了让处理器能够把失败“改写”为成功，
///   调用方如需 `?` 传播可使用 [`EncodingError::into_result`]。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum EncodingError {
    /// 转换成功。
    #[error("conversion succeeded")]
    Ok,
    /// 输入序列非法，或码点在当前编码中不可表示。
    #[error("input contains an invalid or unrepresentable sequence")]
    InvalidSequence,
    /// 输入在完整单元之前耗尽。
    #[error("input ended in the middle of an incomplete sequence")]
    IncompleteSequence,
    /// 输出空间不足以写入完整单元。
    #[error("output space was exhausted before a complete unit could be written")]
    InsufficientOutputSpace,
}

impl EncodingError {
    /// 返回稳定的点分错误码，供日志与指标使用。
    pub const fn code(self) -> &'static str {
        match self {
            EncodingError::Ok => "text.ok",
            EncodingError::InvalidSequence => "text.invalid_sequence",
            EncodingError::IncompleteSequence => "text.incomplete_sequence",
            EncodingError::InsufficientOutputSpace => "text.insufficient_output_space",
        }
    }

    /// 是否为成功分类。
    pub const fn is_ok(self) -> bool {
        matches!(self, EncodingError::Ok)
    }

    /// 将分类码提升为 `Result`，便于调用方使用 `?`。
    pub fn into_result(self) -> Result<(), EncodingError> {
        if self.is_ok() { Ok(()) } else { Err(self) }
    }
}

/// 区域设置表装载与校验错误。
///
/// # 教案式说明
/// - **意图 (Why)**：表驱动区域设置来自外部 TOML 配置，任何歧义都会在运行期表现为静默乱码，
///   因此必须在编译表时一次性拒绝。
/// - **契约 (What)**：`locale` 字段为配置中的区域设置名称；字节序列以原样保留，便于定位配置行。
/// - **风险 (Trade-offs)**：`String`/`Vec` 上下文带来少量分配，但只发生在配置阶段。
#[cfg(feature = "std")]
#[derive(Debug, Error)]
pub enum LocaleError {
    /// TOML 语法或字段类型错误。
    #[error("failed to parse locale table: {0}")]
    Parse(#[from] toml::de::Error),

    /// 读取配置文件失败。
    #[error("failed to read locale table `{}`: {source}", .path.display())]
    Io {
        /// 配置文件路径。
        path: PathBuf,
        /// 底层 I/O 错误。
        #[source]
        source: std::io::Error,
    },

    /// 配置中的数值不是 Unicode 标量值。
    #[error("locale `{locale}`: {value:#x} is not a Unicode scalar value")]
    InvalidCodePoint {
        /// 区域设置名称。
        locale: String,
        /// 原始数值。
        value: u32,
    },

    /// 序列的字节列表为空。
    #[error("locale `{locale}`: sequence has no bytes")]
    EmptySequence {
        /// 区域设置名称。
        locale: String,
    },

    /// 序列过长，编码时无法与移位字节一并放入单次输出。
    #[error("locale `{locale}`: sequence {bytes:02x?} exceeds {max} bytes")]
    SequenceTooLong {
        /// 区域设置名称。
        locale: String,
        /// 超长的字节序列。
        bytes: Vec<u8>,
        /// 允许的最大字节数。
        max: usize,
    },

    /// 序列映射的码点为空或超过单次解码上限。
    #[error("locale `{locale}`: sequence {bytes:02x?} must map to 1..={max} code points")]
    CodePointCount {
        /// 区域设置名称。
        locale: String,
        /// 对应的字节序列。
        bytes: Vec<u8>,
        /// 允许的最大码点数。
        max: usize,
    },

    /// 同一字符集内出现重复序列，或一个序列是另一个序列的前缀。
    #[error("locale `{locale}`: sequence {bytes:02x?} is duplicated or ambiguous")]
    Conflict {
        /// 区域设置名称。
        locale: String,
        /// 冲突的字节序列。
        bytes: Vec<u8>,
    },

    /// 字节区间首尾颠倒，或区间映射越过 Unicode 标量范围。
    #[error("locale `{locale}`: range {first:#04x}..={last:#04x} is invalid")]
    InvalidRange {
        /// 区域设置名称。
        locale: String,
        /// 区间首字节。
        first: u8,
        /// 区间末字节。
        last: u8,
    },

    /// 0x00 必须解码为 U+0000。
    #[error("locale `{locale}`: byte 0x00 must map to U+0000")]
    NulNotPreserved {
        /// 区域设置名称。
        locale: String,
    },

    /// 移位配置非法（例如 SO 与 SI 相同，或序列以移位字节开头）。
    #[error("locale `{locale}`: invalid shift configuration: {detail}")]
    Shift {
        /// 区域设置名称。
        locale: String,
        /// 违反的约束。
        detail: &'static str,
    },
}
