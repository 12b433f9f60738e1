//! 执行字符集：依赖区域设置的窄编码与 Unicode 之间的单元级转换引擎。
//!
//! ## 模块目标（Why）
//! - 执行字符集由运行期的区域设置决定，可能带移位状态，也可能一个输入单元产生多个码点；
//! - 不同平台暴露的原语截然不同：unix 提供逐字符的 `mbrtoc32`/`c32rtomb`，Windows 只提供以 UTF-16 为中心的缓冲 API；
//! - 引擎需要在两条路径上维持同一套结果结构与处理器协议，调用方无从感知差异。
//!
//! ## 结构概览（What）
//! - [`Execution`]：实现 [`Encoding`] 的编码对象，公开常量与替换码元在此声明；
//! - [`Backend`]：后端契约，状态类型与单元转换由后端决定；
//! - [`Multibyte`]：字节导向后端，驱动任意 [`MultibyteRuntime`]；
//! - [`CodePageBridge`]：宽字符后端，经 UTF-16 桥接驱动任意 [`WideCodePage`]；
//! - [`NativeExecution`]：按编译目标选定的平台默认组合。
//!
//! ## 实现策略（How）
//! - 平台差异在类型层面通过后端泛型选择，公开签名保持一致；
//! - 处理器以泛型静态分发，可忽略处理器的调用在单态化后被完全消除。

mod bridge;
mod multibyte;

use crate::encoding::{Encoding, MAX_CODE_POINTS, MB_LEN_MAX, REPLACEMENT_CODE_UNITS};
use crate::error::EncodingError;
use crate::handler::ErrorHandler;
use crate::result::{DecodeResult, EncodeResult};
use crate::runtime::{MultibyteRuntime, WideCodePage};

pub use bridge::{BridgeDecodeState, CodePageBridge};
pub use multibyte::{ExecutionDecodeState, ExecutionEncodeState, Multibyte};

/// 执行字符集后端。
///
/// # 教案式说明
/// - **意图 (Why)**：字节导向与宽字符导向两种平台原语需要完全不同的算法，但必须共享 [`Execution`] 的公开契约；
/// - **契约 (What)**：
///   - 所有方法以所属的 [`Execution`] 作为编码身份传给错误处理器，处理器因此看到的永远是执行字符集本身；
///   - `drain_pending` 只排出上一次解码留下的待输出码点，从不消费输入；没有待输出内容的后端保留默认实现；
/// - **风险 (Trade-offs)**：后端以关联函数形式接收 `&Execution<Self>`，换取处理器签名中编码类型的一致。
pub trait Backend: Sized {
    /// 编码方向的持久状态。
    type EncodeState: core::fmt::Debug;
    /// 解码方向的持久状态。
    type DecodeState: core::fmt::Debug;

    /// 后端（区域设置或代码页）名称。
    fn name(&self) -> &str;

    /// 构造并预热编码状态。
    fn encode_state(&self) -> Self::EncodeState;

    /// 构造并预热解码状态。
    fn decode_state(&self) -> Self::DecodeState;

    /// 单码点编码。
    fn encode_one<'a, H>(
        encoding: &Execution<Self>,
        input: &'a [char],
        output: &'a mut [u8],
        handler: &mut H,
        state: &'a mut Self::EncodeState,
    ) -> EncodeResult<'a, Execution<Self>>
    where
        H: ErrorHandler<Execution<Self>> + ?Sized;

    /// 单码点解码。
    fn decode_one<'a, H>(
        encoding: &Execution<Self>,
        input: &'a [u8],
        output: &'a mut [char],
        handler: &mut H,
        state: &'a mut Self::DecodeState,
    ) -> DecodeResult<'a, Execution<Self>>
    where
        H: ErrorHandler<Execution<Self>> + ?Sized;

    /// 在输入结束后排出一个待输出码点。
    fn drain_pending<'a, H>(
        _encoding: &Execution<Self>,
        output: &'a mut [char],
        _handler: &mut H,
        state: &'a mut Self::DecodeState,
    ) -> DecodeResult<'a, Execution<Self>>
    where
        H: ErrorHandler<Execution<Self>> + ?Sized,
    {
        DecodeResult::new(&[], output, state, EncodingError::Ok)
    }
}

/// 执行字符集编码对象。
///
/// # 教案式说明
/// - **意图 (Why)**：以一个编码对象承载“当前区域设置的窄编码”，与 UTF-8/UTF-16 共享同一 [`Encoding`] 契约；
/// - **契约 (What)**：
///   - 码元为 `u8`，码点为 `char`；单次编码最多写出 [`MB_LEN_MAX`] 个码元，单次解码最多写出一个码点，
///     公开上限 [`MAX_CODE_POINTS`] 为跨已知编码的保守值；
///   - 编码与解码均不保证单射；
///   - 默认替换码元为 `?`；
/// - **前置条件**：状态必须由同一对象的 `encode_state`/`decode_state` 构造，且只被一个转换流独占使用。
#[derive(Clone, Debug, Default)]
pub struct Execution<B> {
    backend: B,
}

impl<B: Backend> Execution<B> {
    /// 以给定后端构造。
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// 访问后端。
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// 在输入结束后排出上一次解码留下的待输出码点。
    ///
    /// 空输入的 `decode_one` 永远直接成功，因此流结束时需要调用本方法，直到状态不再报告待输出内容。
    pub fn drain_pending<'a, H>(
        &self,
        output: &'a mut [char],
        handler: &mut H,
        state: &'a mut B::DecodeState,
    ) -> DecodeResult<'a, Self>
    where
        H: ErrorHandler<Self> + ?Sized,
    {
        B::drain_pending(self, output, handler, state)
    }
}

impl<R: MultibyteRuntime> Execution<Multibyte<R>> {
    /// 以字节导向运行时构造。
    pub fn with_runtime(runtime: R) -> Self {
        Self::new(Multibyte::new(runtime))
    }
}

impl<C: WideCodePage> Execution<CodePageBridge<C>> {
    /// 以宽字符代码页构造。
    pub fn with_code_page(code_page: C) -> Self {
        Self::new(CodePageBridge::new(code_page))
    }
}

impl<B: Backend> Encoding for Execution<B> {
    type CodeUnit = u8;
    type CodePoint = char;
    type EncodeState = B::EncodeState;
    type DecodeState = B::DecodeState;

    const MAX_CODE_UNITS: usize = MB_LEN_MAX;
    const MAX_CODE_POINTS: usize = MAX_CODE_POINTS;
    const IS_DECODE_INJECTIVE: bool = false;
    const IS_ENCODE_INJECTIVE: bool = false;

    fn name(&self) -> &str {
        self.backend.name()
    }

    fn replacement_code_units(&self) -> Option<&'static [u8]> {
        Some(&REPLACEMENT_CODE_UNITS)
    }

    fn encode_state(&self) -> Self::EncodeState {
        self.backend.encode_state()
    }

    fn decode_state(&self) -> Self::DecodeState {
        self.backend.decode_state()
    }

    fn encode_one<'a, H>(
        &self,
        input: &'a [char],
        output: &'a mut [u8],
        handler: &mut H,
        state: &'a mut Self::EncodeState,
    ) -> EncodeResult<'a, Self>
    where
        H: ErrorHandler<Self> + ?Sized,
    {
        B::encode_one(self, input, output, handler, state)
    }

    fn decode_one<'a, H>(
        &self,
        input: &'a [u8],
        output: &'a mut [char],
        handler: &mut H,
        state: &'a mut Self::DecodeState,
    ) -> DecodeResult<'a, Self>
    where
        H: ErrorHandler<Self> + ?Sized,
    {
        B::decode_one(self, input, output, handler, state)
    }
}

#[cfg(all(feature = "native", unix, not(target_vendor = "apple")))]
/// 当前编译目标的平台默认后端。
pub type NativeBackend = Multibyte<crate::runtime::NativeRuntime>;

#[cfg(all(feature = "native", windows))]
/// 当前编译目标的平台默认后端。
pub type NativeBackend = CodePageBridge<crate::runtime::ActiveCodePage>;

#[cfg(not(any(
    all(feature = "native", unix, not(target_vendor = "apple")),
    all(feature = "native", windows)
)))]
/// 当前编译目标的平台默认后端。
pub type NativeBackend = Multibyte<crate::runtime::CLocale>;

/// 由当前进程区域设置驱动的执行字符集。
pub type NativeExecution = Execution<NativeBackend>;

impl NativeExecution {
    /// 构造平台默认的执行字符集。
    ///
    /// Windows 上在此刻捕获活动代码页；unix 上每次转换都读取进程当前的 `LC_CTYPE`；
    /// 其余目标退化为严格的 `"C"` 区域设置。
    pub fn native() -> Self {
        Self::new(NativeBackend::default())
    }
}
