//! 字节导向后端：以 `mbrtoc32`/`c32rtomb` 式原语逐单元驱动执行字符集。

use crate::encoding::{MB_LEN_MAX, write_one};
use crate::error::EncodingError;
use crate::execution::{Backend, Execution};
use crate::handler::{ErrorHandler, report_decode_error, report_encode_error};
use crate::result::{DecodeResult, EncodeResult};
use crate::runtime::{MbConversion, MultibyteRuntime, ShiftState};

/// 执行字符集编码方向的状态。
#[derive(Clone, Debug)]
pub struct ExecutionEncodeState<S> {
    narrow: S,
}

impl<S: ShiftState> ExecutionEncodeState<S> {
    /// 构造并以一次 U+0000 转换预热，使运行时进入已知的初始移位状态。
    pub fn new<R>(runtime: &R) -> Self
    where
        R: MultibyteRuntime<ShiftState = S>,
    {
        let mut narrow = S::default();
        let mut scratch = [0u8; MB_LEN_MAX];
        let primed = runtime.c32rtomb('\0', &mut scratch, &mut narrow);
        debug_assert!(primed.is_some(), "locale `{}` cannot encode U+0000", runtime.name());
        debug_assert!(narrow.is_initial());
        Self { narrow }
    }

    /// 是否处于初始移位状态。
    pub fn is_initial(&self) -> bool {
        self.narrow.is_initial()
    }

    /// 底层移位状态。
    pub fn shift_state(&self) -> &S {
        &self.narrow
    }
}

/// 执行字符集解码方向的状态。
///
/// # 教案式说明
/// - **意图 (Why)**：部分遗留编码的单个输入单元会产生两个码点，而每次调用只有一个输出槽位；
///   `output_pending` 标记“上一次调用还有后半部分待排出”；
/// - **契约 (What)**：状态要么处于初始移位态，要么 `output_pending` 为真，永远不会处于未初始化状态；
/// - **前置条件**：只被一个转换流独占使用。
#[derive(Clone, Debug)]
pub struct ExecutionDecodeState<S> {
    narrow: S,
    output_pending: bool,
}

impl<S: ShiftState> ExecutionDecodeState<S> {
    /// 构造并以一次 NUL 转换预热。
    pub fn new<R>(runtime: &R) -> Self
    where
        R: MultibyteRuntime<ShiftState = S>,
    {
        let mut narrow = S::default();
        let primed = runtime.mbrtoc32(&[0], &mut narrow);
        debug_assert_eq!(primed, MbConversion::NullTerminator, "locale `{}`", runtime.name());
        debug_assert!(narrow.is_initial());
        Self {
            narrow,
            output_pending: false,
        }
    }

    /// 是否处于初始移位状态且没有待输出码点。
    pub fn is_initial(&self) -> bool {
        !self.output_pending && self.narrow.is_initial()
    }

    /// 上一次解码是否留下了待输出码点。
    pub fn has_pending_output(&self) -> bool {
        self.output_pending
    }

    /// 底层移位状态。
    pub fn shift_state(&self) -> &S {
        &self.narrow
    }
}

type Handback<'a, S> = (&'a mut [char], &'a mut ExecutionDecodeState<S>);

/// 驱动 [`MultibyteRuntime`] 的执行字符集后端。
#[derive(Clone, Debug, Default)]
pub struct Multibyte<R> {
    runtime: R,
}

impl<R: MultibyteRuntime> Multibyte<R> {
    /// 包装运行时。
    pub fn new(runtime: R) -> Self {
        Self { runtime }
    }

    /// 被驱动的运行时。
    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    /// 排出一个待输出码点；没有待输出内容时交还输出与状态，由调用方继续常规路径。
    fn drain<'a, H>(
        encoding: &Execution<Self>,
        input: &'a [u8],
        output: &'a mut [char],
        handler: &mut H,
        state: &'a mut ExecutionDecodeState<R::ShiftState>,
    ) -> Result<DecodeResult<'a, Execution<Self>>, Handback<'a, R::ShiftState>>
    where
        H: ErrorHandler<Execution<Self>> + ?Sized,
    {
        let mut drained = state.narrow.clone();
        match encoding.backend().runtime.mbrtoc32(&[], &mut drained) {
            MbConversion::Produced(code_point) => {
                state.narrow = drained;
                state.output_pending = false;
                Ok(DecodeResult::new(input, write_one(output, code_point), state, EncodingError::Ok))
            }
            MbConversion::ProducedWithPending(code_point) => {
                state.narrow = drained;
                Ok(DecodeResult::new(input, write_one(output, code_point), state, EncodingError::Ok))
            }
            MbConversion::Invalid => {
                state.narrow = drained;
                state.output_pending = false;
                Ok(report_decode_error(
                    encoding,
                    handler,
                    DecodeResult::new(input, output, state, EncodingError::InvalidSequence),
                    &[],
                ))
            }
            MbConversion::Incomplete | MbConversion::NullTerminator => {
                state.output_pending = false;
                Err((output, state))
            }
        }
    }
}

impl<R: MultibyteRuntime> Backend for Multibyte<R> {
    type EncodeState = ExecutionEncodeState<R::ShiftState>;
    type DecodeState = ExecutionDecodeState<R::ShiftState>;

    fn name(&self) -> &str {
        self.runtime.name()
    }

    fn encode_state(&self) -> Self::EncodeState {
        ExecutionEncodeState::new(&self.runtime)
    }

    fn decode_state(&self) -> Self::DecodeState {
        ExecutionDecodeState::new(&self.runtime)
    }

    /// # 教案式说明
    /// - **执行逻辑 (How)**：
    ///   1. 空输入直接成功；输出为空时报告 `InsufficientOutputSpace`，输入保持不动；
    ///   2. 读取一个码点，在移位状态副本上调用 `c32rtomb`，失败时报告 `InvalidSequence`，
    ///      输入越过该码点，输出不变，状态不变；
    ///   3. 成功后提交状态，把暂存字节逐个写入输出；写到一半空间耗尽时报告 `InsufficientOutputSpace`，
    ///      已写入的字节保留，不回滚。
    fn encode_one<'a, H>(
        encoding: &Execution<Self>,
        input: &'a [char],
        output: &'a mut [u8],
        handler: &mut H,
        state: &'a mut Self::EncodeState,
    ) -> EncodeResult<'a, Execution<Self>>
    where
        H: ErrorHandler<Execution<Self>> + ?Sized,
    {
        let Some((&code_point, rest)) = input.split_first() else {
            return EncodeResult::new(input, output, state, EncodingError::Ok);
        };
        if output.is_empty() {
            return report_encode_error(
                encoding,
                handler,
                EncodeResult::new(input, output, state, EncodingError::InsufficientOutputSpace),
                &[],
            );
        }

        let mut staged = [0u8; MB_LEN_MAX];
        let mut attempt = state.narrow.clone();
        let Some(len) = encoding
            .backend()
            .runtime
            .c32rtomb(code_point, &mut staged, &mut attempt)
        else {
            return report_encode_error(
                encoding,
                handler,
                EncodeResult::new(rest, output, state, EncodingError::InvalidSequence),
                &[code_point],
            );
        };
        state.narrow = attempt;

        let fits = len.min(output.len());
        let (head, tail) = output.split_at_mut(fits);
        head.copy_from_slice(&staged[..fits]);
        if fits < len {
            return report_encode_error(
                encoding,
                handler,
                EncodeResult::new(rest, tail, state, EncodingError::InsufficientOutputSpace),
                &[code_point],
            );
        }
        EncodeResult::new(rest, tail, state, EncodingError::Ok)
    }

    /// # 教案式说明
    /// - **执行逻辑 (How)**：
    ///   1. 空输入直接成功；输出为空时报告 `InsufficientOutputSpace`；
    ///   2. `output_pending` 为真时不消费输入，以空输入探测并写出待输出码点；
    ///   3. 否则逐个追加输入单元到暂存区，每一步都在移位状态的副本上调用 `mbrtoc32`，只在成功时提交；
    ///   4. 不完整且输入耗尽时报告 `IncompleteSequence` 并暴露全部已累积单元；
    ///      非法时报告 `InvalidSequence`，输入越过已累积单元，输出不变；
    ///   5. 累积到 [`MB_LEN_MAX`] 仍未完成时报告 `IncompleteSequence`。
    fn decode_one<'a, H>(
        encoding: &Execution<Self>,
        input: &'a [u8],
        output: &'a mut [char],
        handler: &mut H,
        state: &'a mut Self::DecodeState,
    ) -> DecodeResult<'a, Execution<Self>>
    where
        H: ErrorHandler<Execution<Self>> + ?Sized,
    {
        if input.is_empty() {
            return DecodeResult::new(input, output, state, EncodingError::Ok);
        }
        if output.is_empty() {
            return report_decode_error(
                encoding,
                handler,
                DecodeResult::new(input, output, state, EncodingError::InsufficientOutputSpace),
                &[],
            );
        }

        let (output, state) = if state.output_pending {
            match Self::drain(encoding, input, output, handler, state) {
                Ok(result) => return result,
                Err(parts) => parts,
            }
        } else {
            (output, state)
        };

        let runtime = &encoding.backend().runtime;
        let mut accumulated = [0u8; MB_LEN_MAX];
        let limit = input.len().min(MB_LEN_MAX);
        for count in 1..=limit {
            accumulated[count - 1] = input[count - 1];
            let rest = &input[count..];
            let mut preserved = state.narrow.clone();
            match runtime.mbrtoc32(&accumulated[..count], &mut preserved) {
                MbConversion::Incomplete if rest.is_empty() => {
                    return report_decode_error(
                        encoding,
                        handler,
                        DecodeResult::new(rest, output, state, EncodingError::IncompleteSequence),
                        &accumulated[..count],
                    );
                }
                MbConversion::Incomplete => {}
                MbConversion::Produced(code_point) => {
                    state.narrow = preserved;
                    return DecodeResult::new(rest, write_one(output, code_point), state, EncodingError::Ok);
                }
                MbConversion::ProducedWithPending(code_point) => {
                    state.narrow = preserved;
                    state.output_pending = true;
                    return DecodeResult::new(rest, write_one(output, code_point), state, EncodingError::Ok);
                }
                MbConversion::NullTerminator => {
                    state.narrow = preserved;
                    return DecodeResult::new(rest, write_one(output, '\0'), state, EncodingError::Ok);
                }
                MbConversion::Invalid => {
                    return report_decode_error(
                        encoding,
                        handler,
                        DecodeResult::new(rest, output, state, EncodingError::InvalidSequence),
                        &accumulated[..count],
                    );
                }
            }
        }

        report_decode_error(
            encoding,
            handler,
            DecodeResult::new(&input[limit..], output, state, EncodingError::IncompleteSequence),
            &accumulated[..limit],
        )
    }

    fn drain_pending<'a, H>(
        encoding: &Execution<Self>,
        output: &'a mut [char],
        handler: &mut H,
        state: &'a mut Self::DecodeState,
    ) -> DecodeResult<'a, Execution<Self>>
    where
        H: ErrorHandler<Execution<Self>> + ?Sized,
    {
        if !state.output_pending {
            return DecodeResult::new(&[], output, state, EncodingError::Ok);
        }
        if output.is_empty() {
            return report_decode_error(
                encoding,
                handler,
                DecodeResult::new(&[], output, state, EncodingError::InsufficientOutputSpace),
                &[],
            );
        }
        match Self::drain(encoding, &[], output, handler, state) {
            Ok(result) => result,
            Err((output, state)) => DecodeResult::new(&[], output, state, EncodingError::Ok),
        }
    }
}
