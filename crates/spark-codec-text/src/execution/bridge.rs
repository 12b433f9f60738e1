//! 宽字符后端：经 UTF-16 桥接驱动以 16 位码元为中心的代码页 API。
//!
//! ## 执行逻辑（How）
//! - 编码：码点先经 [`Utf16`] 降为不超过 8 个宽码元，再交给 `to_narrow`；
//!   平台以默认字符替换时视为不可表示；
//! - 解码：逐个追加窄码元并尝试 `to_wide`，“无法转换”视为需要更多码元，直到达到代码页的单字符最大字节数；
//!   成功后经 [`Utf16`] 升为码点，桥接编码自身的失败原样转述；一次转换产生多个码点时，
//!   第一个立即写出，其余保存在 [`BridgeDecodeState`] 中，由后续调用或 `drain_pending` 排出；
//! - 代码页为 UTF-8（65001）时两个方向都直接走 [`Utf8`]，桥接编码记录下的问题单元以执行字符集身份重新报告。

use crate::encoding::{EmptyState, Encoding, MAX_CODE_POINTS, MB_LEN_MAX, REPLACEMENT_CODE_UNITS, write_one};
use crate::error::EncodingError;
use crate::execution::{Backend, Execution};
use crate::handler::progress::ProgressHandler;
use crate::handler::{ErrorHandler, PassThroughHandler, report_decode_error, report_encode_error};
use crate::result::{DecodeResult, EncodeResult};
use crate::runtime::{CP_UTF8, CodePageError, NarrowConversion, StatelessShift, WideCodePage};
use crate::unicode::{Utf8, Utf16};

const WIDE_INTERMEDIATE: usize = 8;
const WIDE_DECODED: usize = 2 * MAX_CODE_POINTS;
const PENDING_CAPACITY: usize = MAX_CODE_POINTS - 1;

/// 宽字符后端的解码状态。
///
/// 平台缓冲 API 本身不保存移位状态；这里只记录一次转换产生的、尚未写出的后续码点（逆序保存）。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BridgeDecodeState {
    pending: [char; PENDING_CAPACITY],
    pending_len: u8,
}

impl BridgeDecodeState {
    /// 是否没有待输出码点。
    pub fn is_initial(&self) -> bool {
        self.pending_len == 0
    }

    /// 上一次解码是否留下了待输出码点。
    pub fn has_pending_output(&self) -> bool {
        self.pending_len != 0
    }

    fn pop_pending(&mut self) -> Option<char> {
        let last = usize::from(self.pending_len).checked_sub(1)?;
        self.pending_len -= 1;
        Some(self.pending[last])
    }

    fn push_pending_reversed(&mut self, code_points: &[char]) {
        for (slot, &code_point) in self.pending.iter_mut().zip(code_points.iter().rev()) {
            *slot = code_point;
        }
        self.pending_len = code_points.len().min(PENDING_CAPACITY) as u8;
    }
}

/// 把一次 `to_wide` 的全部宽码元升为码点，返回码点数；任何一步失败都原样返回其分类码。
fn lift(wide: &[u16], lifted: &mut [char; MAX_CODE_POINTS]) -> Result<usize, EncodingError> {
    let mut remaining = wide;
    let mut count = 0;
    let mut scratch = EmptyState;
    while !remaining.is_empty() {
        if count == MAX_CODE_POINTS {
            return Err(EncodingError::InvalidSequence);
        }
        let step = Utf16.decode_one(remaining, &mut lifted[count..], &mut PassThroughHandler, &mut scratch);
        let (left, error_code) = (step.input.len(), step.error_code);
        if !error_code.is_ok() {
            return Err(error_code);
        }
        remaining = &remaining[remaining.len() - left..];
        count += 1;
    }
    Ok(count)
}

/// 驱动 [`WideCodePage`] 的执行字符集后端。
///
/// 平台缓冲 API 不保存跨调用状态，编码方向的状态为零尺寸的 [`StatelessShift`]；
/// 解码方向只需记住一对多转换中尚未写出的码点。
#[derive(Clone, Debug, Default)]
pub struct CodePageBridge<C> {
    code_page: C,
}

impl<C: WideCodePage> CodePageBridge<C> {
    /// 包装代码页。
    pub fn new(code_page: C) -> Self {
        Self { code_page }
    }

    /// 被驱动的代码页。
    pub fn code_page(&self) -> &C {
        &self.code_page
    }

    fn is_utf8(&self) -> bool {
        self.code_page.code_page() == CP_UTF8
    }
}

impl<C: WideCodePage> Backend for CodePageBridge<C> {
    type EncodeState = StatelessShift;
    type DecodeState = BridgeDecodeState;

    fn name(&self) -> &str {
        self.code_page.name()
    }

    fn encode_state(&self) -> StatelessShift {
        StatelessShift
    }

    fn decode_state(&self) -> BridgeDecodeState {
        BridgeDecodeState::default()
    }

    fn encode_one<'a, H>(
        encoding: &Execution<Self>,
        input: &'a [char],
        output: &'a mut [u8],
        handler: &mut H,
        state: &'a mut StatelessShift,
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

        let bridge = encoding.backend();
        if bridge.is_utf8() {
            let mut progress = ProgressHandler::<Utf8>::new();
            let mut scratch = EmptyState;
            let available = output.len();
            let inner = Utf8.encode_one(&input[..1], &mut *output, &mut progress, &mut scratch);
            let (consumed, written, error_code) =
                (1 - inner.input.len(), available - inner.output.len(), inner.error_code);
            let result = EncodeResult::new(
                &input[consumed..],
                &mut output[written..],
                state,
                error_code,
            );
            if error_code.is_ok() {
                return result;
            }
            return report_encode_error(encoding, handler, result, progress.code_points());
        }

        let mut wide = [0u16; WIDE_INTERMEDIATE];
        let mut wide_state = EmptyState;
        let lowered = Utf16.encode_one(&input[..1], &mut wide, &mut PassThroughHandler, &mut wide_state);
        let (wide_len, lowered_ok) = (WIDE_INTERMEDIATE - lowered.output.len(), lowered.is_ok());
        if !lowered_ok {
            return report_encode_error(
                encoding,
                handler,
                EncodeResult::new(rest, output, state, EncodingError::InvalidSequence),
                &[code_point],
            );
        }

        let mut staged = [0u8; MB_LEN_MAX];
        let len = match bridge
            .code_page
            .to_narrow(&wide[..wide_len], &mut staged, REPLACEMENT_CODE_UNITS[0])
        {
            Ok(NarrowConversion {
                used_default_char: false,
                written,
            }) => written,
            Ok(NarrowConversion { .. }) | Err(CodePageError::NoUnicodeTranslation | CodePageError::Other) => {
                return report_encode_error(
                    encoding,
                    handler,
                    EncodeResult::new(rest, output, state, EncodingError::InvalidSequence),
                    &[code_point],
                );
            }
            Err(CodePageError::InsufficientBuffer) => {
                return report_encode_error(
                    encoding,
                    handler,
                    EncodeResult::new(rest, output, state, EncodingError::InsufficientOutputSpace),
                    &[code_point],
                );
            }
        };

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

    fn decode_one<'a, H>(
        encoding: &Execution<Self>,
        input: &'a [u8],
        output: &'a mut [char],
        handler: &mut H,
        state: &'a mut BridgeDecodeState,
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
        if let Some(code_point) = state.pop_pending() {
            return DecodeResult::new(input, write_one(output, code_point), state, EncodingError::Ok);
        }

        let bridge = encoding.backend();
        if bridge.is_utf8() {
            let mut progress = ProgressHandler::<Utf8>::new();
            let mut scratch = EmptyState;
            let available = output.len();
            let inner = Utf8.decode_one(input, &mut *output, &mut progress, &mut scratch);
            let (consumed, written, error_code) = (
                input.len() - inner.input.len(),
                available - inner.output.len(),
                inner.error_code,
            );
            let result = DecodeResult::new(
                &input[consumed..],
                &mut output[written..],
                state,
                error_code,
            );
            if error_code.is_ok() {
                return result;
            }
            return report_decode_error(encoding, handler, result, progress.code_units());
        }

        let max_char_size = bridge.code_page.max_char_size().clamp(1, MB_LEN_MAX);
        let mut accumulated = [0u8; MB_LEN_MAX];
        for count in 1..=input.len().min(max_char_size) {
            accumulated[count - 1] = input[count - 1];
            let rest = &input[count..];
            let mut wide = [0u16; WIDE_DECODED];
            let wide_len = match bridge.code_page.to_wide(&accumulated[..count], &mut wide) {
                Ok(wide_len) => wide_len,
                Err(CodePageError::NoUnicodeTranslation) if count == max_char_size => {
                    return report_decode_error(
                        encoding,
                        handler,
                        DecodeResult::new(rest, output, state, EncodingError::InvalidSequence),
                        &accumulated[..count],
                    );
                }
                Err(CodePageError::NoUnicodeTranslation) if rest.is_empty() => {
                    return report_decode_error(
                        encoding,
                        handler,
                        DecodeResult::new(rest, output, state, EncodingError::IncompleteSequence),
                        &accumulated[..count],
                    );
                }
                Err(CodePageError::NoUnicodeTranslation) => continue,
                Err(CodePageError::InsufficientBuffer | CodePageError::Other) => {
                    return report_decode_error(
                        encoding,
                        handler,
                        DecodeResult::new(rest, output, state, EncodingError::InvalidSequence),
                        &accumulated[..count],
                    );
                }
            };

            let mut lifted_buffer = ['\0'; MAX_CODE_POINTS];
            let lifted = match lift(&wide[..wide_len], &mut lifted_buffer) {
                Ok(lifted_len) => &lifted_buffer[..lifted_len],
                Err(error_code) => {
                    return report_decode_error(
                        encoding,
                        handler,
                        DecodeResult::new(rest, output, state, error_code),
                        &accumulated[..count],
                    );
                }
            };
            let Some((&first, later)) = lifted.split_first() else {
                return report_decode_error(
                    encoding,
                    handler,
                    DecodeResult::new(rest, output, state, EncodingError::InvalidSequence),
                    &accumulated[..count],
                );
            };
            state.push_pending_reversed(later);
            return DecodeResult::new(rest, write_one(output, first), state, EncodingError::Ok);
        }

        // 循环只会在 `count == max_char_size` 或输入耗尽时结束，两者都已在循环内返回。
        report_decode_error(
            encoding,
            handler,
            DecodeResult::new(&input[input.len()..], output, state, EncodingError::IncompleteSequence),
            &accumulated[..input.len().min(max_char_size)],
        )
    }

    fn drain_pending<'a, H>(
        encoding: &Execution<Self>,
        output: &'a mut [char],
        handler: &mut H,
        state: &'a mut BridgeDecodeState,
    ) -> DecodeResult<'a, Execution<Self>>
    where
        H: ErrorHandler<Execution<Self>> + ?Sized,
    {
        if !state.has_pending_output() {
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
        match state.pop_pending() {
            Some(code_point) => DecodeResult::new(&[], write_one(output, code_point), state, EncodingError::Ok),
            None => DecodeResult::new(&[], output, state, EncodingError::Ok),
        }
    }
}
