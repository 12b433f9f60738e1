//! 内置错误处理策略。
//!
//! - [`AssumeValidHandler`]：编译期可忽略标记，原语不会调用它；
//! - [`PassThroughHandler`]：原样返回失败结果；
//! - [`ReplacementHandler`]：写入替换内容后以 `Ok` 继续。

use core::mem;

use crate::encoding::{Encoding, REPLACEMENT_CHARACTER};
use crate::error::EncodingError;
use crate::handler::ErrorHandler;
use crate::result::{DecodeResult, EncodeResult};

static REPLACEMENT_CODE_POINTS: [char; 1] = [REPLACEMENT_CHARACTER];

/// 可忽略处理器：声明调用方确信输入合法，或愿意丢弃失败。
///
/// # 教案式说明
/// - **意图 (Why)**：让不关心错误的调用方获得零开销路径，处理器分支在单态化后被消除；
/// - **契约 (What)**：失败时原语直接返回分类码，视图只前移到已确认安全的位置，不生成任何恢复内容；
/// - **风险 (Trade-offs)**：若错误确实发生，替换信息会丢失，调用方需自行检查 `error_code`。
#[derive(Clone, Copy, Debug, Default)]
pub struct AssumeValidHandler;

impl<E: Encoding> ErrorHandler<E> for AssumeValidHandler {
    const IGNORABLE: bool = true;

    fn handle_encode_error<'a>(
        &mut self,
        _encoding: &E,
        result: EncodeResult<'a, E>,
        _progress: &[E::CodePoint],
    ) -> EncodeResult<'a, E> {
        result
    }

    fn handle_decode_error<'a>(
        &mut self,
        _encoding: &E,
        result: DecodeResult<'a, E>,
        _progress: &[E::CodeUnit],
    ) -> DecodeResult<'a, E> {
        result
    }
}

/// 透传处理器：被调用但不做任何修复，错误码原样返回给调用方。
#[derive(Clone, Copy, Debug, Default)]
pub struct PassThroughHandler;

impl<E: Encoding> ErrorHandler<E> for PassThroughHandler {
    fn handle_encode_error<'a>(
        &mut self,
        _encoding: &E,
        result: EncodeResult<'a, E>,
        _progress: &[E::CodePoint],
    ) -> EncodeResult<'a, E> {
        result
    }

    fn handle_decode_error<'a>(
        &mut self,
        _encoding: &E,
        result: DecodeResult<'a, E>,
        _progress: &[E::CodeUnit],
    ) -> DecodeResult<'a, E> {
        result
    }
}

/// 替换处理器：写入替换内容后以 `Ok` 继续。
///
/// # 教案式说明
/// - **意图 (Why)**：默认恢复策略，保证流式转换在遇到坏数据时仍能前进；
/// - **执行逻辑 (How)**：
///   1. `InsufficientOutputSpace` 无法通过替换修复，原样返回；
///   2. 编码方向优先写入 [`Encoding::replacement_code_units`]，否则用透传处理器编码
///      [`Encoding::replacement_code_points`] 或 U+FFFD；
///   3. 解码方向写入 [`Encoding::replacement_code_points`] 或 U+FFFD；
///   4. 替换成功后错误码改写为 `Ok`，`handled_errors` 加一；
/// - **契约 (What)**：输入视图保持原语给出的失败点，替换内容追加在输出已写入部分之后；
///   输出放不下替换内容时返回 `InsufficientOutputSpace`。
#[derive(Clone, Copy, Debug, Default)]
pub struct ReplacementHandler;

impl<E> ErrorHandler<E> for ReplacementHandler
where
    E: Encoding<CodePoint = char>,
{
    fn handle_encode_error<'a>(
        &mut self,
        encoding: &E,
        mut result: EncodeResult<'a, E>,
        _progress: &[E::CodePoint],
    ) -> EncodeResult<'a, E> {
        if result.error_code == EncodingError::InsufficientOutputSpace {
            return result;
        }

        if let Some(units) = encoding.replacement_code_units() {
            if result.output.len() < units.len() {
                result.error_code = EncodingError::InsufficientOutputSpace;
                return result;
            }
            let (head, tail) = mem::take(&mut result.output).split_at_mut(units.len());
            head.copy_from_slice(units);
            result.output = tail;
            result.error_code = EncodingError::Ok;
            result.handled_errors += 1;
            return result;
        }

        let points: &'static [char] = encoding
            .replacement_code_points()
            .unwrap_or(&REPLACEMENT_CODE_POINTS);
        let EncodeResult {
            input,
            output,
            state,
            error_code,
            handled_errors,
        } = result;
        let replaced = encoding.encode_one(points, output, &mut PassThroughHandler, state);
        let error_code = if replaced.is_ok() {
            EncodingError::Ok
        } else {
            error_code
        };
        EncodeResult {
            input,
            output: replaced.output,
            state: replaced.state,
            error_code,
            handled_errors: handled_errors + usize::from(error_code.is_ok()),
        }
    }

    fn handle_decode_error<'a>(
        &mut self,
        encoding: &E,
        mut result: DecodeResult<'a, E>,
        _progress: &[E::CodeUnit],
    ) -> DecodeResult<'a, E> {
        if result.error_code == EncodingError::InsufficientOutputSpace {
            return result;
        }

        let points: &'static [char] = encoding
            .replacement_code_points()
            .unwrap_or(&REPLACEMENT_CODE_POINTS);
        if result.output.len() < points.len() {
            result.error_code = EncodingError::InsufficientOutputSpace;
            return result;
        }
        let (head, tail) = mem::take(&mut result.output).split_at_mut(points.len());
        head.copy_from_slice(points);
        result.output = tail;
        result.error_code = EncodingError::Ok;
        result.handled_errors += 1;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unicode::{Utf8, Utf16};

    #[test]
    fn replacement_fills_decode_output_with_fffd() {
        let mut state = Utf8.decode_state();
        let mut output = ['\0'; 2];
        let input = [0xFFu8, b'a'];
        let result = Utf8.decode_one(&input, &mut output, &mut ReplacementHandler, &mut state);
        assert_eq!(result.error_code, EncodingError::Ok);
        assert_eq!(result.handled_errors, 1);
        assert_eq!(result.input, &[b'a']);
        assert_eq!(result.output.len(), 1);
        assert_eq!(output[0], REPLACEMENT_CHARACTER);
    }

    #[test]
    fn replacement_encodes_fffd_when_no_code_units_are_published() {
        let mut state = Utf16.encode_state();
        let mut output = [0u16; 2];
        let input = ['x'];
        let mut result = EncodeResult::<Utf16>::new(
            &input,
            &mut output,
            &mut state,
            EncodingError::InvalidSequence,
        );
        result = ReplacementHandler.handle_encode_error(&Utf16, result, &['x']);
        assert_eq!(result.error_code, EncodingError::Ok);
        assert_eq!(result.output.len(), 1);
        assert_eq!(output[0], 0xFFFD);
    }

    #[test]
    fn insufficient_space_is_never_masked() {
        let mut state = Utf8.decode_state();
        let mut output: [char; 0] = [];
        let input = [b'a'];
        let result = Utf8.decode_one(&input, &mut output, &mut ReplacementHandler, &mut state);
        assert_eq!(result.error_code, EncodingError::InsufficientOutputSpace);
        assert_eq!(result.handled_errors, 0);
        assert_eq!(result.input, &[b'a']);
    }

    #[test]
    fn replacement_prefers_published_code_units() {
        let encoding = crate::execution::Execution::with_runtime(crate::runtime::CLocale);
        let mut state = encoding.encode_state();
        let mut output = [0u8; 2];
        let input = ['é', 'a'];
        let result = encoding.encode_one(&input, &mut output, &mut ReplacementHandler, &mut state);
        assert_eq!(result.error_code, EncodingError::Ok);
        assert_eq!(result.handled_errors, 1);
        assert_eq!(result.input, &['a']);
        assert_eq!(result.output.len(), 1);
        assert_eq!(output[0], b'?');
    }
}
