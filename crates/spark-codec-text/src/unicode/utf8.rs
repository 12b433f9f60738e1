//! UTF-8 辅助编码。
//!
//! 作为代码页 65001 的直通路径与 `Utf8Locale` 运行时的底层扫描器使用。

use crate::encoding::{EmptyState, Encoding, write_one};
use crate::error::EncodingError;
use crate::handler::{ErrorHandler, report_decode_error, report_encode_error};
use crate::result::{DecodeResult, EncodeResult};

/// 前缀扫描结果。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Utf8Scan {
    /// 完整码点及其字节长度。
    Complete(char, usize),
    /// 目前为止是合法前缀，需要更多字节。
    Incomplete,
    /// 非法；携带构成最大非法子段的字节数。
    Invalid(usize),
}

/// 扫描 `bytes` 开头的一个 UTF-8 序列。
///
/// 遵循 Unicode 的“最大子段”规则：过长编码、代理区与超出 U+10FFFF 的序列在第二个字节处即被拒绝。
pub(crate) fn scan(bytes: &[u8]) -> Utf8Scan {
    let Some(&lead) = bytes.first() else {
        return Utf8Scan::Incomplete;
    };
    let (len, mut value) = match lead {
        0x00..=0x7F => return Utf8Scan::Complete(char::from(lead), 1),
        0xC2..=0xDF => (2, u32::from(lead & 0x1F)),
        0xE0..=0xEF => (3, u32::from(lead & 0x0F)),
        0xF0..=0xF4 => (4, u32::from(lead & 0x07)),
        _ => return Utf8Scan::Invalid(1),
    };
    for index in 1..len {
        let Some(&byte) = bytes.get(index) else {
            return Utf8Scan::Incomplete;
        };
        let (low, high) = match (index, lead) {
            (1, 0xE0) => (0xA0, 0xBF),
            (1, 0xED) => (0x80, 0x9F),
            (1, 0xF0) => (0x90, 0xBF),
            (1, 0xF4) => (0x80, 0x8F),
            _ => (0x80, 0xBF),
        };
        if !(low..=high).contains(&byte) {
            return Utf8Scan::Invalid(index);
        }
        value = (value << 6) | u32::from(byte & 0x3F);
    }
    match char::from_u32(value) {
        Some(code_point) => Utf8Scan::Complete(code_point, len),
        None => Utf8Scan::Invalid(len),
    }
}

/// UTF-8 编码对象。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Utf8;

impl Encoding for Utf8 {
    type CodeUnit = u8;
    type CodePoint = char;
    type EncodeState = EmptyState;
    type DecodeState = EmptyState;

    const MAX_CODE_UNITS: usize = 4;
    const MAX_CODE_POINTS: usize = 1;
    const IS_DECODE_INJECTIVE: bool = true;
    const IS_ENCODE_INJECTIVE: bool = true;

    fn name(&self) -> &str {
        "UTF-8"
    }

    fn encode_state(&self) -> EmptyState {
        EmptyState
    }

    fn decode_state(&self) -> EmptyState {
        EmptyState
    }

    fn encode_one<'a, H>(
        &self,
        input: &'a [char],
        output: &'a mut [u8],
        handler: &mut H,
        state: &'a mut EmptyState,
    ) -> EncodeResult<'a, Self>
    where
        H: ErrorHandler<Self> + ?Sized,
    {
        let Some((&code_point, rest)) = input.split_first() else {
            return EncodeResult::new(input, output, state, EncodingError::Ok);
        };
        let mut staged = [0u8; 4];
        let encoded = code_point.encode_utf8(&mut staged).as_bytes();
        if output.len() < encoded.len() {
            return report_encode_error(
                self,
                handler,
                EncodeResult::new(rest, output, state, EncodingError::InsufficientOutputSpace),
                &[code_point],
            );
        }
        let (head, tail) = output.split_at_mut(encoded.len());
        head.copy_from_slice(encoded);
        EncodeResult::new(rest, tail, state, EncodingError::Ok)
    }

    fn decode_one<'a, H>(
        &self,
        input: &'a [u8],
        output: &'a mut [char],
        handler: &mut H,
        state: &'a mut EmptyState,
    ) -> DecodeResult<'a, Self>
    where
        H: ErrorHandler<Self> + ?Sized,
    {
        if input.is_empty() {
            return DecodeResult::new(input, output, state, EncodingError::Ok);
        }
        if output.is_empty() {
            return report_decode_error(
                self,
                handler,
                DecodeResult::new(input, output, state, EncodingError::InsufficientOutputSpace),
                &[],
            );
        }
        match scan(input) {
            Utf8Scan::Complete(code_point, len) => DecodeResult::new(
                &input[len..],
                write_one(output, code_point),
                state,
                EncodingError::Ok,
            ),
            Utf8Scan::Incomplete => report_decode_error(
                self,
                handler,
                DecodeResult::new(
                    &input[input.len()..],
                    output,
                    state,
                    EncodingError::IncompleteSequence,
                ),
                input,
            ),
            Utf8Scan::Invalid(len) => report_decode_error(
                self,
                handler,
                DecodeResult::new(&input[len..], output, state, EncodingError::InvalidSequence),
                &input[..len],
            ),
        }
    }
}
