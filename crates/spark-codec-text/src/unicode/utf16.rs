//! UTF-16 辅助编码，即桥接平台宽字符 API 的中间编码。

use crate::encoding::{EmptyState, Encoding, write_one};
use crate::error::EncodingError;
use crate::handler::{ErrorHandler, report_decode_error, report_encode_error};
use crate::result::{DecodeResult, EncodeResult};

/// UTF-16（本机字节序码元）编码对象。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Utf16;

const fn is_lead_surrogate(unit: u16) -> bool {
    matches!(unit, 0xD800..=0xDBFF)
}

const fn is_trail_surrogate(unit: u16) -> bool {
    matches!(unit, 0xDC00..=0xDFFF)
}

impl Encoding for Utf16 {
    type CodeUnit = u16;
    type CodePoint = char;
    type EncodeState = EmptyState;
    type DecodeState = EmptyState;

    const MAX_CODE_UNITS: usize = 2;
    const MAX_CODE_POINTS: usize = 1;
    const IS_DECODE_INJECTIVE: bool = true;
    const IS_ENCODE_INJECTIVE: bool = true;

    fn name(&self) -> &str {
        "UTF-16"
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
        output: &'a mut [u16],
        handler: &mut H,
        state: &'a mut EmptyState,
    ) -> EncodeResult<'a, Self>
    where
        H: ErrorHandler<Self> + ?Sized,
    {
        let Some((&code_point, rest)) = input.split_first() else {
            return EncodeResult::new(input, output, state, EncodingError::Ok);
        };
        let mut staged = [0u16; 2];
        let encoded = code_point.encode_utf16(&mut staged);
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
        input: &'a [u16],
        output: &'a mut [char],
        handler: &mut H,
        state: &'a mut EmptyState,
    ) -> DecodeResult<'a, Self>
    where
        H: ErrorHandler<Self> + ?Sized,
    {
        let Some((&lead, rest)) = input.split_first() else {
            return DecodeResult::new(input, output, state, EncodingError::Ok);
        };
        if output.is_empty() {
            return report_decode_error(
                self,
                handler,
                DecodeResult::new(input, output, state, EncodingError::InsufficientOutputSpace),
                &[],
            );
        }
        if is_trail_surrogate(lead) {
            return report_decode_error(
                self,
                handler,
                DecodeResult::new(rest, output, state, EncodingError::InvalidSequence),
                &[lead],
            );
        }
        if !is_lead_surrogate(lead) {
            // 非代理码元必然是合法标量值。
            let code_point = char::from_u32(u32::from(lead)).unwrap_or_default();
            return DecodeResult::new(rest, write_one(output, code_point), state, EncodingError::Ok);
        }
        let Some((&trail, after)) = rest.split_first() else {
            return report_decode_error(
                self,
                handler,
                DecodeResult::new(rest, output, state, EncodingError::IncompleteSequence),
                &[lead],
            );
        };
        if !is_trail_surrogate(trail) {
            return report_decode_error(
                self,
                handler,
                DecodeResult::new(rest, output, state, EncodingError::InvalidSequence),
                &[lead],
            );
        }
        let value = 0x10000 + ((u32::from(lead) - 0xD800) << 10) + (u32::from(trail) - 0xDC00);
        match char::from_u32(value) {
            Some(code_point) => {
                DecodeResult::new(after, write_one(output, code_point), state, EncodingError::Ok)
            }
            None => report_decode_error(
                self,
                handler,
                DecodeResult::new(after, output, state, EncodingError::InvalidSequence),
                &[lead, trail],
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::PassThroughHandler;

    #[test]
    fn surrogate_pairs_roundtrip_through_one_call_each() {
        let mut state = EmptyState;
        let mut units = [0u16; 2];
        let encoded = Utf16.encode_one(&['😀'], &mut units, &mut PassThroughHandler, &mut state);
        assert!(encoded.is_ok());
        assert!(encoded.output.is_empty());
        assert_eq!(units, [0xD83D, 0xDE00]);

        let mut output = ['\0'; 1];
        let decoded = Utf16.decode_one(&units, &mut output, &mut PassThroughHandler, &mut state);
        assert!(decoded.is_ok());
        assert!(decoded.input.is_empty());
        assert_eq!(output[0], '😀');
    }

    #[test]
    fn lone_surrogates_are_classified() {
        let mut state = EmptyState;
        let mut output = ['\0'; 1];
        let lone_trail = Utf16.decode_one(&[0xDC00, 0x41], &mut output, &mut PassThroughHandler, &mut state);
        assert_eq!(lone_trail.error_code, EncodingError::InvalidSequence);
        assert_eq!(lone_trail.input, &[0x41]);

        let truncated = Utf16.decode_one(&[0xD800], &mut output, &mut PassThroughHandler, &mut state);
        assert_eq!(truncated.error_code, EncodingError::IncompleteSequence);

        let unpaired = Utf16.decode_one(&[0xD800, 0x41], &mut output, &mut PassThroughHandler, &mut state);
        assert_eq!(unpaired.error_code, EncodingError::InvalidSequence);
        assert_eq!(unpaired.input, &[0x41]);
    }
}
