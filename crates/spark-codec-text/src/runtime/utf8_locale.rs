use crate::encoding::MB_LEN_MAX;
use crate::runtime::{MbConversion, MultibyteRuntime, StatelessShift};
use crate::unicode::utf8::{Utf8Scan, scan};

/// `C.UTF-8` 区域设置：无移位的多字节编码，最长 4 字节。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Utf8Locale;

impl MultibyteRuntime for Utf8Locale {
    type ShiftState = StatelessShift;

    fn name(&self) -> &str {
        "C.UTF-8"
    }

    fn mbrtoc32(&self, input: &[u8], _state: &mut StatelessShift) -> MbConversion {
        if input.is_empty() {
            return MbConversion::Incomplete;
        }
        match scan(input) {
            Utf8Scan::Complete('\0', _) => MbConversion::NullTerminator,
            Utf8Scan::Complete(code_point, _) => MbConversion::Produced(code_point),
            Utf8Scan::Incomplete => MbConversion::Incomplete,
            Utf8Scan::Invalid(_) => MbConversion::Invalid,
        }
    }

    fn c32rtomb(
        &self,
        code_point: char,
        output: &mut [u8; MB_LEN_MAX],
        _state: &mut StatelessShift,
    ) -> Option<usize> {
        Some(code_point.encode_utf8(output).len())
    }
}
