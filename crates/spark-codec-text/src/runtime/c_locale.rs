use crate::encoding::MB_LEN_MAX;
use crate::runtime::{MbConversion, MultibyteRuntime, ShiftState};

/// 无移位的区域设置使用的零尺寸状态。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatelessShift;

impl ShiftState for StatelessShift {
    fn is_initial(&self) -> bool {
        true
    }
}

/// 严格的 `"C"`/POSIX 区域设置：仅 0x00..=0x7F 有效，对应 ASCII。
///
/// 高位字节一律视为非法，是验证错误路径最直接的区域设置。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CLocale;

impl MultibyteRuntime for CLocale {
    type ShiftState = StatelessShift;

    fn name(&self) -> &str {
        "C"
    }

    fn mbrtoc32(&self, input: &[u8], _state: &mut StatelessShift) -> MbConversion {
        match input.first() {
            None => MbConversion::Incomplete,
            Some(0) => MbConversion::NullTerminator,
            Some(&byte) if byte.is_ascii() => MbConversion::Produced(char::from(byte)),
            Some(_) => MbConversion::Invalid,
        }
    }

    fn c32rtomb(
        &self,
        code_point: char,
        output: &mut [u8; MB_LEN_MAX],
        _state: &mut StatelessShift,
    ) -> Option<usize> {
        if !code_point.is_ascii() {
            return None;
        }
        output[0] = code_point as u8;
        Some(1)
    }
}
