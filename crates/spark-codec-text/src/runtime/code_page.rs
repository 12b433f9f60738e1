//! 可移植的宽字符代码页实现。
//!
//! - [`Windows1252`]：严格的西欧代码页 1252，五个未定义字节拒绝转换；
//! - [`LocaleCodePage`]：把任意字节导向运行时包装成代码页 API，使桥接路径可以在任何平台上验证。

use core::char::decode_utf16;

use crate::encoding::MB_LEN_MAX;
use crate::runtime::{CodePageError, MbConversion, MultibyteRuntime, NarrowConversion, WideCodePage};

/// 0x80..=0x9F 区段；`0` 表示未定义。
const CP1252_HIGH_CONTROL: [u16; 32] = [
    0x20AC, 0x0000, 0x201A, 0x0192, 0x201E, 0x2026, 0x2020, 0x2021, //
    0x02C6, 0x2030, 0x0160, 0x2039, 0x0152, 0x0000, 0x017D, 0x0000, //
    0x0000, 0x2018, 0x2019, 0x201C, 0x201D, 0x2022, 0x2013, 0x2014, //
    0x02DC, 0x2122, 0x0161, 0x203A, 0x0153, 0x0000, 0x017E, 0x0178,
];

/// 代码页 1252（Windows 西欧）。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Windows1252;

impl Windows1252 {
    fn byte_to_unit(byte: u8) -> Option<u16> {
        match byte {
            0x80..=0x9F => match CP1252_HIGH_CONTROL[usize::from(byte - 0x80)] {
                0 => None,
                unit => Some(unit),
            },
            _ => Some(u16::from(byte)),
        }
    }

    fn char_to_byte(code_point: char) -> Option<u8> {
        let value = u32::from(code_point);
        if value < 0x80 || (0xA0..=0xFF).contains(&value) {
            return u8::try_from(value).ok();
        }
        CP1252_HIGH_CONTROL
            .iter()
            .position(|&unit| unit != 0 && u32::from(unit) == value)
            .and_then(|index| u8::try_from(0x80 + index).ok())
    }
}

impl WideCodePage for Windows1252 {
    fn code_page(&self) -> u32 {
        1252
    }

    fn name(&self) -> &str {
        "windows-1252"
    }

    fn max_char_size(&self) -> usize {
        1
    }

    fn to_wide(&self, input: &[u8], output: &mut [u16]) -> Result<usize, CodePageError> {
        if output.len() < input.len() {
            return Err(CodePageError::InsufficientBuffer);
        }
        for (slot, &byte) in output.iter_mut().zip(input) {
            *slot = Self::byte_to_unit(byte).ok_or(CodePageError::NoUnicodeTranslation)?;
        }
        Ok(input.len())
    }

    fn to_narrow(
        &self,
        input: &[u16],
        output: &mut [u8],
        default_char: u8,
    ) -> Result<NarrowConversion, CodePageError> {
        narrow_by(input, output, default_char, |code_point, staged| {
            let byte = Self::char_to_byte(code_point)?;
            staged[0] = byte;
            Some(1)
        })
    }
}

/// 以字节导向运行时实现的代码页。
///
/// # 教案式说明
/// - **意图 (Why)**：宽字符桥接路径只在 Windows 上有原生后端；把 [`MultibyteRuntime`] 包装成
///   [`WideCodePage`] 后，桥接逻辑可以在任何平台上用同一组区域设置验证；
/// - **契约 (What)**：
///   - 每次调用都从初始移位状态开始，不保存跨调用状态，与平台 API 一致；
///   - `to_wide` 要求输入完整合法，截断或非法都报告 `NoUnicodeTranslation`；
///   - `to_narrow` 对无法表示的码点（含未配对代理）写入 `default_char` 并置位 `used_default_char`；
/// - **风险 (Trade-offs)**：`max_char_size` 由调用方声明，声明值小于运行时真实最长序列时，桥接解码会提前放弃累积。
#[derive(Clone, Debug)]
pub struct LocaleCodePage<R> {
    runtime: R,
    code_page: u32,
    max_char_size: usize,
}

impl<R: MultibyteRuntime> LocaleCodePage<R> {
    /// 以代码页标识与单字符最大字节数包装运行时。
    pub fn new(runtime: R, code_page: u32, max_char_size: usize) -> Self {
        Self {
            runtime,
            code_page,
            max_char_size: max_char_size.clamp(1, MB_LEN_MAX),
        }
    }

    /// 被包装的运行时。
    pub fn runtime(&self) -> &R {
        &self.runtime
    }
}

impl<R: MultibyteRuntime> WideCodePage for LocaleCodePage<R> {
    fn code_page(&self) -> u32 {
        self.code_page
    }

    fn name(&self) -> &str {
        self.runtime.name()
    }

    fn max_char_size(&self) -> usize {
        self.max_char_size
    }

    fn to_wide(&self, input: &[u8], output: &mut [u16]) -> Result<usize, CodePageError> {
        let mut state = R::ShiftState::default();
        let mut written = 0;
        let mut start = 0;
        let mut end = 0;
        while start < input.len() {
            end += 1;
            if end > input.len() {
                return Err(CodePageError::NoUnicodeTranslation);
            }
            let mut attempt = state.clone();
            let mut pending = false;
            let code_point = match self.runtime.mbrtoc32(&input[start..end], &mut attempt) {
                MbConversion::Incomplete => continue,
                MbConversion::Invalid => return Err(CodePageError::NoUnicodeTranslation),
                MbConversion::NullTerminator => '\0',
                MbConversion::Produced(code_point) => code_point,
                MbConversion::ProducedWithPending(code_point) => {
                    pending = true;
                    code_point
                }
            };
            written += push_wide(code_point, &mut output[written..])?;
            while pending {
                match self.runtime.mbrtoc32(&[], &mut attempt) {
                    MbConversion::Produced(code_point) => {
                        written += push_wide(code_point, &mut output[written..])?;
                        pending = false;
                    }
                    MbConversion::ProducedWithPending(code_point) => {
                        written += push_wide(code_point, &mut output[written..])?;
                    }
                    MbConversion::Invalid => return Err(CodePageError::NoUnicodeTranslation),
                    MbConversion::Incomplete | MbConversion::NullTerminator => pending = false,
                }
            }
            state = attempt;
            start = end;
        }
        Ok(written)
    }

    fn to_narrow(
        &self,
        input: &[u16],
        output: &mut [u8],
        default_char: u8,
    ) -> Result<NarrowConversion, CodePageError> {
        let mut state = R::ShiftState::default();
        narrow_by(input, output, default_char, |code_point, staged| {
            let mut attempt = state.clone();
            let written = self.runtime.c32rtomb(code_point, staged, &mut attempt)?;
            state = attempt;
            Some(written)
        })
    }
}

fn push_wide(code_point: char, output: &mut [u16]) -> Result<usize, CodePageError> {
    let mut staged = [0u16; 2];
    let encoded = code_point.encode_utf16(&mut staged);
    let Some(target) = output.get_mut(..encoded.len()) else {
        return Err(CodePageError::InsufficientBuffer);
    };
    target.copy_from_slice(encoded);
    Ok(encoded.len())
}

/// `WideCharToMultiByte` 的公共骨架：逐码点调用 `map`，`None` 以默认字符替换。
fn narrow_by<F>(
    input: &[u16],
    output: &mut [u8],
    default_char: u8,
    mut map: F,
) -> Result<NarrowConversion, CodePageError>
where
    F: FnMut(char, &mut [u8; MB_LEN_MAX]) -> Option<usize>,
{
    let mut written = 0;
    let mut used_default_char = false;
    for decoded in decode_utf16(input.iter().copied()) {
        let mut staged = [0u8; MB_LEN_MAX];
        let len = match decoded.ok().and_then(|code_point| map(code_point, &mut staged)) {
            Some(len) => len,
            None => {
                used_default_char = true;
                staged[0] = default_char;
                1
            }
        };
        let Some(target) = output.get_mut(written..written + len) else {
            return Err(CodePageError::InsufficientBuffer);
        };
        target.copy_from_slice(&staged[..len]);
        written += len;
    }
    Ok(NarrowConversion {
        written,
        used_default_char,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Utf8Locale;

    #[test]
    fn cp1252_maps_high_controls_and_rejects_holes() {
        let mut wide = [0u16; 2];
        assert_eq!(Windows1252.to_wide(&[0x80, 0xE9], &mut wide), Ok(2));
        assert_eq!(wide, [0x20AC, 0x00E9]);
        assert_eq!(
            Windows1252.to_wide(&[0x81], &mut wide),
            Err(CodePageError::NoUnicodeTranslation)
        );

        let mut narrow = [0u8; 4];
        let converted = Windows1252.to_narrow(&[0x2122], &mut narrow, b'?');
        assert_eq!(
            converted,
            Ok(NarrowConversion {
                written: 1,
                used_default_char: false
            })
        );
        assert_eq!(narrow[0], 0x99);

        let fallback = Windows1252.to_narrow(&[0x4E2D], &mut narrow, b'?');
        assert_eq!(
            fallback,
            Ok(NarrowConversion {
                written: 1,
                used_default_char: true
            })
        );
        assert_eq!(narrow[0], b'?');
    }

    #[test]
    fn locale_code_page_requires_complete_input() {
        let page = LocaleCodePage::new(Utf8Locale, 54936, 4);
        let mut wide = [0u16; 4];
        assert_eq!(
            page.to_wide(&[0xE4, 0xB8], &mut wide),
            Err(CodePageError::NoUnicodeTranslation)
        );
        assert_eq!(page.to_wide(&[0xE4, 0xB8, 0xAD], &mut wide), Ok(1));
        assert_eq!(wide[0], 0x4E2D);
        assert_eq!(
            page.to_wide(&[0xF0, 0x9F, 0x98, 0x80], &mut wide[..1]),
            Err(CodePageError::InsufficientBuffer)
        );
    }

    #[test]
    fn locale_code_page_narrows_surrogate_pairs() {
        let page = LocaleCodePage::new(Utf8Locale, 54936, 4);
        let mut narrow = [0u8; 4];
        let converted = page.to_narrow(&[0xD83D, 0xDE00], &mut narrow, b'?');
        assert_eq!(converted.map(|c| c.written), Ok(4));
        assert_eq!(narrow, [0xF0, 0x9F, 0x98, 0x80]);
        assert_eq!(
            page.to_narrow(&[0xD83D, 0xDE00], &mut narrow[..2], b'?'),
            Err(CodePageError::InsufficientBuffer)
        );
    }
}
