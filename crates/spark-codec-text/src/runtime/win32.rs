//! Windows 活动代码页（`GetACP`）的 Win32 绑定。

use core::ptr;

use crate::encoding::MB_LEN_MAX;
use crate::runtime::{CP_UTF8, CodePageError, NarrowConversion, WideCodePage};

const MB_ERR_INVALID_CHARS: u32 = 0x0000_0008;
const WC_ERR_INVALID_CHARS: u32 = 0x0000_0080;
const CP_GB18030: u32 = 54936;
const ERROR_INSUFFICIENT_BUFFER: u32 = 122;
const ERROR_NO_UNICODE_TRANSLATION: u32 = 1113;

#[repr(C)]
struct CpInfo {
    max_char_size: u32,
    default_char: [u8; 2],
    lead_byte: [u8; 12],
}

#[link(name = "kernel32")]
unsafe extern "system" {
    fn GetACP() -> u32;
    fn GetCPInfo(code_page: u32, info: *mut CpInfo) -> i32;
    fn GetLastError() -> u32;
    fn MultiByteToWideChar(
        code_page: u32,
        flags: u32,
        multi_byte: *const u8,
        multi_byte_len: i32,
        wide: *mut u16,
        wide_len: i32,
    ) -> i32;
    fn WideCharToMultiByte(
        code_page: u32,
        flags: u32,
        wide: *const u16,
        wide_len: i32,
        multi_byte: *mut u8,
        multi_byte_len: i32,
        default_char: *const u8,
        used_default_char: *mut i32,
    ) -> i32;
}

fn last_error() -> CodePageError {
    // SAFETY: 无参数的线程局部查询。
    match unsafe { GetLastError() } {
        ERROR_INSUFFICIENT_BUFFER => CodePageError::InsufficientBuffer,
        ERROR_NO_UNICODE_TRANSLATION => CodePageError::NoUnicodeTranslation,
        _ => CodePageError::Other,
    }
}

/// 窄化调用的标志位，以及是否允许传入默认字符指针。
///
/// UTF-8 与 GB18030 只接受 `WC_ERR_INVALID_CHARS`，且默认字符指针必须为空；
/// 其余代码页不接受该标志，由默认字符检测不可表示的字符。
fn narrow_flags(code_page: u32) -> (u32, bool) {
    if code_page == CP_UTF8 || code_page == CP_GB18030 {
        (WC_ERR_INVALID_CHARS, false)
    } else {
        (0, true)
    }
}

/// `CPINFO::LeadByte` 以成对的闭区间列出前导字节，遇到 `0, 0` 结束。
fn in_lead_byte_ranges(ranges: &[u8; 12], byte: u8) -> bool {
    ranges
        .chunks_exact(2)
        .take_while(|pair| pair[0] != 0 || pair[1] != 0)
        .any(|pair| (pair[0]..=pair[1]).contains(&byte))
}

fn len_i32(len: usize) -> Result<i32, CodePageError> {
    i32::try_from(len).map_err(|_| CodePageError::Other)
}

/// 构造时捕获的进程活动代码页。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActiveCodePage {
    code_page: u32,
    max_char_size: usize,
    default_char: u8,
    lead_bytes: [u8; 12],
}

impl ActiveCodePage {
    /// 读取当前活动代码页及其单字符最大字节数。
    pub fn current() -> Self {
        // SAFETY: 无参数查询。
        let code_page = unsafe { GetACP() };
        let mut info = CpInfo {
            max_char_size: 0,
            default_char: [0; 2],
            lead_byte: [0; 12],
        };
        // SAFETY: `info` 为本地可写结构，布局与 `CPINFO` 一致。
        let ok = unsafe { GetCPInfo(code_page, &mut info) } != 0;
        if !ok {
            return Self {
                code_page,
                max_char_size: MB_LEN_MAX,
                default_char: b'?',
                lead_bytes: [0; 12],
            };
        }
        let max_char_size = match info.max_char_size {
            0 => MB_LEN_MAX,
            size => (size as usize).min(MB_LEN_MAX),
        };
        Self {
            code_page,
            max_char_size,
            default_char: info.default_char[0],
            lead_bytes: info.lead_byte,
        }
    }

    /// 代码页自带的默认字符（`CPINFO::DefaultChar` 的首字节）。
    pub fn system_default_char(&self) -> u8 {
        self.default_char
    }

    /// `byte` 是否是双字节字符的前导字节；单字节代码页恒为 `false`。
    pub fn is_lead_byte(&self, byte: u8) -> bool {
        in_lead_byte_ranges(&self.lead_bytes, byte)
    }
}

impl Default for ActiveCodePage {
    fn default() -> Self {
        Self::current()
    }
}

impl WideCodePage for ActiveCodePage {
    fn code_page(&self) -> u32 {
        self.code_page
    }

    fn name(&self) -> &str {
        "active code page"
    }

    fn max_char_size(&self) -> usize {
        self.max_char_size
    }

    fn to_wide(&self, input: &[u8], output: &mut [u16]) -> Result<usize, CodePageError> {
        // SAFETY: 两个缓冲在调用期间有效，长度准确传入。
        let written = unsafe {
            MultiByteToWideChar(
                self.code_page,
                MB_ERR_INVALID_CHARS,
                input.as_ptr(),
                len_i32(input.len())?,
                output.as_mut_ptr(),
                len_i32(output.len())?,
            )
        };
        if written == 0 {
            return Err(last_error());
        }
        usize::try_from(written).map_err(|_| CodePageError::Other)
    }

    fn to_narrow(
        &self,
        input: &[u16],
        output: &mut [u8],
        default_char: u8,
    ) -> Result<NarrowConversion, CodePageError> {
        let default_chars = [default_char, 0];
        let mut used_default_char = 0i32;
        let (flags, accepts_default) = narrow_flags(self.code_page);
        let (default_ptr, used_ptr) = if accepts_default {
            (default_chars.as_ptr(), &mut used_default_char as *mut i32)
        } else {
            (ptr::null(), ptr::null_mut())
        };
        // SAFETY: 所有指针在调用期间有效，长度准确传入。
        let written = unsafe {
            WideCharToMultiByte(
                self.code_page,
                flags,
                input.as_ptr(),
                len_i32(input.len())?,
                output.as_mut_ptr(),
                len_i32(output.len())?,
                default_ptr,
                used_ptr,
            )
        };
        if written == 0 {
            return Err(last_error());
        }
        Ok(NarrowConversion {
            written: usize::try_from(written).map_err(|_| CodePageError::Other)?,
            used_default_char: used_default_char != 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_code_pages_reject_unpaired_surrogates_instead_of_substituting() {
        assert_eq!(narrow_flags(CP_UTF8), (WC_ERR_INVALID_CHARS, false));
        assert_eq!(narrow_flags(CP_GB18030), (WC_ERR_INVALID_CHARS, false));
        assert_eq!(narrow_flags(1252), (0, true));
        assert_eq!(narrow_flags(932), (0, true));
    }

    #[test]
    fn lead_byte_ranges_stop_at_the_terminating_pair() {
        let shift_jis = [0x81, 0x9F, 0xE0, 0xFC, 0, 0, 0, 0, 0, 0, 0, 0];
        assert!(in_lead_byte_ranges(&shift_jis, 0x81));
        assert!(in_lead_byte_ranges(&shift_jis, 0xFC));
        assert!(!in_lead_byte_ranges(&shift_jis, 0xA0));
        assert!(!in_lead_byte_ranges(&shift_jis, 0x00));
        assert!(!in_lead_byte_ranges(&[0; 12], 0x00));
    }

    #[test]
    fn active_code_page_reports_consistent_metadata() {
        let active = ActiveCodePage::current();
        assert!((1..=MB_LEN_MAX).contains(&active.max_char_size()));
        assert!(!active.is_lead_byte(b'A'));
        if active.max_char_size() == 1 {
            assert!((0u8..=0xFF).all(|byte| !active.is_lead_byte(byte)));
        }
        assert_ne!(active.system_default_char(), 0);
    }
}
