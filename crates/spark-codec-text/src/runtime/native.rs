//! unix 平台 C 运行时的 `mbrtoc32`/`c32rtomb` 绑定。
//!
//! ## 契约（What）
//! - 当前进程 `LC_CTYPE` 决定编码；本模块从不调用 `setlocale`，由宿主程序负责；
//! - `mbstate_t` 的布局因 libc 而异，这里以 128 字节、8 字节对齐的不透明块承载，足以容纳 glibc 与 musl 的定义；
//! - 返回值映射：`0` → NUL，`(size_t)-1` → 非法，`(size_t)-2` → 不完整，`(size_t)-3` → 来自状态的待输出码点。
//!
//! ## 风险（Trade-offs）
//! - glibc 的 `mbrtoc32` 不会返回 `-3`；待输出探测在这些平台上总是得到“无待输出”，行为退化为普通多字节解码。

use core::fmt;

use libc::{c_char, c_int, size_t};

use crate::encoding::MB_LEN_MAX;
use crate::runtime::{MbConversion, MultibyteRuntime, ShiftState};

const CONVERSION_INVALID: size_t = size_t::MAX;
const CONVERSION_INCOMPLETE: size_t = size_t::MAX - 1;
const CONVERSION_PENDING: size_t = size_t::MAX - 2;

unsafe extern "C" {
    fn mbrtoc32(pc32: *mut u32, s: *const c_char, n: size_t, ps: *mut NativeShiftState) -> size_t;
    fn c32rtomb(s: *mut c_char, c32: u32, ps: *mut NativeShiftState) -> size_t;
    fn mbsinit(ps: *const NativeShiftState) -> c_int;
}

/// 平台 `mbstate_t` 的不透明承载体。
#[derive(Clone, Copy)]
#[repr(C, align(8))]
pub struct NativeShiftState([u8; 128]);

impl Default for NativeShiftState {
    fn default() -> Self {
        Self([0; 128])
    }
}

impl fmt::Debug for NativeShiftState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeShiftState")
            .field("initial", &self.is_initial())
            .finish()
    }
}

impl ShiftState for NativeShiftState {
    fn is_initial(&self) -> bool {
        // SAFETY: 全零或经 libc 修改过的 `mbstate_t` 均为合法输入，指针在调用期间有效。
        unsafe { mbsinit(self) != 0 }
    }
}

/// 由当前进程区域设置驱动的字节导向运行时。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NativeRuntime;

impl NativeRuntime {
    fn convert(input: &[u8], state: &mut NativeShiftState) -> (size_t, u32) {
        let mut code_point = 0u32;
        // SAFETY: `input` 在调用期间有效且长度准确传入，`state` 为独占借用，输出为本地变量。
        let rc = unsafe {
            mbrtoc32(
                &mut code_point,
                input.as_ptr().cast::<c_char>(),
                input.len(),
                state,
            )
        };
        (rc, code_point)
    }

    /// 用 NUL 探测状态副本中是否仍有待输出码点。
    fn has_pending(state: &NativeShiftState) -> bool {
        let mut scratch = *state;
        Self::convert(&[0], &mut scratch).0 == CONVERSION_PENDING
    }

    fn classify(rc: size_t, code_point: u32, state: &NativeShiftState) -> MbConversion {
        match rc {
            0 => MbConversion::NullTerminator,
            CONVERSION_INVALID => MbConversion::Invalid,
            CONVERSION_INCOMPLETE => MbConversion::Incomplete,
            _ => match char::from_u32(code_point) {
                Some(code_point) if Self::has_pending(state) => {
                    MbConversion::ProducedWithPending(code_point)
                }
                Some(code_point) => MbConversion::Produced(code_point),
                None => MbConversion::Invalid,
            },
        }
    }
}

impl MultibyteRuntime for NativeRuntime {
    type ShiftState = NativeShiftState;

    fn name(&self) -> &str {
        "native"
    }

    fn mbrtoc32(&self, input: &[u8], state: &mut NativeShiftState) -> MbConversion {
        if input.is_empty() {
            let mut drained = *state;
            let (rc, code_point) = Self::convert(&[0], &mut drained);
            if rc != CONVERSION_PENDING {
                return MbConversion::Incomplete;
            }
            *state = drained;
            return Self::classify(rc, code_point, state);
        }
        let (rc, code_point) = Self::convert(input, state);
        Self::classify(rc, code_point, state)
    }

    fn c32rtomb(
        &self,
        code_point: char,
        output: &mut [u8; MB_LEN_MAX],
        state: &mut NativeShiftState,
    ) -> Option<usize> {
        // SAFETY: glibc/musl 的 `MB_CUR_MAX` 不超过 `MB_LEN_MAX`（16），输出缓冲足够容纳单次写入。
        let rc = unsafe {
            c32rtomb(
                output.as_mut_ptr().cast::<c_char>(),
                u32::from(code_point),
                state,
            )
        };
        (rc != CONVERSION_INVALID).then_some(rc.min(MB_LEN_MAX))
    }
}
