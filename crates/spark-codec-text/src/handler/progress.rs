//! 中间编码的问题单元捕获器。
//!
//! 桥接路径先用 UTF-8/UTF-16 辅助编码完成一半转换；辅助编码失败时，外层需要把同一批问题单元
//! 以执行字符集的身份重新报告给调用方处理器。`ProgressHandler` 就是这个“记录员”：它被调用时
//! 只复制问题单元，然后原样返回失败结果。

use crate::encoding::{Encoding, MB_LEN_MAX};
use crate::handler::ErrorHandler;
use crate::result::{DecodeResult, EncodeResult};

const CAPACITY: usize = MB_LEN_MAX;

pub(crate) struct ProgressHandler<E: Encoding> {
    code_points: [E::CodePoint; CAPACITY],
    code_points_len: usize,
    code_units: [E::CodeUnit; CAPACITY],
    code_units_len: usize,
}

impl<E: Encoding> ProgressHandler<E> {
    pub(crate) fn new() -> Self {
        Self {
            code_points: [E::CodePoint::default(); CAPACITY],
            code_points_len: 0,
            code_units: [E::CodeUnit::default(); CAPACITY],
            code_units_len: 0,
        }
    }

    /// 最近一次编码失败的问题码点。
    pub(crate) fn code_points(&self) -> &[E::CodePoint] {
        &self.code_points[..self.code_points_len]
    }

    /// 最近一次解码失败的问题码元。
    pub(crate) fn code_units(&self) -> &[E::CodeUnit] {
        &self.code_units[..self.code_units_len]
    }
}

impl<E: Encoding> ErrorHandler<E> for ProgressHandler<E> {
    fn handle_encode_error<'a>(
        &mut self,
        _encoding: &E,
        result: EncodeResult<'a, E>,
        progress: &[E::CodePoint],
    ) -> EncodeResult<'a, E> {
        let len = progress.len().min(CAPACITY);
        self.code_points[..len].copy_from_slice(&progress[..len]);
        self.code_points_len = len;
        result
    }

    fn handle_decode_error<'a>(
        &mut self,
        _encoding: &E,
        result: DecodeResult<'a, E>,
        progress: &[E::CodeUnit],
    ) -> DecodeResult<'a, E> {
        let len = progress.len().min(CAPACITY);
        self.code_units[..len].copy_from_slice(&progress[..len]);
        self.code_units_len = len;
        result
    }
}
