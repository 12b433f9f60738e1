//! 集成测试共享的循环辅助与记录型处理器。
//!
//! 单元原语每次只转换一个码点，测试需要一个“整段缓冲”循环来验证往返与错误位置；
//! 这里的循环刻意保持最朴素的形态：每次调用后按结果视图推进，失败即停。

#![allow(dead_code)]

use spark_codec_text::{
    Backend, DecodeResult, EncodeResult, Encoding, EncodingError, ErrorHandler, Execution,
    MB_LEN_MAX, Multibyte, TableLocale,
};

/// 失败时的分类码与失败前已消费的输入单元数。
pub type Failure = (EncodingError, usize);

/// 逐单元解码整段输入，输入耗尽后排出全部待输出码点。
pub fn decode_all<B, H>(encoding: &Execution<B>, bytes: &[u8], handler: &mut H) -> Result<Vec<char>, Failure>
where
    B: Backend,
    H: ErrorHandler<Execution<B>>,
{
    let mut state = encoding.decode_state();
    let mut decoded = Vec::new();
    let mut offset = 0;
    while offset < bytes.len() {
        let mut slot = ['\0'; 1];
        let input = &bytes[offset..];
        let result = encoding.decode_one(input, &mut slot, handler, &mut state);
        let (consumed, written, error_code) =
            (input.len() - result.input.len(), 1 - result.output.len(), result.error_code);
        if !error_code.is_ok() {
            return Err((error_code, offset));
        }
        assert!(consumed + written > 0, "decode_one made no progress at offset {offset}");
        decoded.extend_from_slice(&slot[..written]);
        offset += consumed;
    }
    loop {
        let mut slot = ['\0'; 1];
        let result = encoding.drain_pending(&mut slot, handler, &mut state);
        let (written, error_code) = (1 - result.output.len(), result.error_code);
        if !error_code.is_ok() {
            return Err((error_code, offset));
        }
        if written == 0 {
            return Ok(decoded);
        }
        decoded.push(slot[0]);
    }
}

/// 逐码点编码整段输入。
pub fn encode_all<B, H>(encoding: &Execution<B>, text: &[char], handler: &mut H) -> Result<Vec<u8>, Failure>
where
    B: Backend,
    H: ErrorHandler<Execution<B>>,
{
    let mut state = encoding.encode_state();
    let mut encoded = Vec::new();
    let mut offset = 0;
    while offset < text.len() {
        let mut chunk = [0u8; MB_LEN_MAX];
        let input = &text[offset..];
        let result = encoding.encode_one(input, &mut chunk, handler, &mut state);
        let (consumed, written, error_code) = (
            input.len() - result.input.len(),
            MB_LEN_MAX - result.output.len(),
            result.error_code,
        );
        if !error_code.is_ok() {
            return Err((error_code, offset));
        }
        encoded.extend_from_slice(&chunk[..written]);
        offset += consumed;
    }
    Ok(encoded)
}

/// 记录每次调用的分类码与问题单元，然后交给内层处理器。
#[derive(Debug, Default)]
pub struct RecordingHandler<H> {
    pub inner: H,
    pub encode_calls: Vec<(EncodingError, Vec<char>)>,
    pub decode_calls: Vec<(EncodingError, Vec<u8>)>,
}

impl<H> RecordingHandler<H> {
    pub fn new(inner: H) -> Self {
        Self {
            inner,
            encode_calls: Vec::new(),
            decode_calls: Vec::new(),
        }
    }
}

impl<E, H> ErrorHandler<E> for RecordingHandler<H>
where
    E: Encoding<CodeUnit = u8, CodePoint = char>,
    H: ErrorHandler<E>,
{
    fn handle_encode_error<'a>(
        &mut self,
        encoding: &E,
        result: EncodeResult<'a, E>,
        progress: &[char],
    ) -> EncodeResult<'a, E> {
        self.encode_calls.push((result.error_code, progress.to_vec()));
        self.inner.handle_encode_error(encoding, result, progress)
    }

    fn handle_decode_error<'a>(
        &mut self,
        encoding: &E,
        result: DecodeResult<'a, E>,
        progress: &[u8],
    ) -> DecodeResult<'a, E> {
        self.decode_calls.push((result.error_code, progress.to_vec()));
        self.inner.handle_decode_error(encoding, result, progress)
    }
}

pub fn iso2022() -> Execution<Multibyte<TableLocale>> {
    Execution::with_runtime(TableLocale::iso2022_latin1().expect("bundled table compiles"))
}

pub fn hkscs() -> Execution<Multibyte<TableLocale>> {
    Execution::with_runtime(TableLocale::hkscs_compositions().expect("bundled table compiles"))
}
