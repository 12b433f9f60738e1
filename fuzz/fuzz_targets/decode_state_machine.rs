#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use spark_codec_text::{
    AssumeValidHandler, Backend, CLocale, Encoding, EncodingError, Execution, MB_LEN_MAX,
    PassThroughHandler, ReplacementHandler, TableLocale, Utf8Locale, Windows1252,
};

/// Fuzz 输入：一段任意字节流，按调用方给出的输出窗口与处理器逐单元解码。
///
/// - **Why**：移位状态、待输出码点与处理器协议交织，是单元原语最容易出现“卡住不前进”或越界写出的位置；
/// - **How**：`windows` 给出每次调用的输出容量（含 0），`policy` 选择处理器，`locale` 选择后端；
/// - **What**：任何输入都不得 panic，单次调用消费不超过 `MB_LEN_MAX`、写出不超过一个码点，
///   且在输出容量非零时必然前进或报告非空间类错误。
#[derive(Debug, Arbitrary)]
struct DecodeCase {
    locale: u8,
    policy: u8,
    windows: Vec<u8>,
    bytes: Vec<u8>,
}

fuzz_target!(|case: DecodeCase| {
    match case.locale % 5 {
        0 => run(&Execution::with_runtime(CLocale), &case),
        1 => run(&Execution::with_runtime(Utf8Locale), &case),
        2 => {
            if let Ok(table) = TableLocale::iso2022_latin1() {
                run(&Execution::with_runtime(table), &case);
            }
        }
        3 => {
            if let Ok(table) = TableLocale::hkscs_compositions() {
                run(&Execution::with_runtime(table), &case);
            }
        }
        _ => run(&Execution::with_code_page(Windows1252), &case),
    }
});

fn run<B: Backend>(encoding: &Execution<B>, case: &DecodeCase) {
    let mut state = encoding.decode_state();
    let mut remaining = case.bytes.as_slice();
    let mut windows = case.windows.iter().cycle();
    let mut stalls = 0;
    while !remaining.is_empty() && stalls < 4 {
        let capacity = windows.next().map_or(1, |window| usize::from(*window % 3));
        let mut output = ['\0'; 2];
        let slot = &mut output[..capacity];
        let (consumed, written, error_code) = match case.policy % 3 {
            0 => step(encoding, remaining, slot, &mut AssumeValidHandler, &mut state),
            1 => step(encoding, remaining, slot, &mut PassThroughHandler, &mut state),
            _ => step(encoding, remaining, slot, &mut ReplacementHandler, &mut state),
        };
        assert!(consumed <= MB_LEN_MAX);
        assert!(written <= 1);
        if capacity > 0 && error_code.is_ok() {
            assert!(consumed + written > 0, "decode_one stalled on {remaining:?}");
        }
        if capacity == 0 && error_code != EncodingError::Ok {
            assert_eq!(consumed, 0);
        }
        stalls = if consumed == 0 { stalls + 1 } else { 0 };
        remaining = &remaining[consumed..];
    }
}

fn step<B, H>(
    encoding: &Execution<B>,
    input: &[u8],
    output: &mut [char],
    handler: &mut H,
    state: &mut B::DecodeState,
) -> (usize, usize, EncodingError)
where
    B: Backend,
    H: spark_codec_text::ErrorHandler<Execution<B>>,
{
    let capacity = output.len();
    let result = encoding.decode_one(input, output, handler, state);
    (
        input.len() - result.input.len(),
        capacity - result.output.len(),
        result.error_code,
    )
}
