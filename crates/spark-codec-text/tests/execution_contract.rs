//! 执行字符集单元原语的契约测试。
//!
//! # 教案级注释概览
//!
//! - **核心目标 (Why)**：以可复现的区域设置（严格 `"C"`、`C.UTF-8`、表驱动的 ISO-2022 与 HKSCS 片段）
//!   逐条验证单元原语对调用方承诺的行为：位置推进、错误分类、处理器协议与移位状态的生命周期；
//! - **结构 (How)**：每个测试只构造一个编码对象与一个状态，直接调用 `encode_one`/`decode_one`，
//!   整段循环只在往返类测试中通过 `common` 辅助函数使用；
//! - **合同 (What)**：失败时结果视图只前移到失败点；处理器看到的问题单元与视图一致；处理器的返回值即调用结果。

mod common;

use common::{RecordingHandler, decode_all, encode_all, hkscs, iso2022};
use spark_codec_text::{
    AssumeValidHandler, CLocale, Encoding, EncodingError, Execution, MB_LEN_MAX, PassThroughHandler,
    REPLACEMENT_CHARACTER, ReplacementHandler, Utf8Locale,
};

#[test]
fn decoding_a_single_ascii_byte_in_the_c_locale() {
    let encoding = Execution::with_runtime(CLocale);
    let mut state = encoding.decode_state();
    let mut output = ['\0'; 2];
    let result = encoding.decode_one(b"A", &mut output, &mut PassThroughHandler, &mut state);
    assert_eq!(result.error_code, EncodingError::Ok);
    assert!(result.input.is_empty());
    assert_eq!(result.output.len(), 1);
    assert_eq!(output[0], 'A');
}

#[test]
fn primed_states_report_shift_initial() {
    let encoding = iso2022();
    assert!(encoding.encode_state().is_initial());
    let state = encoding.decode_state();
    assert!(state.is_initial());
    assert!(!state.has_pending_output());
}

#[test]
fn empty_input_is_trivially_ok_in_every_state() {
    let encoding = hkscs();
    let mut state = encoding.decode_state();
    let mut output = ['\0'; 1];
    let _ = encoding.decode_one(&[0x88, 0x62], &mut output, &mut PassThroughHandler, &mut state);
    assert!(state.has_pending_output());

    let mut no_room: [char; 0] = [];
    let result = encoding.decode_one(&[], &mut no_room, &mut PassThroughHandler, &mut state);
    assert_eq!(result.error_code, EncodingError::Ok);
    assert!(result.state.has_pending_output(), "empty input never drains");

    let mut encode_state = encoding.encode_state();
    let mut no_bytes: [u8; 0] = [];
    let encoded = encoding.encode_one(&[], &mut no_bytes, &mut PassThroughHandler, &mut encode_state);
    assert!(encoded.is_ok());
}

#[test]
fn encoding_into_zero_length_output_leaves_input_untouched() {
    let encoding = Execution::with_runtime(Utf8Locale);
    let mut state = encoding.encode_state();
    let mut handler = RecordingHandler::new(PassThroughHandler);
    let input = ['a', 'b'];
    let mut output: [u8; 0] = [];
    let result = encoding.encode_one(&input, &mut output, &mut handler, &mut state);
    assert_eq!(result.error_code, EncodingError::InsufficientOutputSpace);
    assert_eq!(result.input, &input);
    assert_eq!(handler.encode_calls, vec![(EncodingError::InsufficientOutputSpace, vec![])]);
}

#[test]
fn decoding_into_zero_length_output_reports_insufficient_space() {
    let encoding = Execution::with_runtime(CLocale);
    let mut state = encoding.decode_state();
    let mut output: [char; 0] = [];
    let result = encoding.decode_one(b"A", &mut output, &mut PassThroughHandler, &mut state);
    assert_eq!(result.error_code, EncodingError::InsufficientOutputSpace);
    assert_eq!(result.input, b"A");
}

#[test]
fn truncated_sequences_expose_every_consumed_unit() {
    let encoding = Execution::with_runtime(Utf8Locale);
    let euro = [0xE2, 0x82, 0xAC];
    for k in 1..euro.len() {
        let mut state = encoding.decode_state();
        let mut handler = RecordingHandler::new(PassThroughHandler);
        let mut output = ['\0'; 1];
        let result = encoding.decode_one(&euro[..k], &mut output, &mut handler, &mut state);
        assert_eq!(result.error_code, EncodingError::IncompleteSequence);
        assert!(result.input.is_empty());
        assert_eq!(result.output.len(), 1);
        assert_eq!(
            handler.decode_calls,
            vec![(EncodingError::IncompleteSequence, euro[..k].to_vec())]
        );
    }
}

#[test]
fn corrupted_final_unit_is_an_invalid_sequence() {
    let encoding = Execution::with_runtime(Utf8Locale);
    let mut state = encoding.decode_state();
    let mut handler = RecordingHandler::new(PassThroughHandler);
    let mut output = ['\0'; 1];
    let result = encoding.decode_one(&[0xE2, 0x82, 0x41, b'z'], &mut output, &mut handler, &mut state);
    assert_eq!(result.error_code, EncodingError::InvalidSequence);
    assert_eq!(result.input, b"z");
    assert_eq!(
        handler.decode_calls,
        vec![(EncodingError::InvalidSequence, vec![0xE2, 0x82, 0x41])]
    );
}

#[test]
fn ignorable_handler_returns_invalid_without_writing() {
    let encoding = Execution::with_runtime(CLocale);
    let mut state = encoding.decode_state();
    let mut output = ['#'; 1];
    let result = encoding.decode_one(&[0xC3, b'a'], &mut output, &mut AssumeValidHandler, &mut state);
    assert_eq!(result.error_code, EncodingError::InvalidSequence);
    assert_eq!(result.input, b"a");
    assert_eq!(result.output.len(), 1);
    assert_eq!(result.handled_errors, 0);
    assert_eq!(output, ['#']);
}

#[test]
fn unrepresentable_replacement_character_becomes_question_mark() {
    let encoding = Execution::with_runtime(CLocale);
    let mut state = encoding.encode_state();
    let mut handler = RecordingHandler::new(ReplacementHandler);
    let mut output = [0u8; 4];
    let result = encoding.encode_one(&[REPLACEMENT_CHARACTER], &mut output, &mut handler, &mut state);
    assert_eq!(result.error_code, EncodingError::Ok);
    assert_eq!(result.handled_errors, 1);
    assert!(result.input.is_empty());
    assert_eq!(result.output.len(), 3);
    assert_eq!(output[0], b'?');
    assert_eq!(
        handler.encode_calls,
        vec![(EncodingError::InvalidSequence, vec![REPLACEMENT_CHARACTER])]
    );
}

#[test]
fn replacement_handler_keeps_decoding_after_bad_bytes() {
    let encoding = Execution::with_runtime(CLocale);
    let decoded = decode_all(&encoding, b"ok\xFFgo", &mut ReplacementHandler).expect("replacement recovers");
    assert_eq!(decoded, vec!['o', 'k', REPLACEMENT_CHARACTER, 'g', 'o']);
}

#[test]
fn representable_code_points_roundtrip() {
    let utf8 = Execution::with_runtime(Utf8Locale);
    let text: Vec<char> = "héllo, 世界 😀\0!".chars().collect();
    let bytes = encode_all(&utf8, &text, &mut PassThroughHandler).expect("utf-8 encodes everything");
    assert_eq!(bytes, "héllo, 世界 😀\0!".as_bytes());
    assert_eq!(decode_all(&utf8, &bytes, &mut PassThroughHandler), Ok(text));

    let shifted = iso2022();
    let text: Vec<char> = "aé b\u{FF}\0é".chars().collect();
    let bytes = encode_all(&shifted, &text, &mut PassThroughHandler).expect("iso-2022 encodes latin-1");
    assert_eq!(
        bytes,
        vec![b'a', 0x0E, 0x69, 0x0F, b' ', b'b', 0x0E, 0x7F, 0x0F, 0x00, 0x0E, 0x69]
    );
    assert_eq!(decode_all(&shifted, &bytes, &mut PassThroughHandler), Ok(text));
}

#[test]
fn shift_state_survives_across_calls() {
    let encoding = iso2022();
    let mut state = encoding.decode_state();
    let mut output = ['\0'; 1];

    let first = encoding.decode_one(&[0x0E, 0x69], &mut output, &mut PassThroughHandler, &mut state);
    assert!(first.is_ok());
    assert!(!first.state.is_initial());
    assert_eq!(output[0], 'é');

    let second = encoding.decode_one(&[0x6A], &mut output, &mut PassThroughHandler, &mut state);
    assert!(second.is_ok());
    assert_eq!(output[0], 'ê');

    let nul = encoding.decode_one(&[0x00], &mut output, &mut PassThroughHandler, &mut state);
    assert!(nul.is_ok());
    assert!(nul.state.is_initial());
    assert_eq!(output[0], '\0');
}

#[test]
fn lone_shift_byte_is_incomplete_and_not_committed() {
    let encoding = iso2022();
    let mut state = encoding.decode_state();
    let mut handler = RecordingHandler::new(PassThroughHandler);
    let mut output = ['\0'; 1];
    let result = encoding.decode_one(&[0x0E], &mut output, &mut handler, &mut state);
    assert_eq!(result.error_code, EncodingError::IncompleteSequence);
    assert!(result.state.is_initial());
    assert_eq!(handler.decode_calls, vec![(EncodingError::IncompleteSequence, vec![0x0E])]);
}

#[test]
fn shifted_encode_partially_writes_when_output_runs_out() {
    let encoding = iso2022();
    let mut state = encoding.encode_state();
    let mut handler = RecordingHandler::new(PassThroughHandler);
    let mut output = [0u8; 1];
    let result = encoding.encode_one(&['é'], &mut output, &mut handler, &mut state);
    assert_eq!(result.error_code, EncodingError::InsufficientOutputSpace);
    assert!(result.input.is_empty());
    assert!(result.output.is_empty());
    assert_eq!(output, [0x0E]);
    assert_eq!(
        handler.encode_calls,
        vec![(EncodingError::InsufficientOutputSpace, vec!['é'])]
    );
}

#[test]
fn compositions_drain_then_resume_ordinary_decoding() {
    let encoding = hkscs();
    let mut state = encoding.decode_state();
    let input = [0x88, 0x62, b'A'];
    let mut output = ['\0'; 1];

    let first = encoding.decode_one(&input, &mut output, &mut PassThroughHandler, &mut state);
    assert!(first.is_ok());
    assert_eq!(first.input, b"A");
    assert_eq!(output[0], '\u{CA}');

    let drained = encoding.decode_one(&input[2..], &mut output, &mut PassThroughHandler, &mut state);
    assert!(drained.is_ok());
    assert_eq!(drained.input, b"A");
    assert!(!drained.state.has_pending_output());
    assert_eq!(output[0], '\u{304}');

    let ordinary = encoding.decode_one(&input[2..], &mut output, &mut PassThroughHandler, &mut state);
    assert!(ordinary.is_ok());
    assert!(ordinary.input.is_empty());
    assert_eq!(output[0], 'A');
    assert!(state.is_initial());
}

#[test]
fn compositions_at_end_of_stream_are_recovered_by_draining() {
    let encoding = hkscs();
    let decoded = decode_all(&encoding, &[b'x', 0x88, 0xA5], &mut PassThroughHandler);
    assert_eq!(decoded, Ok(vec!['x', '\u{EA}', '\u{30C}']));
}

#[test]
fn stray_lead_byte_consumes_the_accumulated_run() {
    let encoding = hkscs();
    let mut state = encoding.decode_state();
    let mut handler = RecordingHandler::new(PassThroughHandler);
    let mut output = ['\0'; 1];
    let result = encoding.decode_one(&[0x88, b'A', b'B'], &mut output, &mut handler, &mut state);
    assert_eq!(result.error_code, EncodingError::InvalidSequence);
    assert_eq!(result.input, b"B");
    assert_eq!(handler.decode_calls, vec![(EncodingError::InvalidSequence, vec![0x88, b'A'])]);
}

#[test]
fn handler_decision_is_returned_verbatim() {
    struct Escalate;

    impl<E: Encoding> spark_codec_text::ErrorHandler<E> for Escalate {
        fn handle_encode_error<'a>(
            &mut self,
            _encoding: &E,
            mut result: spark_codec_text::EncodeResult<'a, E>,
            _progress: &[E::CodePoint],
        ) -> spark_codec_text::EncodeResult<'a, E> {
            result.error_code = EncodingError::IncompleteSequence;
            result
        }

        fn handle_decode_error<'a>(
            &mut self,
            _encoding: &E,
            mut result: spark_codec_text::DecodeResult<'a, E>,
            _progress: &[E::CodeUnit],
        ) -> spark_codec_text::DecodeResult<'a, E> {
            result.handled_errors = 42;
            result
        }
    }

    let encoding = Execution::with_runtime(CLocale);
    let mut state = encoding.encode_state();
    let mut output = [0u8; 1];
    let encoded = encoding.encode_one(&['ß'], &mut output, &mut Escalate, &mut state);
    assert_eq!(encoded.error_code, EncodingError::IncompleteSequence);

    let mut decode_state = encoding.decode_state();
    let mut code_points = ['\0'; 1];
    let decoded = encoding.decode_one(&[0x80], &mut code_points, &mut Escalate, &mut decode_state);
    assert_eq!(decoded.error_code, EncodingError::InvalidSequence);
    assert_eq!(decoded.handled_errors, 42);
}

#[test]
fn unit_budget_exhaustion_is_an_incomplete_sequence() {
    let encoding = iso2022();
    let mut state = encoding.decode_state();
    let mut handler = RecordingHandler::new(PassThroughHandler);
    let mut output = ['#'; 1];
    let input = [0x0E; MB_LEN_MAX + 1];
    let result = encoding.decode_one(&input, &mut output, &mut handler, &mut state);
    assert_eq!(result.error_code, EncodingError::IncompleteSequence);
    assert_eq!(result.input.len(), 1);
    assert_eq!(result.output.len(), 1);
    assert!(result.state.is_initial());
    assert_eq!(output, ['#']);
    assert_eq!(
        handler.decode_calls,
        vec![(EncodingError::IncompleteSequence, vec![0x0E; MB_LEN_MAX])]
    );
}
