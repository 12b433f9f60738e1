//! 平台默认执行字符集的冒烟测试。
//!
//! 进程从未调用 `setlocale`，因此宿主运行时处于 `"C"` 区域设置（Windows 上为活动代码页），
//! 这里只断言所有区域设置共有的 ASCII 子集。

mod common;

use common::{decode_all, encode_all};
use spark_codec_text::{Encoding, NativeExecution, PassThroughHandler};

#[test]
fn ascii_roundtrips_through_the_native_execution_encoding() {
    let encoding = NativeExecution::native();
    let text: Vec<char> = "Hello, spark!\0~".chars().collect();
    let bytes = encode_all(&encoding, &text, &mut PassThroughHandler).expect("ascii is always representable");
    assert_eq!(bytes, b"Hello, spark!\0~");
    assert_eq!(decode_all(&encoding, &bytes, &mut PassThroughHandler), Ok(text));
}

#[test]
fn empty_input_is_ok_for_the_native_encoding() {
    let encoding = NativeExecution::native();
    assert!(!encoding.name().is_empty());
    let mut state = encoding.decode_state();
    let mut no_room: [char; 0] = [];
    let result = encoding.decode_one(&[], &mut no_room, &mut PassThroughHandler, &mut state);
    assert!(result.is_ok());
}

#[cfg(all(feature = "native", unix, not(target_vendor = "apple")))]
#[test]
fn primed_native_decode_state_is_initial() {
    let encoding = NativeExecution::native();
    let state = encoding.decode_state();
    assert!(state.is_initial());
    assert!(encoding.encode_state().is_initial());
}
