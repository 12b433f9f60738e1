//! 表驱动的区域设置：从 TOML 配置编译出确定性的窄字符运行时。
//!
//! ## 模块目标（Why）
//! - 平台运行时依赖进程全局的区域设置，无法在测试中稳定复现移位编码与一对多解码；
//! - 表驱动实现让这两类行为可以通过一份声明式配置完整描述，并在编译期一次性校验歧义。
//!
//! ## 配置格式（What）
//! ```toml
//! name = "iso2022-latin1"
//!
//! [shift]
//! shift_out = 0x0E
//! shift_in = 0x0F
//!
//! [[range]]
//! first_byte = 0x20
//! last_byte = 0x7F
//! first_code_point = 0xA0
//! set = "shifted"
//!
//! [[sequence]]
//! bytes = [0x88, 0x62]
//! code_points = [0xCA, 0x304]
//! ```
//! - `set` 取 `base`（默认）或 `shifted`，后者要求存在 `[shift]` 段；
//! - 0x00 必须在基本字符集中映射为 U+0000，并在任何移位状态下把状态复位；
//! - 同一字符集内不得出现重复序列或前缀歧义，移位字节不得作为序列首字节。
//!
//! ## 编码选择（How）
//! - 只有映射为单个码点的序列参与编码；同一码点出现多次时，基本字符集优先，其次按配置顺序取第一个。

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::encoding::{MAX_CODE_POINTS, MB_LEN_MAX};
use crate::error::LocaleError;
use crate::runtime::{MbConversion, MultibyteRuntime, ShiftState};

const ISO2022_LATIN1: &str = include_str!("../../locales/iso2022-latin1.toml");
const HKSCS_COMPOSITIONS: &str = include_str!("../../locales/hkscs-compositions.toml");

const PENDING_CAPACITY: usize = MAX_CODE_POINTS - 1;

/// 区域设置表的顶层配置。
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LocaleTableConfig {
    /// 区域设置名称。
    pub name: String,
    /// 可选的 SO/SI 移位字节。
    #[serde(default)]
    pub shift: Option<ShiftConfig>,
    /// 连续字节区间映射。
    #[serde(default)]
    pub range: Vec<RangeConfig>,
    /// 显式字节序列映射。
    #[serde(default)]
    pub sequence: Vec<SequenceConfig>,
}

/// 移位字节配置。
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ShiftConfig {
    /// 切换到 `shifted` 字符集的字节（SO）。
    pub shift_out: u8,
    /// 切换回 `base` 字符集的字节（SI）。
    pub shift_in: u8,
}

/// `first_byte..=last_byte` 依次映射到自 `first_code_point` 起的连续码点。
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RangeConfig {
    /// 区间首字节。
    pub first_byte: u8,
    /// 区间末字节（含）。
    pub last_byte: u8,
    /// `first_byte` 对应的码点。
    pub first_code_point: u32,
    /// 所属字符集。
    #[serde(default)]
    pub set: CharacterSet,
}

/// 一个字节序列映射到一个或多个码点。
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SequenceConfig {
    /// 完整的字节序列，不含移位字节。
    pub bytes: Vec<u8>,
    /// 按顺序产生的码点。
    pub code_points: Vec<u32>,
    /// 所属字符集。
    #[serde(default)]
    pub set: CharacterSet,
}

/// 映射所属的字符集。
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum CharacterSet {
    /// 初始移位状态下生效的字符集。
    #[default]
    Base,
    /// SO 之后生效的字符集。
    Shifted,
}

/// 表驱动区域设置的移位状态。
///
/// 待输出码点以逆序保存，排出时从尾部弹出。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TableShiftState {
    shifted: bool,
    pending: [char; PENDING_CAPACITY],
    pending_len: u8,
}

impl TableShiftState {
    /// 当前是否处于 `shifted` 字符集。
    pub fn is_shifted(&self) -> bool {
        self.shifted
    }

    fn pop_pending(&mut self) -> Option<char> {
        let len = usize::from(self.pending_len);
        let last = len.checked_sub(1)?;
        self.pending_len -= 1;
        Some(self.pending[last])
    }

    fn push_pending_reversed(&mut self, code_points: &[char]) {
        for (slot, &code_point) in self.pending.iter_mut().zip(code_points.iter().rev()) {
            *slot = code_point;
        }
        self.pending_len = code_points.len().min(PENDING_CAPACITY) as u8;
    }
}

impl ShiftState for TableShiftState {
    fn is_initial(&self) -> bool {
        !self.shifted && self.pending_len == 0
    }
}

#[derive(Clone, Debug, Default)]
struct CharacterTable {
    sequences: BTreeMap<Vec<u8>, Vec<char>>,
    prefixes: BTreeSet<Vec<u8>>,
}

impl CharacterTable {
    fn insert(&mut self, locale: &str, bytes: Vec<u8>, code_points: Vec<char>) -> Result<(), LocaleError> {
        if self.sequences.contains_key(&bytes) {
            return Err(LocaleError::Conflict {
                locale: locale.into(),
                bytes,
            });
        }
        self.sequences.insert(bytes, code_points);
        Ok(())
    }

    /// 拒绝前缀歧义并生成真前缀集合。
    ///
    /// 按字典序排列时，若 `a` 是某个键的前缀，则紧随 `a` 的下一个键必然以 `a` 开头。
    fn seal(&mut self, locale: &str) -> Result<(), LocaleError> {
        let mut keys = self.sequences.keys().peekable();
        while let Some(key) = keys.next() {
            if let Some(next) = keys.peek()
                && next.starts_with(key)
            {
                return Err(LocaleError::Conflict {
                    locale: locale.into(),
                    bytes: key.clone(),
                });
            }
            for end in 1..key.len() {
                self.prefixes.insert(key[..end].to_vec());
            }
        }
        Ok(())
    }
}

/// 由 TOML 配置编译出的窄字符运行时。
///
/// # 教案式说明
/// - **意图 (Why)**：以纯数据描述 ISO-2022 式移位编码与 Big5-HKSCS 式一对多映射，供执行字符集引擎确定性地驱动；
/// - **契约 (What)**：
///   - 解码时先吸收前导 SO/SI 字节，只含移位字节的输入报告为不完整；
///   - 一对多序列首次调用返回首个码点，其余码点保存在 [`TableShiftState`] 中，以空输入逐个排出；
///   - 编码 U+0000 时若处于移位态，先写 SI 再写 0x00，状态复位；
/// - **风险 (Trade-offs)**：映射存放于 `BTreeMap`，单次查找为 O(log n)，换取配置校验与前缀判定的简洁。
#[derive(Clone, Debug)]
pub struct TableLocale {
    name: String,
    shift: Option<ShiftConfig>,
    base: CharacterTable,
    shifted: CharacterTable,
    encode: BTreeMap<char, (CharacterSet, Vec<u8>)>,
}

impl TableLocale {
    /// 从 TOML 文本编译。
    pub fn from_toml_str(source: &str) -> Result<Self, LocaleError> {
        let config: LocaleTableConfig = toml::from_str(source)?;
        Self::from_config(config)
    }

    /// 从 TOML 文件编译。
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LocaleError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| LocaleError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// 校验并编译已解析的配置。
    pub fn from_config(config: LocaleTableConfig) -> Result<Self, LocaleError> {
        let LocaleTableConfig {
            name,
            shift,
            range,
            sequence,
        } = config;

        if let Some(shift) = shift {
            if shift.shift_out == shift.shift_in {
                return Err(shift_error(&name, "shift_out and shift_in must differ"));
            }
            if shift.shift_out == 0 || shift.shift_in == 0 {
                return Err(shift_error(&name, "0x00 cannot be a shift byte"));
            }
        }

        let mut entries: Vec<(CharacterSet, Vec<u8>, Vec<char>)> = Vec::new();
        for item in range {
            if item.first_byte > item.last_byte {
                return Err(LocaleError::InvalidRange {
                    locale: name,
                    first: item.first_byte,
                    last: item.last_byte,
                });
            }
            for byte in item.first_byte..=item.last_byte {
                let value = item
                    .first_code_point
                    .checked_add(u32::from(byte - item.first_byte))
                    .ok_or_else(|| LocaleError::InvalidRange {
                        locale: name.clone(),
                        first: item.first_byte,
                        last: item.last_byte,
                    })?;
                let code_point = scalar(&name, value)?;
                entries.push((item.set, vec![byte], vec![code_point]));
            }
        }
        for item in sequence {
            if item.bytes.is_empty() {
                return Err(LocaleError::EmptySequence { locale: name });
            }
            if item.bytes.len() >= MB_LEN_MAX {
                return Err(LocaleError::SequenceTooLong {
                    locale: name,
                    bytes: item.bytes,
                    max: MB_LEN_MAX - 1,
                });
            }
            if item.code_points.is_empty() || item.code_points.len() > MAX_CODE_POINTS {
                return Err(LocaleError::CodePointCount {
                    locale: name,
                    bytes: item.bytes,
                    max: MAX_CODE_POINTS,
                });
            }
            let code_points = item
                .code_points
                .iter()
                .map(|&value| scalar(&name, value))
                .collect::<Result<Vec<_>, _>>()?;
            entries.push((item.set, item.bytes, code_points));
        }

        let mut base = CharacterTable::default();
        let mut shifted = CharacterTable::default();
        for (set, bytes, code_points) in entries {
            if let Some(shift) = shift
                && (bytes[0] == shift.shift_out || bytes[0] == shift.shift_in)
            {
                return Err(shift_error(&name, "a sequence starts with a shift byte"));
            }
            if bytes[0] == 0 && (bytes.len() > 1 || code_points != ['\0']) {
                return Err(LocaleError::NulNotPreserved { locale: name });
            }
            let table = match set {
                CharacterSet::Base => &mut base,
                CharacterSet::Shifted if shift.is_some() => &mut shifted,
                CharacterSet::Shifted => {
                    return Err(shift_error(&name, "shifted mappings require a [shift] section"));
                }
            };
            table.insert(&name, bytes, code_points)?;
        }
        if base.sequences.get([0u8].as_slice()).is_none() {
            return Err(LocaleError::NulNotPreserved { locale: name });
        }
        base.seal(&name)?;
        shifted.seal(&name)?;

        let mut encode = BTreeMap::new();
        for (set, table) in [(CharacterSet::Base, &base), (CharacterSet::Shifted, &shifted)] {
            for (bytes, code_points) in &table.sequences {
                if let [code_point] = code_points.as_slice() {
                    encode.entry(*code_point).or_insert_with(|| (set, bytes.clone()));
                }
            }
        }

        tracing::debug!(
            locale = %name,
            base_sequences = base.sequences.len(),
            shifted_sequences = shifted.sequences.len(),
            encodable = encode.len(),
            "compiled locale table"
        );

        Ok(Self {
            name,
            shift,
            base,
            shifted,
            encode,
        })
    }

    /// ISO-2022 风格的移位区域设置：SO（0x0E）后 0x20..=0x7F 映射为 U+00A0..=U+00FF。
    pub fn iso2022_latin1() -> Result<Self, LocaleError> {
        Self::from_toml_str(ISO2022_LATIN1)
    }

    /// Big5-HKSCS 的组合字符片段：0x8862..=0x88A7 的六个双字节序列，其中四个解码为两个码点。
    pub fn hkscs_compositions() -> Result<Self, LocaleError> {
        Self::from_toml_str(HKSCS_COMPOSITIONS)
    }

    fn table(&self, shifted: bool) -> &CharacterTable {
        if shifted { &self.shifted } else { &self.base }
    }

    fn shift_byte(&self, byte: u8) -> Option<bool> {
        let shift = self.shift?;
        if byte == shift.shift_out {
            Some(true)
        } else if byte == shift.shift_in {
            Some(false)
        } else {
            None
        }
    }
}

impl MultibyteRuntime for TableLocale {
    type ShiftState = TableShiftState;

    fn name(&self) -> &str {
        &self.name
    }

    fn mbrtoc32(&self, input: &[u8], state: &mut TableShiftState) -> MbConversion {
        if let Some(code_point) = state.pop_pending() {
            return if state.pending_len == 0 {
                MbConversion::Produced(code_point)
            } else {
                MbConversion::ProducedWithPending(code_point)
            };
        }

        let mut shifted = state.shifted;
        let mut body = input;
        while let Some((&byte, rest)) = body.split_first()
            && let Some(next) = self.shift_byte(byte)
        {
            shifted = next;
            body = rest;
        }
        let Some(&first) = body.first() else {
            return MbConversion::Incomplete;
        };
        if first == 0 {
            *state = TableShiftState::default();
            return MbConversion::NullTerminator;
        }

        let table = self.table(shifted);
        match table.sequences.get(body) {
            Some(code_points) => {
                state.shifted = shifted;
                match code_points.split_first() {
                    Some((&head, [])) => MbConversion::Produced(head),
                    Some((&head, rest)) => {
                        state.push_pending_reversed(rest);
                        MbConversion::ProducedWithPending(head)
                    }
                    None => MbConversion::Invalid,
                }
            }
            None if table.prefixes.contains(body) => MbConversion::Incomplete,
            None => MbConversion::Invalid,
        }
    }

    fn c32rtomb(
        &self,
        code_point: char,
        output: &mut [u8; MB_LEN_MAX],
        state: &mut TableShiftState,
    ) -> Option<usize> {
        let mut written = 0;
        if code_point == '\0' {
            if let Some(shift) = self.shift
                && state.shifted
            {
                output[0] = shift.shift_in;
                written = 1;
            }
            output[written] = 0;
            *state = TableShiftState::default();
            return Some(written + 1);
        }

        let (set, bytes) = self.encode.get(&code_point)?;
        let want_shifted = *set == CharacterSet::Shifted;
        if let Some(shift) = self.shift
            && want_shifted != state.shifted
        {
            output[0] = if want_shifted {
                shift.shift_out
            } else {
                shift.shift_in
            };
            written = 1;
        }
        output[written..written + bytes.len()].copy_from_slice(bytes);
        state.shifted = want_shifted;
        Some(written + bytes.len())
    }
}

fn scalar(locale: &str, value: u32) -> Result<char, LocaleError> {
    char::from_u32(value).ok_or_else(|| LocaleError::InvalidCodePoint {
        locale: locale.into(),
        value,
    })
}

fn shift_error(locale: &str, detail: &'static str) -> LocaleError {
    LocaleError::Shift {
        locale: locale.into(),
        detail,
    }
}
