//! 区间写法：`n` 表示单个值，`lo-hi` 表示闭区间。

use std::collections::BTreeSet;

use thiserror::Error;

/// 区间 token 解析失败
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("empty range token")]
    Empty,
    #[error("`{0}` is not a non-negative integer")]
    NotANumber(String),
    #[error("range `{lo}-{hi}` runs backwards")]
    Reversed { lo: u32, hi: u32 },
    #[error("range list expands to {count} ids, more than {limit}")]
    TooLarge { count: u64, limit: usize },
}

/// 单次解码最多展开的编号数，远大于任何真实节点的逻辑 CPU 数
pub const MAX_DECODED_IDS: usize = 1 << 16;

/// 把已排序去重的编号切成最大连续段，每段写成 `n` 或 `lo-hi`。
pub fn encode_runs<I>(ids: I) -> Vec<String>
where
    I: IntoIterator<Item = u32>,
{
    let sorted: BTreeSet<u32> = ids.into_iter().collect();
    let mut runs = Vec::new();
    let mut iter = sorted.into_iter();
    let Some(first) = iter.next() else {
        return runs;
    };

    let (mut lo, mut hi) = (first, first);
    for id in iter {
        if hi.checked_add(1) == Some(id) {
            hi = id;
            continue;
        }
        runs.push(format_run(lo, hi));
        lo = id;
        hi = id;
    }
    runs.push(format_run(lo, hi));
    runs
}

/// `{0,1,2,3,7,8,9}` -> `"0-3, 7-9"`；空集合得到空串。
pub fn encode<I>(ids: I) -> String
where
    I: IntoIterator<Item = u32>,
{
    encode_runs(ids).join(", ")
}

fn format_run(lo: u32, hi: u32) -> String {
    if lo == hi {
        lo.to_string()
    } else {
        format!("{lo}-{hi}")
    }
}

/// 展开单个 token。两侧空白会被忽略。
pub fn decode_token(token: &str) -> Result<std::ops::RangeInclusive<u32>, CodecError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(CodecError::Empty);
    }
    match token.split_once('-') {
        Some((lo, hi)) => {
            let lo = parse_id(lo)?;
            let hi = parse_id(hi)?;
            if hi < lo {
                return Err(CodecError::Reversed { lo, hi });
            }
            let count = u64::from(hi - lo) + 1;
            if count > MAX_DECODED_IDS as u64 {
                return Err(CodecError::TooLarge {
                    count,
                    limit: MAX_DECODED_IDS,
                });
            }
            Ok(lo..=hi)
        }
        None => {
            let id = parse_id(token)?;
            Ok(id..=id)
        }
    }
}

fn parse_id(raw: &str) -> Result<u32, CodecError> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CodecError::NotANumber(raw.to_string()));
    }
    raw.parse()
        .map_err(|_| CodecError::NotANumber(raw.to_string()))
}

/// 展开一组 token。顺序无关，重复值合并。
///
/// 去重后超过 `MAX_DECODED_IDS` 个编号时报 `TooLarge`。
pub fn decode<S>(tokens: &[S]) -> Result<BTreeSet<u32>, CodecError>
where
    S: AsRef<str>,
{
    let mut ids = BTreeSet::new();
    for token in tokens {
        ids.extend(decode_token(token.as_ref())?);
        if ids.len() > MAX_DECODED_IDS {
            return Err(CodecError::TooLarge {
                count: ids.len() as u64,
                limit: MAX_DECODED_IDS,
            });
        }
    }
    Ok(ids)
}
