use crate::codec::{CodecError, MAX_DECODED_IDS, decode, decode_token, encode, encode_runs};
use proptest::prelude::*;
use std::collections::BTreeSet;

#[test]
fn encode_merges_consecutive_runs() {
    assert_eq!(encode([0, 1, 2, 3, 7, 8, 9]), "0-3, 7-9");
    assert_eq!(encode([5, 1, 3, 2]), "1-3, 5");
    assert_eq!(encode([4]), "4");
    assert_eq!(encode(std::iter::empty()), "");
}

#[test]
fn encode_ignores_duplicates_and_handles_upper_bound() {
    assert_eq!(encode([2, 2, 3, 3]), "2-3");
    assert_eq!(
        encode_runs([u32::MAX, u32::MAX - 1, 0]),
        vec!["0".to_string(), format!("{}-{}", u32::MAX - 1, u32::MAX)]
    );
}

#[test]
fn decode_accepts_unsorted_overlapping_tokens() {
    let ids = decode(&["7-9", "0", "1-3", "2", " 8 "]).expect("decode");
    assert_eq!(ids, BTreeSet::from([0, 1, 2, 3, 7, 8, 9]));
}

#[test]
fn decode_rejects_bad_tokens() {
    assert_eq!(decode_token(""), Err(CodecError::Empty));
    assert_eq!(
        decode_token("abc"),
        Err(CodecError::NotANumber("abc".to_string()))
    );
    assert_eq!(
        decode_token("5-3"),
        Err(CodecError::Reversed { lo: 5, hi: 3 })
    );
    assert!(decode_token("-3").is_err());
    assert!(decode_token("1-2-3").is_err());
    assert!(decode(&["0-3", "x"]).is_err());
}

#[test]
fn decode_rejects_oversized_ranges() {
    let limit = MAX_DECODED_IDS as u32;
    assert!(decode_token(&format!("0-{}", limit - 1)).is_ok());
    assert_eq!(
        decode_token("4-40000000"),
        Err(CodecError::TooLarge {
            count: 39_999_997,
            limit: MAX_DECODED_IDS,
        })
    );
    assert!(matches!(
        decode_token(&format!("0-{}", u32::MAX)),
        Err(CodecError::TooLarge { .. })
    ));

    // 每个 token 都在上限内，合起来超过上限
    let half = limit / 2;
    let tokens = [
        format!("0-{}", half - 1),
        format!("{}-{}", half, limit - 1),
        format!("{limit}"),
    ];
    assert_eq!(
        decode(&tokens[..]),
        Err(CodecError::TooLarge {
            count: MAX_DECODED_IDS as u64 + 1,
            limit: MAX_DECODED_IDS,
        })
    );
    assert!(decode(&tokens[..2]).is_ok());
}

/// 稀疏的任意集合、`base` 附近的稠密集合、贴着 `u32::MAX` 的区间
fn arb_id_set() -> impl Strategy<Value = BTreeSet<u32>> {
    prop_oneof![
        prop::collection::btree_set(any::<u32>(), 0..40),
        (any::<u32>(), prop::collection::btree_set(0u32..200, 0..80)).prop_map(
            |(base, offsets)| offsets
                .into_iter()
                .map(|o| base.saturating_add(o))
                .collect()
        ),
        (0u32..200, 0u32..200).prop_map(|(gap, len)| {
            let hi = u32::MAX - gap;
            (hi.saturating_sub(len)..=hi).collect()
        }),
    ]
}

/// 乱序、互相重叠、整体重复一遍的 token 列表，以及它们覆盖的编号
fn arb_tokens() -> impl Strategy<Value = (Vec<String>, BTreeSet<u32>)> {
    prop::collection::vec((0u32..1_000, 0u32..20), 0..30).prop_map(|spans| {
        let mut tokens = Vec::new();
        let mut expected = BTreeSet::new();
        for &(lo, len) in &spans {
            let hi = lo + len;
            expected.extend(lo..=hi);
            if len == 0 {
                tokens.push(lo.to_string());
            } else {
                tokens.push(format!("{lo}-{hi}"));
            }
        }
        let again: Vec<String> = tokens.iter().rev().cloned().collect();
        tokens.extend(again);
        (tokens, expected)
    })
}

proptest! {
    #[test]
    fn decode_inverts_encode(set in arb_id_set()) {
        let encoded = encode(set.iter().copied());
        let tokens: Vec<&str> = if encoded.is_empty() {
            Vec::new()
        } else {
            encoded.split(", ").collect()
        };
        prop_assert_eq!(decode(tokens.as_slice()), Ok(set), "encoded={}", encoded);
    }

    #[test]
    fn decode_merges_unsorted_duplicate_tokens((tokens, expected) in arb_tokens()) {
        prop_assert_eq!(decode(tokens.as_slice()), Ok(expected));
    }
}
