//! 整数区间编解码
//!
//! 把 CPU 编号集合压缩成 `0-3, 7-9` 这样的区间写法，或者反过来展开。

mod range;

pub use range::{CodecError, MAX_DECODED_IDS, decode, decode_token, encode, encode_runs};
