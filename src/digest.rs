//! ページ内容のダイジェスト計算
//!
//! 変更検出用のSHA-256フィンガープリント

use sha2::{Digest, Sha256};

/// Compute the change-detection digest for normalized page text.
///
/// SHA-256 over the UTF-8 bytes, returned as lowercase hex. Deterministic:
/// the same text always yields the same digest, so two polls can be compared
/// with plain string equality.
pub fn page_digest(text: &str) -> String {
    let hash = Sha256::digest(text.as_bytes());
    format!("{:x}", hash)
}
