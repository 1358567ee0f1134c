use rand::Rng;

/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a Snowflake-style i64 for use as resource ID.
///
/// Layout (53 bits, fits in JavaScript's Number.MAX_SAFE_INTEGER):
///   - 41 bits: milliseconds since 2024-01-01 UTC (~69 years)
///   - 12 bits: random (4096 values per ms)
pub fn snowflake_id() -> i64 {
    // Custom epoch: 2024-01-01 00:00:00 UTC
    const EPOCH_MS: i64 = 1_704_067_200_000;
    let now = now_millis();
    let ts = (now - EPOCH_MS) & 0x1FF_FFFF_FFFF; // 41 bits
    let rand_bits: i64 = rand::thread_rng().gen_range(0..0x1000); // 12 bits
    (ts << 12) | rand_bits
}

/// Alphabet for customer-facing reference codes (no 0/O/1/I to avoid misreading)
const REFERENCE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Length of the random part of a reference code
pub const REFERENCE_CODE_LEN: usize = 8;

/// Generate a customer-facing reference code such as `RNT-7KQ2M9XA`.
pub fn reference_code(prefix: &str) -> String {
    let mut rng = rand::thread_rng();
    let body: String = (0..REFERENCE_CODE_LEN)
        .map(|_| REFERENCE_ALPHABET[rng.gen_range(0..REFERENCE_ALPHABET.len())] as char)
        .collect();
    format!("{prefix}-{body}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snowflake_ids_are_positive_and_js_safe() {
        let id = snowflake_id();
        assert!(id > 0);
        assert!(id < (1_i64 << 53));
    }

    #[test]
    fn reference_code_shape() {
        let code = reference_code("RSV");
        assert!(code.starts_with("RSV-"));
        let body = &code[4..];
        assert_eq!(body.len(), REFERENCE_CODE_LEN);
        assert!(body.bytes().all(|b| REFERENCE_ALPHABET.contains(&b)));
    }
}
