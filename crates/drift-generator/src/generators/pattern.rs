//! Pattern-based string generator.
//!
//! Supports placeholders:
//! - `{index}` - producer call index
//! - `{uuid}` - random UUID drawn from the producer's RNG
//! - `{rand:N}` - random N-digit number

use super::random_uuid;
use drift_core::Value;
use rand::Rng;

/// Generate a string based on a pattern with placeholders.
pub fn generate_pattern<R: Rng>(pattern: &str, rng: &mut R, index: u64) -> Value {
    let mut result = pattern.replace("{index}", &index.to_string());

    while result.contains("{uuid}") {
        result = result.replacen("{uuid}", &random_uuid(rng).to_string(), 1);
    }

    // Unparseable `{rand:...}` placeholders are left as-is.
    let mut cursor = 0;
    while let Some(offset) = result[cursor..].find("{rand:") {
        let start = cursor + offset;
        let Some(len) = result[start..].find('}') else {
            break;
        };
        let end = start + len;
        match result[start + 6..end].parse::<usize>() {
            Ok(digits) => {
                let random_num = generate_random_digits(rng, digits);
                result.replace_range(start..=end, &random_num);
                cursor = start + random_num.len();
            }
            Err(_) => cursor = end + 1,
        }
    }

    Value::Text(result)
}

/// Generate a random number with exactly N digits.
fn generate_random_digits<R: Rng>(rng: &mut R, digits: usize) -> String {
    let mut result = String::with_capacity(digits);
    for i in 0..digits {
        // First digit is 1-9 to avoid leading zeros
        let low = if i == 0 { b'1' } else { b'0' };
        result.push(rng.gen_range(low..=b'9') as char);
    }
    result
}
