use std::sync::atomic::{AtomicU64, Ordering};

const DIGITS: &[u8; 32] = b"0123456789abcdefghijklmnopqrstuv";

/// Hands out continuation tokens.
///
/// Tokens are a process-wide counter written in base 32, so every call
/// returns a value no other call has seen, whichever thread makes it.
#[derive(Debug)]
pub struct TokenGenerator {
    counter: AtomicU64,
}

impl TokenGenerator {
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
        }
    }

    pub fn next_token(&self) -> String {
        let id = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        encode_base32(id)
    }
}

impl Default for TokenGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn encode_base32(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut buf = Vec::with_capacity(13);
    while value > 0 {
        buf.push(DIGITS[(value % 32) as usize]);
        value /= 32;
    }
    buf.reverse();

    String::from_utf8(buf).unwrap_or_default()
}
