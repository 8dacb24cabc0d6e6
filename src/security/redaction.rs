// Simple helpers to avoid accidental printing of secrets in logs/tests.

/// Length-only placeholder for a byte buffer.
pub fn redact_bytes(bytes: &[u8]) -> String {
    format!("<redacted len={}>", bytes.len())
}

/// Length-only placeholder for a text body such as a mnemonic or password.
pub fn redact_text(s: &str) -> String {
    format!("<redacted chars={}>", s.chars().count())
}

/// Short form of a public address for log lines: first six and last four characters.
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 12 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}…{}", head, tail)
}
