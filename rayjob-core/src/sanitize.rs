//! Log sanitizer
//!
//! The Ray dashboard returns job logs either as plain text or wrapped in a
//! JSON object (`{"logs": "..."}`) whose payload still carries backslash
//! escapes. Both forms are normalised into displayable text with terminal
//! control sequences and box-drawing characters removed.

use regex::Regex;
use std::sync::LazyLock;

/// Substituted when a payload is not valid UTF-8
pub const UNREADABLE_LOGS: &str = "Log content is not in a readable format.";

/// OSC sequences, CSI sequences, two-byte escapes and box-drawing runs
static TERMINAL_NOISE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\x1B\][^\x07\x1B]*(?:\x07|\x1B\\)",
        r"|\x1B\[[0-?]*[ -/]*[@-~]",
        r"|\x1B[@-Z\\\]^_]",
        r"|[\u{2500}-\u{257F}]+",
    ))
    .expect("terminal noise pattern must compile")
});

/// Cleans a raw log payload received as bytes
pub fn clean_bytes(raw: &[u8]) -> String {
    match std::str::from_utf8(raw) {
        Ok(text) => clean(text),
        Err(_) => UNREADABLE_LOGS.to_string(),
    }
}

/// Cleans a raw log payload
///
/// Never fails: input that is not a JSON object is treated as plain text.
pub fn clean(raw: &str) -> String {
    let text = match unwrap_json_logs(raw) {
        Some(unwrapped) => unwrapped,
        None => raw.to_string(),
    };

    strip_terminal_noise(&text)
}

/// Removes ANSI escape sequences and box-drawing characters
pub fn strip_terminal_noise(text: &str) -> String {
    TERMINAL_NOISE.replace_all(text, "").into_owned()
}

/// Extracts and unescapes the `logs` field of a JSON-wrapped payload
///
/// Returns `None` when the payload is not a JSON object or its `logs` field
/// is not a string. An object without a `logs` field yields an empty string.
fn unwrap_json_logs(raw: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(raw).ok()?;
    let object = value.as_object()?;

    match object.get("logs") {
        None => Some(String::new()),
        Some(serde_json::Value::String(logs)) => Some(unescape(logs)),
        Some(_) => None,
    }
}

/// Decodes backslash escapes left inside a log payload
///
/// Unknown escapes and truncated numeric escapes are kept verbatim.
pub fn unescape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let Some(&next) = chars.peek() else {
            out.push('\\');
            break;
        };

        let simple = match next {
            'n' => Some('\n'),
            't' => Some('\t'),
            'r' => Some('\r'),
            '\\' => Some('\\'),
            '\'' => Some('\''),
            '"' => Some('"'),
            'a' => Some('\x07'),
            'b' => Some('\x08'),
            'f' => Some('\x0C'),
            'v' => Some('\x0B'),
            _ => None,
        };

        if let Some(decoded) = simple {
            chars.next();
            out.push(decoded);
            continue;
        }

        match next {
            '0'..='7' => {
                let mut digits = String::new();
                while digits.len() < 3 {
                    match chars.peek() {
                        Some(&d) if ('0'..='7').contains(&d) => {
                            digits.push(d);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                match u32::from_str_radix(&digits, 8).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push('\\');
                        out.push_str(&digits);
                    }
                }
            }
            'x' | 'u' | 'U' => {
                let width = match next {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                chars.next();

                let mut digits = String::new();
                while digits.len() < width {
                    match chars.peek() {
                        Some(&d) if d.is_ascii_hexdigit() => {
                            digits.push(d);
                            chars.next();
                        }
                        _ => break,
                    }
                }

                let decoded = (digits.len() == width)
                    .then(|| u32::from_str_radix(&digits, 16).ok())
                    .flatten()
                    .and_then(char::from_u32);

                match decoded {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push('\\');
                        out.push(next);
                        out.push_str(&digits);
                    }
                }
            }
            _ => out.push('\\'),
        }
    }

    out
}
