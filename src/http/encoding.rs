//! # Percent-encoding
//! src/http/encoding.rs
//!
//! Codificación y decodificación `%XX` para query strings, paths y el
//! parámetro `filename*=UTF-8''` de RFC 5987. También escapa texto
//! para insertarlo en HTML.

/// Decodifica una cadena percent-encoded
///
/// Secuencias `%XX` inválidas se dejan tal cual. Con `plus_as_space`
/// el `+` se interpreta como espacio (formato de query string).
/// Los bytes resultantes se decodifican como UTF-8 con reemplazo.
///
/// # Ejemplo
/// ```
/// use gallery_server::http::encoding::percent_decode;
///
/// assert_eq!(percent_decode("hello%20world", false), "hello world");
/// assert_eq!(percent_decode("a+b", true), "a b");
/// assert_eq!(percent_decode("caf%C3%A9.png", false), "café.png");
/// ```
pub fn percent_decode(input: &str, plus_as_space: bool) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                match (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                    (Some(hi), Some(lo)) => {
                        out.push(hi << 4 | lo);
                        i += 3;
                    }
                    _ => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b'+' if plus_as_space => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}

/// Codifica una cadena para usarla como componente de URL
///
/// Deja sin tocar los caracteres no reservados de RFC 3986
/// (`A-Z a-z 0-9 - _ . ~`); todo lo demás se emite como `%XX`.
pub fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for b in input.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}

/// Escapa `& < > " '` para insertar texto en HTML
pub fn html_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_basic() {
        assert_eq!(percent_decode("hello%20world", false), "hello world");
        assert_eq!(percent_decode("a%2Fb", false), "a/b");
    }

    #[test]
    fn test_decode_plus() {
        assert_eq!(percent_decode("a+b", true), "a b");
        assert_eq!(percent_decode("a+b", false), "a+b");
    }

    #[test]
    fn test_decode_utf8() {
        assert_eq!(percent_decode("%E6%97%A5.png", false), "日.png");
    }

    #[test]
    fn test_decode_invalid_sequences_kept() {
        assert_eq!(percent_decode("100%", false), "100%");
        assert_eq!(percent_decode("%zz", false), "%zz");
        assert_eq!(percent_decode("%4", false), "%4");
    }

    #[test]
    fn test_encode() {
        assert_eq!(percent_encode("a b.png"), "a%20b.png");
        assert_eq!(percent_encode("x&y=z"), "x%26y%3Dz");
        assert_eq!(percent_encode("ok-file_1.jpg"), "ok-file_1.jpg");
    }

    #[test]
    fn test_encode_then_decode_non_ascii() {
        let name = "foto de café.png";
        assert_eq!(percent_decode(&percent_encode(name), false), name);
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("<img src='x'>&"), "&lt;img src=&#39;x&#39;&gt;&amp;");
    }
}
