//! # Info Strings
//!
//! Backslash-delimited key/value strings (`\key\value\key\value`), the
//! textual form of userinfo, serverinfo, and systeminfo. Values cannot
//! contain `\` or `"`.

/// Returns the value for `key` in an info string, or empty when absent.
#[must_use]
pub fn value_for_key(info: &str, key: &str) -> String {
    let mut parts = info.split('\\');
    // Leading separator produces an empty first element.
    if info.starts_with('\\') {
        parts.next();
    }
    while let Some(k) = parts.next() {
        let v = parts.next().unwrap_or("");
        if k == key {
            return v.to_owned();
        }
    }
    String::new()
}

/// Builds an info string from key/value pairs, in order.
///
/// Returns the string and a truncation flag; a pair that would push the
/// result past `max_len` is dropped along with everything after it.
#[must_use]
pub fn build_info_string<'a, I>(pairs: I, max_len: usize) -> (String, bool)
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut out = String::new();
    for (key, value) in pairs {
        if value.is_empty() {
            continue;
        }
        let entry_len = key.len() + value.len() + 2;
        if out.len() + entry_len > max_len {
            return (out, true);
        }
        out.push('\\');
        out.push_str(key);
        out.push('\\');
        out.push_str(value);
    }
    (out, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_for_key() {
        let info = "\\name\\grunt\\rate\\25000";
        assert_eq!(value_for_key(info, "name"), "grunt");
        assert_eq!(value_for_key(info, "rate"), "25000");
        assert_eq!(value_for_key(info, "absent"), "");
        assert_eq!(value_for_key("", "name"), "");
    }

    #[test]
    fn test_build_round_trips() {
        let (info, truncated) = build_info_string([("name", "grunt"), ("rate", "25000")], 256);
        assert!(!truncated);
        assert_eq!(value_for_key(&info, "name"), "grunt");
        assert_eq!(value_for_key(&info, "rate"), "25000");
    }

    #[test]
    fn test_build_skips_empty_values() {
        let (info, _) = build_info_string([("a", "1"), ("b", ""), ("c", "3")], 256);
        assert_eq!(info, "\\a\\1\\c\\3");
    }

    #[test]
    fn test_build_truncates() {
        let (info, truncated) = build_info_string([("key", "value"), ("other", "value")], 12);
        assert!(truncated);
        assert_eq!(info, "\\key\\value");
    }
}
