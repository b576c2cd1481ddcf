//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
/// This is intentionally simple (no nested/conditional logic).
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// True if unicode char belongs to CJK ranges.
/// Used to sanity-check that a generated definition is actually Chinese.
pub fn is_cjk(ch: char) -> bool {
  (ch >= '\u{4E00}' && ch <= '\u{9FFF}')
    || (ch >= '\u{3400}' && ch <= '\u{4DBF}')
    || (ch >= '\u{20000}' && ch <= '\u{2A6DF}')
    || (ch >= '\u{2A700}' && ch <= '\u{2B73F}')
    || (ch >= '\u{2B740}' && ch <= '\u{2B81F}')
    || (ch >= '\u{2B820}' && ch <= '\u{2CEAF}')
    || (ch >= '\u{F900}' && ch <= '\u{FAFF}')
}

/// Case-insensitive "does `haystack` contain `needle` as a substring".
/// ASCII folding is enough here: vocabulary words are English.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
  if needle.is_empty() {
    return false;
  }
  haystack.to_ascii_lowercase().contains(&needle.to_ascii_lowercase())
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    s.to_string()
  } else {
    let mut cut = max;
    while !s.is_char_boundary(cut) {
      cut -= 1;
    }
    format!("{}… ({} bytes total)", &s[..cut], s.len())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn template_fills_all_keys() {
    let out = fill_template("{a} and {b} and {a}", &[("a", "x"), ("b", "y")]);
    assert_eq!(out, "x and y and x");
  }

  #[test]
  fn substring_check_ignores_case() {
    assert!(contains_ignore_case("An Economy grows", "economy"));
    assert!(!contains_ignore_case("economical", "")); // empty needle never matches
    assert!(!contains_ignore_case("growth", "cat"));
  }

  #[test]
  fn cjk_detection() {
    assert!(is_cjk('經'));
    assert!(!is_cjk('e'));
  }
}
