//! Naming helpers
//!
//! Plurality and case conversion for object and field names. Providers
//! disagree on both (`contact` vs `contacts`, `firstName` vs `first_name`),
//! so adapters normalize through these functions.

const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("datum", "data"),
];

const UNCOUNTABLE: &[&str] = &["data", "metadata", "information", "news", "media", "feedback"];

/// Plural form of an English noun
pub fn plural(word: &str) -> String {
    if word.is_empty() || is_uncountable(word) {
        return word.to_string();
    }
    let lower = word.to_ascii_lowercase();
    for (single, many) in IRREGULAR {
        if lower == *single {
            return match_case(word, many);
        }
        if lower == *many {
            return word.to_string();
        }
    }

    if let Some(stem) = word.strip_suffix('y') {
        if stem.chars().last().is_some_and(|c| !is_vowel(c)) {
            return format!("{stem}ies");
        }
    }
    if ["s", "x", "z", "ch", "sh"].iter().any(|s| lower.ends_with(s)) {
        if lower.ends_with('s') && !lower.ends_with("ss") && !lower.ends_with("us") {
            return word.to_string();
        }
        return format!("{word}es");
    }
    format!("{word}s")
}

/// Singular form of an English noun
pub fn singular(word: &str) -> String {
    if word.is_empty() || is_uncountable(word) {
        return word.to_string();
    }
    let lower = word.to_ascii_lowercase();
    for (single, many) in IRREGULAR {
        if lower == *many {
            return match_case(word, single);
        }
        if lower == *single {
            return word.to_string();
        }
    }

    if let Some(stem) = word.strip_suffix("ies") {
        return format!("{stem}y");
    }
    for suffix in ["sses", "xes", "zes", "ches", "shes", "uses"] {
        if lower.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    if lower.ends_with("ss") || lower.ends_with("us") || lower.ends_with("is") {
        return word.to_string();
    }
    match word.strip_suffix('s') {
        Some(stem) => stem.to_string(),
        None => word.to_string(),
    }
}

/// Whether a word is already in plural form
pub fn is_plural(word: &str) -> bool {
    !word.is_empty() && plural(&singular(word)).eq_ignore_ascii_case(word)
}

/// Split an identifier into lowercase words
///
/// Separators are `_`, `-`, `.` and whitespace; case changes also start a
/// new word, and acronyms stay together (`HTTPServer` → `http`, `server`).
pub fn words(s: &str) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' || c == '.' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower)
            {
                words.push(std::mem::take(&mut current));
            }
        }
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// `firstName` → `first_name`
pub fn to_snake_case(s: &str) -> String {
    words(s).join("_")
}

/// `first_name` → `firstName`
pub fn to_camel_case(s: &str) -> String {
    let mut out = String::new();
    for (i, word) in words(s).iter().enumerate() {
        if i == 0 {
            out.push_str(word);
        } else {
            out.push_str(&capitalize(word));
        }
    }
    out
}

/// `first_name` → `first name`
pub fn to_space_separated(s: &str) -> String {
    words(s).join(" ")
}

/// Uppercase the first character
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Human-readable label for an identifier (`first_name` → `First Name`)
pub fn display_name(s: &str) -> String {
    words(s)
        .iter()
        .map(|w| capitalize(w))
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_vowel(c: char) -> bool {
    matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u')
}

fn is_uncountable(word: &str) -> bool {
    UNCOUNTABLE.iter().any(|u| u.eq_ignore_ascii_case(word))
}

fn match_case(original: &str, replacement: &str) -> String {
    if original.chars().next().is_some_and(char::is_uppercase) {
        capitalize(replacement)
    } else {
        replacement.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("contact", "contacts")]
    #[test_case("company", "companies")]
    #[test_case("day", "days")]
    #[test_case("box", "boxes")]
    #[test_case("batch", "batches")]
    #[test_case("status", "statuses")]
    #[test_case("person", "people")]
    #[test_case("contacts", "contacts")]
    #[test_case("metadata", "metadata")]
    fn test_plural(input: &str, expected: &str) {
        assert_eq!(plural(input), expected);
    }

    #[test_case("contacts", "contact")]
    #[test_case("companies", "company")]
    #[test_case("boxes", "box")]
    #[test_case("batches", "batch")]
    #[test_case("statuses", "status")]
    #[test_case("People", "Person")]
    #[test_case("address", "address")]
    #[test_case("contact", "contact")]
    fn test_singular(input: &str, expected: &str) {
        assert_eq!(singular(input), expected);
    }

    #[test]
    fn test_is_plural() {
        assert!(is_plural("contacts"));
        assert!(is_plural("companies"));
        assert!(!is_plural("contact"));
    }

    #[test_case("firstName", "first_name")]
    #[test_case("HTTPServer", "http_server")]
    #[test_case("first-name", "first_name")]
    #[test_case("Account Owner", "account_owner")]
    #[test_case("already_snake", "already_snake")]
    fn test_snake_case(input: &str, expected: &str) {
        assert_eq!(to_snake_case(input), expected);
    }

    #[test]
    fn test_camel_and_space() {
        assert_eq!(to_camel_case("first_name"), "firstName");
        assert_eq!(to_camel_case("Account Owner Id"), "accountOwnerId");
        assert_eq!(to_space_separated("lastModifiedDate"), "last modified date");
        assert_eq!(display_name("created_at"), "Created At");
        assert_eq!(capitalize("émile"), "Émile");
    }
}
