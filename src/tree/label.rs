//! Display label derivation from declaration keys.

/// Derive a display label from a programmatic identifier.
///
/// Splits on case boundaries, underscores, and dashes, then renders the
/// words capitalized and space-separated: `loadModules`, `load_modules`,
/// and `LoadModules` all become "Load modules". All-caps runs are kept as
/// acronyms (`parseHTTPHeaders` → "Parse HTTP headers").
pub fn humanize(key: &str) -> String {
    let words = split_words(key);
    let mut label = String::with_capacity(key.len() + words.len());

    for (i, word) in words.iter().enumerate() {
        if i > 0 {
            label.push(' ');
        }
        if i == 0 {
            label.push_str(&capitalize(word));
        } else if is_acronym(word) {
            label.push_str(word);
        } else {
            label.push_str(&word.to_lowercase());
        }
    }

    label
}

fn split_words(key: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let chars: Vec<char> = key.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' || c == ' ' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            // Boundary: lower→Upper, or the last capital of an acronym run
            // followed by a lowercase letter (HTTPServer → HTTP | Server).
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower)
            {
                words.push(std::mem::take(&mut current));
            }
        }

        current.push(c);
    }

    if !current.is_empty() {
        words.push(current);
    }

    words
}

fn capitalize(word: &str) -> String {
    if is_acronym(word) {
        return word.to_string();
    }
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

fn is_acronym(word: &str) -> bool {
    word.len() > 1 && word.chars().all(|c| c.is_uppercase() || c.is_ascii_digit())
}
