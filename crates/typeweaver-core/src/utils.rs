//! String helpers shared by the naming policy and the type registry

/// Convert a string to snake_case
pub fn to_snake_case(s: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_is_lowercase = false;

    for ch in s.chars() {
        if ch.is_uppercase() {
            // A lowercase -> uppercase transition starts a new word
            if prev_is_lowercase && !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            current.extend(ch.to_lowercase());
            prev_is_lowercase = false;
        } else if ch.is_alphanumeric() {
            current.push(ch);
            prev_is_lowercase = ch.is_lowercase();
        } else {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_is_lowercase = false;
        }
    }
    if !current.is_empty() {
        words.push(current);
    }

    words.join("_")
}

/// Convert a string to UpperCamelCase (PascalCase)
pub fn to_upper_camel_case(s: &str) -> String {
    to_snake_case(s)
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            }
        })
        .collect()
}

/// Last `.`-separated segment of a fully-qualified name
pub fn simple_name(fully_qualified_name: &str) -> &str {
    fully_qualified_name
        .rsplit_once('.')
        .map_or(fully_qualified_name, |(_, name)| name)
}

/// Everything before the last `.` of a fully-qualified name (empty for the root namespace)
pub fn namespace_of(fully_qualified_name: &str) -> &str {
    fully_qualified_name
        .rsplit_once('.')
        .map_or("", |(namespace, _)| namespace)
}
