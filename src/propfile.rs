// Property File Parser
// Parses key=value setup files with optional [section] headers

use std::collections::HashMap;

/// Parse a property file string, invoking `handler` for each key-value pair.
///
/// Keys keep their case. Text after `#` is a comment. A `[section]` line
/// makes every following key reported as `section.key` until the next
/// header; keys before the first header have no prefix. Lines without `=`
/// are skipped with a warning.
pub fn parse_propfile(data: &str, handler: &mut dyn FnMut(&str, &str)) {
    let mut section = String::new();

    for (number, raw_line) in data.lines().enumerate() {
        let line = match raw_line.find('#') {
            Some(pos) => &raw_line[..pos],
            None => raw_line,
        }
        .trim();
        if line.is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix('[') {
            match rest.strip_suffix(']') {
                Some(name) => section = name.trim().to_string(),
                None => log::warn!("Unterminated section header on line {}", number + 1),
            }
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            log::warn!("Key without value on line {}", number + 1);
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            log::warn!("Value without key on line {}", number + 1);
            continue;
        }

        if section.is_empty() {
            handler(key, value.trim());
        } else {
            handler(&format!("{}.{}", section, key), value.trim());
        }
    }
}

/// Collect a property file into a map keyed by lowercase `section.key`.
pub fn parse_to_map(data: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    parse_propfile(data, &mut |key, value| {
        map.insert(key.to_lowercase(), value.to_string());
    });
    map
}
