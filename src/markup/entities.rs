/// Named entities recognised when decoding text and attribute values.
const NAMED_ENTITIES: &[(&str, char)] = &[
    ("nbsp", '\u{a0}'),
    ("amp", '&'),
    ("lt", '<'),
    ("gt", '>'),
    ("quot", '"'),
    ("apos", '\''),
    ("rsquo", '\u{2019}'),
    ("lsquo", '\u{2018}'),
    ("rdquo", '\u{201d}'),
    ("ldquo", '\u{201c}'),
    ("ndash", '\u{2013}'),
    ("mdash", '\u{2014}'),
    ("hellip", '\u{2026}'),
    ("copy", '\u{a9}'),
    ("reg", '\u{ae}'),
    ("trade", '\u{2122}'),
    ("bull", '\u{2022}'),
    ("middot", '\u{b7}'),
];

/// Longest entity body we try to match before giving up.
const MAX_ENTITY_LEN: usize = 10;

/// Decode character references in `text`.
///
/// Unknown or malformed references are left in place verbatim.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let decoded = after
            .find(';')
            .filter(|&semi| semi > 0 && semi <= MAX_ENTITY_LEN)
            .and_then(|semi| decode_one(&after[..semi]).map(|ch| (ch, semi)));
        match decoded {
            Some((ch, semi)) => {
                out.push(ch);
                rest = &after[semi + 1..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_one(body: &str) -> Option<char> {
    if let Some(numeric) = body.strip_prefix('#') {
        let code = if let Some(hex) = numeric
            .strip_prefix('x')
            .or_else(|| numeric.strip_prefix('X'))
        {
            u32::from_str_radix(hex, 16).ok()?
        } else {
            numeric.parse::<u32>().ok()?
        };
        return char::from_u32(code);
    }
    NAMED_ENTITIES
        .iter()
        .find(|(name, _)| *name == body)
        .map(|(_, ch)| *ch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_named_entities() {
        assert_eq!(decode_entities("a&nbsp;b"), "a\u{a0}b");
        assert_eq!(decode_entities("you&rsquo;re"), "you\u{2019}re");
        assert_eq!(decode_entities("sets &amp; clocks"), "sets & clocks");
    }

    #[test]
    fn test_decodes_numeric_entities() {
        assert_eq!(decode_entities("&#65;&#x42;"), "AB");
    }

    #[test]
    fn test_unknown_entity_is_kept() {
        assert_eq!(decode_entities("&bogus; &"), "&bogus; &");
    }

    #[test]
    fn test_ampersand_without_semicolon_is_kept() {
        assert_eq!(decode_entities("Q&A session"), "Q&A session");
    }
}
