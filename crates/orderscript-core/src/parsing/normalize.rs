/// Canonicalize a pasted script.
///
/// Steps:
/// 1. Map Eastern-Arabic and Persian digits (and the Arabic decimal/thousands marks) to ASCII
/// 2. Drop zero-width, bidi and BOM characters, Arabic diacritics and tatweel
/// 3. CRLF and lone CR become LF, tabs and no-break spaces become a single space
/// 4. Collapse runs of spaces, trim every line, collapse 3+ blank lines, trim the text
///
/// Total and idempotent: normalizing normalized text returns it unchanged.
pub fn normalize_text(raw: &str) -> String {
    let mut mapped = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\r' {
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            mapped.push('\n');
            continue;
        }
        if is_invisible(c) || is_arabic_mark(c) {
            continue;
        }
        match c {
            '\t' | '\u{00A0}' | '\u{2007}' | '\u{202F}' => mapped.push(' '),
            _ => mapped.push(ascii_digit(c).unwrap_or(c)),
        }
    }

    let mut out = String::with_capacity(mapped.len());
    let mut blank_run = 0;
    for line in mapped.split('\n') {
        let collapsed = collapse_spaces(line);
        if collapsed.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(&collapsed);
        out.push('\n');
    }

    out.trim().to_string()
}

/// Map only the digit glyphs, leaving everything else untouched.
pub fn normalize_digits(s: &str) -> String {
    s.chars().map(|c| ascii_digit(c).unwrap_or(c)).collect()
}

/// Comparison key for names, colors and sizes.
///
/// Lowercases, folds alef/teh-marbuta/alef-maksura variants and squeezes
/// whitespace, so "أزرق " and "ازرق" compare equal.
pub fn match_key(s: &str) -> String {
    let folded: String = s
        .chars()
        .filter(|c| !is_invisible(*c) && !is_arabic_mark(*c))
        .map(|c| match c {
            'أ' | 'إ' | 'آ' | 'ٱ' => 'ا',
            'ة' => 'ه',
            'ى' => 'ي',
            _ => ascii_digit(c).unwrap_or(c),
        })
        .flat_map(char::to_lowercase)
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collapse_spaces(line: &str) -> String {
    line.split(' ')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn ascii_digit(c: char) -> Option<char> {
    match c {
        '\u{0660}'..='\u{0669}' => char::from_digit(c as u32 - 0x0660, 10),
        '\u{06F0}'..='\u{06F9}' => char::from_digit(c as u32 - 0x06F0, 10),
        '\u{066B}' => Some('.'),
        '\u{066C}' => Some(','),
        _ => None,
    }
}

fn is_invisible(c: char) -> bool {
    matches!(
        c,
        '\u{200B}'..='\u{200F}'
            | '\u{202A}'..='\u{202E}'
            | '\u{2060}'..='\u{2069}'
            | '\u{061C}'
            | '\u{00AD}'
            | '\u{FEFF}'
    )
}

/// Harakat, superscript alef and tatweel.
fn is_arabic_mark(c: char) -> bool {
    matches!(c, '\u{064B}'..='\u{065F}' | '\u{0670}' | '\u{0640}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eastern_arabic_digits() {
        assert_eq!(normalize_text("الكميه ٢ السعر ١٥٠"), "الكميه 2 السعر 150");
    }

    #[test]
    fn test_persian_digits() {
        assert_eq!(normalize_text("۰۱۲۳۴۵۶۷۸۹"), "0123456789");
    }

    #[test]
    fn test_strips_bidi_and_zero_width() {
        assert_eq!(normalize_text("\u{200F}الاسم:\u{200B} محمد\u{FEFF}"), "الاسم: محمد");
    }

    #[test]
    fn test_strips_diacritics_and_tatweel() {
        assert_eq!(normalize_text("مُحَمَّد قمـــيص"), "محمد قميص");
    }

    #[test]
    fn test_line_endings_and_spaces() {
        let raw = "  الاسم:\t\tعلي  \r\nالعنوان:   القاهرة\rالمحافظة: الجيزة  ";
        assert_eq!(
            normalize_text(raw),
            "الاسم: علي\nالعنوان: القاهرة\nالمحافظة: الجيزة"
        );
    }

    #[test]
    fn test_blank_lines_collapsed() {
        assert_eq!(normalize_text("a\n\n\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_idempotent() {
        let raw = "\u{200F} الاسم:  أحمد\r\n\r\n\r\nالكميه ٣\tاسم تيشيرت ";
        let once = normalize_text(raw);
        assert_eq!(normalize_text(&once), once);
    }

    #[test]
    fn test_no_match_leaves_text() {
        assert_eq!(normalize_text("plain text"), "plain text");
        assert_eq!(normalize_text(""), "");
    }

    #[test]
    fn test_match_key_folds_letters() {
        assert_eq!(match_key(" أزرق "), "ازرق");
        assert_eq!(match_key("جاكيت  شتوي"), "جاكيت شتوي");
        assert_eq!(match_key("Hoodie XL"), "hoodie xl");
        assert_eq!(match_key("سترة"), "ستره");
    }
}
