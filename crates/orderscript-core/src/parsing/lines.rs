use crate::model::{LineParseMode, ParsedProductLine};
use crate::parsing::normalize::match_key;
use crate::parsing::values::{coerce_decimal, line_amount, parse_quantity};
use regex::Regex;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

/// Keyword separator: "اللون: ازرق", "اللون ازرق", "اللون:ازرق".
const SEP: &str = r"(?:\s*:\s*|\s+)";

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("product line pattern is valid")
}

static NEW_PRODUCT_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"^(?:الكميه|الكمية|عدد|[-–•*]|[0-9]+\s*(?:[-.)×xX*])?\s*[^\s0-9.,])")
});

static STRUCTURED_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"^(?:الكميه|الكمية){SEP}(?P<qty>[0-9]+)\s+(?:ال)?اسم(?:\s+المنتج)?{SEP}(?P<name>.+?)\s+(?:ال)?لون{SEP}(?P<color>.+?)\s+(?:ال)?مقاس{SEP}(?P<size>.+?)(?:\s+السعر{SEP}(?P<price>[0-9][0-9.,]*).*)?$"
    ))
});

static ORDINAL_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"^(?:[-–•*]+|[0-9]+\s*[-.)])\s*"));

static QTY_KEYWORD_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(&format!(r"^(?:الكميه|الكمية|عدد){SEP}")));

static LEADING_QTY_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"^(?P<qty>[0-9]+)(?:\s*[xX×*])?(?:\s+|$)"));

static SIZE_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(&format!(r"(?:ال)?مقاس{SEP}(?P<size>\S+)")));

static PRICE_KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"السعر{SEP}(?P<price>[0-9][0-9.,]*)(?:\s*(?:جنيه|جم|ج\.م|ج|(?i:le|egp))\.?)?"
    ))
});

static TRAILING_PRICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?:^|\s)(?P<price>[0-9][0-9.,]*)\s*(?:جنيه|جم|ج\.م|ج|(?i:le|egp))?\.?\s*$")
});

static LETTER_SIZE_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)^(?:xs|s|m|l|xl|xxl|xxxl|[2-5]xl)$"));

/// Words that label parts of a line and never belong to the name.
const FILLER_WORDS: &[&str] = &[
    "اسم", "الاسم", "المنتج", "اللون", "لون", "المقاس", "مقاس", "السعر", "الكميه", "الكمية",
];

/// Recognized color words, stored as match keys.
static COLOR_WORDS: LazyLock<HashSet<String>> = LazyLock::new(|| {
    [
        "اسود", "سوداء", "ابيض", "بيضاء", "احمر", "حمراء", "ازرق", "زرقاء", "اخضر", "خضراء",
        "اصفر", "صفراء", "بني", "رمادي", "رصاصي", "بيج", "كحلي", "وردي", "بمبي", "موف",
        "بنفسجي", "برتقالي", "زيتي", "سيمون", "لبني", "نبيتي", "فضي", "ذهبي", "كافيه", "هافان",
        "جملي", "black", "white", "red", "blue", "green", "yellow", "brown", "gray", "grey",
        "beige", "navy", "pink", "purple", "orange", "silver", "gold",
    ]
    .iter()
    .map(|w| match_key(w))
    .collect()
});

pub fn is_color_word(token: &str) -> bool {
    COLOR_WORDS.contains(&match_key(token))
}

/// Split the product-details field into decomposed product lines.
pub fn parse_lines(details: &str) -> Vec<ParsedProductLine> {
    assemble_logical_lines(details)
        .iter()
        .map(|line| parse_line(line))
        .collect()
}

/// Merge wrapped sub-lines: a new product starts only at a sub-line that
/// begins with a quantity marker; anything else continues the current one.
pub fn assemble_logical_lines(details: &str) -> Vec<String> {
    let mut logical: Vec<String> = Vec::new();
    for sub in details.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match logical.last_mut() {
            Some(current) if !NEW_PRODUCT_RE.is_match(sub) => {
                current.push(' ');
                current.push_str(sub);
            }
            _ => logical.push(sub.to_string()),
        }
    }
    logical
}

/// Decompose one logical line, structured pattern first.
pub fn parse_line(raw: &str) -> ParsedProductLine {
    let raw = raw.trim();
    let stripped = ORDINAL_RE.replace(raw, "").trim().to_string();

    let mut line = parse_structured(&stripped).unwrap_or_else(|| parse_heuristic(&stripped));
    line.raw_text = raw.to_string();
    match line_amount(line.script_price, line.quantity) {
        Some(total) => line.script_line_total = total,
        None => {
            debug!(raw, "script price out of range, treated as absent");
            line.script_price = Decimal::ZERO;
            line.script_line_total = Decimal::ZERO;
        }
    }
    line
}

fn parse_structured(line: &str) -> Option<ParsedProductLine> {
    let cap = STRUCTURED_RE.captures(line)?;
    let field = |name: &str| {
        cap.name(name)
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default()
    };
    Some(ParsedProductLine {
        parse_mode: LineParseMode::Structured,
        quantity: parse_quantity(&field("qty")),
        name: field("name"),
        color: field("color"),
        size: field("size"),
        script_price: coerce_decimal(&field("price")),
        ..Default::default()
    })
}

fn parse_heuristic(line: &str) -> ParsedProductLine {
    let mut rest = QTY_KEYWORD_RE.replace(line, "").to_string();

    let mut quantity = 1;
    let mut quantity_defaulted = true;
    let leading = LEADING_QTY_RE
        .captures(&rest)
        .map(|cap| (parse_quantity(&cap["qty"]), cap.get(0).map_or(0, |m| m.end())));
    if let Some((qty, end)) = leading {
        quantity = qty;
        quantity_defaulted = false;
        rest = rest[end..].to_string();
    }

    let mut size = String::new();
    if let Some((value, remaining)) = take_capture(&SIZE_RE, &rest, "size") {
        size = value;
        rest = remaining;
    }

    let mut price = String::new();
    if let Some((value, remaining)) = take_capture(&PRICE_KEYWORD_RE, &rest, "price")
        .or_else(|| take_capture(&TRAILING_PRICE_RE, &rest, "price"))
    {
        price = value;
        rest = remaining;
    }

    let mut colors = Vec::new();
    let mut names = Vec::new();
    for token in rest.split_whitespace() {
        let token = token.trim_matches(|c: char| c == ':' || c == '-' || c == '،' || c == ',');
        if token.is_empty() || FILLER_WORDS.contains(&token) {
            continue;
        }
        if size.is_empty() && LETTER_SIZE_RE.is_match(token) {
            size = token.to_string();
        } else if is_color_word(token) {
            colors.push(token);
        } else {
            names.push(token);
        }
    }

    let mut name = names.join(" ");
    if name.is_empty() && colors.is_empty() {
        // Only labels were left; keep whatever the extracted fragments did not consume.
        name = rest.trim().to_string();
    }

    ParsedProductLine {
        parse_mode: LineParseMode::Heuristic,
        quantity,
        quantity_defaulted,
        name,
        color: colors.join(" "),
        size,
        script_price: coerce_decimal(&price),
        ..Default::default()
    }
}

/// Pull a named capture out of `text`, returning it and the text without the match.
fn take_capture(re: &Regex, text: &str, group: &str) -> Option<(String, String)> {
    let cap = re.captures(text)?;
    let whole = cap.get(0)?;
    let value = cap.name(group)?.as_str().trim().to_string();
    let remaining = format!("{} {}", &text[..whole.start()], &text[whole.end()..]);
    Some((value, remaining.split_whitespace().collect::<Vec<_>>().join(" ")))
}
