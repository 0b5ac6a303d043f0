use crate::model::{OrderBlock, ParsedOrder};
use crate::parsing::segment::NAME_LABELS;
use crate::parsing::values::coerce_decimal;
use regex::Regex;
use std::sync::LazyLock;

pub const PHONE_LABELS: &[&str] = &[
    "رقم الموبايل",
    "رقم الهاتف",
    "رقم التليفون",
    "الموبايل",
    "الهاتف",
    "التليفون",
    "التلفون",
];
pub const SECOND_PHONE_LABELS: &[&str] = &["رقم اخر", "رقم آخر", "رقم تاني", "رقم ثاني"];
pub const GOVERNORATE_LABELS: &[&str] = &["المحافظة", "المحافظه"];
pub const CITY_LABELS: &[&str] = &["المدينة", "المدينه"];
pub const ADDRESS_LABELS: &[&str] = &["العنوان بالتفصيل", "العنوان"];
pub const EMPLOYEE_LABELS: &[&str] = &["اسم الموظف", "الموظف", "الموظفة", "الموظفه"];
pub const PAGE_LABELS: &[&str] = &["البيدج", "الصفحة", "الصفحه", "البيج"];
pub const PRODUCT_LABELS: &[&str] = &[
    "تفاصيل الطلب",
    "تفاصيل الاوردر",
    "تفاصيل المنتجات",
    "المنتجات",
    "الطلب",
];
pub const NOTES_LABELS: &[&str] = &["ملاحظات", "الملاحظات"];
pub const PRICE_LABELS: &[&str] = &["السعر", "سعر المنتجات", "سعر الطلب"];
pub const SHIPPING_LABELS: &[&str] = &["الشحن", "مصاريف الشحن", "سعر الشحن"];
pub const TOTAL_LABELS: &[&str] = &[
    "الاجمالي",
    "الإجمالي",
    "الاجمالى",
    "الإجمالى",
    "الاجمالي المطلوب",
    "المطلوب",
];

/// Every label that can open a field. Used to stop multi-line fields and to
/// cut single-line values that run into a neighbouring field.
fn all_labels() -> Vec<&'static str> {
    [
        NAME_LABELS,
        PHONE_LABELS,
        SECOND_PHONE_LABELS,
        GOVERNORATE_LABELS,
        CITY_LABELS,
        ADDRESS_LABELS,
        EMPLOYEE_LABELS,
        PAGE_LABELS,
        PRODUCT_LABELS,
        NOTES_LABELS,
        PRICE_LABELS,
        SHIPPING_LABELS,
        TOTAL_LABELS,
    ]
    .concat()
}

/// Regex alternation of the labels, longest first so that
/// "الاجمالي المطلوب" wins over "الاجمالي" at the same position.
fn alternation(labels: &[&str]) -> String {
    let mut sorted = labels.to_vec();
    sorted.sort_by_key(|l| std::cmp::Reverse(l.chars().count()));
    sorted
        .iter()
        .map(|l| regex::escape(l))
        .collect::<Vec<_>>()
        .join("|")
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("field label pattern is valid")
}

/// Compiled lookups for one field's label synonyms.
struct FieldPattern {
    /// `label: value` anywhere a word can start.
    inline: Regex,
    /// `label: value` only at the start of a line.
    line_start: Regex,
}

impl FieldPattern {
    fn new(labels: &[&str]) -> Self {
        let alts = alternation(labels);
        FieldPattern {
            inline: compile(&format!(
                r"(?m)(?:^|[ \t])(?:{alts})[ \t]*:[ \t]*(?P<value>[^\n]*)"
            )),
            line_start: compile(&format!(
                r"(?m)^[ \t]*(?:{alts})[ \t]*:[ \t]*(?P<value>[^\n]*)"
            )),
        }
    }

    /// Rest of the line after the label, cut at the next inline label.
    fn single_line(&self, text: &str) -> Option<String> {
        first_value(&self.inline, text)
    }

    /// Like `single_line`, but the label must open its line.
    fn single_line_at_start(&self, text: &str) -> Option<String> {
        first_value(&self.line_start, text)
    }

    /// Everything from the label up to the next line that opens another field.
    fn multi_line(&self, text: &str) -> Option<String> {
        let value = self.line_start.captures(text)?.name("value")?;
        let start = value.start();
        let end = TERMINATOR_RE
            .find_at(text, start)
            .map(|m| m.start())
            .unwrap_or(text.len());
        let span = text[start..end].trim();
        (!span.is_empty()).then(|| span.to_string())
    }
}

fn first_value(re: &Regex, text: &str) -> Option<String> {
    re.captures_iter(text)
        .filter_map(|cap| cap.name("value"))
        .map(|m| cut_at_next_label(m.as_str()))
        .find(|v| !v.is_empty())
}

/// Drop anything from the first inline field label onwards.
pub fn cut_at_next_label(value: &str) -> String {
    match INLINE_LABEL_RE.find(value) {
        Some(m) => value[..m.start()].trim().to_string(),
        None => value.trim().to_string(),
    }
}

static INLINE_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"(?:^|[ \t])(?:{})[ \t]*:",
        alternation(&all_labels())
    ))
});

static TERMINATOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"(?m)^[ \t]*(?:{})[ \t]*:",
        alternation(&all_labels())
    ))
});

static PHONE: LazyLock<FieldPattern> = LazyLock::new(|| FieldPattern::new(PHONE_LABELS));
static SECOND_PHONE: LazyLock<FieldPattern> =
    LazyLock::new(|| FieldPattern::new(SECOND_PHONE_LABELS));
static GOVERNORATE: LazyLock<FieldPattern> =
    LazyLock::new(|| FieldPattern::new(GOVERNORATE_LABELS));
static CITY: LazyLock<FieldPattern> = LazyLock::new(|| FieldPattern::new(CITY_LABELS));
static ADDRESS: LazyLock<FieldPattern> = LazyLock::new(|| FieldPattern::new(ADDRESS_LABELS));
static EMPLOYEE: LazyLock<FieldPattern> = LazyLock::new(|| FieldPattern::new(EMPLOYEE_LABELS));
static PAGE: LazyLock<FieldPattern> = LazyLock::new(|| FieldPattern::new(PAGE_LABELS));
static PRODUCTS: LazyLock<FieldPattern> = LazyLock::new(|| FieldPattern::new(PRODUCT_LABELS));
static NOTES: LazyLock<FieldPattern> = LazyLock::new(|| FieldPattern::new(NOTES_LABELS));
static PRICE: LazyLock<FieldPattern> = LazyLock::new(|| FieldPattern::new(PRICE_LABELS));
static SHIPPING: LazyLock<FieldPattern> = LazyLock::new(|| FieldPattern::new(SHIPPING_LABELS));
static TOTAL: LazyLock<FieldPattern> = LazyLock::new(|| FieldPattern::new(TOTAL_LABELS));

static GOVERNORATE_LOOSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?m)(?:^|[ \t])[^\s:]*محافظ[^\s:]*[ \t]*:[ \t]*(?P<value>[^\n]*)")
});

static DIGIT_RUN_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"[0-9]+"));

static QUANTITY_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?m)^[ \t]*(?:الكميه|الكمية)[^\n]*"));

/// Knobs for field extraction.
#[derive(Debug, Clone, Copy)]
pub struct ExtractOptions {
    /// A first line longer than this is not trusted as the customer name.
    pub name_line_max_chars: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions {
            name_line_max_chars: 50,
        }
    }
}

/// Pull the labeled fields out of one order block.
///
/// Never fails: an absent field stays empty (or zero for money values).
/// `lines` is left empty; product details are kept raw for the line parser.
pub fn extract_fields(
    block: &OrderBlock,
    highest_existing: u64,
    options: &ExtractOptions,
) -> ParsedOrder {
    let body = block.body.as_str();
    let (phone1, phone2) = extract_phones(body);

    ParsedOrder {
        sequence_number: highest_existing
            .saturating_add(block.index as u64)
            .saturating_add(1),
        customer_name: extract_customer_name(body, options.name_line_max_chars),
        governorate: extract_governorate(body),
        address: ADDRESS
            .multi_line(body)
            .map(|a| collapse_lines(&a))
            .unwrap_or_default(),
        phone1,
        phone2,
        employee_raw: EMPLOYEE.single_line(body).unwrap_or_default(),
        page_raw: PAGE.single_line(body).unwrap_or_default(),
        notes: NOTES.multi_line(body).unwrap_or_default(),
        declared_price: money(&PRICE, body),
        declared_shipping: money(&SHIPPING, body),
        declared_total: money(&TOTAL, body),
        product_details: extract_product_details(body),
        lines: Vec::new(),
    }
}

/// First line of the block, unless it is implausibly long; then only the
/// part before the first other field label on that line.
fn extract_customer_name(body: &str, max_chars: usize) -> String {
    let first_line = body.lines().next().unwrap_or_default().trim();
    if first_line.chars().count() > max_chars || INLINE_LABEL_RE.is_match(first_line) {
        return cut_at_next_label(first_line);
    }
    first_line.to_string()
}

fn extract_governorate(body: &str) -> String {
    GOVERNORATE
        .single_line(body)
        .or_else(|| CITY.single_line(body))
        .or_else(|| first_value(&GOVERNORATE_LOOSE_RE, body))
        .unwrap_or_default()
}

/// Phone numbers from the labeled field: 11-digit runs first, otherwise any
/// run of 7+ digits. Without a phone label, mobile-looking runs anywhere in
/// the block are used.
fn extract_phones(body: &str) -> (String, String) {
    let mut phones = match PHONE.single_line(body) {
        Some(field) => phone_candidates(&field),
        None => mobile_runs(body),
    };
    if phones.len() < 2 {
        if let Some(second) = SECOND_PHONE.single_line(body) {
            for p in phone_candidates(&second) {
                if !phones.contains(&p) {
                    phones.push(p);
                }
            }
        }
    }
    let mut it = phones.into_iter();
    (it.next().unwrap_or_default(), it.next().unwrap_or_default())
}

pub fn phone_candidates(field: &str) -> Vec<String> {
    let found = runs_with_fallback(field);
    if !found.is_empty() {
        return found;
    }
    // "010 1234 5678" / "010-1234-5678"
    let joined: String = field.chars().filter(|c| *c != ' ' && *c != '-').collect();
    runs_with_fallback(&joined)
}

fn runs_with_fallback(text: &str) -> Vec<String> {
    let runs: Vec<&str> = DIGIT_RUN_RE.find_iter(text).map(|m| m.as_str()).collect();
    let eleven: Vec<String> = runs
        .iter()
        .filter(|r| r.len() == 11)
        .map(|r| r.to_string())
        .collect();
    if !eleven.is_empty() {
        return eleven;
    }
    runs.iter()
        .filter(|r| r.len() >= 7)
        .map(|r| r.to_string())
        .collect()
}

fn mobile_runs(body: &str) -> Vec<String> {
    DIGIT_RUN_RE
        .find_iter(body)
        .map(|m| m.as_str())
        .filter(|r| r.len() == 11 && r.starts_with("01"))
        .map(str::to_string)
        .collect()
}

/// The product-details field, or every quantity line when the label is missing.
fn extract_product_details(body: &str) -> String {
    if let Some(details) = PRODUCTS.multi_line(body) {
        return details;
    }
    QUANTITY_LINE_RE
        .find_iter(body)
        .map(|m| m.as_str().trim())
        .collect::<Vec<_>>()
        .join("\n")
}

fn money(field: &FieldPattern, body: &str) -> rust_decimal::Decimal {
    field
        .single_line_at_start(body)
        .map(|v| coerce_decimal(&v))
        .unwrap_or_default()
}

fn collapse_lines(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
