use crate::model::OrderBlock;
use regex::Regex;
use std::sync::LazyLock;

/// Customer-name labels that open an order, longest alternatives first.
pub const NAME_LABELS: &[&str] = &["اسم العميل", "الإسم", "الاسم", "الأسم"];

static NAME_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives = NAME_LABELS.join("|");
    Regex::new(&format!(r"(?m)(?:^|[ \t])(?P<label>(?:{alternatives})[ \t]*:)"))
        .expect("name label pattern is valid")
});

/// Result of splitting a script into order blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segmentation {
    pub blocks: Vec<OrderBlock>,
    /// Text before the first name label, if any. Never part of an order.
    pub preamble: Option<String>,
    /// Labels that were followed by nothing before the next label.
    pub empty_spans: usize,
}

/// Split normalized text into one block per customer-name label.
///
/// Empty spans are dropped, so the block count equals the label count for
/// any script where every label carries content. Zero labels yields zero
/// blocks; the caller reports that as "nothing parsed".
pub fn segment(text: &str) -> Segmentation {
    let labels: Vec<(usize, usize, String)> = NAME_LABEL_RE
        .captures_iter(text)
        .filter_map(|cap| cap.name("label"))
        .map(|m| (m.start(), m.end(), m.as_str().to_string()))
        .collect();

    let Some(&(first_start, _, _)) = labels.first() else {
        return Segmentation::default();
    };

    let preamble = Some(text[..first_start].trim())
        .filter(|p| !p.is_empty())
        .map(str::to_string);

    let mut blocks = Vec::with_capacity(labels.len());
    let mut empty_spans = 0;
    for (i, (_, end, label)) in labels.iter().enumerate() {
        let stop = labels.get(i + 1).map(|next| next.0).unwrap_or(text.len());
        let body = text[*end..stop].trim();
        if body.is_empty() {
            empty_spans += 1;
            continue;
        }
        blocks.push(OrderBlock {
            index: blocks.len(),
            label: label.clone(),
            body: body.to_string(),
        });
    }

    Segmentation {
        blocks,
        preamble,
        empty_spans,
    }
}

/// Number of name labels in the text.
pub fn count_name_labels(text: &str) -> usize {
    NAME_LABEL_RE.captures_iter(text).count()
}
