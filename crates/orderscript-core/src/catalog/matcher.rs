use crate::catalog::schema::{Catalog, CatalogEntry};
use crate::model::{MatchTier, ParsedProductLine};
use crate::parsing::normalize::match_key;
use tracing::debug;

/// Catalog entry with its comparison keys computed once per resolution pass.
struct Keyed<'a> {
    entry: &'a CatalogEntry,
    name: String,
    color: String,
    size: String,
}

/// Annotate each line with its catalog match and variant flags.
///
/// Tiers, first hit wins: exact (name, color, size) with empty parsed
/// color/size acting as wildcards, then exact name, then mutual substring
/// containment. Within a tier the first entry in catalog order wins.
/// Parsed color/size are never overwritten; a differing catalog value only
/// raises `missing_color`/`missing_size`.
pub fn resolve_products(lines: &mut [ParsedProductLine], catalog: &Catalog) {
    let keyed: Vec<Keyed> = catalog
        .entries
        .iter()
        .map(|entry| Keyed {
            entry,
            name: match_key(&entry.name),
            color: match_key(&entry.color),
            size: match_key(&entry.size),
        })
        .collect();

    for line in lines.iter_mut() {
        resolve_line(line, &keyed);
    }
}

fn resolve_line(line: &mut ParsedProductLine, keyed: &[Keyed]) {
    line.resolved_product_id = None;
    line.match_tier = None;
    line.missing_size = false;
    line.missing_color = false;

    let name = match_key(&line.name);
    let color = match_key(&line.color);
    let size = match_key(&line.size);

    let Some((hit, tier)) = find_match(&name, &color, &size, keyed) else {
        line.missing_product = true;
        debug!(name = %line.name, "no catalog match");
        return;
    };

    line.missing_product = false;
    line.resolved_product_id = Some(hit.entry.id.clone());
    line.match_tier = Some(tier);
    line.missing_color = !hit.color.is_empty() && hit.color != color;
    line.missing_size = !hit.size.is_empty() && hit.size != size;

    debug!(
        name = %line.name,
        product_id = %hit.entry.id,
        tier = %tier,
        missing_color = line.missing_color,
        missing_size = line.missing_size,
        "catalog match"
    );
}

fn find_match<'k, 'a>(
    name: &str,
    color: &str,
    size: &str,
    keyed: &'k [Keyed<'a>],
) -> Option<(&'k Keyed<'a>, MatchTier)> {
    if name.is_empty() {
        return None;
    }

    let variant = keyed.iter().find(|k| {
        k.name == name
            && (color.is_empty() || k.color == color)
            && (size.is_empty() || k.size == size)
    });
    if let Some(hit) = variant {
        return Some((hit, MatchTier::ExactVariant));
    }

    if let Some(hit) = keyed.iter().find(|k| k.name == name) {
        return Some((hit, MatchTier::ExactName));
    }

    keyed
        .iter()
        .find(|k| !k.name.is_empty() && (k.name.contains(name) || name.contains(k.name.as_str())))
        .map(|hit| (hit, MatchTier::Fuzzy))
}
