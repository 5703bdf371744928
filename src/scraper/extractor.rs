// extractor.rs
use scraper::{ElementRef, Html};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::domain::{ListingBatch, ListingRecord, PageId, ABSENT};
use crate::scraper::layout::{CompiledLayout, FieldSelector, ListingLayout};
use crate::scraper::ExtractError;

const SIZE_DELIMITER: char = '-';
const BEDROOM_MARKER: &str = "br";
const FOOTAGE_MARKER: &str = "ft";

const BEDROOM_UNITS: &[&str] = &["br"];
// Longest first, so "sqft" is not left as "sq".
const FOOTAGE_UNITS: &[&str] = &["sqft", "ft²", "ft2", "ft"];

/// What to do with a listing whose price can't be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingPricePolicy {
    /// Fail the whole page.
    #[default]
    AbortPage,
    /// Keep the listing with `rent = -1`.
    Sentinel,
}

impl FromStr for MissingPricePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" | "abort-page" | "abort_page" => Ok(Self::AbortPage),
            "sentinel" => Ok(Self::Sentinel),
            other => Err(format!(
                "unknown missing-price policy '{other}' (expected 'abort' or 'sentinel')"
            )),
        }
    }
}

impl fmt::Display for MissingPricePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingPricePolicy::AbortPage => write!(f, "abort"),
            MissingPricePolicy::Sentinel => write!(f, "sentinel"),
        }
    }
}

/// Borrowed handle to one listing's metadata block inside a parsed document.
#[derive(Debug, Clone, Copy)]
pub struct RawListingNode<'a>(ElementRef<'a>);

/// Result of splitting a size token. At most one of the two is filled
/// from any single sub-part.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizeFields {
    pub bedrooms: Option<i64>,
    pub sq_feet: Option<i64>,
}

/// Parsed fields of one listing, before assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingFields {
    pub rent: i64,
    pub size: SizeFields,
    pub location: String,
}

pub struct ListingExtractor {
    layout: CompiledLayout,
    policy: MissingPricePolicy,
}

impl ListingExtractor {
    pub fn new(layout: &ListingLayout, policy: MissingPricePolicy) -> Result<Self, ExtractError> {
        Ok(Self {
            layout: layout.compile()?,
            policy,
        })
    }

    pub fn policy(&self) -> MissingPricePolicy {
        self.policy
    }

    /// All listing containers, in document order.
    pub fn find_listing_nodes<'a>(&self, document: &'a Html) -> Vec<RawListingNode<'a>> {
        document
            .select(self.layout.container())
            .map(RawListingNode)
            .collect()
    }

    /// Text of the first matching sub-element, or `None` if the node has none.
    pub fn extract_field(&self, node: RawListingNode<'_>, field: FieldSelector) -> Option<String> {
        let text = node
            .0
            .select(self.layout.field(field))
            .next()
            .map(element_text);

        if text.is_none() {
            debug!(field = field.name(), "field absent on listing");
        }
        text
    }

    pub fn extract(
        &self,
        document: &Html,
        source_page_id: PageId,
    ) -> Result<ListingBatch, ExtractError> {
        let nodes = self.find_listing_nodes(document);
        debug!(page_id = %source_page_id, nodes = nodes.len(), "listing nodes located");

        let mut fields = Vec::with_capacity(nodes.len());
        for (index, node) in nodes.into_iter().enumerate() {
            fields.push(self.extract_node(index, node)?);
        }

        Ok(assemble(source_page_id, fields))
    }

    /// Convenience for raw HTML already in memory (saved pages, fixtures).
    pub fn extract_html(
        &self,
        html: &str,
        source_page_id: PageId,
    ) -> Result<ListingBatch, ExtractError> {
        let document = Html::parse_document(html);
        self.extract(&document, source_page_id)
    }

    fn extract_node(
        &self,
        index: usize,
        node: RawListingNode<'_>,
    ) -> Result<ListingFields, ExtractError> {
        let price = self.extract_field(node, FieldSelector::Price);
        let rent = match parse_price(price.as_deref()) {
            Ok(rent) => rent,
            Err(e) => match self.policy {
                MissingPricePolicy::AbortPage => return Err(e.at_index(index)),
                MissingPricePolicy::Sentinel => {
                    warn!(index, raw = ?price, "unparsable price, recording sentinel");
                    ABSENT
                }
            },
        };

        let size = parse_size(self.extract_field(node, FieldSelector::Size).as_deref());
        let location =
            parse_location(self.extract_field(node, FieldSelector::Neighborhood).as_deref());

        Ok(ListingFields {
            rent,
            size,
            location,
        })
    }
}

/// Strips `$`, thousands separators and whitespace, then parses.
/// The error carries index 0; callers re-tag it with the listing position.
pub fn parse_price(raw: Option<&str>) -> Result<i64, ExtractError> {
    let fail = || ExtractError::PriceParse {
        index: 0,
        raw: raw.map(str::to_string),
    };

    let text = raw.ok_or_else(fail)?;
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, '$' | ',') && !c.is_whitespace())
        .collect();

    cleaned.parse::<i64>().map_err(|_| fail())
}

/// Splits a housing token like `"2br - 850ft"` into bedrooms and square feet.
///
/// Cases, in order:
/// 1. exactly two sub-parts: bedrooms, then square feet
/// 2. first sub-part mentions `br`: bedrooms only
/// 3. first sub-part mentions `ft`: square feet only
/// 4. anything else: neither
pub fn parse_size(raw: Option<&str>) -> SizeFields {
    let Some(raw) = raw else {
        return SizeFields::default();
    };

    let parts: Vec<String> = raw
        .split(SIZE_DELIMITER)
        .map(|p| p.trim().to_ascii_lowercase())
        .filter(|p| !p.is_empty())
        .collect();

    match parts.as_slice() {
        [beds, feet] => SizeFields {
            bedrooms: coerce_quantity(beds, BEDROOM_UNITS),
            sq_feet: coerce_quantity(feet, FOOTAGE_UNITS),
        },
        [first, ..] if first.contains(BEDROOM_MARKER) => SizeFields {
            bedrooms: coerce_quantity(first, BEDROOM_UNITS),
            sq_feet: None,
        },
        [first, ..] if first.contains(FOOTAGE_MARKER) => SizeFields {
            bedrooms: None,
            sq_feet: coerce_quantity(first, FOOTAGE_UNITS),
        },
        _ => SizeFields::default(),
    }
}

/// Neighborhood text without tag remnants, parentheses or extra whitespace.
pub fn parse_location(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };

    let unwrapped: String = strip_tags(raw)
        .chars()
        .filter(|c| !matches!(c, '(' | ')'))
        .collect();
    let cleaned = unwrapped.split_whitespace().collect::<Vec<_>>().join(" ");

    // Missing cells were serialized as "nan" by older exports.
    if cleaned.eq_ignore_ascii_case("nan") {
        String::new()
    } else {
        cleaned
    }
}

/// Builds one record per parsed node. Absent fields get their sentinel at
/// the node's own index, so alignment never shifts.
pub fn assemble(
    source_page_id: PageId,
    fields: impl IntoIterator<Item = ListingFields>,
) -> ListingBatch {
    let mut batch = ListingBatch::empty(source_page_id);

    for f in fields {
        batch.push(ListingRecord {
            source_page_id,
            rent: f.rent,
            bedrooms: f.size.bedrooms.unwrap_or(ABSENT),
            sq_feet: f.size.sq_feet.unwrap_or(ABSENT),
            location: f.location,
        });
    }

    batch
}

/// Direct text children only; nested markup like `<sup>2</sup>` is skipped.
/// Falls back to the full descendant text when the element only wraps others.
fn element_text(element: ElementRef<'_>) -> String {
    let direct: String = element
        .children()
        .filter_map(|child| child.value().as_text())
        .map(|text| &**text)
        .collect();

    if direct.trim().is_empty() {
        element.text().collect()
    } else {
        direct
    }
}

fn coerce_quantity(part: &str, units: &[&str]) -> Option<i64> {
    let mut value = part.trim();
    for unit in units {
        if let Some(stripped) = value.strip_suffix(unit) {
            value = stripped;
            break;
        }
    }

    let digits: String = value
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();

    match digits.parse::<i64>() {
        Ok(n) => Some(n),
        Err(_) => {
            debug!(part, "size sub-part is not numeric, treating as absent");
            None
        }
    }
}

/// Removes `<tag ...>` / `</tag>` spans. A `<` that doesn't open a closed
/// tag (e.g. a decoded `&lt;` in "Glendale < 5 mi") is kept as text.
fn strip_tags(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        let candidate = &rest[open..];

        let opens_tag = candidate[1..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '/' || c == '!');

        match candidate.find('>') {
            Some(close) if opens_tag => rest = &candidate[close + 1..],
            _ => {
                out.push('<');
                rest = &candidate[1..];
            }
        }
    }

    out.push_str(rest);
    out
}
