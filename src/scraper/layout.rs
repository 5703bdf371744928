use scraper::Selector;

use crate::scraper::ExtractError;

/// CSS selectors describing where listing fields live on a search page.
/// Defaults match the classified search result markup:
///
/// ```text
/// p.result-info
///  └── span.result-meta          <- one per listing
///       ├── span.result-price    "$1,234"
///       ├── span.housing         "2br - 850ft<sup>2</sup> -"
///       └── span.result-hood     " (Downtown)"
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingLayout {
    pub container: String,
    pub price: String,
    pub size: String,
    pub neighborhood: String,
}

impl Default for ListingLayout {
    fn default() -> Self {
        Self {
            container: ".result-meta".to_string(),
            price: ".result-price".to_string(),
            size: ".housing".to_string(),
            neighborhood: ".result-hood".to_string(),
        }
    }
}

impl ListingLayout {
    /// Parses every selector once, up front.
    pub fn compile(&self) -> Result<CompiledLayout, ExtractError> {
        Ok(CompiledLayout {
            container: compile_selector(&self.container)?,
            price: compile_selector(&self.price)?,
            size: compile_selector(&self.size)?,
            neighborhood: compile_selector(&self.neighborhood)?,
        })
    }
}

/// Named sub-elements looked up inside a listing node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSelector {
    Price,
    Size,
    Neighborhood,
}

impl FieldSelector {
    pub fn name(self) -> &'static str {
        match self {
            FieldSelector::Price => "price",
            FieldSelector::Size => "size",
            FieldSelector::Neighborhood => "neighborhood",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompiledLayout {
    container: Selector,
    price: Selector,
    size: Selector,
    neighborhood: Selector,
}

impl CompiledLayout {
    pub fn container(&self) -> &Selector {
        &self.container
    }

    pub fn field(&self, field: FieldSelector) -> &Selector {
        match field {
            FieldSelector::Price => &self.price,
            FieldSelector::Size => &self.size,
            FieldSelector::Neighborhood => &self.neighborhood,
        }
    }
}

fn compile_selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::Selector {
        selector: css.to_string(),
        reason: e.to_string(),
    })
}
