use std::num::NonZeroUsize;

use serde::Deserialize;

pub const QUESTIONS_PER_PAGE: usize = 10;

/// 1-indexed page number. Zero, negative and non-numeric values are rejected while
/// deserializing, so every `Page` addresses a real slice of the result set.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(try_from = "i64")]
pub struct Page(NonZeroUsize);

impl Page {
    pub const FIRST: Page = Page(NonZeroUsize::MIN);

    pub fn number(self) -> usize {
        self.0.get()
    }

    fn offset(self) -> usize {
        (self.number() - 1).saturating_mul(QUESTIONS_PER_PAGE)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::FIRST
    }
}

impl TryFrom<i64> for Page {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        usize::try_from(value)
            .ok()
            .and_then(NonZeroUsize::new)
            .map(Page)
            .ok_or_else(|| format!("Wrong page {value}, pages start at 1"))
    }
}

/// `?page=N` query string shared by every paginated listing.
#[derive(Deserialize, Debug, Default)]
pub struct PageQuery {
    #[serde(default)]
    pub page: Page,
}

/// Returns the items of `page`, empty when the page lies past the end of `items`.
pub fn paginate<T>(items: Vec<T>, page: Page) -> Vec<T> {
    items
        .into_iter()
        .skip(page.offset())
        .take(QUESTIONS_PER_PAGE)
        .collect()
}
