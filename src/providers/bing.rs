//! Bing provider — a decent fallback source.

use super::{direct_link, Recipe, ScrapedProvider, SelectorSet};

const SELECTORS: SelectorSet = SelectorSet {
    result: "li.b_algo",
    title: "h2",
    snippet: "div.b_caption p",
    link: "a",
    link_attr: "href",
};

/// Build the Bing provider adapter.
pub fn bing() -> ScrapedProvider {
    ScrapedProvider::new(
        "Bing",
        Recipe::GetQuery {
            base: "https://www.bing.com/search",
            param: "q",
        },
        SELECTORS,
        direct_link,
    )
}
