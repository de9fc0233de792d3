//! Collection pipeline: sort, filter, paginate
//!
//! Pure and synchronous. Runs over the base collection on every render and
//! never mutates it. Results carry full recipes, ids included, so actions
//! taken on a displayed card address the right record.

use std::fmt;
use std::str::FromStr;

use tracing::trace;

use crate::domain::Recipe;

/// Sort direction on preparation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn toggle(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => write!(f, "time ↑"),
            Self::Descending => write!(f, "time ↓"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Ascending),
            "desc" | "descending" => Ok(Self::Descending),
            other => Err(format!("unknown sort order '{}' (expected asc or desc)", other)),
        }
    }
}

/// Preparation-time range filter; exactly one is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeBucket {
    #[default]
    All,
    /// Under 30 minutes
    Under30,
    /// 30 to 60 minutes, inclusive
    From30To60,
    /// Over 60 minutes
    Over60,
}

impl TimeBucket {
    pub fn contains(self, minutes: u32) -> bool {
        match self {
            Self::All => true,
            Self::Under30 => minutes < 30,
            Self::From30To60 => (30..=60).contains(&minutes),
            Self::Over60 => minutes > 60,
        }
    }

    /// Next bucket in selector order, wrapping around
    pub fn next(self) -> Self {
        match self {
            Self::All => Self::Under30,
            Self::Under30 => Self::From30To60,
            Self::From30To60 => Self::Over60,
            Self::Over60 => Self::All,
        }
    }
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::All => "All",
            Self::Under30 => "Less than 30 minutes",
            Self::From30To60 => "30 to 60 minutes",
            Self::Over60 => "More than 60 minutes",
        };
        f.write_str(label)
    }
}

impl FromStr for TimeBucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "" | "all" => Ok(Self::All),
            "under30" | "lt30" | "lessthan30" => Ok(Self::Under30),
            "30to60" | "30-60" => Ok(Self::From30To60),
            "over60" | "gt60" | "morethan60" => Ok(Self::Over60),
            other => Err(format!(
                "unknown time bucket '{}' (expected all, under30, 30to60 or over60)",
                other
            )),
        }
    }
}

/// Everything the view depends on besides the collection itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub sort: SortOrder,
    pub bucket: TimeBucket,
    /// Applied (already debounced) search text
    pub search: String,
    pub favorites_only: bool,
    /// 1-based page number
    pub page: usize,
    pub page_size: usize,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            sort: SortOrder::default(),
            bucket: TimeBucket::default(),
            search: String::new(),
            favorites_only: false,
            page: 1,
            page_size: crate::DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of pipeline output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    pub items: Vec<Recipe>,
    /// Page actually shown, after clamping
    pub page: usize,
    /// `ceil(total_matches / page_size)`; zero when nothing matches
    pub page_count: usize,
    /// Recipes that passed every filter
    pub total_matches: usize,
}

impl PageView {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Page numbers for the pagination bar
    pub fn page_numbers(&self) -> std::ops::RangeInclusive<usize> {
        1..=self.page_count
    }
}

/// Stable sort by preparation time
pub fn sort(recipes: &[Recipe], order: SortOrder) -> Vec<&Recipe> {
    let mut sorted: Vec<&Recipe> = recipes.iter().collect();
    match order {
        SortOrder::Ascending => sorted.sort_by(|a, b| a.preparation_time.cmp(&b.preparation_time)),
        SortOrder::Descending => sorted.sort_by(|a, b| b.preparation_time.cmp(&a.preparation_time)),
    }
    sorted
}

/// Apply bucket, search and favorites filters, keeping order
pub fn filter<'a>(recipes: Vec<&'a Recipe>, query: &Query) -> Vec<&'a Recipe> {
    let needle = query.search.trim().to_lowercase();
    recipes
        .into_iter()
        .filter(|r| query.bucket.contains(r.preparation_time))
        .filter(|r| r.matches_search(&needle))
        .filter(|r| !query.favorites_only || r.favorite)
        .collect()
}

/// Number of pages for a match count; a zero page size counts as one
pub fn page_count(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1))
}

/// Run the full pipeline
///
/// Out-of-range page numbers are clamped into `1..=max(page_count, 1)` so a
/// shrinking result set never leaves the user on an empty page.
pub fn run(recipes: &[Recipe], query: &Query) -> PageView {
    trace!(count = recipes.len(), ?query, "pipeline::run: called");
    let matches = filter(sort(recipes, query.sort), query);

    let page_size = query.page_size.max(1);
    let total_matches = matches.len();
    let page_count = page_count(total_matches, page_size);
    let page = query.page.clamp(1, page_count.max(1));

    let items = matches
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .cloned()
        .collect();

    PageView {
        items,
        page,
        page_count,
        total_matches,
    }
}
