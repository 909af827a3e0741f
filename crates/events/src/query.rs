//! Listing query model: filters, sorting, pagination.

use core::cmp::Ordering;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use skillbridge_core::DomainError;

use crate::event::{Category, Event};

/// Price bucket filter: `free` means exactly zero, `paid` strictly positive.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PriceFilter {
    Free,
    Paid,
}

impl FromStr for PriceFilter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "free" => Ok(PriceFilter::Free),
            "paid" => Ok(PriceFilter::Paid),
            other => Err(DomainError::validation(format!(
                "unknown price filter '{other}': must be free or paid"
            ))),
        }
    }
}

/// Fields an event listing may be sorted by.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Date,
    Price,
    Title,
    CreatedAt,
}

impl SortField {
    pub fn compare(&self, a: &Event, b: &Event) -> Ordering {
        match self {
            SortField::Date => a.date.cmp(&b.date),
            SortField::Price => a.price.partial_cmp(&b.price).unwrap_or(Ordering::Equal),
            SortField::Title => a.title.cmp(&b.title),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        }
    }
}

impl FromStr for SortField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "date" => Ok(SortField::Date),
            "price" => Ok(SortField::Price),
            "title" => Ok(SortField::Title),
            "created_at" | "createdat" => Ok(SortField::CreatedAt),
            other => Err(DomainError::validation(format!(
                "cannot sort by '{other}': must be one of date, price, title, created_at"
            ))),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(DomainError::validation(format!(
                "unknown sort order '{other}': must be asc or desc"
            ))),
        }
    }
}

/// Listing filters. All events are public; filters only narrow the set.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Case-insensitive substring match over title OR description.
    pub search: Option<String>,
    pub category: Option<Category>,
    pub price: Option<PriceFilter>,
}

impl EventFilter {
    pub fn matches(&self, event: &Event) -> bool {
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let hit = event.title.to_lowercase().contains(&needle)
                || event.description.to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }

        if let Some(category) = self.category {
            if event.category != category {
                return false;
            }
        }

        match self.price {
            Some(PriceFilter::Free) if event.price != 0.0 => return false,
            Some(PriceFilter::Paid) if event.price <= 0.0 => return false,
            _ => {}
        }

        true
    }
}

/// Page number + page size. Both are clamped to sane bounds.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    pub const DEFAULT_LIMIT: u32 = 10;
    pub const MAX_LIMIT: u32 = 100;

    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, Self::MAX_LIMIT),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(1, Self::DEFAULT_LIMIT)
    }
}

/// Complete listing request.
#[derive(Debug, Clone, Default)]
pub struct EventQuery {
    pub filter: EventFilter,
    pub sort: SortField,
    pub order: SortOrder,
    pub page: Pagination,
}

/// Pagination echo returned alongside a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageInfo {
    pub total: u64,
    pub page: u32,
    pub pages: u32,
}

impl PageInfo {
    pub fn new(total: u64, page: Pagination) -> Self {
        Self {
            total,
            page: page.page,
            pages: total.div_ceil(u64::from(page.limit)) as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use skillbridge_core::{EventId, UserId};

    fn event(title: &str, description: &str, category: Category, price: f64) -> Event {
        let now = Utc::now();
        Event {
            id: EventId::new(),
            title: title.to_string(),
            description: description.to_string(),
            date: now,
            price,
            category,
            skills: vec![],
            image: String::new(),
            max_attendees: 10,
            host: UserId::new(),
            attendees: vec![],
            location: "Online".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn search_is_case_insensitive_over_title_and_description() {
        let filter = EventFilter {
            search: Some("WORKshop".to_string()),
            ..Default::default()
        };

        let by_title = event("Rust Workshop", "learn rust", Category::Meetup, 0.0);
        let by_description = event("Rust", "a hands-on workshop", Category::Meetup, 0.0);
        let miss = event("Rust", "a lecture", Category::Meetup, 0.0);

        assert!(filter.matches(&by_title));
        assert!(filter.matches(&by_description));
        assert!(!filter.matches(&miss));
    }

    #[test]
    fn free_bucket_means_exactly_zero() {
        let filter = EventFilter {
            price: Some(PriceFilter::Free),
            ..Default::default()
        };

        assert!(filter.matches(&event("a", "b", Category::Course, 0.0)));
        assert!(!filter.matches(&event("a", "b", Category::Course, 0.01)));
    }

    #[test]
    fn paid_bucket_means_strictly_positive() {
        let filter = EventFilter {
            price: Some(PriceFilter::Paid),
            ..Default::default()
        };

        assert!(filter.matches(&event("a", "b", Category::Course, 5.0)));
        assert!(!filter.matches(&event("a", "b", Category::Course, 0.0)));
    }

    #[test]
    fn category_filter_is_exact() {
        let filter = EventFilter {
            category: Some(Category::Meetup),
            ..Default::default()
        };

        assert!(filter.matches(&event("a", "b", Category::Meetup, 0.0)));
        assert!(!filter.matches(&event("a", "b", Category::Workshop, 0.0)));
    }

    #[test]
    fn pagination_clamps_and_computes_offsets() {
        let p = Pagination::new(0, 0);
        assert_eq!((p.page, p.limit), (1, 1));

        let p = Pagination::new(3, 10);
        assert_eq!(p.offset(), 20);

        let p = Pagination::new(1, 10_000);
        assert_eq!(p.limit, Pagination::MAX_LIMIT);
    }

    #[test]
    fn page_info_rounds_up() {
        let info = PageInfo::new(21, Pagination::new(1, 10));
        assert_eq!(info.pages, 3);

        let info = PageInfo::new(0, Pagination::new(1, 10));
        assert_eq!(info.pages, 0);
    }
}
