use itertools::Itertools;

use crate::model::{City, PaginationMetadata};

/// Filters for the city collection, normalised so that blank input counts
/// as absent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CityFilter {
    name: Option<String>,
    search_query: Option<String>,
}

impl CityFilter {
    pub fn new(name: Option<&str>, search_query: Option<&str>) -> Self {
        Self {
            name: normalize(name),
            search_query: normalize(search_query),
        }
    }

    /// Exact, case-sensitive name match
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Case-sensitive substring matched against name or description
    pub fn search_query(&self) -> Option<&str> {
        self.search_query.as_deref()
    }

    pub fn matches(&self, city: &City) -> bool {
        if let Some(name) = &self.name {
            if city.name != *name {
                return false;
            }
        }

        if let Some(term) = &self.search_query {
            let in_name = city.name.contains(term.as_str());
            let in_description = city
                .description
                .as_deref()
                .is_some_and(|description| description.contains(term.as_str()));
            if !in_name && !in_description {
                return false;
            }
        }

        true
    }
}

fn normalize(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// One page of a collection. Construct through [`PageRequest::clamped`] at
/// the request boundary so that `page_size` is always in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page_number: u32,
    page_size: u32,
}

impl PageRequest {
    pub fn clamped(page_number: Option<u32>, page_size: Option<u32>, default_size: u32, max_size: u32) -> Self {
        let max_size = max_size.max(1);
        Self {
            page_number: page_number.unwrap_or(1).max(1),
            page_size: page_size.unwrap_or(default_size).clamp(1, max_size),
        }
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn skip(&self) -> u64 {
        u64::from(self.page_size) * u64::from(self.page_number - 1)
    }

    pub fn take(&self) -> u64 {
        u64::from(self.page_size)
    }

    pub fn metadata(&self, total_item_count: u64) -> PaginationMetadata {
        PaginationMetadata::new(total_item_count, self.page_size, self.page_number)
    }
}

/// Order cities by name, ties broken by id
pub fn order_cities<'a, I>(cities: I) -> Vec<City>
where
    I: IntoIterator<Item = &'a City>,
{
    cities
        .into_iter()
        .sorted_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)))
        .cloned()
        .collect()
}

/// Cut one page out of an already filtered and ordered sequence
pub fn paginate<T>(items: Vec<T>, page: &PageRequest) -> (Vec<T>, PaginationMetadata) {
    let total_item_count = items.len() as u64;
    let skip = usize::try_from(page.skip()).unwrap_or(usize::MAX);
    let take = usize::try_from(page.take()).unwrap_or(usize::MAX);
    let items = items.into_iter().skip(skip).take(take).collect();
    (items, page.metadata(total_item_count))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cities() -> Vec<City> {
        vec![
            City::new(1, "New York City", Some("The one with the big park.")),
            City::new(2, "Melbourne", Some("The one with the river bank.")),
            City::new(3, "Paris", Some("The one with the big tower.")),
            City::new(4, "Antwerp", None),
        ]
    }

    fn ids(filter: &CityFilter) -> Vec<i32> {
        cities().iter().filter(|c| filter.matches(c)).map(|c| c.id).collect()
    }

    #[test]
    fn test_blank_filters_are_absent() {
        let filter = CityFilter::new(Some("   "), Some(""));
        assert_eq!(filter.name(), None);
        assert_eq!(filter.search_query(), None);
        assert_eq!(ids(&filter), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_name_is_trimmed_exact_match() {
        assert_eq!(ids(&CityFilter::new(Some("  Paris "), None)), vec![3]);
        assert!(ids(&CityFilter::new(Some("paris"), None)).is_empty());
        assert!(ids(&CityFilter::new(Some("Par"), None)).is_empty());
    }

    #[test]
    fn test_search_matches_name_or_description() {
        assert_eq!(ids(&CityFilter::new(None, Some("big"))), vec![1, 3]);
        assert_eq!(ids(&CityFilter::new(None, Some("Melb"))), vec![2]);
        assert!(ids(&CityFilter::new(None, Some("BIG"))).is_empty());
    }

    #[test]
    fn test_combined_filters_intersect() {
        let name_only: Vec<_> = ids(&CityFilter::new(Some("Paris"), None));
        let search_only: Vec<_> = ids(&CityFilter::new(None, Some("big")));
        let combined = ids(&CityFilter::new(Some("Paris"), Some("big")));
        let intersection: Vec<_> = name_only
            .into_iter()
            .filter(|id| search_only.contains(id))
            .collect();
        assert_eq!(combined, intersection);
        assert!(ids(&CityFilter::new(Some("Paris"), Some("park"))).is_empty());
    }

    #[test]
    fn test_page_request_clamps() {
        let page = PageRequest::clamped(None, None, 10, 20);
        assert_eq!((page.page_number(), page.page_size()), (1, 10));

        let page = PageRequest::clamped(Some(0), Some(500), 10, 20);
        assert_eq!((page.page_number(), page.page_size()), (1, 20));

        let page = PageRequest::clamped(Some(3), Some(0), 10, 20);
        assert_eq!((page.page_number(), page.page_size()), (3, 1));
        assert_eq!(page.skip(), 2);
    }

    #[test]
    fn test_paginate_last_and_beyond() {
        let items: Vec<u32> = (1..=25).collect();

        let (page, metadata) = paginate(items.clone(), &PageRequest::clamped(Some(3), Some(10), 10, 20));
        assert_eq!(page, vec![21, 22, 23, 24, 25]);
        assert_eq!(metadata.total_item_count(), 25);
        assert_eq!(metadata.total_page_count(), 3);

        let (page, metadata) = paginate(items, &PageRequest::clamped(Some(9), Some(10), 10, 20));
        assert!(page.is_empty());
        assert_eq!(metadata.total_item_count(), 25);
        assert_eq!(metadata.current_page(), 9);
    }

    #[test]
    fn test_order_breaks_ties_by_id() {
        let mut list = cities();
        list.push(City::new(0, "Paris", Some("Texas")));
        let ordered: Vec<_> = order_cities(&list).into_iter().map(|c| c.id).collect();
        assert_eq!(ordered, vec![4, 2, 1, 0, 3]);
    }
}
