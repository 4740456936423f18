//! The alumni directory pipeline.
//!
//! A snapshot of [`Profile`]s flows through [`SearchIndex`] and then [`FilterSet`] to produce
//! the list the directory shows. [`AlphabetIndex`] is computed separately from the full
//! snapshot to drive jump navigation.

use std::cmp::Ordering;

use tracing::debug;

mod alphabet;
mod filter;
mod profile;
mod query;
mod search;

pub use alphabet::{AlphabetIndex, ScrollTarget};
pub use filter::{Facet, FacetOption, FacetOptions, FilterSet, available_options};
pub use profile::{Profile, ProfilePatch};
pub use query::{Order, Predicate, ProfileQuery, Window, fetch_profiles};
pub use search::{SearchField, SearchIndex, SearchOptions};

/// A loaded directory snapshot together with the user's current search and filters.
#[derive(Debug, Clone)]
pub struct Directory {
    records: Vec<Profile>,
    search: SearchIndex,
    alphabet: AlphabetIndex,
    query: String,
    filters: FilterSet,
}

impl Directory {
    /// Take ownership of a snapshot, ordering it by name.
    pub fn new(mut records: Vec<Profile>, options: SearchOptions) -> Self {
        records.sort_by(by_name);
        let alphabet = AlphabetIndex::build(&records);

        debug!("Loaded directory with {} profiles", records.len());

        Self {
            records,
            search: SearchIndex::new(options),
            alphabet,
            query: String::new(),
            filters: FilterSet::new(),
        }
    }

    pub fn records(&self) -> &[Profile] {
        &self.records
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn filters_mut(&mut self) -> &mut FilterSet {
        &mut self.filters
    }

    /// Profiles matching the current query and filters, in name order.
    pub fn view(&self) -> Vec<&Profile> {
        self.filters
            .apply(self.search.search(&self.records, &self.query))
    }

    /// Facet options over the whole directory, so choices don't vanish as filters narrow.
    pub fn options(&self) -> FacetOptions {
        available_options(&self.records)
    }

    pub fn alphabet(&self) -> &AlphabetIndex {
        &self.alphabet
    }

    /// The equivalent query for fetching the current view from the backing store.
    pub fn to_query(&self) -> ProfileQuery {
        ProfileQuery::from_filters(&self.filters, &self.query, self.search.options())
            .order_by(SearchField::Name, true)
    }
}

fn by_name(a: &Profile, b: &Profile) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then(a.id.cmp(&b.id))
}

#[cfg(test)]
mod test {
    use super::{Directory, Facet, Profile, SearchOptions};

    fn alumnus(id: i64, name: &str, year: &str, location: &str) -> Profile {
        Profile {
            year_graduated: Some(year.to_string()),
            location: Some(location.to_string()),
            ..Profile::new(id, name)
        }
    }

    fn directory() -> Directory {
        Directory::new(
            vec![
                alumnus(1, "Alice Smith", "2000", "Chennai"),
                alumnus(2, "Bob Lee", "2005", "Chennai"),
                alumnus(3, "Amy Ng", "2000", "Mumbai"),
            ],
            SearchOptions::default(),
        )
    }

    fn names(directory: &Directory) -> Vec<&str> {
        directory.view().iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_sorted_by_name() {
        let directory = directory();
        assert_eq!(names(&directory), vec!["Alice Smith", "Amy Ng", "Bob Lee"]);
    }

    #[test]
    fn test_search_then_filter() {
        let mut directory = directory();

        directory.set_query("a");
        assert_eq!(names(&directory), vec!["Alice Smith", "Amy Ng", "Bob Lee"]);

        directory.filters_mut().toggle(Facet::Year, "2000");
        assert_eq!(names(&directory), vec!["Alice Smith", "Amy Ng"]);

        directory.filters_mut().toggle(Facet::Location, "Mumbai");
        assert_eq!(names(&directory), vec!["Amy Ng"]);
    }

    #[test]
    fn test_no_results_is_not_an_error() {
        let mut directory = directory();
        directory.set_query("zzz");

        assert!(directory.view().is_empty());
    }

    #[test]
    fn test_alphabet_and_options_ignore_filters() {
        let mut directory = directory();
        directory.filters_mut().toggle(Facet::Location, "Mumbai");
        directory.set_query("amy");

        assert!(directory.alphabet().has_records('B'));
        assert_eq!(directory.options().count(Facet::Location, "Chennai"), 2);
        assert_eq!(names(&directory), vec!["Amy Ng"]);
    }

    #[test]
    fn test_to_query() {
        let mut directory = directory();
        directory.set_query("lee");
        directory.filters_mut().toggle(Facet::Year, "2005");

        let query = directory.to_query();
        let matched: Vec<i64> = directory
            .records()
            .iter()
            .filter(|p| query.matches(p))
            .map(|p| p.id)
            .collect();

        assert_eq!(matched, vec![2]);
        assert!(
            query
                .to_params()
                .contains(&("order".to_string(), "name.asc".to_string()))
        );
    }
}
