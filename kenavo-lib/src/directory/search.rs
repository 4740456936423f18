use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use tracing::debug;

use crate::{Error, directory::Profile};

/// Text fields of a [`Profile`] that free-text search can look at.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SearchField {
    Name,
    Location,
    CurrentJob,
    DesignationOrganisation,
    Nicknames,
    Company,
    Bio,
}

impl SearchField {
    /// Parse a field name, reporting unknown names as [`Error::UnknownSearchField`].
    pub fn parse(name: &str) -> crate::Result<Self> {
        Self::from_str(name.trim()).map_err(|_| Error::UnknownSearchField(name.to_string()))
    }

    /// Column name in the backing table.
    pub fn column(self) -> &'static str {
        self.into()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Fields checked, in order
    pub fields: Vec<SearchField>,
    pub case_sensitive: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            fields: vec![
                SearchField::Name,
                SearchField::Location,
                SearchField::CurrentJob,
                SearchField::DesignationOrganisation,
                SearchField::Nicknames,
            ],
            case_sensitive: false,
        }
    }
}

/// Substring search over a fixed set of profile fields.
///
/// This is a predicate, not a ranking: a profile either matches or it doesn't, and results
/// keep the order of the input.
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    options: SearchOptions,
}

impl SearchIndex {
    pub fn new(options: SearchOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Return the profiles that match `query`, in their original order. A blank query
    /// matches everything.
    pub fn search<'a>(&self, records: &'a [Profile], query: &str) -> Vec<&'a Profile> {
        let Some(needle) = self.normalize_query(query) else {
            return records.iter().collect();
        };

        let results: Vec<&Profile> = records
            .iter()
            .filter(|profile| self.contains(profile, &needle))
            .collect();

        debug!(
            "Search for {:?} matched {} of {} profiles",
            needle,
            results.len(),
            records.len()
        );

        results
    }

    pub fn matches(&self, profile: &Profile, query: &str) -> bool {
        match self.normalize_query(query) {
            Some(needle) => self.contains(profile, &needle),
            None => true,
        }
    }

    fn normalize_query(&self, query: &str) -> Option<String> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(self.fold(trimmed))
        }
    }

    fn contains(&self, profile: &Profile, needle: &str) -> bool {
        self.options
            .fields
            .iter()
            .filter_map(|field| profile.field(*field))
            .any(|value| self.fold(value).contains(needle))
    }

    fn fold(&self, value: &str) -> String {
        if self.options.case_sensitive {
            value.to_string()
        } else {
            value.to_lowercase()
        }
    }
}

#[cfg(test)]
mod test {
    use super::{SearchField, SearchIndex, SearchOptions};
    use crate::{Error, directory::Profile};

    fn profiles() -> Vec<Profile> {
        vec![
            Profile {
                location: Some("Chennai".to_string()),
                ..Profile::new(1, "Alice Smith")
            },
            Profile {
                current_job: Some("Pilot".to_string()),
                nicknames: Some("Bobby".to_string()),
                ..Profile::new(2, "Bob Lee")
            },
            Profile {
                designation_organisation: Some("CTO / Acme Corp".to_string()),
                bio: Some("Loves chess".to_string()),
                ..Profile::new(3, "Amy Ng")
            },
        ]
    }

    fn ids(results: &[&Profile]) -> Vec<i64> {
        results.iter().map(|p| p.id).collect()
    }

    #[test]
    fn test_blank_query_returns_everything() {
        let records = profiles();
        let index = SearchIndex::default();

        assert_eq!(ids(&index.search(&records, "")), vec![1, 2, 3]);
        assert_eq!(ids(&index.search(&records, "   \t")), vec![1, 2, 3]);
    }

    #[test]
    fn test_case_insensitive_by_default() {
        let records = profiles();
        let index = SearchIndex::default();

        assert_eq!(ids(&index.search(&records, "  CHENNAI ")), vec![1]);
        assert_eq!(ids(&index.search(&records, "acme")), vec![3]);
        assert_eq!(ids(&index.search(&records, "bobby")), vec![2]);
    }

    #[test]
    fn test_only_configured_fields_are_searched() {
        let records = profiles();
        let index = SearchIndex::default();

        assert!(index.search(&records, "chess").is_empty());

        let index = SearchIndex::new(SearchOptions {
            fields: vec![SearchField::Bio],
            case_sensitive: false,
        });
        assert_eq!(ids(&index.search(&records, "chess")), vec![3]);
    }

    #[test]
    fn test_case_sensitive() {
        let records = profiles();
        let index = SearchIndex::new(SearchOptions {
            case_sensitive: true,
            ..SearchOptions::default()
        });

        assert!(index.search(&records, "alice").is_empty());
        assert_eq!(ids(&index.search(&records, "Alice")), vec![1]);
    }

    #[test]
    fn test_stable_and_repeatable() {
        let records = profiles();
        let index = SearchIndex::default();

        let first = ids(&index.search(&records, "a"));
        let second = ids(&index.search(&records, "a"));

        assert_eq!(first, vec![1, 3]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_matches_agrees_with_search() {
        let records = profiles();
        let index = SearchIndex::default();

        for query in ["a", "lee", "pilot", "zzz", ""] {
            let found = ids(&index.search(&records, query));
            let expected: Vec<i64> = records
                .iter()
                .filter(|p| index.matches(p, query))
                .map(|p| p.id)
                .collect();
            assert_eq!(found, expected, "query {query:?}");
        }
    }

    #[test]
    fn test_parse_field() {
        assert_eq!(
            SearchField::parse("current_job").unwrap(),
            SearchField::CurrentJob
        );
        assert_eq!(SearchField::DesignationOrganisation.column(), "designation_organisation");
        assert!(matches!(
            SearchField::parse("salary"),
            Err(Error::UnknownSearchField(_))
        ));
    }
}
