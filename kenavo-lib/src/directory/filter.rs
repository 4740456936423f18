use std::{
    collections::{BTreeMap, BTreeSet},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use tracing::debug;

use crate::{Error, Result, directory::Profile};

/// One of the filterable dimensions of the directory.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Facet {
    /// `year_graduated`, compared as written
    Year,
    Location,
    /// Company derived from `designation_organisation`
    Industry,
}

impl Facet {
    pub fn parse(name: &str) -> Result<Self> {
        Self::from_str(name.trim()).map_err(|_| Error::UnknownFacet(name.to_string()))
    }
}

/// Multi-select filter over the three facets.
///
/// Facets combine with AND, values selected within one facet combine with OR. A facet with
/// nothing selected doesn't constrain anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    years: BTreeSet<String>,
    locations: BTreeSet<String>,
    industries: BTreeSet<String>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `value` in `facet`, or deselect it if it was already selected.
    pub fn toggle(&mut self, facet: Facet, value: &str) {
        let selection = self.selection_mut(facet);
        if !selection.remove(value) {
            selection.insert(value.to_string());
        }
    }

    pub fn remove(&mut self, facet: Facet, value: &str) {
        self.selection_mut(facet).remove(value);
    }

    pub fn clear_all(&mut self) {
        self.years.clear();
        self.locations.clear();
        self.industries.clear();
    }

    pub fn selected(&self, facet: Facet) -> &BTreeSet<String> {
        match facet {
            Facet::Year => &self.years,
            Facet::Location => &self.locations,
            Facet::Industry => &self.industries,
        }
    }

    pub fn is_selected(&self, facet: Facet, value: &str) -> bool {
        self.selected(facet).contains(value)
    }

    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }

    /// Total number of selected values across all facets.
    pub fn active_count(&self) -> usize {
        self.years.len() + self.locations.len() + self.industries.len()
    }

    pub fn matches(&self, profile: &Profile) -> bool {
        Facet::iter().all(|facet| {
            let selection = self.selected(facet);
            selection.is_empty()
                || profile
                    .facet_value(facet)
                    .is_some_and(|value| selection.contains(value))
        })
    }

    /// Keep the profiles that satisfy every facet with a selection, preserving order.
    pub fn apply<'a, I>(&self, records: I) -> Vec<&'a Profile>
    where
        I: IntoIterator<Item = &'a Profile>,
    {
        let results: Vec<&Profile> = records.into_iter().filter(|p| self.matches(p)).collect();

        debug!(
            "Applied {} filter selections, {} profiles remain",
            self.active_count(),
            results.len()
        );

        results
    }

    fn selection_mut(&mut self, facet: Facet) -> &mut BTreeSet<String> {
        match facet {
            Facet::Year => &mut self.years,
            Facet::Location => &mut self.locations,
            Facet::Industry => &mut self.industries,
        }
    }
}

/// A value present in some facet and how many profiles carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetOption {
    pub value: String,
    pub count: usize,
}

/// The distinct values of each facet in a collection, sorted ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FacetOptions {
    pub years: Vec<FacetOption>,
    pub locations: Vec<FacetOption>,
    pub industries: Vec<FacetOption>,
}

impl FacetOptions {
    pub fn get(&self, facet: Facet) -> &[FacetOption] {
        match facet {
            Facet::Year => &self.years,
            Facet::Location => &self.locations,
            Facet::Industry => &self.industries,
        }
    }

    pub fn count(&self, facet: Facet, value: &str) -> usize {
        self.get(facet)
            .iter()
            .find(|option| option.value == value)
            .map_or(0, |option| option.count)
    }
}

/// Collect the facet values present in `records`. Profiles without a value for a facet are
/// left out of that facet's options.
pub fn available_options<'a, I>(records: I) -> FacetOptions
where
    I: IntoIterator<Item = &'a Profile>,
{
    let mut counts: BTreeMap<Facet, BTreeMap<&str, usize>> = BTreeMap::new();

    for profile in records {
        for facet in Facet::iter() {
            if let Some(value) = profile.facet_value(facet) {
                *counts.entry(facet).or_default().entry(value).or_default() += 1;
            }
        }
    }

    let mut take = |facet: Facet| -> Vec<FacetOption> {
        counts
            .remove(&facet)
            .unwrap_or_default()
            .into_iter()
            .map(|(value, count)| FacetOption {
                value: value.to_string(),
                count,
            })
            .collect()
    };

    FacetOptions {
        years: take(Facet::Year),
        locations: take(Facet::Location),
        industries: take(Facet::Industry),
    }
}
