//! Typed query specification for profile reads.
//!
//! A [`ProfileQuery`] is a list of predicates plus an optional window and ordering. It can be
//! rendered into the REST table's query parameters, or evaluated against a profile in memory,
//! which keeps filter composition testable without a backend.

use reqwest::RequestBuilder;
use tracing::debug;

use crate::{
    ApiClient, Result,
    directory::{Facet, FilterSet, Profile, SearchField, SearchIndex, SearchOptions},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// The facet value equals one of `values`
    AnyOf { facet: Facet, values: Vec<String> },
    /// At least one of `fields` contains `term`
    Contains {
        fields: Vec<SearchField>,
        term: String,
        case_sensitive: bool,
    },
}

impl Predicate {
    pub fn matches(&self, profile: &Profile) -> bool {
        match self {
            Predicate::AnyOf { facet, values } => profile
                .facet_value(*facet)
                .is_some_and(|value| values.iter().any(|v| v == value)),
            Predicate::Contains {
                fields,
                term,
                case_sensitive,
            } => SearchIndex::new(SearchOptions {
                fields: fields.clone(),
                case_sensitive: *case_sensitive,
            })
            .matches(profile, term),
        }
    }

    /// Whether the backing store can evaluate this predicate. Derived facets can't be.
    pub fn is_pushdown(&self) -> bool {
        match self {
            Predicate::AnyOf { facet, .. } => facet_column(*facet).is_some(),
            Predicate::Contains { .. } => true,
        }
    }

    /// Whether the store's answer for this predicate is exactly what [`Predicate::matches`]
    /// gives. A literal `*` can only be sent as a single-character wildcard, and a search over
    /// no fields can't be expressed at all, so both come back as a superset.
    pub fn is_exact(&self) -> bool {
        match self {
            Predicate::AnyOf { .. } => self.is_pushdown(),
            Predicate::Contains { fields, term, .. } => {
                !fields.is_empty() && !term.contains('*')
            }
        }
    }

    fn to_param(&self) -> Option<(String, String)> {
        match self {
            Predicate::AnyOf { facet, values } => {
                let column = facet_column(*facet)?;
                let list: Vec<String> = values.iter().map(|v| quote(v, true)).collect();
                Some((column.to_string(), format!("in.({})", list.join(","))))
            }
            Predicate::Contains {
                fields,
                term,
                case_sensitive,
            } => {
                if fields.is_empty() {
                    return None;
                }
                let op = if *case_sensitive { "like" } else { "ilike" };
                let pattern = format!("*{}*", escape_like(term.trim()));
                let clauses: Vec<String> = fields
                    .iter()
                    .map(|field| format!("{}.{op}.{}", field.column(), quote(&pattern, false)))
                    .collect();
                Some(("or".to_string(), format!("({})", clauses.join(","))))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub offset: usize,
    pub limit: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub field: SearchField,
    pub ascending: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileQuery {
    predicates: Vec<Predicate>,
    window: Option<Window>,
    order: Option<Order>,
}

impl ProfileQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the query equivalent to searching for `query` and then applying `filters`.
    pub fn from_filters(filters: &FilterSet, query: &str, options: &SearchOptions) -> Self {
        let mut spec = Self::new();

        if !query.trim().is_empty() {
            spec = spec.search(&options.fields, query, options.case_sensitive);
        }

        for facet in [Facet::Year, Facet::Location, Facet::Industry] {
            let selected = filters.selected(facet);
            if !selected.is_empty() {
                spec = spec.any_of(facet, selected.iter().map(String::as_str));
            }
        }

        spec
    }

    pub fn any_of<'a, I>(mut self, facet: Facet, values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.predicates.push(Predicate::AnyOf {
            facet,
            values: values.into_iter().map(str::to_string).collect(),
        });
        self
    }

    pub fn eq(self, facet: Facet, value: &str) -> Self {
        self.any_of(facet, [value])
    }

    pub fn search(mut self, fields: &[SearchField], term: &str, case_sensitive: bool) -> Self {
        self.predicates.push(Predicate::Contains {
            fields: fields.to_vec(),
            term: term.trim().to_string(),
            case_sensitive,
        });
        self
    }

    pub fn range(mut self, offset: usize, limit: usize) -> Self {
        self.window = Some(Window { offset, limit });
        self
    }

    pub fn order_by(mut self, field: SearchField, ascending: bool) -> Self {
        self.order = Some(Order { field, ascending });
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn window(&self) -> Option<Window> {
        self.window
    }

    /// Facets that have to be filtered after fetching.
    pub fn client_side_facets(&self) -> Vec<Facet> {
        self.predicates
            .iter()
            .filter(|p| !p.is_pushdown())
            .filter_map(|p| match p {
                Predicate::AnyOf { facet, .. } => Some(*facet),
                Predicate::Contains { .. } => None,
            })
            .collect()
    }

    /// Evaluate every predicate against `profile`. The window and ordering are ignored.
    pub fn matches(&self, profile: &Profile) -> bool {
        self.predicates.iter().all(|p| p.matches(profile))
    }

    /// Whether rows fetched with [`ProfileQuery::to_params`] need another pass through
    /// [`ProfileQuery::matches`].
    pub fn needs_refilter(&self) -> bool {
        !self.predicates.iter().all(Predicate::is_exact)
    }

    /// Drop fetched rows the store let through but the query doesn't match.
    pub fn refilter(&self, profiles: &mut Vec<Profile>) {
        if self.needs_refilter() {
            profiles.retain(|p| self.matches(p));
        }
    }

    /// Render as REST table query parameters, e.g. `location=in.("Chennai")`.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> =
            self.predicates.iter().filter_map(Predicate::to_param).collect();

        if let Some(order) = self.order {
            let direction = if order.ascending { "asc" } else { "desc" };
            params.push((
                "order".to_string(),
                format!("{}.{direction}", order.field.column()),
            ));
        }

        if let Some(window) = self.window {
            params.push(("offset".to_string(), window.offset.to_string()));
            params.push(("limit".to_string(), window.limit.to_string()));
        }

        params
    }
}

/// Read profiles from the backing table at `rest/v1/<table>`.
///
/// Predicates the store can't evaluate are applied to the fetched rows, so with a window and
/// a derived-facet filter a page can come back shorter than its limit.
pub async fn fetch_profiles(
    client: &ApiClient,
    table: &str,
    query: &ProfileQuery,
) -> Result<Vec<Profile>> {
    let mut profiles: Vec<Profile> = client
        .send_json(profiles_request(client, table, query))
        .await?;

    query.refilter(&mut profiles);

    debug!("Fetched {} profiles from {table}", profiles.len());

    Ok(profiles)
}

fn profiles_request(client: &ApiClient, table: &str, query: &ProfileQuery) -> RequestBuilder {
    let mut params = vec![("select".to_string(), "*".to_string())];
    params.extend(query.to_params());

    client.request(&format!("rest/v1/{table}"), &params)
}

fn facet_column(facet: Facet) -> Option<&'static str> {
    match facet {
        Facet::Year => Some("year_graduated"),
        Facet::Location => Some("location"),
        Facet::Industry => None,
    }
}

/// Escape the LIKE wildcards in user input. `*` is the store's own wildcard and has no escape,
/// so it goes out as `_` and the match is narrowed again after fetching.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
        .replace('*', "_")
}

/// Double-quote `value` if it contains characters reserved by the filter syntax.
fn quote(value: &str, always: bool) -> String {
    let reserved =
        |c: char| matches!(c, ',' | '.' | ':' | '(' | ')' | '"' | '\\') || c.is_whitespace();

    if always || value.chars().any(reserved) {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        value.to_string()
    }
}
