use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    directory::{Facet, SearchField},
};

/// Query parameter carrying the image version, so a replaced photo is not served stale.
const IMAGE_VERSION_PARAM: &str = "v";

/// An alumnus as rendered in the directory.
///
/// Profiles are read-only snapshots of the backing table. Optional text fields may be
/// absent or blank; both are treated as "no value" when searching and filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    /// Either a single year (`"2000"`) or a range (`"1993-2000"`)
    #[serde(default)]
    pub year_graduated: Option<String>,
    /// `"<Position> / <Company>"` or just `"<Company>"`
    #[serde(default)]
    pub designation_organisation: Option<String>,
    #[serde(default)]
    pub current_job: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub nicknames: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Profile {
    pub fn new(id: i64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            location: None,
            year_graduated: None,
            designation_organisation: None,
            current_job: None,
            company: None,
            bio: None,
            nicknames: None,
            linkedin_url: None,
            email: None,
            phone: None,
            profile_image_url: None,
            updated_at: None,
        }
    }

    /// The company part of `designation_organisation`.
    ///
    /// `"Senior Engineer / Acme Corp"` yields `"Acme Corp"`, a value without a slash is
    /// returned whole.
    pub fn industry(&self) -> Option<&str> {
        let designation = non_blank(self.designation_organisation.as_deref())?;
        let mut parts = designation.split('/').map(str::trim);
        let first = parts.next();
        let company = match (first, parts.next()) {
            (_, Some(company)) => company,
            (Some(whole), None) => whole,
            (None, None) => return None,
        };

        non_blank(Some(company))
    }

    pub fn facet_value(&self, facet: Facet) -> Option<&str> {
        match facet {
            Facet::Year => non_blank(self.year_graduated.as_deref()),
            Facet::Location => non_blank(self.location.as_deref()),
            Facet::Industry => self.industry(),
        }
    }

    pub fn field(&self, field: SearchField) -> Option<&str> {
        let value = match field {
            SearchField::Name => Some(self.name.as_str()),
            SearchField::Location => self.location.as_deref(),
            SearchField::CurrentJob => self.current_job.as_deref(),
            SearchField::DesignationOrganisation => self.designation_organisation.as_deref(),
            SearchField::Nicknames => self.nicknames.as_deref(),
            SearchField::Company => self.company.as_deref(),
            SearchField::Bio => self.bio.as_deref(),
        };

        non_blank(value)
    }

    /// The profile image URL with a version parameter derived from `updated_at`.
    pub fn image_url(&self) -> Option<String> {
        let url = non_blank(self.profile_image_url.as_deref())?;

        let Some(updated_at) = self.updated_at else {
            return Some(url.to_string());
        };

        Some(with_query_param(
            url,
            IMAGE_VERSION_PARAM,
            &updated_at.timestamp_millis().to_string(),
        ))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Set `key=value` on `url`, replacing any existing value for `key`.
fn with_query_param(url: &str, key: &str, value: &str) -> String {
    let (rest, fragment) = match url.split_once('#') {
        Some((rest, fragment)) => (rest, Some(fragment)),
        None => (url, None),
    };
    let (base, query) = match rest.split_once('?') {
        Some((base, query)) => (base, query),
        None => (rest, ""),
    };

    let mut pairs: Vec<String> = query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| pair.split('=').next() != Some(key))
        .map(str::to_string)
        .collect();
    pairs.push(format!("{key}={value}"));

    let mut out = format!("{base}?{}", pairs.join("&"));
    if let Some(fragment) = fragment {
        out.push('#');
        out.push_str(fragment);
    }

    out
}

/// A partial update to a [`Profile`].
///
/// Only the fields that were explicitly set are serialized, so the payload can be sent as-is
/// to a PATCH endpoint. Nullable columns use `Some(None)` to clear the stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    year_graduated: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    designation_organisation: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    current_job: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    company: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bio: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    nicknames: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    linkedin_url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    profile_image_url: Option<Option<String>>,
}

macro_rules! patch_setters {
    ($($field:ident),* $(,)?) => {
        $(
            pub fn $field(mut self, value: Option<&str>) -> Self {
                self.$field = Some(value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()));
                self
            }
        )*
    };
}

impl ProfilePatch {
    pub fn name(mut self, name: &str) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::EmptyName);
        }

        self.name = Some(name.to_string());
        Ok(self)
    }

    patch_setters!(
        location,
        year_graduated,
        designation_organisation,
        current_job,
        company,
        bio,
        nicknames,
        linkedin_url,
        email,
        phone,
        profile_image_url,
    );

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply this patch to a local copy of a profile.
    pub fn apply_to(&self, profile: &Profile) -> Profile {
        let mut patched = profile.clone();

        macro_rules! merge {
            ($($field:ident),*) => {
                $(
                    if let Some(value) = &self.$field {
                        patched.$field = value.clone();
                    }
                )*
            };
        }

        if let Some(name) = &self.name {
            patched.name = name.clone();
        }
        merge!(
            location,
            year_graduated,
            designation_organisation,
            current_job,
            company,
            bio,
            nicknames,
            linkedin_url,
            email,
            phone,
            profile_image_url
        );

        patched
    }
}

#[cfg(test)]
mod test {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::{Profile, ProfilePatch};
    use crate::{Error, directory::Facet};

    fn with_designation(designation: Option<&str>) -> Profile {
        Profile {
            designation_organisation: designation.map(str::to_string),
            ..Profile::new(1, "Alice Smith")
        }
    }

    #[test]
    fn test_industry_from_position_and_company() {
        let profile = with_designation(Some("Senior Engineer / Acme Corp"));
        assert_eq!(profile.industry(), Some("Acme Corp"));
    }

    #[test]
    fn test_industry_without_slash() {
        let profile = with_designation(Some("Acme Corp"));
        assert_eq!(profile.industry(), Some("Acme Corp"));
    }

    #[test]
    fn test_industry_missing() {
        assert_eq!(with_designation(None).industry(), None);
        assert_eq!(with_designation(Some("   ")).industry(), None);
        assert_eq!(with_designation(Some("Founder /  ")).industry(), None);
    }

    #[test]
    fn test_blank_facet_values() {
        let profile = Profile {
            location: Some("".to_string()),
            year_graduated: Some("1993-2000".to_string()),
            ..Profile::new(1, "Alice Smith")
        };

        assert_eq!(profile.facet_value(Facet::Location), None);
        assert_eq!(profile.facet_value(Facet::Year), Some("1993-2000"));
    }

    #[test]
    fn test_deserialize_sparse_record() {
        let profile: Profile = serde_json::from_value(json!({
            "id": 7,
            "name": "Bob Lee",
            "location": null,
            "updated_at": "2024-05-01T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(profile.id, 7);
        assert_eq!(profile.location, None);
        assert!(profile.updated_at.is_some());
    }

    #[test]
    fn test_image_url_cache_busting() {
        let updated_at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let millis = updated_at.timestamp_millis();
        let mut profile = Profile {
            profile_image_url: Some("https://cdn.example/a.jpg".to_string()),
            updated_at: Some(updated_at),
            ..Profile::new(1, "Alice Smith")
        };

        assert_eq!(
            profile.image_url().unwrap(),
            format!("https://cdn.example/a.jpg?v={millis}")
        );

        profile.profile_image_url = Some("https://cdn.example/a.jpg?w=200&v=1#top".to_string());
        assert_eq!(
            profile.image_url().unwrap(),
            format!("https://cdn.example/a.jpg?w=200&v={millis}#top")
        );

        profile.updated_at = None;
        assert_eq!(
            profile.image_url().unwrap(),
            "https://cdn.example/a.jpg?w=200&v=1#top"
        );

        profile.profile_image_url = None;
        assert_eq!(profile.image_url(), None);
    }

    #[test]
    fn test_patch_only_serializes_set_fields() {
        let patch = ProfilePatch::default()
            .name("  Alice Smith ")
            .unwrap()
            .location(Some("Chennai"))
            .bio(None);

        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({ "name": "Alice Smith", "location": "Chennai", "bio": null })
        );
    }

    #[test]
    fn test_patch_empty() {
        assert!(ProfilePatch::default().is_empty());
        assert!(!ProfilePatch::default().phone(Some("123")).is_empty());
        assert!(matches!(
            ProfilePatch::default().name("   "),
            Err(Error::EmptyName)
        ));
    }

    #[test]
    fn test_patch_apply() {
        let profile = Profile {
            location: Some("Mumbai".to_string()),
            bio: Some("Hello".to_string()),
            ..Profile::new(3, "Amy Ng")
        };
        let patch = ProfilePatch::default().location(Some("Chennai")).bio(Some(" "));

        let patched = patch.apply_to(&profile);

        assert_eq!(patched.name, "Amy Ng");
        assert_eq!(patched.location.as_deref(), Some("Chennai"));
        assert_eq!(patched.bio, None);
    }
}
