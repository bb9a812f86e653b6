use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::markup::{self, Element};
use crate::error::ExtractError;

pub const NA: &str = "NA";

const CONTAINER: &str = "MEMBINFO";
const NAME_TAG: &str = "DISP_NAME";
const PARTY_TAG: &str = "PARTY";
const LEG_EXP_TAG: &str = "LEG_EXP";
const EDUCATION_TAG: &str = "EDUCATION";
const OCCUPATION_TAG: &str = "OCCUPATION";
const COMMITTEE_TAG: &str = "CMTE_NAME";
const ORG_TAG: &str = "ORG_INFO";
const PERSONAL_TAG: &str = "PERS_INFO";

static CHAMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)senate|house").unwrap());

/// Output column names, in table order.
pub const COLUMNS: [&str; 10] = [
    "Legislator",
    "Body",
    "Party",
    "LegislativeExp",
    "Education",
    "Occupations",
    "Committees",
    "Organizations",
    "Personal",
    "url",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegislatorRecord {
    #[serde(rename = "Legislator")]
    pub legislator: String,
    #[serde(rename = "Body")]
    pub body: String,
    #[serde(rename = "Party")]
    pub party: String,
    #[serde(rename = "LegislativeExp")]
    pub legislative_exp: String,
    #[serde(rename = "Education")]
    pub education: String,
    #[serde(rename = "Occupations")]
    pub occupations: String,
    #[serde(rename = "Committees")]
    pub committees: String,
    #[serde(rename = "Organizations")]
    pub organizations: String,
    #[serde(rename = "Personal")]
    pub personal: String,
    pub url: String,
}

impl LegislatorRecord {
    /// Placeholder row for a page that couldn't be read; keeps the source url.
    pub fn not_available(url: &str) -> Self {
        LegislatorRecord {
            legislator: NA.into(),
            body: NA.into(),
            party: NA.into(),
            legislative_exp: NA.into(),
            education: NA.into(),
            occupations: NA.into(),
            committees: NA.into(),
            organizations: NA.into(),
            personal: NA.into(),
            url: url.to_string(),
        }
    }

    /// Field values in `COLUMNS` order.
    pub fn fields(&self) -> [&str; 10] {
        [
            self.legislator.as_str(),
            self.body.as_str(),
            self.party.as_str(),
            self.legislative_exp.as_str(),
            self.education.as_str(),
            self.occupations.as_str(),
            self.committees.as_str(),
            self.organizations.as_str(),
            self.personal.as_str(),
            self.url.as_str(),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chamber {
    Senate,
    House,
}

impl Chamber {
    /// First "senate" or "house" in the url, any case.
    pub fn from_url(url: &str) -> Option<Chamber> {
        let m = CHAMBER_RE.find(url)?;
        if m.as_str().eq_ignore_ascii_case("senate") {
            Some(Chamber::Senate)
        } else {
            Some(Chamber::House)
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Chamber::Senate => "Senate",
            Chamber::House => "House",
        }
    }
}

/// Result of reading one page. Either failure becomes an all-NA row.
#[derive(Debug)]
pub enum Outcome {
    Success(LegislatorRecord),
    StructuralAbsence { url: String, reason: ExtractError },
    OtherFailure { url: String, cause: anyhow::Error },
}

impl Outcome {
    pub fn from_page(bytes: &[u8], url: &str) -> Outcome {
        match extract(bytes, url) {
            Ok(record) => Outcome::Success(record),
            Err(e) if e.is_structural() => Outcome::StructuralAbsence {
                url: url.to_string(),
                reason: e,
            },
            Err(e) => Outcome::OtherFailure {
                url: url.to_string(),
                cause: e.into(),
            },
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Outcome::Success(r) => &r.url,
            Outcome::StructuralAbsence { url, .. } | Outcome::OtherFailure { url, .. } => url,
        }
    }

    pub fn into_record(self) -> LegislatorRecord {
        match self {
            Outcome::Success(r) => r,
            Outcome::StructuralAbsence { url, .. } | Outcome::OtherFailure { url, .. } => {
                LegislatorRecord::not_available(&url)
            }
        }
    }
}

/// Parse one member bio page into a record.
pub fn extract(bytes: &[u8], url: &str) -> Result<LegislatorRecord, ExtractError> {
    let document = markup::parse(bytes)?;
    let table = document
        .find(CONTAINER)
        .ok_or(ExtractError::MissingElement(CONTAINER))?;

    let legislator = first_text(table, NAME_TAG)?;
    let body = Chamber::from_url(url).ok_or_else(|| ExtractError::UnknownChamber(url.to_string()))?;
    let party = first_text(table, PARTY_TAG)?;

    Ok(LegislatorRecord {
        legislator,
        body: body.as_str().to_string(),
        party,
        legislative_exp: join_texts(&table.find_all(LEG_EXP_TAG)),
        education: join_texts(&table.find_all(EDUCATION_TAG)),
        occupations: join_texts(&table.find_all(OCCUPATION_TAG)),
        committees: join_texts(&table.find_all(COMMITTEE_TAG)),
        organizations: flatten_newlines(&first_text(table, ORG_TAG)?),
        personal: flatten_newlines(&first_text(table, PERSONAL_TAG)?),
        url: url.to_string(),
    })
}

fn first_text(table: &Element, tag: &'static str) -> Result<String, ExtractError> {
    table
        .find(tag)
        .map(Element::text)
        .ok_or(ExtractError::MissingElement(tag))
}

/// Space-join element texts, trim, and turn the "\n \n" left between
/// entries into ", ".
pub fn join_texts(elements: &[&Element]) -> String {
    let texts: Vec<String> = elements.iter().map(|e| e.text()).collect();
    texts.join(" ").trim().replace("\n \n", ", ")
}

pub fn flatten_newlines(text: &str) -> String {
    text.replace('\n', " ")
}
