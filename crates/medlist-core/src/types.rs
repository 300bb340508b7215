//! Domain types shared by the pipeline, the index and the query layer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

pub type ProductId = String;

/// One `produktLeczniczy` entry of the medicinal-products register.
///
/// Every attribute is always present; a missing attribute in the source is an
/// empty string. `atc_codes` keeps the order of the nested `kodATC` elements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: ProductId,
    pub title: String,
    pub common_name: String,
    pub preparation_kind: String,
    pub strength: String,
    pub pharmaceutical_form: String,
    pub holder: String,
    pub procedure_type: String,
    pub authorisation_number: String,
    pub authorisation_validity: String,
    pub legal_basis: String,
    pub leaflet_url: String,
    pub spec_url: String,
    pub atc_codes: Vec<String>,
}

impl ProductRecord {
    /// Case-insensitive comparison of `preparation_kind` with `kind`.
    pub fn is_kind(&self, kind: &str) -> bool {
        self.preparation_kind.to_lowercase() == kind.to_lowercase()
    }

    /// Label/value pairs in the order the register lists them.
    pub fn details(&self) -> Vec<(&'static str, String)> {
        vec![
            ("nazwaProduktu", self.title.clone()),
            ("rodzajPreparatu", self.preparation_kind.clone()),
            ("nazwaPowszechnieStosowana", self.common_name.clone()),
            ("moc", self.strength.clone()),
            ("nazwaPostaciFarmaceutycznej", self.pharmaceutical_form.clone()),
            ("podmiotOdpowiedzialny", self.holder.clone()),
            ("typProcedury", self.procedure_type.clone()),
            ("numerPozwolenia", self.authorisation_number.clone()),
            ("waznoscPozwolenia", self.authorisation_validity.clone()),
            ("podstawaPrawna", self.legal_basis.clone()),
            ("ulotka", self.leaflet_url.clone()),
            ("charakterystyka", self.spec_url.clone()),
            ("id", self.id.clone()),
            ("kodyATC", self.atc_codes.join(", ")),
        ]
    }
}

/// The unit stored in the text index.
///
/// - `id`: register identifier, the unique key of the index
/// - `title`/`common_name`: trade name and common (INN) name
/// - `usage_text`: the extracted leaflet fragment, empty when extraction
///   failed or was never attempted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDocument {
    pub id: ProductId,
    pub title: String,
    pub common_name: String,
    pub usage_text: String,
}

impl ProductDocument {
    pub fn from_record(record: &ProductRecord, usage_text: String) -> Self {
        Self {
            id: record.id.clone(),
            title: record.title.clone(),
            common_name: record.common_name.clone(),
            usage_text,
        }
    }
}

/// A ranked match. Higher `score` is better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub document: ProductDocument,
    pub score: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    #[default]
    Relevance,
    Alphabetical,
}

impl FromStr for SortMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "relevance" | "score" => Ok(Self::Relevance),
            "alphabetical" | "alfabetycznie" => Ok(Self::Alphabetical),
            other => Err(Error::InvalidConfig(format!("unknown sort mode '{other}'"))),
        }
    }
}

/// Language of the stemming step shared by every tokenized field.
///
/// The named variants are the Snowball stemmers available to the text
/// engine. `None` keeps lower-casing and ASCII folding but skips stemming.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StemLanguage {
    Arabic,
    Danish,
    Dutch,
    #[default]
    English,
    Finnish,
    French,
    German,
    Greek,
    Hungarian,
    Italian,
    Norwegian,
    Portuguese,
    Romanian,
    Russian,
    Spanish,
    Swedish,
    Tamil,
    Turkish,
    None,
}

impl StemLanguage {
    pub const ALL: [StemLanguage; 19] = [
        Self::Arabic,
        Self::Danish,
        Self::Dutch,
        Self::English,
        Self::Finnish,
        Self::French,
        Self::German,
        Self::Greek,
        Self::Hungarian,
        Self::Italian,
        Self::Norwegian,
        Self::Portuguese,
        Self::Romanian,
        Self::Russian,
        Self::Spanish,
        Self::Swedish,
        Self::Tamil,
        Self::Turkish,
        Self::None,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Arabic => "arabic",
            Self::Danish => "danish",
            Self::Dutch => "dutch",
            Self::English => "english",
            Self::Finnish => "finnish",
            Self::French => "french",
            Self::German => "german",
            Self::Greek => "greek",
            Self::Hungarian => "hungarian",
            Self::Italian => "italian",
            Self::Norwegian => "norwegian",
            Self::Portuguese => "portuguese",
            Self::Romanian => "romanian",
            Self::Russian => "russian",
            Self::Spanish => "spanish",
            Self::Swedish => "swedish",
            Self::Tamil => "tamil",
            Self::Turkish => "turkish",
            Self::None => "none",
        }
    }
}

impl fmt::Display for StemLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StemLanguage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|lang| lang.as_str() == wanted)
            .ok_or_else(|| Error::InvalidConfig(format!("unsupported stemming language '{s}'")))
    }
}
