use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tantivy::schema::{Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions, STORED, STRING};
use tantivy::tokenizer::{AsciiFoldingFilter, Language, LowerCaser, RemoveLongFilter, SimpleTokenizer, Stemmer, TextAnalyzer};
use tantivy::Index;

use medlist_core::{Error, Result, StemLanguage};

pub const ID_FIELD: &str = "id";
pub const TITLE_FIELD: &str = "title";
pub const COMMON_NAME_FIELD: &str = "common_name";
pub const USAGE_TEXT_FIELD: &str = "usage_text";

/// Analyzer shared by every tokenized field.
pub const STEMMED_ANALYZER: &str = "medlist_stemmed";

/// Written next to the tantivy files so readers normalize queries exactly as
/// the index was normalized.
pub const META_FILE: &str = "medlist.json";

pub fn build_schema() -> Schema {
    let mut schema_builder = Schema::builder();
    let _id_field = schema_builder.add_text_field(ID_FIELD, STRING | STORED);
    let text_field_indexing = TextFieldIndexing::default()
        .set_tokenizer(STEMMED_ANALYZER)
        .set_index_option(IndexRecordOption::WithFreqsAndPositions);
    let text_options = TextOptions::default().set_indexing_options(text_field_indexing).set_stored();
    let _title_field = schema_builder.add_text_field(TITLE_FIELD, text_options.clone());
    let _common_name_field = schema_builder.add_text_field(COMMON_NAME_FIELD, text_options.clone());
    let _usage_text_field = schema_builder.add_text_field(USAGE_TEXT_FIELD, text_options);
    schema_builder.build()
}

pub fn stemmer_language(language: StemLanguage) -> Option<Language> {
    let lang = match language {
        StemLanguage::Arabic => Language::Arabic,
        StemLanguage::Danish => Language::Danish,
        StemLanguage::Dutch => Language::Dutch,
        StemLanguage::English => Language::English,
        StemLanguage::Finnish => Language::Finnish,
        StemLanguage::French => Language::French,
        StemLanguage::German => Language::German,
        StemLanguage::Greek => Language::Greek,
        StemLanguage::Hungarian => Language::Hungarian,
        StemLanguage::Italian => Language::Italian,
        StemLanguage::Norwegian => Language::Norwegian,
        StemLanguage::Portuguese => Language::Portuguese,
        StemLanguage::Romanian => Language::Romanian,
        StemLanguage::Russian => Language::Russian,
        StemLanguage::Spanish => Language::Spanish,
        StemLanguage::Swedish => Language::Swedish,
        StemLanguage::Tamil => Language::Tamil,
        StemLanguage::Turkish => Language::Turkish,
        StemLanguage::None => return None,
    };
    Some(lang)
}

pub fn register_tokenizer(index: &Index, language: StemLanguage) {
    let analyzer = match stemmer_language(language) {
        Some(lang) => TextAnalyzer::builder(SimpleTokenizer::default())
            .filter(RemoveLongFilter::limit(40))
            .filter(LowerCaser)
            .filter(AsciiFoldingFilter)
            .filter(Stemmer::new(lang))
            .build(),
        None => TextAnalyzer::builder(SimpleTokenizer::default())
            .filter(RemoveLongFilter::limit(40))
            .filter(LowerCaser)
            .filter(AsciiFoldingFilter)
            .build(),
    };
    index.tokenizers().register(STEMMED_ANALYZER, analyzer);
}

#[derive(Debug, Clone, Copy)]
pub struct ProductFields {
    pub id: Field,
    pub title: Field,
    pub common_name: Field,
    pub usage_text: Field,
}

impl ProductFields {
    pub fn from_schema(schema: &Schema) -> tantivy::Result<Self> {
        Ok(Self {
            id: schema.get_field(ID_FIELD)?,
            title: schema.get_field(TITLE_FIELD)?,
            common_name: schema.get_field(COMMON_NAME_FIELD)?,
            usage_text: schema.get_field(USAGE_TEXT_FIELD)?,
        })
    }

    /// Default fields of free-text queries.
    pub fn text_fields(&self) -> Vec<Field> {
        vec![self.title, self.common_name, self.usage_text]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexMeta {
    pub language: StemLanguage,
}

impl IndexMeta {
    pub fn write(&self, index_dir: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| Error::BuildFatal(e.to_string()))?;
        fs::write(index_dir.join(META_FILE), json)
            .map_err(|e| Error::BuildFatal(format!("cannot write {} in {}: {}", META_FILE, index_dir.display(), e)))
    }

    pub fn read(index_dir: &Path) -> Result<Self> {
        let path = index_dir.join(META_FILE);
        let json = fs::read_to_string(&path)
            .map_err(|e| Error::Index(format!("cannot read {}: {}", path.display(), e)))?;
        serde_json::from_str(&json).map_err(|e| Error::Index(format!("corrupt {}: {}", path.display(), e)))
    }
}
