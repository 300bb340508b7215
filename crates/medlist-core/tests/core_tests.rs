use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use figment::providers::{Format, Toml};
use figment::Figment;
use tempfile::TempDir;

use medlist_core::config::Config;
use medlist_core::data_processor::{DataProcessor, PipelineConfig};
use medlist_core::export::{read_export, write_export};
use medlist_core::traits::{DocumentIndex, IndexSink, IndexStore, LeafletSource};
use medlist_core::{
    Error, FetchFailure, IndexBuilder, MarkerSpec, ProductDocument, ProductRecord, QueryEngine, SearchHit, SortMode,
    StemLanguage,
};

struct FakeLeaflets(HashMap<String, Result<String, FetchFailure>>);

impl LeafletSource for FakeLeaflets {
    fn fetch_text(&self, url: &str) -> Result<String, FetchFailure> {
        self.0.get(url).cloned().unwrap_or_else(|| Err(FetchFailure::Status(404)))
    }
}

fn record(id: &str, title: &str, kind: &str, leaflet_url: &str) -> ProductRecord {
    ProductRecord {
        id: id.to_string(),
        title: title.to_string(),
        common_name: format!("{title} common"),
        preparation_kind: kind.to_string(),
        leaflet_url: leaflet_url.to_string(),
        ..Default::default()
    }
}

fn doc(id: &str, title: &str, usage_text: &str) -> ProductDocument {
    ProductDocument { id: id.into(), title: title.into(), common_name: String::new(), usage_text: usage_text.into() }
}

fn pipeline(include_non_human: bool) -> DataProcessor {
    DataProcessor::new(PipelineConfig {
        markers: MarkerSpec::new("START", "END", 5),
        human_kind: "ludzki".to_string(),
        include_non_human,
    })
}

#[test]
fn pipeline_isolates_per_product_failures() {
    let source = FakeLeaflets(HashMap::from([
        ("https://x/1".to_string(), Ok("START used for headaches END".to_string())),
        ("https://x/2".to_string(), Ok("leaflet without markers".to_string())),
        ("https://x/3".to_string(), Err(FetchFailure::Transport("timed out".into()))),
    ]));
    let records = vec![
        record("1", "Alpha", "Ludzki", "https://x/1"),
        record("2", "Bravo", "ludzki", "https://x/2"),
        record("3", "Charlie", "ludzki", "https://x/3"),
        record("4", "Delta", "ludzki", "brak"),
        record("5", "Echo", "weterynaryjny", "https://x/1"),
    ];

    let (docs, summary) = pipeline(false).process(&records, &source).expect("process");

    let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3", "4"], "veterinary product is filtered out");
    assert_eq!(docs[0].usage_text, "used for headaches");
    assert!(docs[1..].iter().all(|d| d.usage_text.is_empty()));
    assert_eq!(docs[0].common_name, "Alpha common");
    assert_eq!(summary.total, 5);
    assert_eq!(summary.eligible, 4);
    assert_eq!(summary.extracted, 1);
    assert_eq!(summary.not_found, 1);
    assert_eq!(summary.fetch_failures, 1);
    assert_eq!(summary.invalid_reference, 1);
}

#[test]
fn pipeline_can_keep_non_human_products_without_fetching() {
    let source = FakeLeaflets(HashMap::new());
    let records = vec![record("5", "Echo", "weterynaryjny", "https://x/1")];
    let (docs, summary) = pipeline(true).process(&records, &source).expect("process");
    assert_eq!(docs, vec![ProductDocument { id: "5".into(), title: "Echo".into(), common_name: "Echo common".into(), usage_text: String::new() }]);
    assert_eq!(summary.fetch_failures, 0, "no fetch attempted");
}

#[test]
fn pipeline_refuses_empty_markers() {
    let processor = DataProcessor::new(PipelineConfig {
        markers: MarkerSpec::new("", "END", 0),
        human_kind: "ludzki".into(),
        include_non_human: false,
    });
    let err = processor.process(&[], &FakeLeaflets(HashMap::new())).unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)));
}

#[test]
fn export_round_trips_multiline_descriptions() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("out").join("medications.csv");
    let docs = vec![
        ProductDocument {
            id: "100".into(),
            title: "Apap; forte".into(),
            common_name: "Paracetamolum".into(),
            usage_text: "Lek przeciwbólowy.\n\n\"Stosowany\" w gorączce.".into(),
        },
        doc("101", "Ibuprom", ""),
    ];
    write_export(&path, &docs).expect("write");

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.starts_with("id;nazwaProduktu;nazwaPowszechnieStosowana;opis\n"));

    let contents = read_export(&path).expect("read");
    assert_eq!(contents.documents, docs);
    assert!(contents.rejected_lines.is_empty());
}

#[test]
fn export_skips_malformed_rows_and_rejects_missing_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("medications.csv");
    std::fs::write(&path, "id;nazwaProduktu;nazwaPowszechnieStosowana;opis\n1;A;a;x\n2;B\n3;C;c;z\n").unwrap();
    let contents = read_export(&path).expect("read");
    let ids: Vec<&str> = contents.documents.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "3"]);
    assert_eq!(contents.rejected_lines.len(), 1);

    let err = read_export(&tmp.path().join("missing.csv")).unwrap_err();
    assert!(matches!(err, Error::BuildFatal(_)));

    std::fs::write(&path, "a;b\n1;2\n").unwrap();
    assert!(matches!(read_export(&path).unwrap_err(), Error::BuildFatal(_)));
}

#[test]
fn config_layers_defaults_and_resolves_paths() {
    let figment = Figment::new().merge(Toml::string(
        r#"
        [data]
        index_dir = "idx"
        [index]
        language = "none"
        [search]
        default_limit = 5
        "#,
    ));
    let settings = Config::from_figment(figment, "/srv/medlist").settings().expect("settings");
    assert_eq!(settings.data.index_dir, std::path::PathBuf::from("/srv/medlist/idx"));
    assert_eq!(settings.data.export_csv, std::path::PathBuf::from("/srv/medlist/medications.csv"));
    assert_eq!(settings.index.language, StemLanguage::None);
    assert_eq!(settings.extraction.start_marker, "w jakim celu się go stosuje");
    assert_eq!(settings.extraction.min_length, 20);
    assert_eq!(settings.search.effective_limit(None), 5);
    assert_eq!(settings.search.effective_limit(Some(1000)), 100);
    assert_eq!(settings.search.effective_limit(Some(0)), 0);
}

#[test]
fn config_rejects_invalid_values() {
    let cfg = |toml: &str| Config::from_figment(Figment::new().merge(Toml::string(toml)), ".");
    assert!(matches!(cfg("[extraction]\nend_marker = \"\"").settings(), Err(Error::InvalidConfig(_))));
    assert!(matches!(cfg("[search]\ndefault_limit = 500").settings(), Err(Error::InvalidConfig(_))));
    assert!(matches!(cfg("[index]\nlanguage = \"klingon\"").settings(), Err(Error::InvalidConfig(_))));
    assert!(matches!(cfg("[index]\nwriter_memory_bytes = 1000").settings(), Err(Error::InvalidConfig(_))));
}

#[test]
fn sort_mode_and_language_parse() {
    assert_eq!("Alfabetycznie".parse::<SortMode>().unwrap(), SortMode::Alphabetical);
    assert_eq!("score".parse::<SortMode>().unwrap(), SortMode::Relevance);
    assert!("random".parse::<SortMode>().is_err());
    assert_eq!("German".parse::<StemLanguage>().unwrap(), StemLanguage::German);
    assert!("polish".parse::<StemLanguage>().is_err());
}

// A minimal in-memory engine: one point per query word found in any field.
#[derive(Clone, Default)]
struct MemoryStore {
    committed: Arc<Mutex<Vec<ProductDocument>>>,
}

struct MemorySink {
    pending: Vec<ProductDocument>,
    committed: Arc<Mutex<Vec<ProductDocument>>>,
}

impl IndexStore for MemoryStore {
    type Sink = MemorySink;

    fn create(&self) -> medlist_core::Result<MemorySink> {
        Ok(MemorySink { pending: Vec::new(), committed: Arc::clone(&self.committed) })
    }
}

impl IndexSink for MemorySink {
    fn add_document(&mut self, doc: &ProductDocument) -> medlist_core::Result<()> {
        self.pending.push(doc.clone());
        Ok(())
    }

    fn replace_document(&mut self, doc: &ProductDocument) -> medlist_core::Result<()> {
        self.pending.retain(|d| d.id != doc.id);
        self.add_document(doc)
    }

    fn commit(self) -> medlist_core::Result<()> {
        *self.committed.lock().unwrap() = self.pending;
        Ok(())
    }
}

impl DocumentIndex for MemoryStore {
    fn search(&self, query: &str, limit: usize) -> medlist_core::Result<Vec<SearchHit>> {
        if query.contains(':') {
            return Err(Error::InvalidQuery(query.to_string()));
        }
        let docs = self.committed.lock().unwrap();
        let mut hits: Vec<SearchHit> = docs
            .iter()
            .filter_map(|d| {
                let text = format!("{} {} {}", d.title, d.common_name, d.usage_text).to_lowercase();
                let score = query.split_whitespace().filter(|w| text.contains(&w.to_lowercase())).count();
                (score > 0).then(|| SearchHit { document: d.clone(), score: score as f32 })
            })
            .collect();
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
        hits.truncate(limit);
        Ok(hits)
    }

    fn get(&self, id: &str) -> medlist_core::Result<Option<ProductDocument>> {
        Ok(self.committed.lock().unwrap().iter().find(|d| d.id == id).cloned())
    }

    fn num_docs(&self) -> u64 {
        self.committed.lock().unwrap().len() as u64
    }
}

#[test]
fn builder_overwrites_duplicates_and_rejects_malformed_ids() {
    let store = MemoryStore::default();
    let builder = IndexBuilder::new(store.clone());
    let report = builder
        .build(vec![doc("1", "Old", ""), doc("", "Nameless", ""), doc("2", "Two", ""), doc("1", "New", "")])
        .expect("build");

    assert_eq!(report.added, 2);
    assert_eq!(report.replaced, 1);
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].position, 1);
    assert_eq!(store.num_docs(), 2);
    assert_eq!(store.get("1").unwrap().unwrap().title, "New");
}

#[test]
fn query_engine_ordering_policy() {
    let store = MemoryStore::default();
    IndexBuilder::new(store.clone())
        .build(vec![
            doc("3", "zeta", "pain fever"),
            doc("1", "Beta", "pain"),
            doc("2", "alpha", "pain"),
            doc("4", "Gamma", "cough"),
        ])
        .expect("build");
    let engine = QueryEngine::new(store);

    let relevance = engine.search("pain fever", 10, SortMode::Relevance).unwrap();
    let ids: Vec<&str> = relevance.iter().map(|h| h.document.id.as_str()).collect();
    assert_eq!(ids, vec!["3", "1", "2"], "score desc, then id asc");

    let alphabetical = engine.search("pain fever", 10, SortMode::Alphabetical).unwrap();
    let titles: Vec<&str> = alphabetical.iter().map(|h| h.document.title.as_str()).collect();
    assert_eq!(titles, vec!["alpha", "Beta", "zeta"]);

    let limited = engine.search("pain fever", 1, SortMode::Alphabetical).unwrap();
    assert_eq!(limited.len(), 1);
    assert_eq!(limited[0].document.id, "3", "limit applies before the alphabetical re-sort");

    for mode in [SortMode::Relevance, SortMode::Alphabetical] {
        assert!(engine.search("", 10, mode).unwrap().is_empty());
        assert!(engine.search("   ", 10, mode).unwrap().is_empty());
        assert!(engine.search("pain", 0, mode).unwrap().is_empty());
    }
    assert!(matches!(engine.search("title:", 10, SortMode::Relevance), Err(Error::InvalidQuery(_))));
    assert!(engine.get("4").unwrap().is_some());
}
