use std::fs;
use tempfile::TempDir;

use medlist_cli::{commands, present};
use medlist_core::config::Settings;
use medlist_core::export::{read_export, write_export};
use medlist_core::{ProductDocument, SortMode};
use medlist_leaflet::DocumentKind;

const REGISTER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<produktyLecznicze xmlns="http://rejestry.ezdrowie.gov.pl/rpl/eksport-danych-v5.0.0">
  <produktLeczniczy nazwaProduktu="Apap" rodzajPreparatu="ludzki" nazwaPowszechnieStosowana="Paracetamolum" ulotka="" id="100">
    <kodyATC><kodATC>N02BE01</kodATC></kodyATC>
  </produktLeczniczy>
  <produktLeczniczy nazwaProduktu="Rimadyl" rodzajPreparatu="weterynaryjny" nazwaPowszechnieStosowana="Carprofenum" ulotka="brak" id="101"/>
</produktyLecznicze>
"#;

fn settings(root: &std::path::Path) -> Settings {
    let mut settings = Settings::default();
    settings.data.registry_xml = root.join("rejestr.xml");
    settings.data.export_csv = root.join("out/medications.csv");
    settings.data.index_dir = root.join("indexdir");
    settings.data.downloads_dir = root.join("downloads");
    settings
}

fn doc(id: &str, title: &str, common_name: &str, usage_text: &str) -> ProductDocument {
    ProductDocument { id: id.into(), title: title.into(), common_name: common_name.into(), usage_text: usage_text.into() }
}

#[test]
fn index_then_search_from_export_file() {
    let tmp = TempDir::new().unwrap();
    let settings = settings(tmp.path());
    write_export(
        &settings.data.export_csv,
        &[
            doc("1", "Zyrtec", "Cetirizinum", "Allergic rhinitis.\nHay fever.\n2."),
            doc("2", "Apap", "Paracetamolum", "Fever and pain."),
        ],
    )
    .unwrap();

    let report = commands::index(&settings).expect("index");
    assert_eq!(report.added, 2);

    let engine = commands::open_engine(&settings).unwrap();
    let hits = engine.search("fever", 10, SortMode::Alphabetical).unwrap();
    let titles: Vec<&str> = hits.iter().map(|h| h.document.title.as_str()).collect();
    assert_eq!(titles, vec!["Apap", "Zyrtec"]);

    let zyrtec = engine.get("1").unwrap().unwrap();
    assert_eq!(present::display_description(&zyrtec.usage_text), "Allergic rhinitis.\nHay fever.");
}

#[test]
fn search_before_build_is_an_error() {
    let tmp = TempDir::new().unwrap();
    assert!(commands::open_engine(&settings(tmp.path())).is_err());
}

#[test]
fn export_without_valid_references_never_fetches() {
    let tmp = TempDir::new().unwrap();
    let settings = settings(tmp.path());
    fs::write(&settings.data.registry_xml, REGISTER).unwrap();

    let summary = commands::export(&settings, false).expect("export");
    assert_eq!(summary.total, 2);
    assert_eq!(summary.eligible, 1);
    assert_eq!(summary.invalid_reference, 1);
    assert_eq!(summary.fetch_failures, 0);

    let contents = read_export(&settings.data.export_csv).unwrap();
    assert_eq!(contents.documents, vec![doc("100", "Apap", "Paracetamolum", "")]);
}

#[test]
fn register_lookups_and_downloads() {
    let tmp = TempDir::new().unwrap();
    let settings = settings(tmp.path());
    fs::write(&settings.data.registry_xml, REGISTER).unwrap();

    let registry = commands::load_registry(&settings).unwrap();
    let apap = commands::find_product(&registry, "100").unwrap();
    assert!(present::product_details(apap).contains("kodyATC: N02BE01"));
    assert!(commands::find_product(&registry, "404").is_err());

    let err = commands::download(&settings, apap, DocumentKind::Leaflet).unwrap_err();
    assert!(format!("{err:#}").contains("Invalid reference"), "{err:#}");
    assert!(!settings.data.downloads_dir.exists());
}
