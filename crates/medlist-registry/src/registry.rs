use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;
use tracing::{debug, info, warn};

use medlist_core::{Error, ProductRecord, Result};

const PRODUCT_ELEMENT: &[u8] = b"produktLeczniczy";
const ATC_CODE_ELEMENT: &[u8] = b"kodATC";

/// Parsed register export.
///
/// Elements are matched by local name, so the namespace version of the
/// export does not matter.
#[derive(Debug, Default)]
pub struct RegistryParser {
    products: Vec<ProductRecord>,
    by_id: HashMap<String, usize>,
}

impl RegistryParser {
    pub fn from_path(path: &Path) -> Result<Self> {
        let reader = Reader::from_file(path)
            .map_err(|e| Error::Registry(format!("cannot open {}: {}", path.display(), e)))?;
        let parser = Self::parse(reader).map_err(|e| match e {
            Error::Registry(msg) => Error::Registry(format!("{}: {}", path.display(), msg)),
            other => other,
        })?;
        info!(products = parser.products.len(), path = %path.display(), "registry loaded");
        Ok(parser)
    }

    pub fn parse_str(xml: &str) -> Result<Self> {
        Self::parse(Reader::from_reader(xml.as_bytes()))
    }

    fn parse<R: BufRead>(mut reader: Reader<R>) -> Result<Self> {
        reader.config_mut().trim_text(true);
        let mut parser = Self::default();
        let mut buf = Vec::new();
        let mut current: Option<ProductRecord> = None;
        let mut atc_text: Option<String> = None;
        let mut seen_root = false;

        loop {
            let event = reader
                .read_event_into(&mut buf)
                .map_err(|e| Error::Registry(format!("at byte {}: {}", reader.buffer_position(), e)))?;
            match event {
                Event::Start(e) => {
                    seen_root = true;
                    match e.local_name().as_ref() {
                        PRODUCT_ELEMENT => current = Some(product_from_attributes(&e)?),
                        ATC_CODE_ELEMENT if current.is_some() => atc_text = Some(String::new()),
                        _ => {}
                    }
                }
                Event::Empty(e) => {
                    seen_root = true;
                    if e.local_name().as_ref() == PRODUCT_ELEMENT {
                        parser.push(product_from_attributes(&e)?);
                    }
                }
                Event::Text(t) => {
                    if let Some(code) = atc_text.as_mut() {
                        let text = t.unescape().map_err(|e| Error::Registry(e.to_string()))?;
                        code.push_str(&text);
                    }
                }
                Event::End(e) => match e.local_name().as_ref() {
                    ATC_CODE_ELEMENT => {
                        if let (Some(code), Some(product)) = (atc_text.take(), current.as_mut()) {
                            product.atc_codes.push(code);
                        }
                    }
                    PRODUCT_ELEMENT => {
                        if let Some(product) = current.take() {
                            parser.push(product);
                        }
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if !seen_root {
            return Err(Error::Registry("document has no root element".into()));
        }
        Ok(parser)
    }

    fn push(&mut self, product: ProductRecord) {
        let position = self.products.len();
        if self.by_id.contains_key(&product.id) {
            warn!(id = %product.id, "duplicate product id in registry, lookups return the first entry");
        } else {
            self.by_id.insert(product.id.clone(), position);
        }
        debug!(id = %product.id, atc = product.atc_codes.len(), "product parsed");
        self.products.push(product);
    }

    /// All records in document order.
    pub fn products(&self) -> &[ProductRecord] {
        &self.products
    }

    pub fn into_products(self) -> Vec<ProductRecord> {
        self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&ProductRecord> {
        self.by_id.get(id).map(|&i| &self.products[i])
    }

    /// `(leaflet_url, spec_url)` of a product.
    pub fn urls(&self, id: &str) -> Option<(&str, &str)> {
        self.find(id).map(|p| (p.leaflet_url.as_str(), p.spec_url.as_str()))
    }
}

fn product_from_attributes(element: &BytesStart<'_>) -> Result<ProductRecord> {
    let mut product = ProductRecord::default();
    for attr in element.attributes() {
        let attr = attr.map_err(|e| Error::Registry(format!("bad attribute: {e}")))?;
        let value = attr.unescape_value().map_err(|e| Error::Registry(e.to_string()))?.into_owned();
        let slot = match attr.key.local_name().as_ref() {
            b"id" => &mut product.id,
            b"nazwaProduktu" => &mut product.title,
            b"nazwaPowszechnieStosowana" => &mut product.common_name,
            b"rodzajPreparatu" => &mut product.preparation_kind,
            b"moc" => &mut product.strength,
            b"nazwaPostaciFarmaceutycznej" => &mut product.pharmaceutical_form,
            b"podmiotOdpowiedzialny" => &mut product.holder,
            b"typProcedury" => &mut product.procedure_type,
            b"numerPozwolenia" => &mut product.authorisation_number,
            b"waznoscPozwolenia" => &mut product.authorisation_validity,
            b"podstawaPrawna" => &mut product.legal_basis,
            b"ulotka" => &mut product.leaflet_url,
            b"charakterystyka" => &mut product.spec_url,
            _ => continue,
        };
        *slot = value;
    }
    Ok(product)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_attributes_are_ignored() {
        let xml = r#"<produktLeczniczy id="7" ulotka="http://x" kategoriaDostepnosci="OTC"/>"#;
        let reader = Reader::from_reader(xml.as_bytes());
        let parser = RegistryParser::parse(reader).unwrap();
        assert_eq!(parser.products()[0].id, "7");
        assert_eq!(parser.products()[0].leaflet_url, "http://x");
        assert_eq!(parser.products()[0].holder, "");
    }
}
