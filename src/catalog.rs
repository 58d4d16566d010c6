use crate::{CategoryStore, EntryError, EntryKey, EntryRecord, StoreKind, statics};
use anyhow::Context;
use flate2::{Compression, GzBuilder, read::GzDecoder};
use indexmap::IndexMap;
use serde::{Deserialize, de::DeserializeOwned};
use std::{
    fs,
    io::{Read, Write},
    path::{Path, PathBuf},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFormat {
    Json5,
    GzipJson5,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    CrLf,
}

impl LineEnding {
    fn newline(self) -> &'static str {
        match self {
            LineEnding::Lf => statics::NL_LF,
            LineEnding::CrLf => statics::NL_CRLF,
        }
    }
}

#[derive(Deserialize)]
struct CatalogFile<K> {
    categories: IndexMap<String, CategoryFile<K>>,
}

#[derive(Deserialize)]
struct CategoryFile<K> {
    kind: KindFile,
    #[serde(default = "Vec::new")]
    entries: Vec<EntryFile<K>>,
}

#[derive(Deserialize)]
struct EntryFile<K> {
    key: K,
    text: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum KindFile {
    List,
    Keyed,
}

impl From<KindFile> for StoreKind {
    fn from(kind: KindFile) -> Self {
        match kind {
            KindFile::List => StoreKind::List,
            KindFile::Keyed => StoreKind::Keyed,
        }
    }
}

/// Every category of one editable file, as the data provider hands them over.
///
/// Keeps the bytes it was loaded from so an unmodified catalog saves back
/// byte-for-byte. The editing core only reads and writes the in-memory stores;
/// loading and saving is left to the host.
#[derive(Debug, Clone)]
pub struct Catalog<K> {
    pub source_path: Option<PathBuf>,
    pub format: CatalogFormat,
    pub line_ending: LineEnding,
    pub original_bytes: Vec<u8>,
    pub dirty: bool,
    categories: IndexMap<String, CategoryStore<K>>,
    /// Pretty text of the stores as they were at the last load or save.
    clean_text: Option<String>,
}

impl<K: EntryKey> Default for Catalog<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: EntryKey> Catalog<K> {
    pub fn new() -> Self {
        Self {
            source_path: None,
            format: CatalogFormat::Json5,
            line_ending: LineEnding::Lf,
            original_bytes: Vec::new(),
            dirty: false,
            categories: IndexMap::new(),
            clean_text: None,
        }
    }

    pub fn from_stores(stores: impl IntoIterator<Item = CategoryStore<K>>) -> Result<Self, EntryError> {
        let mut catalog = Self::new();
        for store in stores {
            catalog.insert_category(store)?;
        }
        Ok(catalog)
    }

    /// Category ids in file order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn get(&self, category_id: &str) -> Option<&CategoryStore<K>> {
        self.categories.get(category_id)
    }

    pub fn get_mut(&mut self, category_id: &str) -> Option<&mut CategoryStore<K>> {
        self.categories.get_mut(category_id)
    }

    pub fn insert_category(&mut self, store: CategoryStore<K>) -> Result<(), EntryError> {
        if self.categories.contains_key(store.category_id()) {
            return Err(EntryError::DuplicateKey {
                key: store.category_id().to_string(),
                category: statics::CAT_CATEGORIES.to_string(),
            });
        }
        self.categories
            .insert(store.category_id().to_string(), store);
        Ok(())
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Recompute `dirty` by comparing the stores with their state at the last
    /// load or save, so undoing every change clears it again. The comparison is
    /// on content, not on the file's own formatting. A catalog that was never
    /// loaded or saved stays dirty.
    pub fn refresh_dirty(&mut self) {
        self.dirty = self.clean_text.as_deref() != Some(self.current_text().as_str());
    }

    fn current_text(&self) -> String {
        self.to_json5_pretty_with_newline(self.line_ending.newline())
    }

    pub fn to_json5_pretty(&self) -> String {
        self.to_json5_pretty_with_newline(statics::NL_LF)
    }

    /// Four-space indentation, one entry per line, categories in order.
    pub fn to_json5_pretty_with_newline(&self, newline: &str) -> String {
        let mut out = String::new();
        out.push('{');
        out.push_str(newline);
        push_indent(&mut out, 1);
        out.push_str(statics::CAT_CATEGORIES);
        out.push_str(": {");
        out.push_str(newline);
        for (i, (name, store)) in self.categories.iter().enumerate() {
            push_indent(&mut out, 2);
            write_escaped_string(&mut out, name);
            out.push_str(": {");
            out.push_str(newline);

            push_indent(&mut out, 3);
            out.push_str(statics::CAT_KIND);
            out.push_str(": ");
            write_escaped_string(&mut out, store.kind().as_str());
            out.push(',');
            out.push_str(newline);

            push_indent(&mut out, 3);
            out.push_str(statics::CAT_ENTRIES);
            out.push_str(": [");
            if !store.is_empty() {
                out.push_str(newline);
                for (j, record) in store.iter().enumerate() {
                    push_indent(&mut out, 4);
                    write_record(&mut out, record);
                    if j + 1 != store.len() {
                        out.push(',');
                    }
                    out.push_str(newline);
                }
                push_indent(&mut out, 3);
            }
            out.push(']');
            out.push_str(newline);

            push_indent(&mut out, 2);
            out.push('}');
            if i + 1 != self.categories.len() {
                out.push(',');
            }
            out.push_str(newline);
        }
        push_indent(&mut out, 1);
        out.push('}');
        out.push_str(newline);
        out.push('}');
        out.push_str(newline);
        out
    }

    /// Generate bytes for a format regardless of current `dirty` state.
    pub fn generate_bytes_for_format(&self, format: CatalogFormat) -> anyhow::Result<Vec<u8>> {
        let text = self.current_text();
        let text_bytes = text.as_bytes();

        match format {
            CatalogFormat::Json5 => Ok(text_bytes.to_vec()),
            CatalogFormat::GzipJson5 => {
                let mut encoder = GzBuilder::new()
                    .mtime(0)
                    .write(Vec::new(), Compression::default());
                encoder.write_all(text_bytes).context("gzip compress")?;
                encoder.finish().context("gzip finish")
            }
        }
    }

    pub fn save_bytes_for_format(&self, format: CatalogFormat) -> anyhow::Result<Vec<u8>> {
        if !self.dirty && format == self.format && !self.original_bytes.is_empty() {
            return Ok(self.original_bytes.clone());
        }
        self.generate_bytes_for_format(format)
    }

    pub fn save_to_path(&mut self, path: &Path) -> anyhow::Result<()> {
        let target_format = format_for_extension(path);
        let bytes = self.save_bytes_for_format(target_format)?;
        fs::write(path, &bytes).with_context(|| format!("writing {path:?}"))?;
        tracing::info!(path = %path.display(), categories = self.len(), "saved catalog");

        self.source_path = Some(path.to_path_buf());
        self.format = target_format;
        self.original_bytes = bytes;
        self.clean_text = Some(self.current_text());
        self.dirty = false;
        Ok(())
    }
}

impl<K: EntryKey + DeserializeOwned> Catalog<K> {
    /// Parse catalog text. Keyed categories are sorted; duplicate keys are an error.
    pub fn parse_json5(text: &str) -> anyhow::Result<Self> {
        let file: CatalogFile<K> = json5::from_str(text).context("parsing JSON5")?;
        let mut catalog = Self::new();
        for (name, category) in file.categories {
            let records = category
                .entries
                .into_iter()
                .map(|e| EntryRecord::new(e.key, e.text));
            let store = CategoryStore::from_records(name.as_str(), category.kind.into(), records)
                .with_context(|| format!("category {name:?}"))?;
            catalog.insert_category(store)?;
        }
        Ok(catalog)
    }

    pub fn load_path(path: &Path) -> anyhow::Result<Self> {
        let bytes = fs::read(path).with_context(|| format!("reading {path:?}"))?;
        let format = detect_format(path, &bytes);
        let text_bytes = match format {
            CatalogFormat::Json5 => bytes.clone(),
            CatalogFormat::GzipJson5 => {
                let mut decoder = GzDecoder::new(&bytes[..]);
                let mut out = Vec::new();
                decoder.read_to_end(&mut out).context("gzip decompress")?;
                out
            }
        };

        let text = std::str::from_utf8(&text_bytes).context("catalog is not valid UTF-8")?;
        let mut catalog = Self::parse_json5(text).with_context(|| format!("loading {path:?}"))?;
        catalog.source_path = Some(path.to_path_buf());
        catalog.format = format;
        catalog.line_ending = detect_line_ending(&text_bytes);
        catalog.original_bytes = bytes;
        catalog.clean_text = Some(catalog.current_text());
        tracing::info!(path = %path.display(), categories = catalog.len(), "loaded catalog");
        Ok(catalog)
    }
}

fn write_record<K: EntryKey>(out: &mut String, record: &EntryRecord<K>) {
    out.push_str("{ ");
    out.push_str(statics::CAT_FIELD_KEY);
    out.push_str(": ");
    record.key.write_json5(out);
    out.push_str(", ");
    out.push_str(statics::CAT_FIELD_TEXT);
    out.push_str(": ");
    write_escaped_string(out, &record.text);
    out.push_str(" }");
}

fn push_indent(out: &mut String, level: usize) {
    out.push_str(&" ".repeat(level * 4));
}

pub(crate) fn write_escaped_string(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                use std::fmt::Write as _;
                write!(out, "\\u{:04X}", c as u32).ok();
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

fn format_for_extension(path: &Path) -> CatalogFormat {
    if path.extension().and_then(|e| e.to_str()) == Some("gz") {
        CatalogFormat::GzipJson5
    } else {
        CatalogFormat::Json5
    }
}

fn detect_format(path: &Path, bytes: &[u8]) -> CatalogFormat {
    // Gzip magic: 1F 8B
    if bytes.starts_with(&[0x1F, 0x8B]) {
        return CatalogFormat::GzipJson5;
    }
    format_for_extension(path)
}

/// Majority vote over newline terminators; a few stray CRLFs don't flip it.
fn detect_line_ending(text_bytes: &[u8]) -> LineEnding {
    let mut lf_count = 0usize;
    let mut crlf_count = 0usize;
    for (i, b) in text_bytes.iter().enumerate() {
        if *b != b'\n' {
            continue;
        }
        if i > 0 && text_bytes[i - 1] == b'\r' {
            crlf_count += 1;
        } else {
            lf_count += 1;
        }
    }
    if crlf_count > lf_count {
        LineEnding::CrLf
    } else {
        LineEnding::Lf
    }
}

#[cfg(test)]
mod tests {
    use super::{Catalog, CatalogFormat, LineEnding, detect_format, detect_line_ending};
    use crate::{CategoryStore, EntryRecord, GoalKey, GoalType, StoreKind};
    use std::path::Path;

    #[test]
    fn parse_sorts_keyed_and_keeps_list_order() {
        let text = r#"{
            // comment
            categories: {
                "NpcParam": { kind: "keyed", entries: [ { key: 30, text: "C" }, { key: 10, text: "A" } ] },
                "Parts": { kind: "list", entries: [ { key: 30, text: "c" }, { key: 10, text: "a" }, ] },
                "Empty": { kind: "keyed" },
            },
        }"#;
        let catalog = Catalog::<i64>::parse_json5(text).unwrap();
        assert_eq!(
            catalog.categories().collect::<Vec<_>>(),
            vec!["NpcParam", "Parts", "Empty"]
        );
        let npc = catalog.get("NpcParam").unwrap();
        assert_eq!(npc.keys().copied().collect::<Vec<_>>(), vec![10, 30]);
        let parts = catalog.get("Parts").unwrap();
        assert_eq!(parts.keys().copied().collect::<Vec<_>>(), vec![30, 10]);
        assert!(catalog.get("Empty").unwrap().is_empty());
    }

    #[test]
    fn duplicate_keys_in_file_are_rejected() {
        let text = r#"{ categories: { "X": { kind: "keyed", entries: [ { key: 1, text: "a" }, { key: 1, text: "b" } ] } } }"#;
        let err = Catalog::<i64>::parse_json5(text).unwrap_err();
        assert!(format!("{err:#}").contains("already exists"));
    }

    #[test]
    fn pretty_output_parses_back_to_same_stores() {
        let goals = CategoryStore::from_records(
            "m10_01_00_00",
            StoreKind::Keyed,
            [
                EntryRecord::new(GoalKey::new(101, GoalType::Battle), "Knight \"battle\""),
                EntryRecord::new(GoalKey::new(101, GoalType::Logic), "Knight\nlogic"),
            ],
        )
        .unwrap();
        let catalog = Catalog::from_stores([goals]).unwrap();
        let text = catalog.to_json5_pretty();
        assert!(text.contains("{ key: { id: 101, type: \"battle\" }, text: \"Knight \\\"battle\\\"\" }"));

        let parsed = Catalog::<GoalKey>::parse_json5(&text).unwrap();
        assert_eq!(parsed.get("m10_01_00_00"), catalog.get("m10_01_00_00"));
    }

    #[test]
    fn empty_category_writes_empty_array() {
        let catalog =
            Catalog::from_stores([CategoryStore::<String>::new("Events", StoreKind::List)]).unwrap();
        assert_eq!(
            catalog.to_json5_pretty(),
            "{\n    categories: {\n        \"Events\": {\n            kind: \"list\",\n            entries: []\n        }\n    }\n}\n"
        );
    }

    #[test]
    fn goal_category_without_entries_parses() {
        let text = r#"{ categories: { "m10_00_00_00": { kind: "keyed" } } }"#;
        let catalog = Catalog::<GoalKey>::parse_json5(text).unwrap();
        assert!(catalog.get("m10_00_00_00").unwrap().is_empty());
    }

    #[test]
    fn detect_format_uses_magic_then_extension() {
        let gz_magic = [0x1F_u8, 0x8B_u8, 0x08_u8, 0x00_u8];
        assert_eq!(
            detect_format(Path::new("catalog.json5"), &gz_magic),
            CatalogFormat::GzipJson5
        );
        assert_eq!(
            detect_format(Path::new("catalog.json5.gz"), b"{}"),
            CatalogFormat::GzipJson5
        );
        assert_eq!(
            detect_format(Path::new("catalog.json5"), b"{}"),
            CatalogFormat::Json5
        );
    }

    #[test]
    fn detect_line_ending_uses_majority() {
        assert_eq!(detect_line_ending(b"{\n a: 1,\r\n b: 2\n}\n"), LineEnding::Lf);
        assert_eq!(detect_line_ending(b"{\r\n a: 1,\n b: 2\r\n}\r\n"), LineEnding::CrLf);
    }

    #[test]
    fn duplicate_category_is_rejected() {
        let result = Catalog::from_stores([
            CategoryStore::<i64>::new("A", StoreKind::Keyed),
            CategoryStore::<i64>::new("A", StoreKind::List),
        ]);
        assert!(result.is_err());
    }
}
