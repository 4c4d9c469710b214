//! Metadata catalog: the semicolon-delimited CSV listing every published series.

use crate::error::{BcrpError, BcrpResult};
use crate::matching::{normalize, Matcher};
use crate::types::{MetadataRow, SeriesSummary};
use csv::{ReaderBuilder, StringRecord};
use encoding_rs::Encoding;
use std::collections::BTreeSet;

/// Header names of the projected columns and their positional fallbacks.
const CODE_COLUMN: (&str, usize) = ("Código de serie", 0);
const GROUP_COLUMN: (&str, usize) = ("Grupo de serie", 2);
const NAME_COLUMN: (&str, usize) = ("Nombre de serie", 3);

/// Parsed metadata catalog, in upstream order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    rows: Vec<MetadataRow>,
}

impl Catalog {
    pub fn new(rows: Vec<MetadataRow>) -> Self {
        Self { rows }
    }

    /// Decode raw catalog bytes with `encoding` and parse them.
    pub fn from_bytes(bytes: &[u8], encoding: &'static Encoding) -> BcrpResult<Self> {
        let (text, _, had_errors) = encoding.decode(bytes);
        if had_errors {
            tracing::warn!(encoding = encoding.name(), "Metadata contained undecodable bytes");
        }
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> BcrpResult<Self> {
        let text = text.trim_start_matches('\u{feff}');
        let mut reader = ReaderBuilder::new()
            .delimiter(b';')
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let headers = reader.headers()?.clone();
        let code_idx = column_index(&headers, CODE_COLUMN);
        let group_idx = column_index(&headers, GROUP_COLUMN);
        let name_idx = column_index(&headers, NAME_COLUMN);

        let width = headers.len();
        for (label, idx) in [
            (CODE_COLUMN.0, code_idx),
            (GROUP_COLUMN.0, group_idx),
            (NAME_COLUMN.0, name_idx),
        ] {
            if idx >= width {
                return Err(BcrpError::MissingColumn(label));
            }
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let field = |idx: usize| record.get(idx).unwrap_or_default().to_string();
            let code = field(code_idx);
            if code.is_empty() {
                continue;
            }
            rows.push(MetadataRow {
                code,
                name: field(name_idx),
                group: field(group_idx),
            });
        }

        tracing::debug!(rows = rows.len(), "Parsed metadata catalog");
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[MetadataRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct group names matching any of `keywords`, sorted.
    pub fn matching_groups(&self, keywords: &[String], matcher: &Matcher) -> Vec<String> {
        let keywords: Vec<String> = keywords
            .iter()
            .map(|k| normalize(k.trim()))
            .filter(|k| !k.is_empty())
            .collect();
        if keywords.is_empty() {
            return Vec::new();
        }

        let groups: BTreeSet<&str> = self
            .rows
            .iter()
            .map(|row| row.group.as_str())
            .filter(|g| !g.is_empty())
            .collect();

        groups
            .into_iter()
            .filter(|group| {
                let text = normalize(group);
                keywords.iter().any(|k| matcher.matches(k, &text))
            })
            .map(str::to_string)
            .collect()
    }

    /// Series whose group contains `group` (case- and accent-insensitive),
    /// at most `limit` of them, in catalog order.
    pub fn series_in_group(&self, group: &str, limit: usize) -> BcrpResult<Vec<SeriesSummary>> {
        let needle = normalize(group.trim());
        if needle.is_empty() {
            return Err(BcrpError::InvalidInput(
                "time series group must not be empty".to_string(),
            ));
        }

        Ok(self
            .rows
            .iter()
            .filter(|row| normalize(&row.group).contains(&needle))
            .take(limit)
            .map(SeriesSummary::from)
            .collect())
    }
}

fn column_index(headers: &StringRecord, (label, fallback): (&str, usize)) -> usize {
    let wanted = normalize(label);
    headers
        .iter()
        .position(|h| normalize(h) == wanted)
        .unwrap_or(fallback)
}
