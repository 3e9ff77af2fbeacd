//! Plain-text export of the link map.
//!
//! Each article is written on its own line, followed by one tab-indented line
//! per outbound link:
//!
//! ```text
//! OCaml
//! 	Rust
//! Rust
//! 	LLVM
//! 	OCaml
//! ```

use std::io::{self, BufWriter, Write};

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;
use wikilinks_core::ArticleMap;
use wikilinks_fs::create_utf8_file;

/// Counts of what an export wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinksExportReport {
    /// Article lines written.
    pub articles: u64,
    /// Link lines written.
    pub links: u64,
}

/// Errors raised while exporting links.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The output file could not be created.
    #[error("failed to create {path}: {source}")]
    Create {
        /// Output location.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Writing the export failed.
    #[error("failed to write links export: {source}")]
    Write {
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Write `map` to `writer` in the links text format.
///
/// Articles and their targets both appear in name order.
///
/// # Examples
/// ```
/// use wikilinks_core::ArticleMap;
/// use wikilinks_data::wikipedia::export::write_links_text;
///
/// let mut map = ArticleMap::default();
/// let rust = map.insert_article("Rust");
/// let ocaml = map.insert_article("OCaml");
/// map.insert_link(rust, ocaml);
///
/// let mut out = Vec::new();
/// let report = write_links_text(&map, &mut out)?;
/// assert_eq!(String::from_utf8(out)?, "OCaml\nRust\n\tOCaml\n");
/// assert_eq!((report.articles, report.links), (2, 1));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn write_links_text(
    map: &ArticleMap,
    mut writer: impl Write,
) -> Result<LinksExportReport, ExportError> {
    let names = map.name_index();
    let mut report = LinksExportReport::default();
    let mut targets = Vec::new();
    for (name, id) in map.articles() {
        writeln!(writer, "{name}").map_err(|source| ExportError::Write { source })?;
        report.articles += 1;

        targets.clear();
        targets.extend(map.outbound(id).filter_map(|target| names.get(&target).copied()));
        targets.sort_unstable();
        for target in &targets {
            writeln!(writer, "\t{target}").map_err(|source| ExportError::Write { source })?;
            report.links += 1;
        }
    }
    writer
        .flush()
        .map_err(|source| ExportError::Write { source })?;
    Ok(report)
}

/// Write the links export to `path`, creating parent directories as needed.
pub fn export_links_text(
    map: &ArticleMap,
    path: &Utf8Path,
) -> Result<LinksExportReport, ExportError> {
    let file = create_utf8_file(path).map_err(|source| ExportError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    let report = write_links_text(map, BufWriter::new(file.into_std()))?;
    log::info!(
        "exported {} articles and {} links to {path}",
        report.articles,
        report.links
    );
    Ok(report)
}
