//! Scratch workspaces holding a tiny MediaWiki export.

use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tempfile::TempDir;

pub(super) const SAMPLE_EXPORT: &str = r#"<mediawiki>
  <page>
    <title>Rust</title>
    <ns>0</ns>
    <revision><text>Influenced by [[OCaml]] and built on [[LLVM|the LLVM toolchain]].</text></revision>
  </page>
  <page>
    <title>OCaml</title>
    <ns>0</ns>
    <revision><text>Inspired [[Rust]].</text></revision>
  </page>
  <page>
    <title>Talk:Rust</title>
    <ns>1</ns>
    <revision><text>[[Nothing to see]]</text></revision>
  </page>
</mediawiki>
"#;

/// A temporary directory laid out like the `data/` directory of a checkout.
#[derive(Debug)]
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("UTF-8 temp path");
        Self { _dir: dir, root }
    }

    pub(super) fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub(super) fn archive(&self) -> Utf8PathBuf {
        self.root.join("enwiki-latest-pages-articles.xml")
    }

    pub(super) fn dump(&self) -> Utf8PathBuf {
        self.root.join("enwiki.dump")
    }

    pub(super) fn database(&self) -> Utf8PathBuf {
        self.root.join("wikipedia.db")
    }

    pub(super) fn database_url(&self) -> String {
        format!("sqlite://{}", self.database())
    }

    pub(super) fn links(&self) -> Utf8PathBuf {
        self.root.join("out").join("links.txt")
    }

    pub(super) fn write_export(&self) {
        fs::write(self.archive(), SAMPLE_EXPORT).expect("write export");
    }
}
