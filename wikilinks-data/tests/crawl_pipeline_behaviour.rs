//! Behavioural tests for the crawl and insert pipeline.

use std::{cell::RefCell, io::Write};

use bzip2::{Compression, write::BzEncoder};
use camino::Utf8PathBuf;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;
use wikilinks_core::{
    ArticleId, ArticleMap, LinkDirection, LinkGraph, SqliteLinkGraph, write_archive_dump,
};
use wikilinks_data::wikipedia::{
    crawl::{LoadedArticleMap, MapOrigin, load_article_map},
    insert::{InsertOptions, insert_article_map},
};

const EXPORT: &str = r#"<mediawiki>
  <page>
    <title>Rust</title>
    <ns>0</ns>
    <revision><text>[[OCaml]], [[C++|C plus plus]] and [[LLVM]]</text></revision>
  </page>
  <page>
    <title>OCaml</title>
    <ns>0</ns>
    <revision><text>[[Rust]]</text></revision>
  </page>
</mediawiki>"#;

struct PipelineWorld {
    dir: TempDir,
    loaded: RefCell<Option<LoadedArticleMap>>,
}

impl PipelineWorld {
    fn path(&self, name: &str) -> Utf8PathBuf {
        Utf8PathBuf::try_from(self.dir.path().join(name)).expect("temp dir should be UTF-8")
    }

    fn archive(&self) -> Utf8PathBuf {
        self.path("enwiki-latest-pages-articles.xml.bz2")
    }

    fn dump(&self) -> Utf8PathBuf {
        self.path("archive_dump.bincode")
    }

    fn database(&self) -> Utf8PathBuf {
        self.path("wikipedia.db")
    }
}

#[fixture]
fn world() -> PipelineWorld {
    PipelineWorld {
        dir: TempDir::new().expect("create temp dir"),
        loaded: RefCell::new(None),
    }
}

fn languages() -> ArticleMap {
    let mut map = ArticleMap::default();
    let rust = map.insert_article("Rust");
    for target in ["OCaml", "C++", "LLVM"] {
        let id = map.insert_article(target);
        map.insert_link(rust, id);
    }
    map
}

#[given("a bzip2 compressed export about programming languages")]
fn given_compressed_export(world: &PipelineWorld) {
    let mut encoder = BzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(EXPORT.as_bytes()).expect("compress export");
    let bytes = encoder.finish().expect("finish compression");
    std::fs::write(world.archive(), bytes).expect("write archive");
}

#[given("an archive dump cache without an export")]
fn given_cached_dump(world: &PipelineWorld) {
    write_archive_dump(world.dump().as_std_path(), &languages()).expect("write dump");
}

#[when("I crawl the export and load the link graph")]
fn crawl_and_load(world: &PipelineWorld) {
    let loaded = load_article_map(&world.archive(), &world.dump(), &()).expect("load map");
    insert_article_map(&world.database(), &loaded.map, InsertOptions::default(), &())
        .expect("insert map");
    world.loaded.replace(Some(loaded));
}

fn origin(world: &PipelineWorld) -> MapOrigin {
    world
        .loaded
        .borrow()
        .as_ref()
        .map(|loaded| loaded.origin)
        .expect("map should be loaded")
}

#[then("the map was read from the export")]
fn read_from_export(world: &PipelineWorld) {
    assert_eq!(origin(world), MapOrigin::Archive);
}

#[then("the map was read from the cache")]
fn read_from_cache(world: &PipelineWorld) {
    assert_eq!(origin(world), MapOrigin::Cache);
}

#[then("the archive dump cache is written")]
fn dump_written(world: &PipelineWorld) {
    assert!(world.dump().is_file());
}

#[then("the link graph lists the outbound links of Rust")]
fn rust_links(world: &PipelineWorld) {
    let graph = SqliteLinkGraph::open(world.database()).expect("open graph");
    let names: Vec<String> = graph
        .links(ArticleId::from_name("Rust"), LinkDirection::Outbound, 100)
        .expect("list links")
        .into_iter()
        .map(|article| article.name)
        .collect();
    assert_eq!(names, ["C++", "LLVM", "OCaml"]);
}

#[scenario(path = "tests/features/crawl_pipeline.feature", index = 0)]
fn crawling_a_compressed_export(world: PipelineWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/crawl_pipeline.feature", index = 1)]
fn reusing_a_cached_archive_dump(world: PipelineWorld) {
    let _ = world;
}
