//! Behaviour-driven step definitions driving the crawl and export scenarios.

use super::helpers::Workspace;
use super::*;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::{cell::RefCell, fs};
use wikilinks_core::{ArticleId, LinkDirection, LinkGraph, SqliteLinkGraph, read_archive_dump};

use crate::crawl::ARG_ARCHIVE;

/// Scenario state shared by every step through a single world argument.
#[derive(Debug)]
struct PipelineWorld {
    workspace: Workspace,
    outcome: RefCell<Option<Result<(), CliError>>>,
}

impl PipelineWorld {
    fn new() -> Self {
        Self {
            workspace: Workspace::new(),
            outcome: RefCell::new(None),
        }
    }

    fn invoke(&self, args: &[String]) -> Result<(), CliError> {
        let mut invocation = vec!["wikilinks".to_owned()];
        invocation.extend(args.iter().cloned());
        Cli::try_parse_from(invocation)
            .map_err(CliError::ArgumentParsing)
            .and_then(|cli| execute(cli.command))
    }

    fn crawl_args(&self, extra: &[&str]) -> Vec<String> {
        let workspace = &self.workspace;
        let mut args = vec![
            "crawl".to_owned(),
            workspace.archive().into_string(),
            workspace.dump().into_string(),
            "--database-url".to_owned(),
            workspace.database_url(),
        ];
        args.extend(extra.iter().map(|arg| (*arg).to_owned()));
        args
    }

    fn expect_success(&self) {
        let borrowed = self.outcome.borrow();
        let outcome = borrowed.as_ref().expect("command should have run");
        if let Err(err) = outcome {
            panic!("command failed: {err}");
        }
    }
}

#[fixture]
fn world() -> PipelineWorld {
    PipelineWorld::new()
}

#[given("a small MediaWiki export on disk")]
fn export_on_disk(#[from(world)] world: &PipelineWorld) {
    world.workspace.write_export();
}

#[given("the export has already been crawled into an archive dump")]
fn export_already_crawled(#[from(world)] world: &PipelineWorld) {
    world
        .invoke(&world.crawl_args(&["--skip-insert"]))
        .expect("initial crawl succeeds");
    assert!(world.workspace.dump().exists(), "archive dump should exist");
}

#[given("the export has since been deleted")]
fn export_deleted(#[from(world)] world: &PipelineWorld) {
    fs::remove_file(world.workspace.archive()).expect("remove export");
}

#[given("no export exists")]
fn no_export(#[from(world)] world: &PipelineWorld) {
    assert!(!world.workspace.archive().exists());
}

#[when("I run the crawl command against a fresh database")]
fn run_crawl(#[from(world)] world: &PipelineWorld) {
    let outcome = world.invoke(&world.crawl_args(&["--bulk-load-optimized"]));
    world.outcome.replace(Some(outcome));
}

#[when("I export the links")]
fn run_export(#[from(world)] world: &PipelineWorld) {
    let workspace = &world.workspace;
    let args = [
        "export-links".to_owned(),
        workspace.archive().into_string(),
        workspace.dump().into_string(),
        "--output".to_owned(),
        workspace.links().into_string(),
    ];
    let outcome = world.invoke(&args);
    world.outcome.replace(Some(outcome));
}

#[then("the link graph lists the outbound links of Rust")]
fn graph_lists_rust_links(#[from(world)] world: &PipelineWorld) {
    world.expect_success();
    let graph = SqliteLinkGraph::open(world.workspace.database()).expect("open graph");
    let names: Vec<String> = graph
        .links(ArticleId::from_name("Rust"), LinkDirection::Outbound, 10)
        .expect("list links")
        .into_iter()
        .map(|article| article.name)
        .collect();
    assert_eq!(names, ["LLVM", "OCaml"]);
    let summary = graph.summary().expect("summary");
    assert_eq!((summary.articles, summary.links), (3, 3));
}

#[then("the archive dump caches the article map")]
fn dump_caches_map(#[from(world)] world: &PipelineWorld) {
    let map = read_archive_dump(world.workspace.dump().as_std_path()).expect("read dump");
    assert_eq!((map.article_len(), map.link_len()), (3, 3));
}

#[then("the links listing names every article")]
fn listing_names_articles(#[from(world)] world: &PipelineWorld) {
    world.expect_success();
    let listing = fs::read_to_string(world.workspace.links()).expect("read listing");
    assert_eq!(listing, "LLVM\nOCaml\n\tRust\nRust\n\tLLVM\n\tOCaml\n");
}

#[then("the CLI reports that the archive is missing")]
fn reports_missing_archive(#[from(world)] world: &PipelineWorld) {
    let borrowed = world.outcome.borrow();
    let error = borrowed
        .as_ref()
        .expect("command should have run")
        .as_ref()
        .expect_err("expected an error");
    match error {
        CliError::MissingSourceFile { field, .. } => assert_eq!(*field, ARG_ARCHIVE),
        other => panic!("unexpected error {other:?}"),
    }
}

macro_rules! register_pipeline_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/crawl_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: PipelineWorld) {
            let _ = world;
        }
    };
}

register_pipeline_scenario!(crawling_into_the_graph, "crawling an export into the link graph");
register_pipeline_scenario!(
    exporting_from_the_cache,
    "exporting links from a cached archive dump"
);
register_pipeline_scenario!(rejecting_missing_export, "rejecting a missing export");
