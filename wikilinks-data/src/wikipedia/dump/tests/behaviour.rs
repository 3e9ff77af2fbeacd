//! Behavioural coverage for the Wikipedia dump downloader.

use std::{cell::RefCell, fs, path::PathBuf};

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

use crate::wikipedia::dump::test_support::{StubSource, block_on_for_tests};
use crate::wikipedia::dump::{
    DownloadLog, DownloadOptions, DownloadReport, DumpRequest, WikipediaDumpError, download_dump,
};

const SAMPLE_ARCHIVE: &[u8] = b"sample";
const FEATURE_PATH: &str = "tests/features/download_wikipedia_dump.feature";

type DownloadResultCell = RefCell<Option<Result<DownloadReport, WikipediaDumpError>>>;

#[fixture]
fn working_dir() -> TempDir {
    match TempDir::new() {
        Ok(dir) => dir,
        Err(err) => panic!("failed to create temporary directory: {err}"),
    }
}

#[derive(Debug, Default)]
struct DumpScenarioContext {
    stub_source: RefCell<Option<StubSource>>,
    download_result: DownloadResultCell,
    output_path: RefCell<Option<PathBuf>>,
    log_handle: RefCell<Option<DownloadLog>>,
}

#[fixture]
fn dump_context() -> DumpScenarioContext {
    DumpScenarioContext::default()
}

fn manifest_with_dump() -> Vec<u8> {
    format!(
        r#"{{
            "jobs": {{
                "articlesdump": {{
                    "status": "done",
                    "files": {{
                        "enwiki-20240901-pages-articles.xml.bz2": {{
                            "url": "/enwiki/20240901/enwiki-20240901-pages-articles.xml.bz2",
                            "size": {size},
                            "sha1": "abc123"
                        }}
                    }}
                }}
            }}
        }}"#,
        size = SAMPLE_ARCHIVE.len()
    )
    .into_bytes()
}

fn manifest_without_dump() -> Vec<u8> {
    br#"{
        "jobs": {
            "articlesdump": {
                "status": "failed",
                "files": {}
            }
        }
    }"#
    .to_vec()
}

#[given("a dump status manifest containing an articles dump")]
fn given_manifest_with_dump(#[from(dump_context)] ctx: &DumpScenarioContext) {
    ctx.stub_source.replace(Some(StubSource::with_manifest(
        manifest_with_dump(),
        SAMPLE_ARCHIVE.to_vec(),
    )));
}

#[given("a dump status manifest missing the articles dump")]
fn given_manifest_without_dump(#[from(dump_context)] ctx: &DumpScenarioContext) {
    ctx.stub_source.replace(Some(StubSource::with_manifest(
        manifest_without_dump(),
        SAMPLE_ARCHIVE.to_vec(),
    )));
}

#[given("a writable output directory")]
fn writable_output(
    #[from(working_dir)] dir: &TempDir,
    #[from(dump_context)] ctx: &DumpScenarioContext,
) {
    ctx.output_path
        .replace(Some(dir.path().join("enwiki-20240901-pages-articles.xml.bz2")));
}

#[given("a download log target")]
fn download_log_target(
    #[from(working_dir)] dir: &TempDir,
    #[from(dump_context)] ctx: &DumpScenarioContext,
) {
    let path = dir.path().join("downloads.sqlite");
    let log = match DownloadLog::initialise(&path) {
        Ok(log) => log,
        Err(err) => panic!("log initialisation failed: {err}"),
    };
    ctx.log_handle.replace(Some(log));
}

#[when("I download the dated dump")]
fn download_dated(#[from(dump_context)] ctx: &DumpScenarioContext) {
    let source_borrow = ctx.stub_source.borrow();
    let stub = source_borrow
        .as_ref()
        .unwrap_or_else(|| panic!("stub source must be initialised"));
    let output_path = ctx
        .output_path
        .borrow()
        .clone()
        .unwrap_or_else(|| panic!("output path must be prepared"));
    let log_borrow = ctx.log_handle.borrow();
    let mut options = DownloadOptions::new(&output_path);
    if let Some(log) = log_borrow.as_ref() {
        options = options.with_log(log);
    }
    let request = DumpRequest::new("enwiki", "20240901");
    let outcome = block_on_for_tests(download_dump(stub, &request, options));
    ctx.download_result.replace(Some(outcome));
}

#[then("the archive is written to disk")]
fn archive_written(#[from(dump_context)] ctx: &DumpScenarioContext) {
    let result_borrow = ctx.download_result.borrow();
    let report = match result_borrow.as_ref() {
        Some(Ok(report)) => report,
        Some(Err(err)) => panic!("download should succeed: {err}"),
        None => panic!("download result must be captured"),
    };
    let contents = match fs::read(&report.output_path) {
        Ok(bytes) => bytes,
        Err(err) => panic!("failed to read downloaded archive: {err}"),
    };
    assert_eq!(contents, SAMPLE_ARCHIVE);
    assert_eq!(ctx.output_path.borrow().as_ref(), Some(&report.output_path));
}

#[then("the download log records an entry")]
fn log_records_entry(#[from(dump_context)] ctx: &DumpScenarioContext) {
    let log_borrow = ctx.log_handle.borrow();
    let log = log_borrow
        .as_ref()
        .unwrap_or_else(|| panic!("download log should be initialised"));
    match log.entry_count() {
        Ok(count) => assert_eq!(count, 1),
        Err(err) => panic!("failed to query download log: {err}"),
    }
}

#[then("an error about the missing dump is returned")]
fn missing_dump_error(#[from(dump_context)] ctx: &DumpScenarioContext) {
    let result_borrow = ctx.download_result.borrow();
    match result_borrow.as_ref() {
        Some(Err(WikipediaDumpError::MissingDump)) => {}
        Some(Err(err)) => panic!("unexpected error variant: {err}"),
        Some(Ok(_)) => panic!("expected an error for the missing dump"),
        None => panic!("download result must be captured"),
    }
}

#[test]
fn scenario_indices_follow_feature_order() {
    let feature_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(FEATURE_PATH);
    let contents = match fs::read_to_string(&feature_path) {
        Ok(data) => data,
        Err(err) => panic!("failed to read feature file {feature_path:?}: {err}"),
    };
    let titles: Vec<&str> = contents
        .lines()
        .filter_map(|line| line.trim().strip_prefix("Scenario: "))
        .collect();
    assert_eq!(
        titles,
        [
            "downloading a dated articles dump",
            "reporting a missing articles dump",
        ],
        "scenario order changed in feature file"
    );
}

macro_rules! register_scenario {
    ($name:ident, $index:literal) => {
        #[scenario(path = "tests/features/download_wikipedia_dump.feature", index = $index)]
        fn $name(dump_context: DumpScenarioContext, working_dir: TempDir) {
            let _ = (dump_context, working_dir);
        }
    };
}

register_scenario!(downloading_a_dated_articles_dump, 0);
register_scenario!(reporting_a_missing_articles_dump, 1);
