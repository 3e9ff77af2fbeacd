//! Criterion benchmarks for link extraction and page crawling.
//!
//! Measures throughput over synthetic wikitext of increasing size so that
//! regressions in the link pattern or the XML reader show up early.
//!
//! Run benchmarks with:
//! ```bash
//! cargo bench --package wikilinks-data
//! ```

#![allow(missing_docs, reason = "Criterion macros generate undocumented code")]

use std::{fmt::Write as _, hint::black_box, time::Duration};

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use wikilinks_data::wikipedia::crawl::{extract_links, read_archive};

/// Links per synthetic page.
const PAGE_SIZES: &[usize] = &[10, 100, 1_000];

/// Pages per synthetic export.
const EXPORT_PAGES: usize = 200;

/// Wikitext mixing plain, piped, anchored and blacklisted links with prose.
fn synthetic_wikitext(links: usize) -> String {
    let mut text = String::new();
    for index in 0..links {
        let _ = match index % 4 {
            0 => write!(text, "Some prose about [[Topic {index}]]. "),
            1 => write!(text, "See [[topic_{index}|the topic]] for more. "),
            2 => write!(text, "[[Topic {index}#Details]] and ''markup''. "),
            _ => write!(text, "[[File:Image {index}.png|thumb|A caption]] "),
        };
    }
    text
}

fn synthetic_export(pages: usize, links: usize) -> String {
    let body = synthetic_wikitext(links);
    let mut xml = String::from("<mediawiki>");
    for page in 0..pages {
        let _ = write!(
            xml,
            "<page><title>Page {page}</title><ns>0</ns><revision><text>{body}</text></revision></page>"
        );
    }
    xml.push_str("</mediawiki>");
    xml
}

fn bench_extract_links(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_links");
    for &size in PAGE_SIZES {
        let text = synthetic_wikitext(size);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &text, |b, text| {
            b.iter(|| extract_links(black_box(text)).count());
        });
    }
    group.finish();
}

fn bench_read_archive(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_archive");
    group.measurement_time(Duration::from_secs(10));
    for &size in PAGE_SIZES {
        let xml = synthetic_export(EXPORT_PAGES, size);
        group.throughput(Throughput::Bytes(xml.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &xml, |b, xml| {
            b.iter(|| read_archive(black_box(xml.as_bytes()), &()).map(|map| map.link_len()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_extract_links, bench_read_archive);
criterion_main!(benches);
