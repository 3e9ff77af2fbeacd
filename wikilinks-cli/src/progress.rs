//! Terminal progress reporting for the crawl and insert pipelines.
//!
//! Bars draw to stderr and stay hidden when it is not a terminal.

use std::cell::RefCell;

use indicatif::{ProgressBar, ProgressStyle};
use wikilinks_data::wikipedia::{
    crawl::CrawlProgress,
    insert::{InsertPhase, InsertProgress},
};

const SPINNER_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] {msg}: {pos} ({per_sec})";
const BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] {msg} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%)";

/// Spinner counting articles while an export is parsed.
#[derive(Debug)]
pub(crate) struct CrawlSpinner {
    bar: ProgressBar,
}

impl CrawlSpinner {
    pub(crate) fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template(SPINNER_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message("reading articles");
        Self { bar }
    }
}

impl CrawlProgress for CrawlSpinner {
    fn articles_read(&self, articles: u64) {
        self.bar.set_position(articles);
    }

    fn finished(&self, articles: u64) {
        self.bar.set_position(articles);
        self.bar.finish_with_message("articles read");
    }
}

/// One bar per insert phase.
#[derive(Debug, Default)]
pub(crate) struct InsertBars {
    current: RefCell<Option<ProgressBar>>,
}

impl InsertBars {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

impl InsertProgress for InsertBars {
    fn phase_started(&self, phase: InsertPhase, total: u64) {
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::with_template(BAR_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        bar.set_message(phase.label());
        if let Some(previous) = self.current.replace(Some(bar)) {
            previous.finish();
        }
    }

    fn items_queued(&self, _phase: InsertPhase, items: u64) {
        if let Some(bar) = self.current.borrow().as_ref() {
            bar.inc(items);
        }
    }

    fn phase_finished(&self, phase: InsertPhase) {
        if let Some(bar) = self.current.borrow_mut().take() {
            bar.finish_with_message(format!("{}: done", phase.label()));
        }
    }
}
