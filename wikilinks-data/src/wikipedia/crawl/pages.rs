//! Pull-parser over the `<page>` elements of a MediaWiki export.

use std::io::BufRead;

use quick_xml::{Reader, events::Event};
use wikilinks_core::{ArticleMap, is_blacklisted_title, is_redirect_text};

use super::{CrawlError, CrawlProgress, extract_links};

/// Article count between progress reports.
pub const PROGRESS_INTERVAL: u64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadState {
    Ignore,
    Page,
    Title,
    Namespace,
    Revision,
    Text,
}

#[derive(Debug, Default)]
struct PageDraft {
    title: String,
    namespace: String,
    text: String,
    redirect: bool,
    revision_seen: bool,
}

impl PageDraft {
    /// Title and wikitext of a page worth indexing.
    fn into_article(self) -> Option<(String, String)> {
        let title = self.title.trim();
        if title.is_empty() || is_blacklisted_title(title) {
            return None;
        }
        let namespace = self.namespace.trim();
        if !namespace.is_empty() && namespace != "0" {
            return None;
        }
        if self.redirect || is_redirect_text(&self.text) {
            return None;
        }
        Some((title.to_owned(), self.text))
    }
}

/// Build an [`ArticleMap`] from the XML export read by `reader`.
///
/// # Examples
/// ```
/// use wikilinks_data::wikipedia::crawl::read_archive;
///
/// let xml = br#"<mediawiki><page>
///   <title>Rust</title><ns>0</ns>
///   <revision><text>[[OCaml]] and [[LLVM|the LLVM backend]]</text></revision>
/// </page></mediawiki>"#;
/// let map = read_archive(&xml[..], &())?;
/// assert_eq!(map.article_len(), 3);
/// assert_eq!(map.link_len(), 2);
/// # Ok::<(), wikilinks_data::wikipedia::crawl::CrawlError>(())
/// ```
pub fn read_archive<R: BufRead>(
    reader: R,
    progress: &dyn CrawlProgress,
) -> Result<ArticleMap, CrawlError> {
    let mut xml = Reader::from_reader(reader);
    xml.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut state = ReadState::Ignore;
    let mut draft = PageDraft::default();
    let mut map = ArticleMap::default();
    let mut reported = 0_u64;

    loop {
        let event = xml
            .read_event_into(&mut buf)
            .map_err(|source| xml_error(&xml, source))?;
        state = match (state, event) {
            (_, Event::Eof) => break,
            (ReadState::Ignore, Event::Start(tag)) if tag.name().as_ref() == b"page" => {
                draft = PageDraft::default();
                ReadState::Page
            }
            (ReadState::Page, Event::Start(tag)) => match tag.name().as_ref() {
                b"title" => ReadState::Title,
                b"ns" => ReadState::Namespace,
                b"redirect" => {
                    draft.redirect = true;
                    ReadState::Page
                }
                b"revision" if !draft.revision_seen => {
                    draft.revision_seen = true;
                    ReadState::Revision
                }
                _ => ReadState::Page,
            },
            (ReadState::Page, Event::Empty(tag)) if tag.name().as_ref() == b"redirect" => {
                draft.redirect = true;
                ReadState::Page
            }
            (ReadState::Page, Event::End(tag)) if tag.name().as_ref() == b"page" => {
                if let Some((title, text)) = std::mem::take(&mut draft).into_article() {
                    record_article(&mut map, &title, &text);
                }
                ReadState::Ignore
            }
            (ReadState::Title, Event::End(_)) | (ReadState::Namespace, Event::End(_)) => {
                ReadState::Page
            }
            (ReadState::Title, ref event) => {
                append_text(&mut draft.title, event).map_err(|source| xml_error(&xml, source))?;
                ReadState::Title
            }
            (ReadState::Namespace, ref event) => {
                append_text(&mut draft.namespace, event)
                    .map_err(|source| xml_error(&xml, source))?;
                ReadState::Namespace
            }
            (ReadState::Revision, Event::Start(tag)) if tag.name().as_ref() == b"text" => {
                ReadState::Text
            }
            (ReadState::Revision, Event::End(tag)) if tag.name().as_ref() == b"revision" => {
                ReadState::Page
            }
            (ReadState::Text, Event::End(_)) => ReadState::Revision,
            (ReadState::Text, ref event) => {
                append_text(&mut draft.text, event).map_err(|source| xml_error(&xml, source))?;
                ReadState::Text
            }
            (current, _) => current,
        };
        buf.clear();

        let articles = map.article_len();
        if articles.saturating_sub(reported) >= PROGRESS_INTERVAL {
            reported = articles;
            log::info!("reading archive: {articles} articles");
            progress.articles_read(articles);
        }
    }

    log::info!(
        "reading archive: done ({} articles, {} links)",
        map.article_len(),
        map.link_len()
    );
    progress.finished(map.article_len());
    Ok(map)
}

fn record_article(map: &mut ArticleMap, title: &str, text: &str) {
    let source = map.insert_article(title);
    for target in extract_links(text) {
        if target == title {
            continue;
        }
        let target_id = map.insert_article(&target);
        map.insert_link(source, target_id);
    }
}

fn append_text(target: &mut String, event: &Event<'_>) -> Result<(), quick_xml::Error> {
    match event {
        Event::Text(text) => {
            let unescaped = text.unescape().map_err(quick_xml::Error::from)?;
            target.push_str(&unescaped);
        }
        Event::CData(data) => target.push_str(&String::from_utf8_lossy(data)),
        _ => {}
    }
    Ok(())
}

fn xml_error<R>(reader: &Reader<R>, source: quick_xml::Error) -> CrawlError {
    CrawlError::Xml {
        position: u64::try_from(reader.buffer_position()).unwrap_or(u64::MAX),
        source,
    }
}
