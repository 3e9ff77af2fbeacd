//! Background SQLite writer fed through a bounded channel.

use std::{
    mem,
    sync::mpsc::{Receiver, SyncSender, sync_channel},
    thread::{self, JoinHandle},
};

use rusqlite::Connection;
use wikilinks_core::ArticleId;

use super::{CHANNEL_CAPACITY, InsertError, InsertReport, REQUEST_BUFFER_SIZE};

/// A single row destined for the link graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphItem {
    /// An article row.
    Article {
        /// Article id.
        id: ArticleId,
        /// Article title.
        name: String,
    },
    /// A link row.
    Link {
        /// Linking article.
        source: ArticleId,
        /// Linked article.
        target: ArticleId,
    },
}

type WriterHandle = JoinHandle<Result<InsertReport, InsertError>>;

/// Batches [`GraphItem`]s and writes them on a dedicated thread.
///
/// Items are grouped into batches of [`REQUEST_BUFFER_SIZE`]; at most
/// [`CHANNEL_CAPACITY`] batches wait for the writer at any time, so `push`
/// blocks when SQLite falls behind.
#[derive(Debug)]
pub struct BulkInserter {
    sender: Option<SyncSender<Vec<GraphItem>>>,
    writer: Option<WriterHandle>,
    buffer: Vec<GraphItem>,
}

impl BulkInserter {
    /// Start a writer thread that owns `connection`.
    ///
    /// The connection must already carry the link graph schema.
    pub fn spawn(connection: Connection) -> Result<Self, InsertError> {
        let (sender, receiver) = sync_channel(CHANNEL_CAPACITY);
        let writer = thread::Builder::new()
            .name("wikilinks-insert".to_owned())
            .spawn(move || write_batches(connection, &receiver))
            .map_err(|source| InsertError::SpawnWriter { source })?;
        Ok(Self {
            sender: Some(sender),
            writer: Some(writer),
            buffer: Vec::with_capacity(REQUEST_BUFFER_SIZE),
        })
    }

    /// Queue `item`, handing a full batch to the writer.
    pub fn push(&mut self, item: GraphItem) -> Result<(), InsertError> {
        self.buffer.push(item);
        if self.buffer.len() >= REQUEST_BUFFER_SIZE {
            self.flush()?;
        }
        Ok(())
    }

    /// Hand any partially filled batch to the writer.
    pub fn flush(&mut self) -> Result<(), InsertError> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let batch = mem::replace(&mut self.buffer, Vec::with_capacity(REQUEST_BUFFER_SIZE));
        let sender = self.sender.as_ref().ok_or(InsertError::WriterStopped)?;
        sender.send(batch).map_err(|_| InsertError::WriterStopped)
    }

    /// Number of items waiting for the next batch.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Flush, close the channel and wait for the writer.
    ///
    /// A writer failure takes precedence over the [`InsertError::WriterStopped`]
    /// seen by the producer.
    pub fn finish(mut self) -> Result<InsertReport, InsertError> {
        let flushed = self.flush();
        self.sender = None;
        let joined = self.join_writer();
        match (flushed, joined) {
            (_, Err(err)) => Err(err),
            (Err(err), Ok(_)) => Err(err),
            (Ok(()), Ok(report)) => Ok(report),
        }
    }

    fn join_writer(&mut self) -> Result<InsertReport, InsertError> {
        let writer = self.writer.take().ok_or(InsertError::WriterStopped)?;
        writer.join().map_err(|_| InsertError::WriterPanicked)?
    }
}

impl Drop for BulkInserter {
    fn drop(&mut self) {
        self.sender = None;
        if let Some(writer) = self.writer.take()
            && let Ok(Err(err)) = writer.join()
        {
            log::warn!("bulk insert abandoned after writer error: {err}");
        }
    }
}

fn write_batches(
    mut connection: Connection,
    batches: &Receiver<Vec<GraphItem>>,
) -> Result<InsertReport, InsertError> {
    let mut report = InsertReport::default();
    for batch in batches {
        write_batch(&mut connection, &batch, &mut report)?;
    }
    Ok(report)
}

fn write_batch(
    connection: &mut Connection,
    batch: &[GraphItem],
    report: &mut InsertReport,
) -> Result<(), InsertError> {
    let transaction = connection
        .transaction()
        .map_err(|source| InsertError::sqlite("begin batch", source))?;
    {
        let mut insert_article = transaction
            .prepare_cached("INSERT OR IGNORE INTO articles (id, name) VALUES (?1, ?2)")
            .map_err(|source| InsertError::sqlite("prepare article insert", source))?;
        let mut insert_link = transaction
            .prepare_cached("INSERT OR IGNORE INTO links (source, target) VALUES (?1, ?2)")
            .map_err(|source| InsertError::sqlite("prepare link insert", source))?;
        for item in batch {
            match item {
                GraphItem::Article { id, name } => {
                    let changed = insert_article
                        .execute((id.as_bytes().as_slice(), name.as_str()))
                        .map_err(|source| InsertError::sqlite("insert article", source))?;
                    report.articles += changed as u64;
                }
                GraphItem::Link { source, target } => {
                    let changed = insert_link
                        .execute((source.as_bytes().as_slice(), target.as_bytes().as_slice()))
                        .map_err(|err| InsertError::sqlite("insert link", err))?;
                    report.links += changed as u64;
                }
            }
        }
    }
    transaction
        .commit()
        .map_err(|source| InsertError::sqlite("commit batch", source))?;
    report.batches += 1;
    log::debug!("committed batch {} ({} items)", report.batches, batch.len());
    Ok(())
}
