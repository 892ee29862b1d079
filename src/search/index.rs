//! Tantivy index over page titles and bodies

use crate::search::{SearchHit, SearchIndex};
use crate::storage::Page;
use crate::LinkRankError;
use tantivy::collector::TopDocs;
use tantivy::query::QueryParser;
use tantivy::schema::{Field, Schema, Value, INDEXED, STORED, TEXT};
use tantivy::{doc, Index, IndexReader, IndexWriter, TantivyDocument};

/// Heap for the single indexing thread
const WRITER_MEMORY_BYTES: usize = 50_000_000;

/// A document as seen by the index
#[derive(Debug, Clone, Copy)]
pub struct IndexDocument<'a> {
    pub page_id: i64,
    pub title: &'a str,
    pub text: &'a str,
}

impl<'a> From<&'a Page> for IndexDocument<'a> {
    fn from(page: &'a Page) -> Self {
        Self {
            page_id: page.page_id,
            title: &page.title,
            text: &page.text,
        }
    }
}

#[derive(Clone, Copy)]
struct PageFields {
    page_id: Field,
    title: Field,
    text: Field,
}

impl PageFields {
    fn schema() -> (Schema, Self) {
        let mut builder = Schema::builder();
        let fields = Self {
            page_id: builder.add_i64_field("page_id", INDEXED | STORED),
            title: builder.add_text_field("title", TEXT),
            text: builder.add_text_field("text", TEXT),
        };
        (builder.build(), fields)
    }
}

/// In-memory BM25 index of a corpus
///
/// Queries are parsed leniently against title and text; terms are OR-ed, so a
/// page matching any query term is a hit.
pub struct PageIndex {
    index: Index,
    reader: IndexReader,
    fields: PageFields,
    documents: usize,
}

impl PageIndex {
    pub fn build<'a>(
        documents: impl IntoIterator<Item = IndexDocument<'a>>,
    ) -> Result<Self, LinkRankError> {
        let (schema, fields) = PageFields::schema();
        let index = Index::create_in_ram(schema);

        let mut writer: IndexWriter = index.writer_with_num_threads(1, WRITER_MEMORY_BYTES)?;
        let mut count = 0;
        for document in documents {
            writer.add_document(doc!(
                fields.page_id => document.page_id,
                fields.title => document.title,
                fields.text => document.text
            ))?;
            count += 1;
        }
        writer.commit()?;

        let reader = index.reader()?;
        tracing::debug!("Indexed {} documents", count);

        Ok(Self {
            index,
            reader,
            fields,
            documents: count,
        })
    }

    pub fn from_pages(pages: &[Page]) -> Result<Self, LinkRankError> {
        Self::build(pages.iter().map(IndexDocument::from))
    }

    pub fn document_count(&self) -> usize {
        self.documents
    }
}

impl SearchIndex for PageIndex {
    fn search(&self, query: &str) -> Result<Vec<SearchHit>, LinkRankError> {
        if self.documents == 0 {
            return Ok(Vec::new());
        }

        let parser = QueryParser::for_index(&self.index, vec![self.fields.title, self.fields.text]);
        let (query, errors) = parser.parse_query_lenient(query);
        if !errors.is_empty() {
            tracing::debug!("Ignored {} malformed query clauses", errors.len());
        }

        let searcher = self.reader.searcher();
        let top_docs = searcher.search(&query, &TopDocs::with_limit(self.documents))?;

        let mut hits = Vec::with_capacity(top_docs.len());
        for (score, address) in top_docs {
            let document: TantivyDocument = searcher.doc(address)?;
            if let Some(page_id) = document
                .get_first(self.fields.page_id)
                .and_then(|v| v.as_i64())
            {
                hits.push(SearchHit {
                    page_id,
                    score: f64::from(score),
                });
            }
        }
        hits.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.page_id.cmp(&b.page_id)));
        Ok(hits)
    }
}
