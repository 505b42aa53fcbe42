//! A small document repository built on the public API
//!
//! Exercises the full stack the way the application layer uses it: typed
//! views for primary records, indexes synchronized in the same
//! transaction, and the keyed queue in front of contended documents.

use futures::FutureExt;
use quillstore::{
    Condition, DocId, Error, Index, IndexKeyPart, KeyedQueue, Store, Subspace, Transaction,
    TuplePart, TypedView,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Document {
    id: DocId,
    slug: String,
    author: String,
    revision: u64,
}

struct Repository {
    store: Store,
    by_slug: Arc<Index<Document>>,
    by_author: Arc<Index<Document>>,
}

fn docs_space() -> Subspace {
    Subspace::new(&[TuplePart::text("docs")])
}

impl Repository {
    fn new(store: Store) -> Self {
        Repository {
            store,
            by_slug: Arc::new(Index::unique(
                "by_slug",
                Subspace::new(&[TuplePart::text("idx"), TuplePart::text("slug")]),
                |d: &Document| d.id,
                |d: &Document| Some(vec![IndexKeyPart::text(d.slug.clone())]),
            )),
            by_author: Arc::new(Index::non_unique(
                "by_author",
                Subspace::new(&[TuplePart::text("idx"), TuplePart::text("author")]),
                |d: &Document| d.id,
                |d: &Document| Some(vec![IndexKeyPart::text(d.author.clone())]),
            )),
        }
    }

    fn id_key(id: DocId) -> Vec<TuplePart> {
        vec![TuplePart::Bytes(bytes::Bytes::copy_from_slice(
            id.as_bytes(),
        ))]
    }

    async fn load(tx: &mut Transaction, id: DocId) -> quillstore::Result<Option<Document>> {
        TypedView::<Document>::new(tx, docs_space())
            .get(&Self::id_key(id))
            .await
    }

    async fn create(&self, doc: Document) -> quillstore::Result<()> {
        let by_slug = Arc::clone(&self.by_slug);
        let by_author = Arc::clone(&self.by_author);
        self.store
            .transact(|tx| {
                let by_slug = Arc::clone(&by_slug);
                let by_author = Arc::clone(&by_author);
                let doc = doc.clone();
                async move {
                    by_slug.sync(tx, None, Some(&doc)).await?;
                    by_author.sync(tx, None, Some(&doc)).await?;
                    TypedView::new(tx, docs_space()).put(&Self::id_key(doc.id), &doc)
                }
                .boxed()
            })
            .await
    }

    async fn update(
        &self,
        id: DocId,
        mutate: impl Fn(&mut Document) + Send + Sync + 'static,
    ) -> quillstore::Result<()> {
        let mutate: Arc<dyn Fn(&mut Document) + Send + Sync> = Arc::new(mutate);
        let by_slug = Arc::clone(&self.by_slug);
        let by_author = Arc::clone(&self.by_author);
        self.store
            .transact(|tx| {
                let by_slug = Arc::clone(&by_slug);
                let by_author = Arc::clone(&by_author);
                let mutate = Arc::clone(&mutate);
                async move {
                    let prev = Self::load(tx, id)
                        .await?
                        .ok_or_else(|| Error::NotFound(format!("document {id}")))?;
                    let mut next = prev.clone();
                    mutate(&mut next);
                    next.revision = prev.revision + 1;
                    by_slug.sync(tx, Some(&prev), Some(&next)).await?;
                    by_author.sync(tx, Some(&prev), Some(&next)).await?;
                    TypedView::new(tx, docs_space()).put(&Self::id_key(id), &next)
                }
                .boxed()
            })
            .await
    }

    async fn delete(&self, id: DocId) -> quillstore::Result<()> {
        let by_slug = Arc::clone(&self.by_slug);
        let by_author = Arc::clone(&self.by_author);
        self.store
            .transact(|tx| {
                let by_slug = Arc::clone(&by_slug);
                let by_author = Arc::clone(&by_author);
                async move {
                    let prev = Self::load(tx, id)
                        .await?
                        .ok_or_else(|| Error::NotFound(format!("document {id}")))?;
                    by_slug.sync(tx, Some(&prev), None).await?;
                    by_author.sync(tx, Some(&prev), None).await?;
                    TypedView::<Document>::new(tx, docs_space()).delete(&Self::id_key(id))
                }
                .boxed()
            })
            .await
    }

    async fn find_by_author(&self, author: &str) -> quillstore::Result<Vec<DocId>> {
        let by_author = Arc::clone(&self.by_author);
        let key = vec![IndexKeyPart::text(author)];
        self.store
            .snapshot(|tx| async move { by_author.get(tx, &key).await }.boxed())
            .await
    }
}

fn doc(slug: &str, author: &str) -> Document {
    Document {
        id: DocId::new(),
        slug: slug.to_owned(),
        author: author.to_owned(),
        revision: 0,
    }
}

#[tokio::test]
async fn create_update_delete_keeps_documents_and_indexes_aligned() {
    let repo = Repository::new(Store::in_memory());

    let meeting = doc("meeting-notes", "ada");
    let roadmap = doc("roadmap", "ada");
    let diary = doc("diary", "brian");
    repo.create(meeting.clone()).await.unwrap();
    repo.create(roadmap.clone()).await.unwrap();
    repo.create(diary.clone()).await.unwrap();

    let mut ada_docs = repo.find_by_author("ada").await.unwrap();
    ada_docs.sort();
    let mut expected = vec![meeting.id, roadmap.id];
    expected.sort();
    assert_eq!(ada_docs, expected);

    // Handing a document to a new author moves it between index keys
    repo.update(roadmap.id, |d| d.author = "brian".into())
        .await
        .unwrap();
    assert_eq!(repo.find_by_author("ada").await.unwrap(), vec![meeting.id]);
    let mut brian_docs = repo.find_by_author("brian").await.unwrap();
    brian_docs.sort();
    let mut expected = vec![roadmap.id, diary.id];
    expected.sort();
    assert_eq!(brian_docs, expected);

    repo.delete(diary.id).await.unwrap();
    assert_eq!(
        repo.find_by_author("brian").await.unwrap(),
        vec![roadmap.id]
    );
    let missing = repo
        .store
        .snapshot(|tx| async move { Repository::load(tx, diary.id).await }.boxed())
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn duplicate_slug_is_rejected_and_nothing_persists() {
    let repo = Repository::new(Store::in_memory());

    let original = doc("readme", "ada");
    let squatter = doc("readme", "brian");
    repo.create(original.clone()).await.unwrap();

    let err = repo.create(squatter.clone()).await.unwrap_err();
    assert!(matches!(err, Error::UniqueViolation { .. }));

    // The failed create left no document behind
    let missing = repo
        .store
        .snapshot(|tx| {
            let id = squatter.id;
            async move { Repository::load(tx, id).await }.boxed()
        })
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn queued_editors_apply_every_revision() {
    let repo = Arc::new(Repository::new(Store::in_memory()));
    let queue = Arc::new(KeyedQueue::new());

    let page = doc("shared-page", "ada");
    repo.create(page.clone()).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..6 {
        let repo = Arc::clone(&repo);
        let queue = Arc::clone(&queue);
        let id = page.id;
        handles.push(tokio::spawn(async move {
            queue
                .run("shared-page", || async {
                    repo.update(id, |_| {}).await
                })
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let latest = repo
        .store
        .snapshot(|tx| {
            let id = page.id;
            async move { Repository::load(tx, id).await }.boxed()
        })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(latest.revision, 6);
}

#[tokio::test]
async fn updating_a_missing_document_is_not_found() {
    let repo = Repository::new(Store::in_memory());
    let err = repo.update(DocId::new(), |_| {}).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn conditions_with_multiple_bounds_are_rejected() {
    let condition = Condition::<u32>::from_bounds(Some(1), None, Some(5), None);
    assert!(matches!(condition, Err(Error::InvalidCondition(_))));
    let none = Condition::<u32>::from_bounds(None, None, None, None);
    assert!(matches!(none, Err(Error::InvalidCondition(_))));
}
