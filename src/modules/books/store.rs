use std::sync::Arc;

use tokio::sync::RwLock;

use super::models::{Book, BookPayload};

/// In-memory, insertion-ordered collection of books.
///
/// Cloning yields another handle to the same collection. Every mutation
/// runs under the write lock, so id assignment and removal are totally
/// ordered across concurrent requests.
#[derive(Debug, Clone, Default)]
pub struct BookStore {
    books: Arc<RwLock<Vec<Book>>>,
}

impl BookStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given records as-is.
    pub fn with_books(books: Vec<Book>) -> Self {
        Self {
            books: Arc::new(RwLock::new(books)),
        }
    }

    /// Append pre-built records, keeping their ids.
    pub async fn seed(&self, books: impl IntoIterator<Item = Book>) {
        self.books.write().await.extend(books);
    }

    /// All records in insertion order.
    pub async fn list(&self) -> Vec<Book> {
        self.books.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.books.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.books.read().await.is_empty()
    }

    /// First record carrying `id`.
    pub async fn find_by_id(&self, id: u64) -> Option<Book> {
        self.books
            .read()
            .await
            .iter()
            .find(|book| book.id == id)
            .cloned()
    }

    /// Position of the first record carrying `id`.
    pub async fn find_index_by_id(&self, id: u64) -> Option<usize> {
        position(&self.books.read().await, id)
    }

    /// Store a new record with `id = count + 1`.
    ///
    /// The id is derived from the current count, not a high-water mark, so
    /// it can repeat an id still present after a deletion.
    pub async fn create(&self, payload: BookPayload) -> Book {
        let mut books = self.books.write().await;
        let id = books.len() as u64 + 1;
        let book = Book::from_payload(id, payload);
        books.push(book.clone());

        tracing::debug!(book_id = id, "book created");
        book
    }

    /// Overwrite all non-id fields of the first record carrying `id`.
    pub async fn replace(&self, id: u64, payload: BookPayload) -> Option<Book> {
        let mut books = self.books.write().await;
        let book = books.iter_mut().find(|book| book.id == id)?;
        book.replace_with(payload);

        tracing::debug!(book_id = id, "book replaced");
        Some(book.clone())
    }

    /// Remove and return the first record carrying `id`.
    pub async fn delete_by_id(&self, id: u64) -> Option<Book> {
        let mut books = self.books.write().await;
        let index = position(&books, id)?;
        let removed = books.remove(index);

        tracing::debug!(book_id = id, index, "book deleted");
        Some(removed)
    }
}

fn position(books: &[Book], id: u64) -> Option<usize> {
    books.iter().position(|book| book.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::models::sample_book;
    use serde_json::Value;

    fn payload(title: &str) -> BookPayload {
        BookPayload {
            title: Some(Value::from(title)),
            author: Some(Value::from("Frank Herbert")),
            published_date: Some(Value::from("1965-08-01")),
            summary: Some(Value::from("Desert planet saga")),
        }
    }

    #[tokio::test]
    async fn create_assigns_count_plus_one() {
        let store = BookStore::with_books(vec![sample_book()]);

        let created = store.create(payload("Dune")).await;
        assert_eq!(created.id, 2);
        assert_eq!(store.find_by_id(2).await, Some(created));
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn list_preserves_insertion_order() {
        let store = BookStore::new();
        store.create(payload("a")).await;
        store.create(payload("b")).await;
        store.create(payload("c")).await;

        let titles: Vec<_> = store
            .list()
            .await
            .into_iter()
            .filter_map(|book| book.title)
            .collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn missing_ids_are_absent_not_errors() {
        let store = BookStore::with_books(vec![sample_book()]);

        assert!(store.find_by_id(999).await.is_none());
        assert!(store.find_index_by_id(999).await.is_none());
        assert!(store.replace(999, payload("x")).await.is_none());
        assert!(store.delete_by_id(999).await.is_none());
        assert_eq!(store.list().await, vec![sample_book()]);
    }

    #[tokio::test]
    async fn delete_removes_first_match() {
        let store = BookStore::with_books(vec![sample_book()]);
        store.create(payload("Dune")).await;

        assert_eq!(store.find_index_by_id(2).await, Some(1));
        assert_eq!(store.delete_by_id(1).await, Some(sample_book()));
        assert_eq!(store.find_index_by_id(2).await, Some(0));
        assert!(store.find_by_id(1).await.is_none());
    }

    #[tokio::test]
    async fn ids_repeat_after_deletion() {
        let store = BookStore::with_books(vec![sample_book()]);
        store.delete_by_id(1).await;

        let created = store.create(payload("Dune")).await;
        assert_eq!(created.id, 1);
    }

    #[tokio::test]
    async fn replace_leaves_id_untouched() {
        let store = BookStore::with_books(vec![sample_book()]);

        let updated = store.replace(1, payload("Dune (rev)")).await.unwrap();
        assert_eq!(updated.id, 1);
        assert_eq!(updated.title, Some(Value::from("Dune (rev)")));
        assert_eq!(store.find_by_id(1).await, Some(updated));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_get_distinct_ids() {
        let store = BookStore::new();

        let handles: Vec<_> = (0..32)
            .map(|n| {
                let store = store.clone();
                tokio::spawn(async move { store.create(payload(&n.to_string())).await.id })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        ids.sort_unstable();

        assert_eq!(ids, (1..=32).collect::<Vec<u64>>());
    }
}
