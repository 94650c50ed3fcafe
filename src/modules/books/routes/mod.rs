//! HTTP handlers for the book collection and their OpenAPI annotations.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json, Router,
};
use bookshelf_http::{error::AppError, extract::JsonOrDefault};
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};

use super::models::{Book, BookPayload};
use super::store::BookStore;

const NOT_FOUND: &str = "Book not found";
const DELETE_NOT_FOUND: &str = "Book not found.";

#[derive(OpenApi)]
#[openapi(
    components(schemas(Book, BookPayload)),
    tags((name = "Books", description = "CRUD operations on the book collection"))
)]
struct BooksApi;

/// Book routes relative to the module root, with the document describing them.
pub fn api_router(store: BookStore) -> (Router, utoipa::openapi::OpenApi) {
    OpenApiRouter::with_openapi(BooksApi::openapi())
        .routes(routes!(list_books, create_book))
        .routes(routes!(get_book, replace_book, delete_book))
        .with_state(store)
        .split_for_parts()
}

/// Parse the leading integer of a path segment.
///
/// Leading whitespace and a `+` sign are skipped and anything after the
/// digits is ignored. A `0x`/`0X` prefix switches to hexadecimal. Input
/// without digits, or a negative number, yields `None`, which never matches
/// a stored id.
pub(crate) fn parse_id(raw: &str) -> Option<u64> {
    let trimmed = raw.trim_start();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);

    let (digits, radix) = match unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        Some(hex) => (hex, 16),
        None => (unsigned, 10),
    };

    let end = digits
        .find(|c: char| !c.is_digit(radix))
        .unwrap_or(digits.len());
    u64::from_str_radix(&digits[..end], radix).ok()
}

/// Retrieves the list of books
///
/// Retrieves a comprehensive list of all books
#[utoipa::path(
    get,
    path = "/",
    tag = "Books",
    responses(
        (status = 200, description = "Successful retrieval of books", body = [Book])
    )
)]
async fn list_books(State(store): State<BookStore>) -> Json<Vec<Book>> {
    Json(store.list().await)
}

/// Retrieves a single book
///
/// Retrieves a single book by a specific ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Books",
    params(("id" = u64, Path, description = "The book ID")),
    responses(
        (status = 200, description = "A single book", body = Book),
        (status = 404, description = "Book not found", body = String, content_type = "text/plain")
    )
)]
async fn get_book(
    State(store): State<BookStore>,
    Path(id): Path<String>,
) -> Result<Json<Book>, AppError> {
    let book = match parse_id(&id) {
        Some(id) => store.find_by_id(id).await,
        None => None,
    };

    book.map(Json).ok_or_else(|| AppError::not_found(NOT_FOUND))
}

/// Adds a new book
///
/// Adds a new book to the list of books. Missing fields, or a missing body,
/// are stored as absent.
#[utoipa::path(
    post,
    path = "/",
    tag = "Books",
    request_body = BookPayload,
    responses(
        (status = 201, description = "The newly created book", body = Book)
    )
)]
async fn create_book(
    State(store): State<BookStore>,
    JsonOrDefault(payload): JsonOrDefault<BookPayload>,
) -> (StatusCode, Json<Book>) {
    let book = store.create(payload).await;
    (StatusCode::CREATED, Json(book))
}

/// Update an existing book by ID
///
/// Replaces all four fields; fields missing from the body are cleared.
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Books",
    params(("id" = u64, Path, description = "The book ID")),
    request_body = BookPayload,
    responses(
        (status = 200, description = "The updated book", body = Book),
        (status = 404, description = "Book not found", body = String, content_type = "text/plain")
    )
)]
async fn replace_book(
    State(store): State<BookStore>,
    Path(id): Path<String>,
    JsonOrDefault(payload): JsonOrDefault<BookPayload>,
) -> Result<Json<Book>, AppError> {
    let book = match parse_id(&id) {
        Some(id) => store.replace(id, payload).await,
        None => None,
    };

    book.map(Json).ok_or_else(|| AppError::not_found(NOT_FOUND))
}

/// Delete a book by ID
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Books",
    params(("id" = u64, Path, description = "The book ID")),
    responses(
        (status = 200, description = "The deleted book", body = [Book]),
        (status = 404, description = "Book not found", body = String, content_type = "text/plain")
    )
)]
async fn delete_book(
    State(store): State<BookStore>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Book>>, AppError> {
    let removed = match parse_id(&id) {
        Some(id) => store.delete_by_id(id).await,
        None => None,
    };

    removed
        .map(|book| Json(vec![book]))
        .ok_or_else(|| AppError::not_found(DELETE_NOT_FOUND))
}
