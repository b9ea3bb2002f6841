use crate::database::schema::{FieldKind, FieldSpec, Resource};

/// Library book with its lending availability
pub struct Book;

const AVAILABILITY_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("isAvailable", FieldKind::Bool),
    FieldSpec::optional("borrower", FieldKind::Text),
];

const BOOK_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("title", FieldKind::Text),
    FieldSpec::required("author", FieldKind::Text),
    FieldSpec::required("isbn", FieldKind::Text),
    FieldSpec::required("availability", FieldKind::Object(AVAILABILITY_FIELDS)),
];

impl Resource for Book {
    const TABLE: &'static str = "books";
    const NAME: &'static str = "book";

    fn fields() -> &'static [FieldSpec] {
        BOOK_FIELDS
    }
}
