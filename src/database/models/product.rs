use crate::database::schema::{FieldKind, FieldSpec, Resource};

/// Catalog product with pricing, stock level, and supplier details
pub struct Product;

const SUPPLIER_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("name", FieldKind::Text),
    FieldSpec::required("contactEmail", FieldKind::Text),
    FieldSpec::required("contactPhone", FieldKind::Text),
    FieldSpec::optional("rating", FieldKind::Number).range(1.0, 5.0),
];

const PRODUCT_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("title", FieldKind::Text),
    FieldSpec::required("category", FieldKind::Text),
    FieldSpec::required("description", FieldKind::Text),
    FieldSpec::required("price", FieldKind::Number),
    FieldSpec::required("stockQuantity", FieldKind::Number),
    FieldSpec::required("supplier", FieldKind::Object(SUPPLIER_FIELDS)),
];

impl Resource for Product {
    const TABLE: &'static str = "products";
    const NAME: &'static str = "product";

    fn fields() -> &'static [FieldSpec] {
        PRODUCT_FIELDS
    }
}
