use crate::database::schema::{FieldKind, FieldSpec, Resource};

/// Job posting with the hiring company's contact details
pub struct Job;

const COMPANY_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("name", FieldKind::Text),
    FieldSpec::required("contactEmail", FieldKind::Text),
    FieldSpec::required("contactPhone", FieldKind::Text),
];

const JOB_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("title", FieldKind::Text),
    FieldSpec::required("type", FieldKind::Text),
    FieldSpec::required("description", FieldKind::Text),
    FieldSpec::required("company", FieldKind::Object(COMPANY_FIELDS)),
];

impl Resource for Job {
    const TABLE: &'static str = "jobs";
    const NAME: &'static str = "job";

    fn fields() -> &'static [FieldSpec] {
        JOB_FIELDS
    }
}
