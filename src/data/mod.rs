//! Tabular input: schema, CSV I/O and the manual-entry record

mod loader;
mod record;
mod schema;

pub use loader::{
    drop_ignored_columns, load_csv, normalize_headers, preview_rows, read_csv_bytes,
    to_csv_bytes, write_csv,
};
pub use record::{
    numeric_field, ChoiceField, EmployeeRecord, NumericField, CHOICE_FIELDS, COMPANY_SIZES,
    EDUCATION_LEVELS, INDUSTRIES, JOB_TITLES, LOCATIONS, NUMERIC_FIELDS, SAMPLE_CSV,
    SAMPLE_FILE_NAME,
};
pub use schema::{
    is_numeric_dtype, FeatureKind, FeatureSchema, FeatureSpec, CATEGORICAL_FEATURES,
    IGNORED_COLUMNS, NUMERIC_FEATURES, PREDICTION_COLUMN, TARGET_COLUMN,
};
