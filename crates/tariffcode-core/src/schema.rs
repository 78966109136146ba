/// Arrow schema definitions for tariff description data.
pub mod descriptions {
    use arrow::datatypes::{DataType, Field, Schema};

    /// Column holding the raw tariff code.
    pub const CODE: &str = "code";
    /// Column holding the free-text goods description.
    pub const DESCRIPTION: &str = "description";

    /// Schema for `(code, description)` evidence rows.
    pub fn description_schema() -> Schema {
        Schema::new(vec![
            Field::new(CODE, DataType::Utf8, true),
            Field::new(DESCRIPTION, DataType::Utf8, true),
        ])
    }
}
