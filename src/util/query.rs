use serde::Deserialize;
use utoipa::ToSchema;

/// General type used to specify sort order
#[derive(Debug, Deserialize, ToSchema)]
pub enum SortType {
    #[serde(rename = "asc")]
    #[schema(rename = "asc")]
    Asc,
    #[serde(rename = "desc")]
    #[schema(rename = "desc")]
    Desc,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_advertises_both_sort_orders() {
        let schema = serde_json::to_value(<SortType as utoipa::PartialSchema>::schema())
            .expect("schema should serialize");
        let rendered = schema.to_string();
        assert!(rendered.contains("\"asc\""));
        assert!(rendered.contains("\"desc\""));
    }
}
