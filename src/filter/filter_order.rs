use crate::database::schema::Collection;

use super::error::FilterError;
use super::params::lookup_field;
use super::types::{SortDirection, SortKey};

pub struct FilterOrder;

impl FilterOrder {
    /// Parse `name,-createdAt` into sort keys; a leading `-` sorts descending
    pub fn parse(collection: Collection, spec: &str) -> Result<Vec<SortKey>, FilterError> {
        let mut out = Vec::new();
        for part in spec.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() { continue; }
            let (name, direction) = match trimmed.strip_prefix('-') {
                Some(rest) => (rest.trim(), SortDirection::Desc),
                None => (trimmed.trim_start_matches('+'), SortDirection::Asc),
            };
            let field = lookup_field(collection, name)?;
            out.push(SortKey { field, direction });
        }
        Ok(out)
    }

    pub fn generate(keys: &[SortKey]) -> String {
        if keys.is_empty() { return String::new(); }
        let parts: Vec<String> = keys
            .iter()
            .map(|k| {
                // NULLs first ascending, last descending
                let nulls = match k.direction {
                    SortDirection::Asc => "NULLS FIRST",
                    SortDirection::Desc => "NULLS LAST",
                };
                format!("\"{}\" {} {}", k.field.column, k.direction.to_sql(), nulls)
            })
            .collect();
        format!("ORDER BY {}", parts.join(", "))
    }
}
