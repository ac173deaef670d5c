use crate::database::schema::{FieldKind, FieldValue};

use super::types::{CompareOp, Condition, Predicate};

/// Renders typed conditions into a parameterised Postgres WHERE clause
pub struct FilterWhere {
    param_values: Vec<FieldValue>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    /// Returns the clause (`1=1` when empty) and the values to bind in order
    pub fn generate(conditions: &[Condition], starting_param_index: usize) -> (String, Vec<FieldValue>) {
        let mut filter_where = Self::new(starting_param_index);
        let clause = filter_where.build(conditions);
        (clause, filter_where.param_values)
    }

    fn build(&mut self, conditions: &[Condition]) -> String {
        let sql_conditions: Vec<String> = conditions
            .iter()
            .map(|condition| self.build_sql_condition(condition))
            .collect();
        if sql_conditions.is_empty() { "1=1".to_string() } else { sql_conditions.join(" AND ") }
    }

    fn build_sql_condition(&mut self, condition: &Condition) -> String {
        let quoted_column = format!("\"{}\"", condition.field.column);
        let list_column = condition.field.kind == FieldKind::TextList;

        match &condition.predicate {
            Predicate::Compare(CompareOp::Eq, value) if value.is_null() => {
                format!("{} IS NULL", quoted_column)
            }
            // Equality on a list column means "contains"
            Predicate::Compare(CompareOp::Eq, value) if list_column => {
                format!("{} = ANY({})", self.param(value.clone()), quoted_column)
            }
            Predicate::Compare(op, value) => {
                format!("{} {} {}", quoted_column, op.to_sql(), self.param(value.clone()))
            }
            Predicate::In(values) => {
                if values.is_empty() { return "1=0".to_string(); }
                if list_column {
                    let items = values
                        .iter()
                        .filter_map(|v| match v {
                            FieldValue::Text(s) => Some(s.clone()),
                            _ => None,
                        })
                        .collect();
                    return format!("{} && {}", quoted_column, self.param(FieldValue::TextList(items)));
                }
                let params: Vec<String> = values.iter().map(|v| self.param(v.clone())).collect();
                format!("{} IN ({})", quoted_column, params.join(", "))
            }
        }
    }

    fn param(&mut self, value: FieldValue) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}
