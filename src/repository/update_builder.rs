// ==========================================
// Training Ingest - partial UPDATE builder
// ==========================================
// Column names come only from the `GroupField` allow-list; every value
// is a bound parameter.
// ==========================================

use crate::domain::GroupUpdate;
use rusqlite::types::Value;

/// Group columns that may be changed through a partial update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupField {
    StartTime,
    EndTime,
    ClassroomId,
}

impl GroupField {
    pub fn column(self) -> &'static str {
        match self {
            GroupField::StartTime => "start_time",
            GroupField::EndTime => "end_time",
            GroupField::ClassroomId => "classroom_id",
        }
    }
}

/// Builds `UPDATE <table> SET a = ?1, b = ?2 WHERE <key> = ?3`.
///
/// # Example
/// ```
/// use training_ingest::repository::update_builder::{GroupField, UpdateBuilder};
/// use rusqlite::types::Value;
///
/// let (sql, params) = UpdateBuilder::new("course_group", "group_code")
///     .set(GroupField::ClassroomId, Value::Integer(12))
///     .build(Value::Integer(1000123))
///     .unwrap();
/// assert_eq!(sql, "UPDATE course_group SET classroom_id = ?1 WHERE group_code = ?2");
/// assert_eq!(params.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct UpdateBuilder {
    table: &'static str,
    key_column: &'static str,
    assignments: Vec<(GroupField, Value)>,
}

impl UpdateBuilder {
    pub fn new(table: &'static str, key_column: &'static str) -> Self {
        Self {
            table,
            key_column,
            assignments: Vec::new(),
        }
    }

    pub fn set(mut self, field: GroupField, value: Value) -> Self {
        self.assignments.push((field, value));
        self
    }

    pub fn set_if(self, field: GroupField, value: Option<Value>) -> Self {
        match value {
            Some(v) => self.set(field, v),
            None => self,
        }
    }

    /// Builder for a group partial update; keys absent from the payload
    /// are not assigned.
    pub fn for_group(update: &GroupUpdate) -> Self {
        let time = |t: Option<chrono::NaiveTime>| {
            t.map(|t| Value::Text(t.format("%H:%M:%S").to_string()))
        };
        let classroom = update.classroom_id.map(|c| match c {
            Some(id) => Value::Integer(id),
            None => Value::Null,
        });

        Self::new("course_group", "group_code")
            .set_if(GroupField::StartTime, time(update.start_time))
            .set_if(GroupField::EndTime, time(update.end_time))
            .set_if(GroupField::ClassroomId, classroom)
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// # Returns
    /// - None: nothing to assign
    /// - Some((sql, params)): params end with the key value
    pub fn build(self, key: Value) -> Option<(String, Vec<Value>)> {
        if self.assignments.is_empty() {
            return None;
        }

        let set_clause = self
            .assignments
            .iter()
            .enumerate()
            .map(|(i, (field, _))| format!("{} = ?{}", field.column(), i + 1))
            .collect::<Vec<_>>()
            .join(", ");

        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?{}",
            self.table,
            set_clause,
            self.key_column,
            self.assignments.len() + 1
        );

        let mut params: Vec<Value> = self.assignments.into_iter().map(|(_, v)| v).collect();
        params.push(key);

        Some((sql, params))
    }
}
