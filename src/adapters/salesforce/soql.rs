//! SOQL query construction

use crate::connector::ReadParams;
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;

/// Field modification timestamp every sObject carries
pub const MODSTAMP_FIELD: &str = "SystemModstamp";

/// A `SELECT ... FROM ... WHERE ...` statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoqlQuery {
    fields: Vec<String>,
    object: String,
    conditions: Vec<String>,
}

impl SoqlQuery {
    /// Select `fields` from `object`; an empty list selects standard fields
    pub fn new<I, S>(object: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            object: object.into(),
            conditions: Vec::new(),
        }
    }

    /// Query for a read, with `Id` always selected and the time window applied
    pub fn for_read(params: &ReadParams) -> Self {
        let fields: Vec<String> = if params.all_fields() {
            Vec::new()
        } else {
            let mut fields = vec!["Id".to_string()];
            fields.extend(
                params
                    .fields
                    .iter()
                    .filter(|f| !f.eq_ignore_ascii_case("id"))
                    .cloned(),
            );
            fields
        };

        let mut query = Self::new(&params.object_name, fields);
        if let Some(since) = params.since {
            query = query.condition(format!("{MODSTAMP_FIELD} >= {}", literal(since)));
        }
        if let Some(until) = params.until {
            query = query.condition(format!("{MODSTAMP_FIELD} < {}", literal(until)));
        }
        query
    }

    #[must_use]
    pub fn condition(mut self, condition: impl Into<String>) -> Self {
        self.conditions.push(condition.into());
        self
    }
}

impl fmt::Display for SoqlQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fields.is_empty() {
            write!(f, "SELECT FIELDS(STANDARD) FROM {}", self.object)?;
        } else {
            write!(f, "SELECT {} FROM {}", self.fields.join(","), self.object)?;
        }
        if !self.conditions.is_empty() {
            write!(f, " WHERE {}", self.conditions.join(" AND "))?;
        }
        Ok(())
    }
}

/// SOQL datetime literals are unquoted RFC 3339
fn literal(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}
