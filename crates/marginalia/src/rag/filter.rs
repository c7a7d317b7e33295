//! Typed retrieval filter rendered to OData in one place
//!
//! Identifiers never reach the filter language as raw text: each value is
//! validated and rendered as an escaped string literal.

use std::fmt;

use crate::error::{RagError, Result};
use crate::index::fields;
use crate::types::Scope;

const MAX_IDENTIFIER_CHARS: usize = 256;

/// Fields a retrieval filter may constrain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
  CourseId,
  TenantId,
}

impl FilterField {
  pub fn name(self) -> &'static str {
    match self {
      FilterField::CourseId => fields::COURSE_ID,
      FilterField::TenantId => fields::TENANT_ID,
    }
  }
}

impl fmt::Display for FilterField {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// Conjunction of `field eq 'value'` clauses
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
  clauses: Vec<(FilterField, String)>,
}

impl SearchFilter {
  /// Filter for a scope; absent identifiers contribute no clause
  pub fn for_scope(scope: &Scope) -> Result<Self> {
    let mut filter = Self::default();
    if let Some(course_id) = &scope.course_id {
      filter.push(FilterField::CourseId, course_id)?;
    }
    if let Some(tenant_id) = &scope.tenant_id {
      filter.push(FilterField::TenantId, tenant_id)?;
    }
    Ok(filter)
  }

  fn push(&mut self, field: FilterField, value: &str) -> Result<()> {
    validate_identifier(field, value)?;
    self.clauses.push((field, value.to_string()));
    Ok(())
  }

  pub fn is_empty(&self) -> bool {
    self.clauses.is_empty()
  }

  pub fn clauses(&self) -> &[(FilterField, String)] {
    &self.clauses
  }

  /// OData expression, or `None` when nothing is constrained
  pub fn to_odata(&self) -> Option<String> {
    if self.clauses.is_empty() {
      return None;
    }

    let expression = self
      .clauses
      .iter()
      .map(|(field, value)| format!("{field} eq {}", odata_string(value)))
      .collect::<Vec<_>>()
      .join(" and ");
    Some(expression)
  }
}

fn odata_string(value: &str) -> String {
  format!("'{}'", value.replace('\'', "''"))
}

fn validate_identifier(field: FilterField, value: &str) -> Result<()> {
  if value.chars().any(char::is_control) {
    return Err(RagError::invalid_request(format!("{field} must not contain control characters")));
  }
  if value.chars().count() > MAX_IDENTIFIER_CHARS {
    return Err(RagError::invalid_request(format!(
      "{field} must be at most {MAX_IDENTIFIER_CHARS} characters"
    )));
  }
  Ok(())
}
