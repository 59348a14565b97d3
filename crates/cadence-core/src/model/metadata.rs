//! Model name and JSON metadata attached to variables and constraints.

use std::collections::BTreeMap;

use cadence_expr::{Constraint, ConstructionError, Variable};

use crate::model::Model;

impl Model {
    /// Get the model name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Set the model name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Set metadata for a registered variable.
    pub fn set_variable_metadata(
        &mut self,
        variable: &Variable,
        metadata: serde_json::Value,
    ) -> Result<(), ConstructionError> {
        self.ensure_variable_exists(variable)?;
        self.variable_metadata
            .get_or_insert_with(BTreeMap::new)
            .insert(variable.id(), metadata);
        Ok(())
    }

    /// Get metadata for a variable.
    pub fn variable_metadata(&self, variable: &Variable) -> Option<&serde_json::Value> {
        self.variable_metadata
            .as_ref()
            .and_then(|meta| meta.get(&variable.id()))
    }

    /// Set metadata for a registered constraint.
    pub fn set_constraint_metadata(
        &mut self,
        constraint: &Constraint,
        metadata: serde_json::Value,
    ) -> Result<(), ConstructionError> {
        self.ensure_constraint_exists(constraint)?;
        self.constraint_metadata
            .get_or_insert_with(BTreeMap::new)
            .insert(constraint.id(), metadata);
        Ok(())
    }

    /// Get metadata for a constraint.
    pub fn constraint_metadata(&self, constraint: &Constraint) -> Option<&serde_json::Value> {
        self.constraint_metadata
            .as_ref()
            .and_then(|meta| meta.get(&constraint.id()))
    }
}
