use std::collections::BTreeMap;

use hh_core::HhValue;
use hh_parser::{parse_assignments, quoted_literal, Assignment};

use crate::eval::eval_arith;

/// Program variables. One store per engine, wiped at the start of every run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableStore {
    values: BTreeMap<String, HhValue>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, name: &str) -> Option<&HhValue> {
        self.values.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: HhValue) {
        self.values.insert(name.into(), value);
    }

    pub fn assign_line(&mut self, line: &str) {
        let assignments = parse_assignments(line);
        self.assign(&assignments);
    }

    /// Applies pairs left to right, so later pairs see earlier ones.
    pub fn assign(&mut self, assignments: &[Assignment]) {
        for assignment in assignments {
            let value = self.resolve_assigned_value(&assignment.value);
            self.values.insert(assignment.name.clone(), value);
        }
    }

    fn resolve_assigned_value(&self, raw: &str) -> HhValue {
        if let Some(literal) = quoted_literal(raw) {
            return HhValue::String(literal.to_string());
        }
        match eval_arith(raw, self) {
            Ok(number) => HhValue::Number(number),
            Err(_) => HhValue::String(raw.to_string()),
        }
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &HhValue)> {
        self.values.iter()
    }
}
