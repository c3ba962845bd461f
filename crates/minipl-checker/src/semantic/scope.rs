use std::collections::{HashMap, HashSet};

use minipl_common::Symbol;

use super::types::{Type, Value};

/// A declared variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub ty: Type,
    pub default: Value,
    /// The identifier token of the declaration.
    pub declared_at: Symbol,
}

impl Entry {
    /// Entry for a variable of type `ty`; `None` for the poison type.
    pub fn new(ty: Type, declared_at: Symbol) -> Option<Self> {
        Some(Self {
            ty,
            default: ty.default_value()?,
            declared_at,
        })
    }
}

/// The program's single, flat namespace.
///
/// Entries are created by the first valid declaration of a name and are
/// never removed or replaced.
#[derive(Debug, Default, Clone)]
pub struct SymbolTable {
    entries: HashMap<String, Entry>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define `name`.
    /// Returns `Err` with the existing declaration's symbol on duplicate.
    pub fn define(&mut self, name: &str, entry: Entry) -> Result<(), Symbol> {
        if let Some(existing) = self.entries.get(name) {
            return Err(existing.declared_at.clone());
        }
        self.entries.insert(name.to_string(), entry);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&Entry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by name.
    pub fn sorted(&self) -> Vec<(&str, &Entry)> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .map(|(name, entry)| (name.as_str(), entry))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

/// Identifiers currently controlling an enclosing `for` loop.
#[derive(Debug, Default, Clone)]
pub struct LoopGuard {
    bound: HashSet<String>,
}

impl LoopGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name`. Returns `false` if an enclosing loop already binds it.
    pub fn enter(&mut self, name: &str) -> bool {
        self.bound.insert(name.to_string())
    }

    pub fn exit(&mut self, name: &str) {
        self.bound.remove(name);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bound.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.bound.is_empty()
    }
}
