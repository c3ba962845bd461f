use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::ast::NodeId;

use super::types::Type;

/// Resolved type of every node, indexed by node id.
///
/// Kept beside the tree instead of inside it so the tree stays immutable
/// while checking. A slot is `None` until its node has been resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTypes {
    slots: Vec<Option<Type>>,
}

impl ResolvedTypes {
    pub fn new(node_count: usize) -> Self {
        Self {
            slots: vec![None; node_count],
        }
    }

    pub fn get(&self, id: NodeId) -> Option<Type> {
        self.slots.get(id.index()).copied().flatten()
    }

    /// Record the type of `id`. Ids outside the tree are ignored.
    pub(crate) fn set(&mut self, id: NodeId, ty: Type) {
        if let Some(slot) = self.slots.get_mut(id.index()) {
            debug_assert!(slot.is_none(), "node {id} resolved twice");
            *slot = Some(ty);
        }
    }

    pub fn is_resolved(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Resolved nodes in id order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, Type)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.map(|ty| (NodeId(idx as u32), ty)))
    }

    pub fn resolved_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }
}

/// Serialized as a map from node id to type name, resolved nodes only.
impl Serialize for ResolvedTypes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.resolved_count()))?;
        for (id, ty) in self.iter() {
            map.serialize_entry(&id.0.to_string(), &ty)?;
        }
        map.end()
    }
}
