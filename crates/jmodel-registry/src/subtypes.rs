use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::RwLock;

use jmodel_types::{ClassId, ClassRef};

use crate::sync::{read, write};

/// Direct-subtype edges, keyed by the raw id of the extended/implemented type.
#[derive(Debug, Default)]
pub(crate) struct SubtypeIndex {
    edges: RwLock<HashMap<ClassId, Vec<ClassRef>>>,
}

impl SubtypeIndex {
    /// Record `class` under its super type and each interface. All edges for one class become
    /// visible together.
    pub(crate) fn record(&self, class: &ClassRef) {
        let parents: Vec<ClassId> = class.direct_supertype_ids().collect();
        if parents.is_empty() {
            return;
        }

        let mut edges = write(&self.edges);
        for parent in parents {
            let children = edges.entry(parent).or_default();
            if !children.iter().any(|c| c.ptr_eq(class)) {
                children.push(class.clone());
            }
        }
    }

    /// Snapshot of the direct subtypes of `id`, in registration order.
    pub(crate) fn direct(&self, id: ClassId) -> Vec<ClassRef> {
        read(&self.edges).get(&id).cloned().unwrap_or_default()
    }

    /// Breadth-first transitive closure below `id`, excluding `id` itself.
    pub(crate) fn transitive(&self, id: ClassId) -> Vec<ClassRef> {
        let edges = read(&self.edges);

        let mut out = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut queue = VecDeque::from([id]);
        while let Some(current) = queue.pop_front() {
            let Some(children) = edges.get(&current) else {
                continue;
            };
            for child in children {
                if seen.insert(child.id()) {
                    out.push(child.clone());
                    queue.push_back(child.id());
                }
            }
        }
        out
    }
}
