use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use jmodel_types::{ClassId, ModelError, Result};

use crate::sync::{read, write};

/// Handed out by [`NameTable::intern`] once no ids are left. It never names a class, so resolving
/// it fails with [`ModelError::NameTableFull`].
pub(crate) const EXHAUSTED: ClassId = ClassId::new(u32::MAX);

/// Interns class names into [`ClassId`]s. Ids are dense and never reused.
#[derive(Debug)]
pub(crate) struct NameTable {
    inner: RwLock<NameTableInner>,
    limit: u32,
}

#[derive(Debug, Default)]
struct NameTableInner {
    names: Vec<Arc<str>>,
    ids: HashMap<Arc<str>, ClassId>,
}

impl Default for NameTable {
    fn default() -> Self {
        Self::with_limit(EXHAUSTED.to_raw())
    }
}

impl NameTable {
    fn with_limit(limit: u32) -> Self {
        Self {
            inner: RwLock::default(),
            limit,
        }
    }

    /// Like [`NameTable::try_intern`], returning [`EXHAUSTED`] when the table is full.
    pub(crate) fn intern(&self, name: &str) -> ClassId {
        self.try_intern(name).unwrap_or_else(|_| {
            tracing::error!(target = "jmodel.registry", class = name, "class name table is full");
            EXHAUSTED
        })
    }

    pub(crate) fn try_intern(&self, name: &str) -> Result<ClassId> {
        if let Some(id) = self.lookup(name) {
            return Ok(id);
        }

        let mut inner = write(&self.inner);
        // Another thread may have won the race between the read and write locks.
        if let Some(id) = inner.ids.get(name) {
            return Ok(*id);
        }
        let raw = u32::try_from(inner.names.len())
            .ok()
            .filter(|raw| *raw < self.limit)
            .ok_or(ModelError::NameTableFull)?;
        let id = ClassId::new(raw);
        let name: Arc<str> = Arc::from(name);
        inner.names.push(name.clone());
        inner.ids.insert(name, id);
        Ok(id)
    }

    /// Make `alias` resolve to an existing id without changing that id's canonical name.
    pub(crate) fn alias(&self, alias: &str, id: ClassId) {
        write(&self.inner).ids.insert(Arc::from(alias), id);
    }

    pub(crate) fn lookup(&self, name: &str) -> Option<ClassId> {
        read(&self.inner).ids.get(name).copied()
    }

    pub(crate) fn name(&self, id: ClassId) -> Arc<str> {
        read(&self.inner)
            .names
            .get(id.index())
            .cloned()
            .unwrap_or_else(|| Arc::from("<unknown>"))
    }

    pub(crate) fn len(&self) -> usize {
        read(&self.inner).names.len()
    }
}
