use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, RwLock};

use jmodel_types::{
    array_name_for_component, ArrayName, ClassDetails, ClassId, ClassKind, ClassRef,
    MemberDetails, ModelError, PrimitiveType, Result, TypeEnv, TypeRef, WellKnownClasses,
    OBJECT_CLASS_NAME, VOID_BOXED_CLASS_NAME,
};

use crate::backends::MinimalJdk;
use crate::builder::{ChainedBuilder, ClassDetailsBuilder};
use crate::config::RegistryConfig;
use crate::names::{NameTable, EXHAUSTED};
use crate::slot::{ConstructionSlot, PendingTable};
use crate::subtypes::SubtypeIndex;
use crate::sync::{lock, read, write};

/// Memoizing class directory shared by every analysis running in one session.
///
/// Classes are built on first request through the configured [`ClassDetailsBuilder`] and are
/// immutable afterwards; repeated lookups return the same [`ClassRef`] instance. Concurrent
/// first-time requests for one name run the builder once, and every caller observes that single
/// outcome. Requests for different names don't wait on each other. A builder that would end up
/// waiting on its own construction, directly or through builders running on other threads, gets
/// [`ModelError::CircularConstruction`] instead of blocking.
///
/// Names only enter the registry's name table when they are registered or handed out as ids;
/// failed lookups leave no trace.
///
/// `java.lang.Object`, `void` (also reachable as `java.lang.Void`) and the eight primitive
/// classes are registered up front and never reach the builder. Array classes (`[I`,
/// `[[Ljava.lang.String;`) are synthesized from their component class.
pub struct ClassRegistry {
    builder: Arc<dyn ClassDetailsBuilder>,
    config: RegistryConfig,
    names: NameTable,
    well_known: WellKnownClasses,
    registered: RwLock<HashMap<ClassId, ClassRef>>,
    pending: Mutex<PendingTable>,
    subtypes: SubtypeIndex,
    containers: Vec<ClassId>,
}

impl ClassRegistry {
    pub fn new(builder: impl ClassDetailsBuilder + 'static) -> Self {
        Self::with_config(builder, RegistryConfig::default())
    }

    pub fn with_config(builder: impl ClassDetailsBuilder + 'static, config: RegistryConfig) -> Self {
        let primary: Arc<dyn ClassDetailsBuilder> = Arc::new(builder);
        let builder: Arc<dyn ClassDetailsBuilder> = if config.minimal_jdk {
            let fallback: Arc<dyn ClassDetailsBuilder> = Arc::new(MinimalJdk);
            Arc::new(ChainedBuilder::new(vec![primary, fallback]))
        } else {
            primary
        };
        Self::from_shared(builder, config)
    }

    /// Like [`ClassRegistry::with_config`], for a builder that is already shared elsewhere.
    pub fn from_shared(builder: Arc<dyn ClassDetailsBuilder>, config: RegistryConfig) -> Self {
        for warning in config.validate() {
            tracing::warn!(target = "jmodel.registry", ?warning, "questionable registry config");
        }

        let names = NameTable::default();
        let object = names.intern(OBJECT_CLASS_NAME);
        let void = names.intern("void");
        let primitives = PrimitiveType::ALL.map(|kind| names.intern(kind.name()));
        names.alias(VOID_BOXED_CLASS_NAME, void);
        let containers = config
            .normalized_container_types()
            .map(|name| names.intern(name))
            .collect();

        let registry = Self {
            builder,
            config,
            names,
            well_known: WellKnownClasses::new(object, void, primitives),
            registered: RwLock::default(),
            pending: Mutex::default(),
            subtypes: SubtypeIndex::default(),
            containers,
        };

        registry.register(object, ClassDetails::new(OBJECT_CLASS_NAME, ClassKind::Class));
        registry.register(void, ClassDetails::new("void", ClassKind::Void));
        for kind in PrimitiveType::ALL {
            registry.register(
                registry.well_known.primitive(kind),
                ClassDetails::new(kind.name(), ClassKind::Primitive(kind)),
            );
        }
        registry
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// The class registered as `name`, building it if this is the first request.
    pub fn resolve_class_details(&self, name: &str) -> Result<ClassRef> {
        if name.is_empty() {
            return Err(ModelError::InvalidArgument("class name must not be empty"));
        }
        match self.names.lookup(name) {
            Some(id) => self.resolve_id(id),
            None => self.resolve_name(name),
        }
    }

    /// The class registered as `name`, without building it.
    pub fn find_class_details(&self, name: &str) -> Option<ClassRef> {
        let id = self.names.lookup(name)?;
        self.registered(id)
    }

    /// Handle for `name`. Builders use this to refer to classes they don't need to inspect.
    ///
    /// If the name table is full the returned handle never resolves; using it fails with
    /// [`ModelError::NameTableFull`].
    pub fn class_id(&self, name: &str) -> ClassId {
        self.names.intern(name)
    }

    /// Register a class built outside the registry. The first registration of a name wins; the
    /// returned reference is whatever ended up registered.
    pub fn add_class_details(&self, name: &str, details: ClassDetails) -> Result<ClassRef> {
        if name.is_empty() {
            return Err(ModelError::InvalidArgument("class name must not be empty"));
        }
        if &*details.name != name {
            return Err(ModelError::InvalidArgument(
                "class details name does not match the name it is registered under",
            ));
        }
        Ok(self.register(self.names.try_intern(name)?, details))
    }

    /// Visit the registered direct subtypes of `name`. Unknown names and leaf classes produce no
    /// visits.
    pub fn for_each_direct_subtype(&self, name: &str, mut visitor: impl FnMut(&ClassRef)) {
        let Some(id) = self.names.lookup(name) else {
            return;
        };
        for class in self.subtypes.direct(id) {
            visitor(&class);
        }
    }

    /// Registered classes that directly extend or implement `name`.
    pub fn direct_implementors(&self, name: &str) -> Vec<ClassRef> {
        match self.names.lookup(name) {
            Some(id) => self.subtypes.direct(id),
            None => Vec::new(),
        }
    }

    /// Every registered class below `name`, breadth first. `name` itself comes first when
    /// `include_base` is set.
    pub fn collect_implementors(&self, name: &str, include_base: bool) -> Result<Vec<ClassRef>> {
        if name.is_empty() {
            return Err(ModelError::InvalidArgument("class name must not be empty"));
        }
        let mut out = Vec::new();
        if include_base {
            out.push(self.resolve_class_details(name)?);
        }
        if let Some(id) = self.names.lookup(name) {
            out.extend(self.subtypes.transitive(id));
        }
        Ok(out)
    }

    /// Like [`ClassRegistry::collect_implementors`], keeping only instantiable classes.
    pub fn find_concrete_types(&self, name: &str, include_base: bool) -> Result<Vec<ClassRef>> {
        let mut found = self.collect_implementors(name, include_base)?;
        found.retain(|class| class.is_concrete());
        Ok(found)
    }

    /// Whether `member` holds many values: an array, or a subtype of a configured container.
    pub fn is_plural(&self, member: &MemberDetails) -> Result<bool> {
        member.is_plural(self, &self.containers)
    }

    pub fn boxed_class(&self, kind: PrimitiveType) -> Result<ClassRef> {
        self.resolve_class_details(kind.boxed_class_name())
    }

    /// The plain (non-parameterized) type reference naming `class`.
    pub fn type_ref_for_class(&self, class: &ClassRef) -> Result<TypeRef> {
        Ok(match class.kind {
            ClassKind::Primitive(kind) => TypeRef::Primitive(kind),
            ClassKind::Void => TypeRef::Void,
            ClassKind::Array { component } => {
                let component = self.resolve_id(component)?;
                TypeRef::array(self.type_ref_for_class(&component)?)
            }
            _ => class.as_type(),
        })
    }

    pub fn registered_count(&self) -> usize {
        read(&self.registered).len()
    }

    fn registered(&self, id: ClassId) -> Option<ClassRef> {
        read(&self.registered).get(&id).cloned()
    }

    fn resolve_id(&self, id: ClassId) -> Result<ClassRef> {
        if id == EXHAUSTED {
            return Err(ModelError::NameTableFull);
        }
        if let Some(class) = self.registered(id) {
            return Ok(class);
        }
        self.resolve_name(&self.names.name(id))
    }

    fn resolve_name(&self, name: &str) -> Result<ClassRef> {
        if ArrayName::is_array_name(name) {
            return self.resolve_array(name);
        }
        self.construct(name)
    }

    fn resolve_array(&self, name: &str) -> Result<ClassRef> {
        let array = ArrayName::parse(name)?;
        let component = self.resolve_class_details(&array.component_name())?;
        let id = self.names.try_intern(name)?;
        let details = ClassDetails {
            super_type: Some(TypeRef::Class(self.well_known.object)),
            ..ClassDetails::new(name, ClassKind::Array {
                component: component.id(),
            })
        };
        Ok(self.register(id, details))
    }

    fn construct(&self, name: &str) -> Result<ClassRef> {
        let claim = {
            let mut pending = lock(&self.pending);
            // Registration happens before the slot is released, so checking again under the
            // pending lock cannot miss a build that just finished.
            if let Some(class) = self.names.lookup(name).and_then(|id| self.registered(id)) {
                return Ok(class);
            }
            match pending.get(name) {
                None => Claim::Build(pending.claim(name)),
                Some(slot) if pending.start_waiting(&slot) => Claim::Wait(slot),
                Some(_) => {
                    tracing::debug!(
                        target = "jmodel.registry",
                        class = name,
                        "construction cycle detected"
                    );
                    return Err(ModelError::CircularConstruction {
                        name: name.to_string(),
                    });
                }
            }
        };

        match claim {
            Claim::Build(slot) => {
                let mut guard = SlotGuard {
                    registry: self,
                    name,
                    slot,
                    finished: false,
                };
                let result = self.build(name);
                guard.finish(result.clone());
                result
            }
            Claim::Wait(slot) => {
                tracing::trace!(
                    target = "jmodel.registry",
                    class = name,
                    "waiting for in-flight construction"
                );
                let result = slot.wait();
                lock(&self.pending).stop_waiting();
                result
            }
        }
    }

    fn build(&self, name: &str) -> Result<ClassRef> {
        tracing::trace!(target = "jmodel.registry", class = name, "building class details");
        match self.builder.build_class_details(name, self) {
            Ok(Some(details)) if &*details.name == name => {
                Ok(self.register(self.names.try_intern(name)?, details))
            }
            Ok(Some(details)) => Err(ModelError::class_resolution(
                name,
                format!("builder returned details for `{}`", details.name),
            )),
            Ok(None) => Err(ModelError::class_resolution(
                name,
                "no backend could locate the class",
            )),
            Err(err) => {
                tracing::debug!(
                    target = "jmodel.registry",
                    class = name,
                    error = %err,
                    "class construction failed"
                );
                Err(ModelError::class_resolution(name, err.to_string()))
            }
        }
    }

    fn register(&self, id: ClassId, details: ClassDetails) -> ClassRef {
        let mut registered = write(&self.registered);
        if let Some(existing) = registered.get(&id) {
            return existing.clone();
        }
        let class = ClassRef::new(id, Arc::new(details));
        registered.insert(id, class.clone());
        // Arrays are synthesized per component and are not indexed as subtypes of Object.
        if !class.is_array() {
            self.subtypes.record(&class);
        }
        drop(registered);

        tracing::debug!(
            target = "jmodel.registry",
            class = %class.name,
            id = id.to_raw(),
            "registered class"
        );
        class
    }
}

enum Claim {
    Build(Arc<ConstructionSlot>),
    Wait(Arc<ConstructionSlot>),
}

/// Retires the construction slot even if the builder panics, so waiters are released.
struct SlotGuard<'a> {
    registry: &'a ClassRegistry,
    name: &'a str,
    slot: Arc<ConstructionSlot>,
    finished: bool,
}

impl SlotGuard<'_> {
    fn finish(&mut self, result: Result<ClassRef>) {
        lock(&self.registry.pending).release(self.name);
        self.slot.complete(result);
        self.finished = true;
    }
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        tracing::error!(
            target = "jmodel.registry",
            class = self.name,
            "class builder panicked; releasing waiters"
        );
        lock(&self.registry.pending).release(self.name);
        self.slot.abandon(self.name);
    }
}

impl TypeEnv for ClassRegistry {
    fn well_known(&self) -> &WellKnownClasses {
        &self.well_known
    }

    fn class_name(&self, id: ClassId) -> Arc<str> {
        self.names.name(id)
    }

    fn class(&self, id: ClassId) -> Result<ClassRef> {
        self.resolve_id(id)
    }

    fn array_class(&self, component: ClassId) -> ClassId {
        self.names
            .intern(&array_name_for_component(&self.names.name(component)))
    }
}

impl fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassRegistry")
            .field("names", &self.names.len())
            .field("registered", &self.registered_count())
            .field("pending", &lock(&self.pending).len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
