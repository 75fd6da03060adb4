use crate::hash::HashMap;
use crate::{ClassBuilder, ClassId, ClassInfo, ClassKind, ScalarKind, TypeError, TypeExpr};

// -----------------------------------------------------------------------------
// Builtin ids

/// Ids of the classes registered by [`TypeRegistry::new`].
///
/// The registration order is fixed, so these are valid for every registry
/// created with `new`.
pub mod builtin {
    use crate::ClassId;

    pub const OBJECT: ClassId = ClassId(0);

    pub const BOOL: ClassId = ClassId(1);
    pub const CHAR: ClassId = ClassId(2);
    pub const I8: ClassId = ClassId(3);
    pub const I16: ClassId = ClassId(4);
    pub const I32: ClassId = ClassId(5);
    pub const I64: ClassId = ClassId(6);
    pub const U8: ClassId = ClassId(7);
    pub const U16: ClassId = ClassId(8);
    pub const U32: ClassId = ClassId(9);
    pub const U64: ClassId = ClassId(10);
    pub const F32: ClassId = ClassId(11);
    pub const F64: ClassId = ClassId(12);
    pub const STRING: ClassId = ClassId(13);
    pub const CLASS: ClassId = ClassId(14);

    pub const ITERABLE: ClassId = ClassId(15);
    pub const COLLECTION: ClassId = ClassId(16);
    pub const LIST: ClassId = ClassId(17);
    pub const SET: ClassId = ClassId(18);
    pub const MAP: ClassId = ClassId(19);

    pub const ARRAY_LIST: ClassId = ClassId(20);
    pub const LINKED_LIST: ClassId = ClassId(21);
    pub const HASH_SET: ClassId = ClassId(22);
    pub const LINKED_HASH_SET: ClassId = ClassId(23);
    pub const TREE_SET: ClassId = ClassId(24);
    pub const HASH_MAP: ClassId = ClassId(25);
    pub const LINKED_HASH_MAP: ClassId = ClassId(26);
    pub const TREE_MAP: ClassId = ClassId(27);
    pub const IMMUTABLE_MAP: ClassId = ClassId(28);

    pub(crate) const COUNT: usize = 29;
}

const SCALARS: [ScalarKind; 14] = [
    ScalarKind::Bool,
    ScalarKind::Char,
    ScalarKind::I8,
    ScalarKind::I16,
    ScalarKind::I32,
    ScalarKind::I64,
    ScalarKind::U8,
    ScalarKind::U16,
    ScalarKind::U32,
    ScalarKind::U64,
    ScalarKind::F32,
    ScalarKind::F64,
    ScalarKind::String,
    ScalarKind::Class,
];

// -----------------------------------------------------------------------------
// TypeRegistry

/// The declared classes a type expression can refer to.
///
/// The registry is append-only. Once it is shared (usually behind an `Arc`
/// inside a [`TypeFactory`]) it is never mutated again.
///
/// # Examples
///
/// ```
/// use vc_types::{ClassBuilder, PropertyInfo, TypeExpr, TypeRegistry, builtin};
///
/// let mut registry = TypeRegistry::new();
/// let person = registry.register(
///     ClassBuilder::bean("Person")
///         .property(PropertyInfo::new("name", TypeExpr::class(builtin::STRING)))
///         .property(PropertyInfo::new("age", TypeExpr::class(builtin::I32))),
/// ).unwrap();
///
/// assert_eq!(registry.lookup("Person"), Some(person));
/// assert_eq!(registry.class(person).unwrap().properties().len(), 2);
/// ```
///
/// [`TypeFactory`]: crate::TypeFactory
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    classes: Vec<ClassInfo>,
    by_name: HashMap<String, ClassId>,
    builtins: bool,
}

impl Default for TypeRegistry {
    /// See [`TypeRegistry::new`] .
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Creates a registry without any class, not even `Object`.
    ///
    /// Most callers want [`TypeRegistry::new`]; the [`builtin`] ids are
    /// meaningless for an empty registry.
    #[inline]
    pub fn empty() -> Self {
        Self {
            classes: Vec::new(),
            by_name: HashMap::default(),
            builtins: false,
        }
    }

    /// Creates a registry with the builtin classes:
    ///
    /// - `Object`
    /// - scalars: `bool` `char` `i8 - i64` `u8 - u64` `f32` `f64` `String` `Class`
    /// - interfaces: `Iterable<T>` `Collection<E>` `List<E>` `Set<E>` `Map<K, V>`
    /// - implementations: `ArrayList<E>` `LinkedList<E>` `HashSet<E>`
    ///   `LinkedHashSet<E>` `TreeSet<E>` `HashMap<K, V>` `LinkedHashMap<K, V>`
    ///   `TreeMap<K, V>` and the immutable `ImmutableMap<K, V>`
    pub fn new() -> Self {
        use builtin::*;

        fn generic(raw: ClassId, names: &[&str]) -> TypeExpr {
            TypeExpr::parameterized(raw, names.iter().map(|name| TypeExpr::param(*name)))
        }

        let mut registry = Self::empty();

        let builders = [ClassBuilder::object("Object")]
            .into_iter()
            .chain(SCALARS.map(ClassBuilder::scalar))
            .chain([
                ClassBuilder::interface("Iterable").param("T"),
                ClassBuilder::interface("Collection")
                    .param("E")
                    .implements(generic(ITERABLE, &["E"])),
                ClassBuilder::interface("List")
                    .param("E")
                    .implements(generic(COLLECTION, &["E"])),
                ClassBuilder::interface("Set")
                    .param("E")
                    .implements(generic(COLLECTION, &["E"])),
                ClassBuilder::interface("Map").param("K").param("V"),
                ClassBuilder::class("ArrayList")
                    .param("E")
                    .implements(generic(LIST, &["E"])),
                ClassBuilder::class("LinkedList")
                    .param("E")
                    .implements(generic(LIST, &["E"])),
                ClassBuilder::class("HashSet")
                    .param("E")
                    .implements(generic(SET, &["E"])),
                ClassBuilder::class("LinkedHashSet")
                    .param("E")
                    .extends(generic(HASH_SET, &["E"])),
                ClassBuilder::class("TreeSet")
                    .param("E")
                    .implements(generic(SET, &["E"])),
                ClassBuilder::class("HashMap")
                    .param("K")
                    .param("V")
                    .implements(generic(MAP, &["K", "V"])),
                ClassBuilder::class("LinkedHashMap")
                    .param("K")
                    .param("V")
                    .extends(generic(HASH_MAP, &["K", "V"])),
                ClassBuilder::class("TreeMap")
                    .param("K")
                    .param("V")
                    .implements(generic(MAP, &["K", "V"])),
                ClassBuilder::class("ImmutableMap")
                    .param("K")
                    .param("V")
                    .implements(generic(MAP, &["K", "V"]))
                    .immutable(),
            ]);

        for builder in builders {
            // Builtin names are unique, registration can not fail.
            let _ = registry.register(builder);
        }
        debug_assert_eq!(registry.len(), COUNT);
        registry.builtins = true;
        registry
    }

    /// Registers a class and returns its id.
    ///
    /// Ownerless type variables ([`TypeExpr::param`]) inside the declaration
    /// are bound to the new class. Classes other than `Object` and
    /// interfaces without an explicit supertype extend `Object`.
    pub fn register(&mut self, builder: ClassBuilder) -> Result<ClassId, TypeError> {
        let mut info = builder.info;
        if self.by_name.contains_key(info.name()) {
            return Err(TypeError::DuplicateClass(info.name));
        }

        let id = ClassId(self.classes.len() as u32);
        info.id = id;

        if info.super_type.is_none()
            && !matches!(info.kind, ClassKind::Object | ClassKind::Interface)
            && let Some(object) = self.root_class()
        {
            info.super_type = Some(TypeExpr::Class(object));
        }

        if let Some(super_type) = info.super_type.as_mut() {
            super_type.bind_owner(id);
        }
        info.interfaces.iter_mut().for_each(|i| i.bind_owner(id));
        info.properties.iter_mut().for_each(|p| p.bind_owner(id));
        info.components.iter_mut().for_each(|c| c.ty.bind_owner(id));
        for param in info.params.iter_mut() {
            param.bounds.iter_mut().for_each(|b| b.bind_owner(id));
        }

        log::trace!("registered class `{}` as {id}", info.name);
        self.by_name.insert(info.name.clone(), id);
        self.classes.push(info);
        Ok(id)
    }

    /// Whether the [`builtin`] ids are valid for this registry.
    #[inline]
    pub fn has_builtins(&self) -> bool {
        self.builtins
    }

    /// The registered `Object` class, the implicit supertype of classes.
    pub fn root_class(&self) -> Option<ClassId> {
        self.classes
            .iter()
            .find(|c| c.kind == ClassKind::Object)
            .map(|c| c.id)
    }

    /// Returns the declaration of `id`, if registered.
    #[inline]
    pub fn class(&self, id: ClassId) -> Option<&ClassInfo> {
        self.classes.get(id.index())
    }

    /// Returns the id registered under `name`.
    #[inline]
    pub fn lookup(&self, name: &str) -> Option<ClassId> {
        self.by_name.get(name).copied()
    }

    /// Returns the declaration registered under `name`.
    #[inline]
    pub fn class_named(&self, name: &str) -> Option<&ClassInfo> {
        self.lookup(name).and_then(|id| self.class(id))
    }

    /// Returns the name of `id`, or `"?"` for unknown ids.
    #[inline]
    pub fn name_of(&self, id: ClassId) -> &str {
        self.class(id).map_or("?", ClassInfo::name)
    }

    /// Returns the scalar class registered for `kind`.
    pub fn scalar(&self, kind: ScalarKind) -> Option<ClassId> {
        self.classes
            .iter()
            .find(|c| c.kind == ClassKind::Scalar(kind))
            .map(|c| c.id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &ClassInfo> {
        self.classes.iter()
    }

    /// Parses a type expression written with registered class names.
    ///
    /// # Examples
    ///
    /// ```
    /// use vc_types::{TypeExpr, TypeRegistry, builtin};
    ///
    /// let registry = TypeRegistry::new();
    /// let expr = registry.parse_type("Set<i64>").unwrap();
    /// assert_eq!(expr, TypeExpr::set_of(TypeExpr::class(builtin::I64)));
    /// ```
    #[inline]
    pub fn parse_type(&self, input: &str) -> Result<TypeExpr, TypeError> {
        crate::expr::parse_type_expr(self, input)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::builtin;
    use crate::{ClassBuilder, ClassKind, ScalarKind, TypeError, TypeExpr, TypeRegistry};

    #[test]
    fn builtin_ids() {
        let registry = TypeRegistry::new();
        assert_eq!(registry.lookup("Object"), Some(builtin::OBJECT));
        assert_eq!(registry.lookup("String"), Some(builtin::STRING));
        assert_eq!(registry.lookup("Map"), Some(builtin::MAP));
        assert_eq!(registry.lookup("ImmutableMap"), Some(builtin::IMMUTABLE_MAP));
        assert_eq!(registry.scalar(ScalarKind::U16), Some(builtin::U16));
        assert!(registry.class(builtin::IMMUTABLE_MAP).unwrap().is_immutable());
        assert!(!registry.class(builtin::LIST).unwrap().is_constructible());
    }

    #[test]
    fn implicit_object_super() {
        let registry = TypeRegistry::new();
        let array_list = registry.class(builtin::ARRAY_LIST).unwrap();
        assert_eq!(array_list.super_type(), Some(&TypeExpr::Class(builtin::OBJECT)));
        let list = registry.class(builtin::LIST).unwrap();
        assert_eq!(list.kind(), ClassKind::Interface);
        assert_eq!(list.super_type(), None);
    }

    #[test]
    fn owners_are_bound() {
        let registry = TypeRegistry::new();
        let hash_map = registry.class(builtin::HASH_MAP).unwrap();
        assert_eq!(
            hash_map.interfaces(),
            &[TypeExpr::parameterized(
                builtin::MAP,
                [
                    TypeExpr::variable("K", builtin::HASH_MAP),
                    TypeExpr::variable("V", builtin::HASH_MAP),
                ],
            )]
        );
    }

    #[test]
    fn duplicate_names() {
        let mut registry = TypeRegistry::new();
        let err = registry.register(ClassBuilder::bean("String")).unwrap_err();
        assert_eq!(err, TypeError::DuplicateClass("String".into()));
    }
}
