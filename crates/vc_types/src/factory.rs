use core::fmt;
use std::sync::Arc;

use crate::cache::{Relation, SharedTypeCache, TypeCache};
use crate::{ClassId, ClassKind, StructKind, TypeError, TypeExpr, TypeExpression};
use crate::{SequenceKind, TypeKind, TypeRegistry, builtin};

/// Bound on resolution chains and ancestry walks.
///
/// Well-formed declarations never get close; it only stops self-referential
/// bounds such as `T extends U, U extends T`.
pub const MAX_DEPTH: usize = 64;

#[inline]
fn empty() -> Arc<[TypeExpression]> {
    Arc::new([])
}

// -----------------------------------------------------------------------------
// TypeFactory

/// Creates [`TypeExpression`] nodes and answers every question about them.
///
/// The factory owns the registry the expressions refer to and the cache the
/// answers are kept in. It is meant to be built once and shared, it is
/// `Send + Sync` whatever cache it uses.
///
/// Unresolvable questions answer `None` (or an empty slice); nothing here
/// fails for a type that simply can not be known.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use vc_types::{TypeFactory, TypeKind, TypeRegistry, builtin};
///
/// let factory = TypeFactory::new(Arc::new(TypeRegistry::new()));
/// let ty = factory.parse("HashMap<String, List<i32>>").unwrap();
///
/// assert_eq!(factory.kind(&ty), TypeKind::Map);
///
/// let map = factory.locate(&ty, builtin::MAP).unwrap();
/// let value = factory.generic(&map, 1).unwrap();
/// assert_eq!(factory.raw_class(&value), Some(builtin::LIST));
/// assert_eq!(factory.display(&value), "List<i32>");
/// ```
pub struct TypeFactory {
    registry: Arc<TypeRegistry>,
    cache: Box<dyn TypeCache>,
}

impl TypeFactory {
    /// Creates a factory backed by a [`SharedTypeCache`].
    #[inline]
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self::with_cache(registry, SharedTypeCache::new())
    }

    /// Creates a factory backed by `cache`.
    ///
    /// [`NoTypeCache`](crate::NoTypeCache) disables caching entirely.
    #[inline]
    pub fn with_cache(registry: Arc<TypeRegistry>, cache: impl TypeCache + 'static) -> Self {
        Self {
            registry,
            cache: Box::new(cache),
        }
    }

    #[inline]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    #[inline]
    pub fn shared_registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    #[inline]
    pub fn cache(&self) -> &dyn TypeCache {
        &*self.cache
    }

    // -------------------------------------------------------------------------
    // Construction

    /// Places `expr` in the context `parent`.
    #[inline]
    pub fn node(&self, expr: TypeExpr, parent: Option<&TypeExpression>) -> TypeExpression {
        self.cache.intern(TypeExpression::new(expr, parent.cloned()))
    }

    /// A root expression, without context.
    #[inline]
    pub fn of(&self, expr: TypeExpr) -> TypeExpression {
        self.node(expr, None)
    }

    /// The raw class `id` as a root expression.
    #[inline]
    pub fn of_class(&self, id: ClassId) -> TypeExpression {
        self.node(TypeExpr::Class(id), None)
    }

    /// Parses `input` with [`TypeRegistry::parse_type`] into a root expression.
    #[inline]
    pub fn parse(&self, input: &str) -> Result<TypeExpression, TypeError> {
        self.registry.parse_type(input).map(|expr| self.of(expr))
    }

    // -------------------------------------------------------------------------
    // Resolution

    /// Returns the node a variable or wildcard stands for.
    ///
    /// Other nodes resolve to themselves. A variable is resolved through the
    /// closest parent that instantiates its owner, falling back to its first
    /// bound. A wildcard resolves to its upper bound, else its lower bound.
    #[inline]
    pub fn resolve(&self, ty: &TypeExpression) -> Option<TypeExpression> {
        self.resolve_in(ty, 0)
    }

    fn resolve_in(&self, ty: &TypeExpression, depth: usize) -> Option<TypeExpression> {
        if !ty.is_indirect() {
            return Some(ty.clone());
        }
        if let Some(target) = ty.node().target.get() {
            return target.clone();
        }
        if depth > MAX_DEPTH {
            log::debug!("type resolution exceeded depth {MAX_DEPTH} at {ty:?}");
            return None;
        }

        let target = match ty.expr() {
            TypeExpr::Variable { name, owner } => self.variable_target(ty, name, *owner, depth),
            TypeExpr::Wildcard { upper, lower } => {
                let bound = upper.first().or(lower.first());
                bound.and_then(|b| self.resolve_in(&self.node(b.clone(), ty.parent()), depth + 1))
            }
            _ => return Some(ty.clone()),
        };

        // Computed outside of the cell, resolution may revisit this node.
        let _ = ty.node().target.set(target.clone());
        target
    }

    fn variable_target(
        &self,
        ty: &TypeExpression,
        name: &str,
        owner: Option<ClassId>,
        depth: usize,
    ) -> Option<TypeExpression> {
        let owner = owner?;
        let info = self.registry.class(owner)?;
        let index = info.param_index(name)?;

        let mut cursor = ty.parent();
        while let Some(ancestor) = cursor {
            if let Some(effective) = self.resolve_in(ancestor, depth + 1) {
                match effective.expr() {
                    TypeExpr::Parameterized { raw, args } if *raw == owner => {
                        let arg = args.get(index)?;
                        let node = self.node(arg.clone(), effective.parent());
                        return self.resolve_in(&node, depth + 1);
                    }
                    // A raw use of the owner, the arguments are unknown.
                    TypeExpr::Class(raw) if *raw == owner => break,
                    _ => {}
                }
            }
            cursor = ancestor.parent();
        }

        let bound = info.params().get(index)?.bounds().first()?;
        self.resolve_in(&self.node(bound.clone(), None), depth + 1)
    }

    /// The class this expression denotes.
    ///
    /// Arrays answer the class of their component.
    pub fn raw_class(&self, ty: &TypeExpression) -> Option<ClassId> {
        if let Some(raw) = ty.node().raw.get() {
            return *raw;
        }
        let raw = match ty.expr() {
            TypeExpr::Class(id) | TypeExpr::Parameterized { raw: id, .. } => Some(*id),
            TypeExpr::Array(_) => self.component(ty).and_then(|c| self.raw_class(&c)),
            TypeExpr::Variable { .. } | TypeExpr::Wildcard { .. } => {
                self.resolve(ty).and_then(|target| self.raw_class(&target))
            }
        };
        let _ = ty.node().raw.set(raw);
        raw
    }

    /// The component type of an array.
    pub fn component(&self, ty: &TypeExpression) -> Option<TypeExpression> {
        let effective = self.resolve(ty)?;
        match effective.expr() {
            TypeExpr::Array(component) => {
                Some(self.node(component.as_ref().clone(), effective.parent()))
            }
            _ => None,
        }
    }

    // -------------------------------------------------------------------------
    // Relations

    fn related(
        &self,
        ty: &TypeExpression,
        relation: Relation,
        compute: impl FnOnce() -> Arc<[TypeExpression]>,
    ) -> Arc<[TypeExpression]> {
        if let Some(found) = self.cache.relation(ty, relation) {
            return found;
        }
        let value = compute();
        self.cache.store_relation(ty, relation, value.clone());
        value
    }

    /// The generic arguments of this expression.
    ///
    /// For a parameterized type these are its arguments, still in the same
    /// context. For a raw class these are its own declared parameters, which
    /// usually do not resolve.
    pub fn generics(&self, ty: &TypeExpression) -> Arc<[TypeExpression]> {
        self.related(ty, Relation::Generics, || match ty.expr() {
            TypeExpr::Parameterized { args, .. } => args
                .iter()
                .map(|arg| self.node(arg.clone(), ty.parent()))
                .collect(),
            TypeExpr::Class(id) => match self.registry.class(*id) {
                Some(info) => info
                    .params()
                    .iter()
                    .map(|param| self.node(TypeExpr::variable(param.name(), *id), Some(ty)))
                    .collect(),
                None => empty(),
            },
            TypeExpr::Variable { .. } | TypeExpr::Wildcard { .. } => self
                .resolve(ty)
                .map(|target| self.generics(&target))
                .unwrap_or_else(empty),
            TypeExpr::Array(_) => empty(),
        })
    }

    #[inline]
    pub fn generic(&self, ty: &TypeExpression, index: usize) -> Option<TypeExpression> {
        self.generics(ty).get(index).cloned()
    }

    /// The direct supertype, in the context of `ty`.
    ///
    /// Arrays extend `Object`.
    pub fn super_type(&self, ty: &TypeExpression) -> Option<TypeExpression> {
        let found = self.related(ty, Relation::SuperType, || {
            let Some(effective) = self.resolve(ty) else {
                return empty();
            };
            let super_type = match effective.expr() {
                TypeExpr::Array(_) => self.registry.root_class().map(|root| self.of_class(root)),
                _ => self
                    .raw_class(&effective)
                    .and_then(|id| self.registry.class(id))
                    .and_then(|info| info.super_type())
                    .map(|expr| self.node(expr.clone(), Some(&effective))),
            };
            super_type.into_iter().collect()
        });
        found.first().cloned()
    }

    /// The directly implemented interfaces, in the context of `ty`.
    pub fn interfaces(&self, ty: &TypeExpression) -> Arc<[TypeExpression]> {
        self.related(ty, Relation::Interfaces, || {
            let Some(effective) = self.resolve(ty) else {
                return empty();
            };
            if matches!(effective.expr(), TypeExpr::Array(_)) {
                return empty();
            }
            match self.raw_class(&effective).and_then(|id| self.registry.class(id)) {
                Some(info) => info
                    .interfaces()
                    .iter()
                    .map(|expr| self.node(expr.clone(), Some(&effective)))
                    .collect(),
                None => empty(),
            }
        })
    }

    /// Finds the ancestor of `ty` whose raw class is `target`.
    ///
    /// The search is depth-first: `ty` itself, then its interfaces, then its
    /// supertype. The result keeps the context of the search, so its
    /// generic arguments resolve against `ty`.
    pub fn locate(&self, ty: &TypeExpression, target: ClassId) -> Option<TypeExpression> {
        self.locate_in(ty, target, 0)
    }

    fn locate_in(
        &self,
        ty: &TypeExpression,
        target: ClassId,
        depth: usize,
    ) -> Option<TypeExpression> {
        if depth > MAX_DEPTH {
            return None;
        }
        let effective = self.resolve(ty)?;
        if matches!(effective.expr(), TypeExpr::Array(_)) {
            return None;
        }
        if self.raw_class(&effective)? == target {
            return Some(effective);
        }
        for interface in self.interfaces(&effective).iter() {
            if let Some(found) = self.locate_in(interface, target, depth + 1) {
                return Some(found);
            }
        }
        self.super_type(&effective)
            .and_then(|super_type| self.locate_in(&super_type, target, depth + 1))
    }

    /// Whether a value of `ty` can be used where `class` is expected.
    pub fn is_assignable_to(&self, ty: &TypeExpression, class: ClassId) -> bool {
        self.registry.root_class() == Some(class) || self.locate(ty, class).is_some()
    }

    // -------------------------------------------------------------------------
    // Classification

    /// Classifies `ty`, see [`TypeKind`].
    pub fn kind(&self, ty: &TypeExpression) -> TypeKind {
        if let Some(kind) = ty.node().kind.get() {
            return *kind;
        }
        let kind = self.classify(ty);
        let _ = ty.node().kind.set(kind);
        kind
    }

    fn classify(&self, ty: &TypeExpression) -> TypeKind {
        let Some(effective) = self.resolve(ty) else {
            return TypeKind::Unknown;
        };
        if matches!(effective.expr(), TypeExpr::Array(_)) {
            return TypeKind::Array;
        }
        let Some(info) = self.raw_class(&effective).and_then(|id| self.registry.class(id)) else {
            return TypeKind::Unknown;
        };
        match info.kind() {
            ClassKind::Scalar(scalar) => TypeKind::Scalar(scalar),
            ClassKind::Enum => TypeKind::Enum,
            ClassKind::Bean => TypeKind::Struct(StructKind::Bean),
            ClassKind::Record => TypeKind::Struct(StructKind::Record),
            ClassKind::Object => TypeKind::Unknown,
            ClassKind::Interface | ClassKind::Class => self.container_kind(&effective),
        }
    }

    fn container_kind(&self, ty: &TypeExpression) -> TypeKind {
        if !self.registry.has_builtins() {
            return TypeKind::Unknown;
        }
        if self.locate(ty, builtin::MAP).is_some() {
            TypeKind::Map
        } else if self.locate(ty, builtin::SET).is_some() {
            TypeKind::Sequence(SequenceKind::Set)
        } else if self.locate(ty, builtin::COLLECTION).is_some() {
            TypeKind::Sequence(SequenceKind::List)
        } else {
            TypeKind::Unknown
        }
    }

    /// The element type of an array or collection.
    ///
    /// `None` when the element type is not known, e.g. for a raw `List`.
    pub fn element_type(&self, ty: &TypeExpression) -> Option<TypeExpression> {
        match self.kind(ty) {
            TypeKind::Array => self.component(ty),
            TypeKind::Sequence(_) => {
                let collection = self.locate(ty, builtin::COLLECTION)?;
                self.generic(&collection, 0)
                    .and_then(|element| self.resolve(&element))
            }
            _ => None,
        }
    }

    /// The key and value types of a map, each `None` when unknown.
    pub fn map_types(
        &self,
        ty: &TypeExpression,
    ) -> (Option<TypeExpression>, Option<TypeExpression>) {
        if !self.kind(ty).is_map() {
            return (None, None);
        }
        let Some(map) = self.locate(ty, builtin::MAP) else {
            return (None, None);
        };
        let resolve = |index| self.generic(&map, index).and_then(|t| self.resolve(&t));
        (resolve(0), resolve(1))
    }

    // -------------------------------------------------------------------------
    // Display

    /// Renders `ty` after resolution, e.g. `Map<String, V>` reached from
    /// `MyMap<i32>` renders as `Map<String, i32>`.
    pub fn display(&self, ty: &TypeExpression) -> String {
        let mut out = String::new();
        // Writing into a String never fails.
        let _ = self.write_resolved(ty, &mut out, 0);
        out
    }

    fn write_resolved(&self, ty: &TypeExpression, out: &mut String, depth: usize) -> fmt::Result {
        use fmt::Write;

        let Some(effective) = self.resolve(ty).filter(|_| depth <= MAX_DEPTH) else {
            return write!(out, "{}", ty.expr().display(&self.registry));
        };
        match effective.expr() {
            TypeExpr::Parameterized { raw, .. } => {
                out.push_str(self.registry.name_of(*raw));
                out.push('<');
                for (index, arg) in self.generics(&effective).iter().enumerate() {
                    if index > 0 {
                        out.push_str(", ");
                    }
                    self.write_resolved(arg, out, depth + 1)?;
                }
                out.push('>');
                Ok(())
            }
            TypeExpr::Array(_) => {
                if let Some(component) = self.component(&effective) {
                    self.write_resolved(&component, out, depth + 1)?;
                }
                out.push_str("[]");
                Ok(())
            }
            expr => write!(out, "{}", expr.display(&self.registry)),
        }
    }
}

impl fmt::Debug for TypeFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeFactory")
            .field("classes", &self.registry.len())
            .field("cached", &self.cache.len())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{ClassBuilder, ClassId, NoTypeCache, PropertyInfo, TypeParam};
    use crate::{SequenceKind, StructKind, TypeExpr, TypeFactory, TypeKind, TypeRegistry, builtin};

    /// `class MyMap<V> extends HashMap<String, V>`
    fn my_map(registry: &mut TypeRegistry) -> ClassId {
        registry
            .register(ClassBuilder::class("MyMap").param("V").extends(
                TypeExpr::parameterized(
                    builtin::HASH_MAP,
                    [TypeExpr::class(builtin::STRING), TypeExpr::param("V")],
                ),
            ))
            .unwrap()
    }

    #[test]
    fn locate_through_super_chain() {
        let mut registry = TypeRegistry::new();
        let my_map = my_map(&mut registry);
        let factory = TypeFactory::new(Arc::new(registry));

        let ty = factory.of(TypeExpr::parameterized(my_map, [TypeExpr::class(builtin::I32)]));
        let map = factory.locate(&ty, builtin::MAP).unwrap();
        assert_eq!(factory.raw_class(&map), Some(builtin::MAP));

        let generics = factory.generics(&map);
        assert_eq!(generics.len(), 2);
        assert_eq!(factory.raw_class(&generics[0]), Some(builtin::STRING));
        assert_eq!(factory.raw_class(&generics[1]), Some(builtin::I32));
        assert_eq!(factory.display(&map), "Map<String, i32>");
        assert_eq!(factory.kind(&ty), TypeKind::Map);
    }

    #[test]
    fn same_variable_different_contexts() {
        let mut registry = TypeRegistry::new();
        let my_map = my_map(&mut registry);
        let factory = TypeFactory::new(Arc::new(registry));

        let of_i64 = factory.of(TypeExpr::parameterized(my_map, [TypeExpr::class(builtin::I64)]));
        let of_str = factory.of(TypeExpr::parameterized(
            my_map,
            [TypeExpr::class(builtin::STRING)],
        ));

        let (_, value) = factory.map_types(&of_i64);
        assert_eq!(value.and_then(|v| factory.raw_class(&v)), Some(builtin::I64));
        let (_, value) = factory.map_types(&of_str);
        assert_eq!(value.and_then(|v| factory.raw_class(&v)), Some(builtin::STRING));
    }

    #[test]
    fn raw_usage_does_not_resolve() {
        let factory = TypeFactory::new(Arc::new(TypeRegistry::new()));
        let raw = factory.of_class(builtin::HASH_MAP);

        let generics = factory.generics(&raw);
        assert_eq!(generics.len(), 2);
        assert!(generics.iter().all(|g| factory.resolve(g).is_none()));
        assert_eq!(factory.raw_class(&generics[0]), None);

        let map = factory.locate(&raw, builtin::MAP).unwrap();
        assert_eq!(factory.generic(&map, 0).and_then(|k| factory.raw_class(&k)), None);
        assert_eq!(factory.kind(&raw), TypeKind::Map);
    }

    #[test]
    fn bound_fallback() {
        let mut registry = TypeRegistry::new();
        let holder = registry
            .register(
                ClassBuilder::bean("Holder")
                    .type_param(TypeParam::new("T").with_bound(TypeExpr::class(builtin::STRING)))
                    .property(PropertyInfo::new("value", TypeExpr::param("T"))),
            )
            .unwrap();
        let factory = TypeFactory::new(Arc::new(registry));

        let raw = factory.of_class(holder);
        let t = factory.generic(&raw, 0).unwrap();
        assert_eq!(factory.raw_class(&t), Some(builtin::STRING));
    }

    #[test]
    fn wildcards() {
        let factory = TypeFactory::new(Arc::new(TypeRegistry::new()));

        let ty = factory.parse("List<? extends String>").unwrap();
        let element = factory.element_type(&ty).unwrap();
        assert_eq!(factory.raw_class(&element), Some(builtin::STRING));

        let ty = factory.parse("List<? super i32>").unwrap();
        let element = factory.generic(&ty, 0).unwrap();
        assert_eq!(factory.raw_class(&element), Some(builtin::I32));

        let ty = factory.parse("List<?>").unwrap();
        assert!(factory.element_type(&ty).is_none());
    }

    #[test]
    fn arrays() {
        let factory = TypeFactory::new(Arc::new(TypeRegistry::new()));
        let ty = factory.parse("List<i32>[]").unwrap();

        assert_eq!(factory.kind(&ty), TypeKind::Array);
        assert_eq!(factory.raw_class(&ty), Some(builtin::LIST));
        assert!(factory.interfaces(&ty).is_empty());
        assert_eq!(
            factory.super_type(&ty).and_then(|s| factory.raw_class(&s)),
            Some(builtin::OBJECT)
        );
        let component = factory.element_type(&ty).unwrap();
        assert_eq!(factory.display(&component), "List<i32>");
    }

    #[test]
    fn classification() {
        let mut registry = TypeRegistry::new();
        let person = registry.register(ClassBuilder::bean("Person")).unwrap();
        let point = registry
            .register(ClassBuilder::record("Point").component("x", TypeExpr::class(builtin::I32)))
            .unwrap();
        let color = registry
            .register(ClassBuilder::enumeration("Color", ["Red", "Green"]))
            .unwrap();
        let factory = TypeFactory::new(Arc::new(registry));

        let kind = |input: &str| factory.kind(&factory.parse(input).unwrap());
        assert_eq!(kind("ArrayList<i32>"), TypeKind::Sequence(SequenceKind::List));
        assert_eq!(kind("Collection<i32>"), TypeKind::Sequence(SequenceKind::List));
        assert_eq!(kind("LinkedHashSet<i32>"), TypeKind::Sequence(SequenceKind::Set));
        assert_eq!(kind("LinkedHashMap<String, i32>"), TypeKind::Map);
        assert_eq!(kind("u8"), TypeKind::Scalar(crate::ScalarKind::U8));
        assert_eq!(kind("Object"), TypeKind::Unknown);
        assert_eq!(kind("Iterable<i32>"), TypeKind::Unknown);

        assert_eq!(factory.kind(&factory.of_class(person)), TypeKind::Struct(StructKind::Bean));
        assert_eq!(factory.kind(&factory.of_class(point)), TypeKind::Struct(StructKind::Record));
        assert_eq!(factory.kind(&factory.of_class(color)), TypeKind::Enum);
    }

    #[test]
    fn assignability() {
        let factory = TypeFactory::new(Arc::new(TypeRegistry::new()));
        let ty = factory.parse("LinkedHashSet<String>").unwrap();
        assert!(factory.is_assignable_to(&ty, builtin::HASH_SET));
        assert!(factory.is_assignable_to(&ty, builtin::ITERABLE));
        assert!(factory.is_assignable_to(&ty, builtin::OBJECT));
        assert!(!factory.is_assignable_to(&ty, builtin::LIST));
    }

    #[test]
    fn self_referential_bounds_terminate() {
        let mut registry = TypeRegistry::new();
        let looped = registry
            .register(
                ClassBuilder::class("Looped")
                    .type_param(TypeParam::new("T").with_bound(TypeExpr::param("U")))
                    .type_param(TypeParam::new("U").with_bound(TypeExpr::param("T"))),
            )
            .unwrap();
        let factory = TypeFactory::new(Arc::new(registry));
        let raw = factory.of_class(looped);
        assert!(factory.generics(&raw).iter().all(|g| factory.raw_class(g).is_none()));
    }

    #[test]
    fn caches_agree() {
        let shared = TypeFactory::new(Arc::new(TypeRegistry::new()));
        let uncached = TypeFactory::with_cache(Arc::new(TypeRegistry::new()), NoTypeCache);

        for input in ["TreeMap<String, Set<i64>>", "LinkedList<u8>[]", "Set<?>"] {
            let a = shared.parse(input).unwrap();
            let b = uncached.parse(input).unwrap();
            assert_eq!(shared.kind(&a), uncached.kind(&b));
            assert_eq!(shared.display(&a), uncached.display(&b));
        }

        let a = shared.parse("List<i32>").unwrap();
        let b = shared.parse("List<i32>").unwrap();
        assert!(a.ptr_eq(&b));
        assert!(shared.cache().len() > 0);
        shared.cache().clear();
        assert_eq!(shared.cache().len(), 0);
    }
}
