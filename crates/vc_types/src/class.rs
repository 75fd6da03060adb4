use core::fmt;

use crate::TypeExpr;

// -----------------------------------------------------------------------------
// ClassId

/// Dense index of a class declaration inside a [`TypeRegistry`].
///
/// Ids are only meaningful for the registry that produced them.
///
/// [`TypeRegistry`]: crate::TypeRegistry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassId(pub(crate) u32);

impl ClassId {
    /// Returns the raw index of this id.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Creates an id from a raw index.
    ///
    /// The id is not checked against any registry.
    #[inline]
    pub const fn from_index(index: usize) -> Self {
        Self(index as u32)
    }
}

impl fmt::Display for ClassId {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// -----------------------------------------------------------------------------
// ScalarKind

/// The leaf value types the conversion layer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    String,
    /// A class literal, bound from a registered class name.
    Class,
}

impl ScalarKind {
    /// Returns `true` for every signed or unsigned integer kind.
    #[inline]
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            Self::I8
                | Self::I16
                | Self::I32
                | Self::I64
                | Self::U8
                | Self::U16
                | Self::U32
                | Self::U64
        )
    }

    /// Returns `true` for `f32` and `f64`.
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    /// Inclusive integer range of this kind, `None` for non-integers.
    pub const fn integer_range(self) -> Option<(i128, i128)> {
        Some(match self {
            Self::I8 => (i8::MIN as i128, i8::MAX as i128),
            Self::I16 => (i16::MIN as i128, i16::MAX as i128),
            Self::I32 => (i32::MIN as i128, i32::MAX as i128),
            Self::I64 => (i64::MIN as i128, i64::MAX as i128),
            Self::U8 => (0, u8::MAX as i128),
            Self::U16 => (0, u16::MAX as i128),
            Self::U32 => (0, u32::MAX as i128),
            Self::U64 => (0, u64::MAX as i128),
            _ => return None,
        })
    }

    /// The name this kind is registered under by [`TypeRegistry::new`].
    ///
    /// [`TypeRegistry::new`]: crate::TypeRegistry::new
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Char => "char",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::String => "String",
            Self::Class => "Class",
        }
    }
}

impl fmt::Display for ScalarKind {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

// -----------------------------------------------------------------------------
// ClassKind

/// The declared shape of a class.
///
/// This is the *declaration*; the classification used for dispatch is
/// [`TypeKind`](crate::TypeKind), which also looks at the ancestry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    /// The root of the hierarchy.
    Object,
    Scalar(ScalarKind),
    Enum,
    Interface,
    /// A plain class, usually a container implementation.
    Class,
    /// A mutable structured type with writable properties.
    Bean,
    /// An immutable value object built from its components.
    Record,
}

impl fmt::Display for ClassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Object => f.pad("Object"),
            Self::Scalar(kind) => write!(f, "Scalar({kind})"),
            Self::Enum => f.pad("Enum"),
            Self::Interface => f.pad("Interface"),
            Self::Class => f.pad("Class"),
            Self::Bean => f.pad("Bean"),
            Self::Record => f.pad("Record"),
        }
    }
}

// -----------------------------------------------------------------------------
// Members

/// A declared type parameter, e.g. the `V` of `MyMap<V>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeParam {
    name: String,
    pub(crate) bounds: Vec<TypeExpr>,
}

impl TypeParam {
    #[inline]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bounds: Vec::new(),
        }
    }

    #[inline]
    pub fn with_bound(mut self, bound: TypeExpr) -> Self {
        self.bounds.push(bound);
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared upper bounds, the first one is used as fallback resolution.
    #[inline]
    pub fn bounds(&self) -> &[TypeExpr] {
        &self.bounds
    }
}

/// A property of a [`ClassKind::Bean`].
///
/// # Examples
///
/// ```
/// use vc_types::{PropertyInfo, TypeExpr, builtin};
///
/// let prop = PropertyInfo::new("port", TypeExpr::class(builtin::U16))
///     .required()
///     .with_alias("server-port");
///
/// assert!(prop.is_writable());
/// assert!(prop.is_required());
/// assert_eq!(prop.path_name(), "server-port");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyInfo {
    name: String,
    ty: TypeExpr,
    writable: bool,
    required: bool,
    alias: Option<String>,
}

impl PropertyInfo {
    /// Creates a writable, optional property.
    #[inline]
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: name.into(),
            ty,
            writable: true,
            required: false,
            alias: None,
        }
    }

    /// Marks the property as having no setter.
    #[inline]
    pub fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }

    /// Marks the property as required; an empty bind result is an error.
    #[inline]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Binds the property from `alias` instead of its own name.
    #[inline]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared type, written in the context of the declaring class.
    #[inline]
    pub fn ty(&self) -> &TypeExpr {
        &self.ty
    }

    #[inline]
    pub fn is_writable(&self) -> bool {
        self.writable
    }

    #[inline]
    pub fn is_required(&self) -> bool {
        self.required
    }

    #[inline]
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// The path segment this property is bound from.
    #[inline]
    pub fn path_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    pub(crate) fn bind_owner(&mut self, owner: ClassId) {
        self.ty.bind_owner(owner);
    }
}

/// A component of a [`ClassKind::Record`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentInfo {
    name: String,
    pub(crate) ty: TypeExpr,
}

impl ComponentInfo {
    #[inline]
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn ty(&self) -> &TypeExpr {
        &self.ty
    }
}

// -----------------------------------------------------------------------------
// ClassInfo

/// A registered class declaration.
///
/// Created through [`ClassBuilder`] and owned by a [`TypeRegistry`].
///
/// [`TypeRegistry`]: crate::TypeRegistry
#[derive(Debug, Clone)]
pub struct ClassInfo {
    pub(crate) id: ClassId,
    pub(crate) name: String,
    pub(crate) kind: ClassKind,
    pub(crate) params: Vec<TypeParam>,
    pub(crate) super_type: Option<TypeExpr>,
    pub(crate) interfaces: Vec<TypeExpr>,
    pub(crate) properties: Vec<PropertyInfo>,
    pub(crate) components: Vec<ComponentInfo>,
    pub(crate) variants: Vec<String>,
    pub(crate) constructible: bool,
    pub(crate) immutable: bool,
}

impl ClassInfo {
    #[inline]
    pub fn id(&self) -> ClassId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn kind(&self) -> ClassKind {
        self.kind
    }

    #[inline]
    pub fn params(&self) -> &[TypeParam] {
        &self.params
    }

    /// Position of the type parameter called `name`.
    #[inline]
    pub fn param_index(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p.name == name)
    }

    #[inline]
    pub fn super_type(&self) -> Option<&TypeExpr> {
        self.super_type.as_ref()
    }

    #[inline]
    pub fn interfaces(&self) -> &[TypeExpr] {
        &self.interfaces
    }

    /// Properties declared by this class, not including inherited ones.
    #[inline]
    pub fn properties(&self) -> &[PropertyInfo] {
        &self.properties
    }

    #[inline]
    pub fn property(&self, name: &str) -> Option<&PropertyInfo> {
        self.properties.iter().find(|p| p.name == name)
    }

    #[inline]
    pub fn components(&self) -> &[ComponentInfo] {
        &self.components
    }

    #[inline]
    pub fn component(&self, name: &str) -> Option<&ComponentInfo> {
        self.components.iter().find(|c| c.name == name)
    }

    /// Enum variants in declaration order.
    #[inline]
    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    /// Whether a no-arg constructor is available.
    #[inline]
    pub fn is_constructible(&self) -> bool {
        self.constructible
    }

    /// Whether instances reject mutation after construction.
    #[inline]
    pub fn is_immutable(&self) -> bool {
        self.immutable
    }
}

// -----------------------------------------------------------------------------
// ClassBuilder

/// Fluent builder for a [`ClassInfo`].
///
/// Type variables of the class under construction are written with
/// [`TypeExpr::param`]; their owner is filled in on registration.
///
/// # Examples
///
/// ```
/// use vc_types::{ClassBuilder, TypeExpr, TypeRegistry, builtin};
///
/// let mut registry = TypeRegistry::new();
///
/// // class MyMap<V> extends HashMap<String, V>
/// let my_map = registry.register(
///     ClassBuilder::class("MyMap")
///         .param("V")
///         .extends(TypeExpr::parameterized(
///             builtin::HASH_MAP,
///             [TypeExpr::class(builtin::STRING), TypeExpr::param("V")],
///         )),
/// ).unwrap();
///
/// assert_eq!(registry.class(my_map).unwrap().params().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct ClassBuilder {
    pub(crate) info: ClassInfo,
}

impl ClassBuilder {
    fn with_kind(name: impl Into<String>, kind: ClassKind) -> Self {
        let constructible = !matches!(kind, ClassKind::Interface | ClassKind::Enum);
        Self {
            info: ClassInfo {
                id: ClassId(u32::MAX),
                name: name.into(),
                kind,
                params: Vec::new(),
                super_type: None,
                interfaces: Vec::new(),
                properties: Vec::new(),
                components: Vec::new(),
                variants: Vec::new(),
                constructible,
                immutable: matches!(kind, ClassKind::Record | ClassKind::Scalar(_)),
            },
        }
    }

    /// Declares the root class.
    #[inline]
    pub fn object(name: impl Into<String>) -> Self {
        Self::with_kind(name, ClassKind::Object)
    }

    #[inline]
    pub fn scalar(kind: ScalarKind) -> Self {
        Self::with_kind(kind.name(), ClassKind::Scalar(kind))
    }

    #[inline]
    pub fn interface(name: impl Into<String>) -> Self {
        Self::with_kind(name, ClassKind::Interface)
    }

    #[inline]
    pub fn class(name: impl Into<String>) -> Self {
        Self::with_kind(name, ClassKind::Class)
    }

    #[inline]
    pub fn bean(name: impl Into<String>) -> Self {
        Self::with_kind(name, ClassKind::Bean)
    }

    #[inline]
    pub fn record(name: impl Into<String>) -> Self {
        Self::with_kind(name, ClassKind::Record)
    }

    /// Declares an enum with the given variants.
    pub fn enumeration<S: Into<String>>(
        name: impl Into<String>,
        variants: impl IntoIterator<Item = S>,
    ) -> Self {
        let mut builder = Self::with_kind(name, ClassKind::Enum);
        builder.info.variants = variants.into_iter().map(Into::into).collect();
        builder
    }

    /// Adds an unbounded type parameter.
    #[inline]
    pub fn param(self, name: impl Into<String>) -> Self {
        self.type_param(TypeParam::new(name))
    }

    #[inline]
    pub fn type_param(mut self, param: TypeParam) -> Self {
        self.info.params.push(param);
        self
    }

    /// Sets the direct supertype.
    #[inline]
    pub fn extends(mut self, super_type: TypeExpr) -> Self {
        self.info.super_type = Some(super_type);
        self
    }

    /// Adds a directly implemented interface.
    #[inline]
    pub fn implements(mut self, interface: TypeExpr) -> Self {
        self.info.interfaces.push(interface);
        self
    }

    #[inline]
    pub fn property(mut self, property: PropertyInfo) -> Self {
        self.info.properties.push(property);
        self
    }

    #[inline]
    pub fn component(mut self, name: impl Into<String>, ty: TypeExpr) -> Self {
        self.info.components.push(ComponentInfo::new(name, ty));
        self
    }

    /// Removes the no-arg constructor.
    #[inline]
    pub fn abstract_class(mut self) -> Self {
        self.info.constructible = false;
        self
    }

    /// Marks instances as immutable.
    #[inline]
    pub fn immutable(mut self) -> Self {
        self.info.immutable = true;
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.info.name
    }
}
