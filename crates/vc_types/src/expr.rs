use core::fmt;

use crate::{ClassId, TypeError, TypeRegistry};

// -----------------------------------------------------------------------------
// TypeExpr

/// A syntactic type expression, exactly as it is declared.
///
/// A `TypeExpr` carries no resolution state. The same expression can mean
/// different things depending on where it is used (a `V` inside `MyMap<V>`
/// is only known once `MyMap` is instantiated), so resolution happens on a
/// [`TypeExpression`](crate::TypeExpression), which pairs an expression with
/// its parent context.
///
/// # Examples
///
/// ```
/// use vc_types::{TypeExpr, TypeRegistry, builtin};
///
/// let registry = TypeRegistry::new();
/// let expr = TypeExpr::map_of(
///     TypeExpr::class(builtin::STRING),
///     TypeExpr::list_of(TypeExpr::class(builtin::I32)),
/// );
///
/// assert_eq!(expr.display(&registry).to_string(), "Map<String, List<i32>>");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    /// A raw class reference.
    Class(ClassId),
    /// A class with explicit type arguments.
    Parameterized { raw: ClassId, args: Vec<TypeExpr> },
    /// A type variable declared by `owner`.
    ///
    /// `owner` is `None` only while the declaring class is being built.
    Variable { name: String, owner: Option<ClassId> },
    /// `?`, `? extends U` or `? super L`.
    Wildcard {
        upper: Vec<TypeExpr>,
        lower: Vec<TypeExpr>,
    },
    /// An array of the component type.
    Array(Box<TypeExpr>),
}

impl TypeExpr {
    #[inline]
    pub const fn class(id: ClassId) -> Self {
        Self::Class(id)
    }

    /// Creates a parameterized expression without checking the arity.
    ///
    /// See [`parameterized_checked`](Self::parameterized_checked).
    #[inline]
    pub fn parameterized(raw: ClassId, args: impl IntoIterator<Item = TypeExpr>) -> Self {
        Self::Parameterized {
            raw,
            args: args.into_iter().collect(),
        }
    }

    /// Creates a parameterized expression, validating the number of
    /// arguments against the declaration of `raw`.
    ///
    /// # Examples
    ///
    /// ```
    /// use vc_types::{TypeExpr, TypeRegistry, TypeError, builtin};
    ///
    /// let registry = TypeRegistry::new();
    /// let err = TypeExpr::parameterized_checked(
    ///     &registry,
    ///     builtin::MAP,
    ///     [TypeExpr::class(builtin::STRING)],
    /// ).unwrap_err();
    ///
    /// assert!(matches!(err, TypeError::ArityMismatch { expected: 2, actual: 1, .. }));
    /// ```
    pub fn parameterized_checked(
        registry: &TypeRegistry,
        raw: ClassId,
        args: impl IntoIterator<Item = TypeExpr>,
    ) -> Result<Self, TypeError> {
        let info = registry.class(raw).ok_or(TypeError::UnknownClass(raw))?;
        let args: Vec<TypeExpr> = args.into_iter().collect();
        if args.len() != info.params().len() {
            return Err(TypeError::ArityMismatch {
                class: info.name().into(),
                expected: info.params().len(),
                actual: args.len(),
            });
        }
        Ok(Self::Parameterized { raw, args })
    }

    /// A type variable with a known owner.
    #[inline]
    pub fn variable(name: impl Into<String>, owner: ClassId) -> Self {
        Self::Variable {
            name: name.into(),
            owner: Some(owner),
        }
    }

    /// A type variable of the class currently being declared.
    #[inline]
    pub fn param(name: impl Into<String>) -> Self {
        Self::Variable {
            name: name.into(),
            owner: None,
        }
    }

    /// The unbounded wildcard `?`.
    #[inline]
    pub const fn wildcard() -> Self {
        Self::Wildcard {
            upper: Vec::new(),
            lower: Vec::new(),
        }
    }

    /// `? extends bound`
    #[inline]
    pub fn wildcard_extends(bound: TypeExpr) -> Self {
        Self::Wildcard {
            upper: vec![bound],
            lower: Vec::new(),
        }
    }

    /// `? super bound`
    #[inline]
    pub fn wildcard_super(bound: TypeExpr) -> Self {
        Self::Wildcard {
            upper: Vec::new(),
            lower: vec![bound],
        }
    }

    #[inline]
    pub fn array(component: TypeExpr) -> Self {
        Self::Array(Box::new(component))
    }

    /// `List<element>`
    #[inline]
    pub fn list_of(element: TypeExpr) -> Self {
        Self::parameterized(crate::builtin::LIST, [element])
    }

    /// `Set<element>`
    #[inline]
    pub fn set_of(element: TypeExpr) -> Self {
        Self::parameterized(crate::builtin::SET, [element])
    }

    /// `Map<key, value>`
    #[inline]
    pub fn map_of(key: TypeExpr, value: TypeExpr) -> Self {
        Self::parameterized(crate::builtin::MAP, [key, value])
    }

    /// The class named directly by this expression, without resolution.
    #[inline]
    pub fn declared_class(&self) -> Option<ClassId> {
        match self {
            Self::Class(id) | Self::Parameterized { raw: id, .. } => Some(*id),
            _ => None,
        }
    }

    /// Fills the owner of every ownerless variable with `owner`.
    pub(crate) fn bind_owner(&mut self, owner: ClassId) {
        match self {
            Self::Class(_) => {}
            Self::Parameterized { args, .. } => args.iter_mut().for_each(|a| a.bind_owner(owner)),
            Self::Variable { owner: slot, .. } => {
                if slot.is_none() {
                    *slot = Some(owner);
                }
            }
            Self::Wildcard { upper, lower } => {
                upper.iter_mut().for_each(|a| a.bind_owner(owner));
                lower.iter_mut().for_each(|a| a.bind_owner(owner));
            }
            Self::Array(component) => component.bind_owner(owner),
        }
    }

    /// Returns a value that renders this expression with class names.
    #[inline]
    pub fn display<'a>(&'a self, registry: &'a TypeRegistry) -> DisplayExpr<'a> {
        DisplayExpr {
            expr: self,
            registry,
        }
    }
}

// -----------------------------------------------------------------------------
// Display

/// Renders a [`TypeExpr`] against a registry, see [`TypeExpr::display`].
pub struct DisplayExpr<'a> {
    expr: &'a TypeExpr,
    registry: &'a TypeRegistry,
}

impl DisplayExpr<'_> {
    fn class_name(&self, id: ClassId, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.registry.class(id) {
            Some(info) => f.write_str(info.name()),
            None => write!(f, "{id}"),
        }
    }

    fn list(&self, items: &[TypeExpr], sep: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, item) in items.iter().enumerate() {
            if index > 0 {
                f.write_str(sep)?;
            }
            fmt::Display::fmt(&item.display(self.registry), f)?;
        }
        Ok(())
    }
}

impl fmt::Display for DisplayExpr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.expr {
            TypeExpr::Class(id) => self.class_name(*id, f),
            TypeExpr::Parameterized { raw, args } => {
                self.class_name(*raw, f)?;
                f.write_str("<")?;
                self.list(args, ", ", f)?;
                f.write_str(">")
            }
            TypeExpr::Variable { name, .. } => f.write_str(name),
            TypeExpr::Wildcard { upper, lower } => {
                f.write_str("?")?;
                if !upper.is_empty() {
                    f.write_str(" extends ")?;
                    self.list(upper, " & ", f)?;
                } else if !lower.is_empty() {
                    f.write_str(" super ")?;
                    self.list(lower, " & ", f)?;
                }
                Ok(())
            }
            TypeExpr::Array(component) => write!(f, "{}[]", component.display(self.registry)),
        }
    }
}

// -----------------------------------------------------------------------------
// Parsing

/// Parses a type expression such as `Map<String, List<i32>>`, `? extends Foo`
/// or `i64[]` against the class names of `registry`.
pub(crate) fn parse_type_expr(registry: &TypeRegistry, input: &str) -> Result<TypeExpr, TypeError> {
    let mut parser = ExprParser {
        registry,
        input,
        pos: 0,
    };
    let expr = parser.expr()?;
    parser.skip_ws();
    if parser.pos != input.len() {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(expr)
}

struct ExprParser<'a> {
    registry: &'a TypeRegistry,
    input: &'a str,
    pos: usize,
}

impl<'a> ExprParser<'a> {
    fn error(&self, message: &str) -> TypeError {
        TypeError::Syntax {
            input: self.input.into(),
            offset: self.pos,
            message: message.into(),
        }
    }

    fn skip_ws(&mut self) {
        let rest = &self.input[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn eat(&mut self, token: &str) -> bool {
        self.skip_ws();
        if self.input[self.pos..].starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn ident(&mut self) -> Result<&'a str, TypeError> {
        self.skip_ws();
        let rest: &'a str = &self.input[self.pos..];
        let len = rest
            .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
            .unwrap_or(rest.len());
        if len == 0 {
            return Err(self.error("expected a type name"));
        }
        self.pos += len;
        Ok(&rest[..len])
    }

    fn expr(&mut self) -> Result<TypeExpr, TypeError> {
        let mut expr = if self.eat("?") {
            if self.eat("extends") {
                TypeExpr::wildcard_extends(self.expr()?)
            } else if self.eat("super") {
                TypeExpr::wildcard_super(self.expr()?)
            } else {
                TypeExpr::wildcard()
            }
        } else {
            let name = self.ident()?;
            let id = self
                .registry
                .lookup(name)
                .ok_or_else(|| TypeError::UnknownName(name.into()))?;
            if self.eat("<") {
                let mut args = vec![self.expr()?];
                while self.eat(",") {
                    args.push(self.expr()?);
                }
                if !self.eat(">") {
                    return Err(self.error("expected `>`"));
                }
                TypeExpr::parameterized_checked(self.registry, id, args)?
            } else {
                TypeExpr::Class(id)
            }
        };
        while self.eat("[") {
            if !self.eat("]") {
                return Err(self.error("expected `]`"));
            }
            expr = TypeExpr::array(expr);
        }
        Ok(expr)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::{TypeError, TypeExpr, TypeRegistry, builtin};

    #[test]
    fn parse_nested() {
        let registry = TypeRegistry::new();
        let expr = registry.parse_type("Map<String, List<i32>[]>").unwrap();
        assert_eq!(
            expr,
            TypeExpr::map_of(
                TypeExpr::class(builtin::STRING),
                TypeExpr::array(TypeExpr::list_of(TypeExpr::class(builtin::I32))),
            )
        );
        assert_eq!(
            expr.display(&registry).to_string(),
            "Map<String, List<i32>[]>"
        );
    }

    #[test]
    fn parse_wildcards() {
        let registry = TypeRegistry::new();
        let expr = registry.parse_type("List<? extends Collection<?>>").unwrap();
        assert_eq!(
            expr.display(&registry).to_string(),
            "List<? extends Collection<?>>"
        );
    }

    #[test]
    fn parse_errors() {
        let registry = TypeRegistry::new();
        assert!(matches!(
            registry.parse_type("Missing"),
            Err(TypeError::UnknownName(name)) if name == "Missing"
        ));
        assert!(matches!(
            registry.parse_type("List<String"),
            Err(TypeError::Syntax { .. })
        ));
        assert!(matches!(
            registry.parse_type("List<String, i32>"),
            Err(TypeError::ArityMismatch { expected: 1, actual: 2, .. })
        ));
    }

    #[test]
    fn bind_owner_only_fills_missing() {
        let mut expr = TypeExpr::parameterized(
            builtin::MAP,
            [TypeExpr::param("K"), TypeExpr::variable("V", builtin::LIST)],
        );
        expr.bind_owner(builtin::HASH_MAP);
        assert_eq!(
            expr,
            TypeExpr::parameterized(
                builtin::MAP,
                [
                    TypeExpr::variable("K", builtin::HASH_MAP),
                    TypeExpr::variable("V", builtin::LIST),
                ],
            )
        );
    }
}
