use core::fmt;
use core::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use crate::hash::fixed_hash;
use crate::{ClassId, TypeExpr, TypeKind};

// -----------------------------------------------------------------------------
// TypeExpression

/// A [`TypeExpr`] placed in a context.
///
/// The parent is the expression this one was reached from: the owner of a
/// generic argument, the subtype of a supertype. Type variables are resolved
/// by walking back through the parents, so `V` means `i32` when reached
/// from `MyMap<i32>` and `String` when reached from `MyMap<String>`.
///
/// Cloning is cheap, nodes are shared. Nodes are created by a
/// [`TypeFactory`] and only make sense together with it; the resolved raw
/// class, variable target and [`TypeKind`] are memoised on the node itself.
///
/// Equality and hashing are structural over `(expr, parent)`.
///
/// [`TypeFactory`]: crate::TypeFactory
#[derive(Clone)]
pub struct TypeExpression(Arc<Node>);

pub(crate) struct Node {
    expr: TypeExpr,
    parent: Option<TypeExpression>,
    hash: u64,
    pub(crate) raw: OnceLock<Option<ClassId>>,
    /// Only filled for variables and wildcards.
    pub(crate) target: OnceLock<Option<TypeExpression>>,
    pub(crate) kind: OnceLock<TypeKind>,
}

impl TypeExpression {
    pub(crate) fn new(expr: TypeExpr, parent: Option<TypeExpression>) -> Self {
        let parent_hash = parent.as_ref().map_or(0, |p| p.0.hash);
        let hash = fixed_hash(&(&expr, parent_hash));
        Self(Arc::new(Node {
            expr,
            parent,
            hash,
            raw: OnceLock::new(),
            target: OnceLock::new(),
            kind: OnceLock::new(),
        }))
    }

    #[inline]
    pub(crate) fn node(&self) -> &Node {
        &self.0
    }

    /// The syntactic expression of this node.
    #[inline]
    pub fn expr(&self) -> &TypeExpr {
        &self.0.expr
    }

    /// The context this node was reached from.
    #[inline]
    pub fn parent(&self) -> Option<&TypeExpression> {
        self.0.parent.as_ref()
    }

    /// Number of parents up to the root.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut cursor = self.parent();
        while let Some(parent) = cursor {
            depth += 1;
            cursor = parent.parent();
        }
        depth
    }

    /// Returns `true` for variables and wildcards, the nodes that need a
    /// context to mean anything.
    #[inline]
    pub fn is_indirect(&self) -> bool {
        matches!(
            self.0.expr,
            TypeExpr::Variable { .. } | TypeExpr::Wildcard { .. }
        )
    }

    /// Returns `true` if both handles point to the same node.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for TypeExpression {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
            || (self.0.hash == other.0.hash
                && self.0.expr == other.0.expr
                && self.0.parent == other.0.parent)
    }
}

impl Eq for TypeExpression {}

impl Hash for TypeExpression {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.0.hash);
    }
}

impl fmt::Debug for TypeExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeExpression")
            .field("expr", &self.0.expr)
            .field("depth", &self.depth())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::TypeExpression;
    use crate::hash::fixed_hash;
    use crate::{TypeExpr, builtin};

    #[test]
    fn structural_equality() {
        let root = TypeExpression::new(TypeExpr::class(builtin::STRING), None);
        let a = TypeExpression::new(TypeExpr::param("V"), Some(root.clone()));
        let b = TypeExpression::new(TypeExpr::param("V"), Some(root.clone()));
        let c = TypeExpression::new(TypeExpr::param("V"), None);

        assert!(!a.ptr_eq(&b));
        assert_eq!(a, b);
        assert_eq!(fixed_hash(&a), fixed_hash(&b));
        assert_ne!(a, c);
        assert_eq!(a.depth(), 1);
        assert!(a.is_indirect());
        assert!(!root.is_indirect());
    }
}
