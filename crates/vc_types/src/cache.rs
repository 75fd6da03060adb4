//! Storage for canonical [`TypeExpression`] nodes and their derived relations.
//!
//! Derived relations (supertype, interfaces, generic arguments) point back to
//! the node they were derived from, so they are kept here rather than on the
//! node itself. Dropping the cache releases them.

use std::sync::{Arc, PoisonError, RwLock};

use crate::TypeExpression;
use crate::hash::{HashMap, HashSet};

// -----------------------------------------------------------------------------
// Relation

/// A relation derived from a node by the [`TypeFactory`](crate::TypeFactory).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// Zero or one element.
    SuperType,
    Interfaces,
    Generics,
}

// -----------------------------------------------------------------------------
// TypeCache

/// Memoisation backend of a [`TypeFactory`](crate::TypeFactory).
///
/// Values are pure functions of their keys, so concurrent writers may race
/// as long as each write is atomic; the result is the same either way.
pub trait TypeCache: Send + Sync {
    /// Returns the stored node equal to `node`, storing `node` if there is
    /// none yet.
    fn intern(&self, node: TypeExpression) -> TypeExpression;

    fn relation(&self, node: &TypeExpression, relation: Relation) -> Option<Arc<[TypeExpression]>>;

    fn store_relation(
        &self,
        node: &TypeExpression,
        relation: Relation,
        value: Arc<[TypeExpression]>,
    );

    /// Drops every stored entry.
    fn clear(&self);

    /// Number of interned nodes.
    fn len(&self) -> usize;
}

// -----------------------------------------------------------------------------
// SharedTypeCache

#[derive(Default)]
struct CacheInner {
    nodes: HashSet<TypeExpression>,
    relations: HashMap<(TypeExpression, Relation), Arc<[TypeExpression]>>,
}

/// A thread-safe [`TypeCache`], the default of
/// [`TypeFactory::new`](crate::TypeFactory::new).
///
/// A poisoned lock is recovered, entries are never left half-written.
#[derive(Default)]
pub struct SharedTypeCache {
    inner: RwLock<CacheInner>,
}

impl SharedTypeCache {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TypeCache for SharedTypeCache {
    fn intern(&self, node: TypeExpression) -> TypeExpression {
        {
            let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(found) = inner.nodes.get(&node) {
                return found.clone();
            }
        }
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.nodes.get_or_insert(node).clone()
    }

    fn relation(&self, node: &TypeExpression, relation: Relation) -> Option<Arc<[TypeExpression]>> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.relations.get(&(node.clone(), relation)).cloned()
    }

    fn store_relation(
        &self,
        node: &TypeExpression,
        relation: Relation,
        value: Arc<[TypeExpression]>,
    ) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.relations.insert((node.clone(), relation), value);
    }

    fn clear(&self) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.nodes.clear();
        inner.relations.clear();
    }

    fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .nodes
            .len()
    }
}

impl core::fmt::Debug for SharedTypeCache {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SharedTypeCache")
            .field("nodes", &self.len())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// NoTypeCache

/// A [`TypeCache`] that stores nothing. Every query is recomputed.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTypeCache;

impl TypeCache for NoTypeCache {
    #[inline]
    fn intern(&self, node: TypeExpression) -> TypeExpression {
        node
    }

    #[inline]
    fn relation(&self, _: &TypeExpression, _: Relation) -> Option<Arc<[TypeExpression]>> {
        None
    }

    #[inline]
    fn store_relation(&self, _: &TypeExpression, _: Relation, _: Arc<[TypeExpression]>) {}

    #[inline]
    fn clear(&self) {}

    #[inline]
    fn len(&self) -> usize {
        0
    }
}
