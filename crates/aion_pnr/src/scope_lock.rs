//! Read/write access scoping for a shared [`Context`].
//!
//! Placement and routing each run single-threaded today, but both are
//! structured as a sequence of bounded "scopes" (one SA move, one net's
//! route) that either read the context or mutate it. [`ScopeLock`] makes
//! that boundary explicit and gives the concurrency story (a future
//! multi-threaded router partitioning work across regions) a seam to grow
//! into without every call site taking a raw lock.

use crate::context::Context;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Owns a [`Context`] behind a reader/writer lock.
///
/// Read scopes may run concurrently; a write scope excludes all others.
#[derive(Debug, Default)]
pub struct ScopeLock {
    inner: RwLock<Context>,
}

impl ScopeLock {
    /// Wraps `context` for scoped access.
    pub fn new(context: Context) -> Self {
        Self {
            inner: RwLock::new(context),
        }
    }

    /// Opens a read-only scope.
    ///
    /// Panics if the lock is poisoned by a panicking writer, matching the
    /// standard library's own `RwLock::read` behavior.
    pub fn read(&self) -> ReadGuard<'_> {
        ReadGuard {
            guard: self.inner.read().expect("context lock poisoned"),
        }
    }

    /// Opens a read-write scope.
    pub fn write(&self) -> WriteGuard<'_> {
        WriteGuard {
            guard: self.inner.write().expect("context lock poisoned"),
        }
    }

    /// Unwraps the lock, returning the owned context.
    pub fn into_inner(self) -> Context {
        self.inner.into_inner().expect("context lock poisoned")
    }
}

/// A read-only scope over a [`Context`].
pub struct ReadGuard<'a> {
    guard: RwLockReadGuard<'a, Context>,
}

impl std::ops::Deref for ReadGuard<'_> {
    type Target = Context;
    fn deref(&self) -> &Context {
        &self.guard
    }
}

/// A read-write scope over a [`Context`].
pub struct WriteGuard<'a> {
    guard: RwLockWriteGuard<'a, Context>,
}

impl std::ops::Deref for WriteGuard<'_> {
    type Target = Context;
    fn deref(&self) -> &Context {
        &self.guard
    }
}

impl std::ops::DerefMut for WriteGuard<'_> {
    fn deref_mut(&mut self) -> &mut Context {
        &mut self.guard
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PnrNetlist;
    use crate::ids::PnrCellId;
    use crate::strength::Strength;
    use aion_arch::ids::SiteId;

    #[test]
    fn read_scope_sees_committed_writes() {
        let lock = ScopeLock::new(Context::new(PnrNetlist::new()));
        {
            let mut w = lock.write();
            w.netlist_mut().add_cell(crate::data::PnrCell {
                id: PnrCellId::from_raw(0),
                name: "c0".into(),
                cell_type: crate::data::PnrCellType::Dff,
                placement: None,
                is_fixed: false,
            });
        }
        let r = lock.read();
        assert_eq!(r.netlist().cell_count(), 1);
    }

    #[test]
    fn write_scope_can_bind_and_read_scope_observes_it() {
        let mut ctx = Context::new(PnrNetlist::new());
        ctx.netlist_mut().add_cell(crate::data::PnrCell {
            id: PnrCellId::from_raw(0),
            name: "c0".into(),
            cell_type: crate::data::PnrCellType::Dff,
            placement: None,
            is_fixed: false,
        });
        let lock = ScopeLock::new(ctx);
        let bel = SiteId::from_raw(1);
        lock.write()
            .bind_bel(PnrCellId::from_raw(0), bel, Strength::Weak)
            .unwrap();

        assert_eq!(
            lock.read().bel_occupant(bel),
            Some((PnrCellId::from_raw(0), Strength::Weak))
        );
    }

    #[test]
    fn into_inner_returns_owned_context() {
        let lock = ScopeLock::new(Context::new(PnrNetlist::new()));
        let ctx = lock.into_inner();
        assert_eq!(ctx.netlist().cell_count(), 0);
    }
}
