use std::sync::Arc;

/// A read-only transaction context.
///
/// Holds the snapshot pinned at transaction start: every table and index
/// reached through [`schema`](ReadContext::schema) reflects the same logical
/// instant, no matter how many write transactions publish while the reader
/// is running.
pub struct ReadContext<S> {
    snapshot: Arc<S>,
}

impl<S> ReadContext<S> {
    pub(crate) fn new(snapshot: Arc<S>) -> Self {
        Self { snapshot }
    }

    /// The schema as of the pinned snapshot.
    pub fn schema(&self) -> &S {
        &self.snapshot
    }
}

/// A read-write transaction context over the writer's private working copy.
///
/// Nothing done through this context is observable until the transaction
/// callback returns `Ok` and the engine publishes the copy. There is no
/// rollback of individual operations: validate first, mutate last.
pub struct WriteContext<S> {
    working: S,
}

impl<S> WriteContext<S> {
    pub(crate) fn new(working: S) -> Self {
        Self { working }
    }

    /// The working copy, read-only.
    pub fn schema(&self) -> &S {
        &self.working
    }

    /// The working copy, for mutation through table handles.
    pub fn schema_mut(&mut self) -> &mut S {
        &mut self.working
    }

    pub(crate) fn into_inner(self) -> S {
        self.working
    }
}
