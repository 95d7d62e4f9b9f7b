//! Completion callbacks.
//!
//! The transport calls a [`PostCallback`] for every finished transaction,
//! possibly from interrupt context. [`CompletionHook`] is the one the
//! dispatcher installs: it raises the flush-ready signal for flush-tagged
//! transactions, clears the busy flag and then forwards the event to the
//! callback it was constructed with.
//!
//! The hook is `Sync` whenever its notifier is, so it can live in a
//! `static` shared with the interrupt or task that completes transactions.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::transaction::Transaction;

/// Low-level transaction completion callback.
///
/// Implementations run in the bus driver's completion context and must not
/// block or allocate.
pub trait PostCallback {
    fn post(&self, trans: &Transaction<'_>);
}

impl<F> PostCallback for F
where
    F: Fn(&Transaction<'_>),
{
    fn post(&self, trans: &Transaction<'_>) {
        self(trans)
    }
}

/// Graphics library side of the flush handshake.
pub trait FlushReady {
    /// The pixel buffer of the display being refreshed may be reused.
    fn flush_ready(&self);
}

impl<F> FlushReady for F
where
    F: Fn(),
{
    fn flush_ready(&self) {
        self()
    }
}

/// Completion hook installed on the display device.
pub struct CompletionHook<'d, F> {
    notifier: F,
    chained: Option<&'d (dyn PostCallback + Sync)>,
    busy: AtomicBool,
}

impl<'d, F> CompletionHook<'d, F>
where
    F: FlushReady,
{
    pub const fn new(notifier: F) -> Self {
        Self {
            notifier,
            chained: None,
            busy: AtomicBool::new(false),
        }
    }

    /// Like [`Self::new`], forwarding every completion to `post_cb` after
    /// the hook's own work. The device configuration handed to
    /// [`Builder`](crate::Builder) must carry the same `post_cb`.
    pub const fn chained(notifier: F, post_cb: &'d (dyn PostCallback + Sync)) -> Self {
        Self {
            notifier,
            chained: Some(post_cb),
            busy: AtomicBool::new(false),
        }
    }

    /// Returns `true` while a transaction is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Returns `true` if completions are forwarded to a chained callback.
    pub fn is_chained(&self) -> bool {
        self.chained.is_some()
    }

    pub(crate) fn chained_post_cb(&self) -> Option<&'d (dyn PostCallback + Sync)> {
        self.chained
    }

    /// Marks a transaction as handed to the transport.
    pub(crate) fn begin(&self) {
        self.busy.store(true, Ordering::Release);
    }

    /// Undoes [`Self::begin`] for a transaction the transport refused.
    pub(crate) fn abort(&self) {
        self.busy.store(false, Ordering::Release);
    }
}

impl<'d, F> PostCallback for CompletionHook<'d, F>
where
    F: FlushReady,
{
    fn post(&self, trans: &Transaction<'_>) {
        if trans.flags().signals_flush() {
            self.notifier.flush_ready();
        }

        self.busy.store(false, Ordering::Release);

        if let Some(chained) = self.chained {
            chained.post(trans);
        }
    }
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;
    use core::sync::atomic::{AtomicU8, AtomicUsize};

    use super::*;
    use crate::transaction::SendFlags;

    fn assert_sync<T: Sync>() {}

    #[test]
    fn hook_can_be_shared_with_completion_context() {
        assert_sync::<CompletionHook<'static, fn()>>();

        static FLUSHES: AtomicUsize = AtomicUsize::new(0);
        fn flushed() {
            FLUSHES.fetch_add(1, Ordering::Relaxed);
        }
        static HOOK: CompletionHook<'static, fn()> = CompletionHook::new(flushed as fn());

        HOOK.begin();
        std::thread::spawn(|| HOOK.post(&Transaction::inline(&[0], SendFlags::SIGNAL_FLUSH)))
            .join()
            .unwrap();
        assert!(!HOOK.is_busy());
        assert_eq!(FLUSHES.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn flush_tag_notifies() {
        let flushes = Cell::new(0);
        let hook = CompletionHook::new(|| flushes.set(flushes.get() + 1));

        hook.begin();
        hook.post(&Transaction::inline(&[0], SendFlags::SIGNAL_FLUSH));
        assert_eq!(flushes.get(), 1);
        assert!(!hook.is_busy());

        hook.post(&Transaction::inline(&[0], SendFlags::QUEUED));
        assert_eq!(flushes.get(), 1);
    }

    #[test]
    fn chained_callback_sees_every_completion() {
        let seen = AtomicUsize::new(0);
        let observer = |_: &Transaction<'_>| {
            seen.fetch_add(1, Ordering::Relaxed);
        };
        let hook = CompletionHook::chained(|| (), &observer);

        hook.post(&Transaction::inline(&[1], SendFlags::SIGNAL_FLUSH));
        hook.post(&Transaction::inline(&[2], SendFlags::POLLING));

        assert!(hook.is_chained());
        assert_eq!(seen.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn chained_callback_runs_after_flush() {
        let order = AtomicU8::new(0);
        let observer = |_: &Transaction<'_>| {
            assert_eq!(order.load(Ordering::Relaxed), 1);
            order.store(2, Ordering::Relaxed);
        };
        let hook = CompletionHook::chained(|| order.store(1, Ordering::Relaxed), &observer);

        hook.post(&Transaction::inline(&[], SendFlags::SIGNAL_FLUSH));
        assert_eq!(order.load(Ordering::Relaxed), 2);
    }
}
