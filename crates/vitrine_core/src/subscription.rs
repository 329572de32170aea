//! Cancellation handles
//!
//! Every listener, timer and interval registered through this crate hands
//! back a [`Subscription`]. Dropping it (or calling [`Subscription::cancel`])
//! unregisters the callback. Components collect their handles in a
//! [`SubscriptionSet`] and dispose of them together at teardown.

use smallvec::SmallVec;
use std::fmt;

type CancelFn = Box<dyn FnOnce() + Send>;

/// Owned registration of a callback; cancels on drop
#[must_use = "dropping a Subscription cancels it immediately"]
pub struct Subscription {
    cancel: Option<CancelFn>,
}

impl Subscription {
    /// Create a subscription that runs `cancel` exactly once
    pub fn new<F: FnOnce() + Send + 'static>(cancel: F) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription with nothing to cancel
    pub fn empty() -> Self {
        Self { cancel: None }
    }

    /// Cancel now
    pub fn cancel(mut self) {
        self.run_cancel();
    }

    /// Whether cancellation is still outstanding
    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }

    /// Keep the registration alive for the rest of the program
    pub fn detach(mut self) {
        self.cancel = None;
    }

    fn run_cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_cancel();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

/// A bag of subscriptions disposed together
#[derive(Default, Debug)]
pub struct SubscriptionSet {
    subscriptions: SmallVec<[Subscription; 4]>,
}

impl SubscriptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, subscription: Subscription) {
        self.subscriptions.push(subscription);
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Cancel every held subscription, in registration order
    pub fn dispose(&mut self) {
        for subscription in self.subscriptions.drain(..) {
            subscription.cancel();
        }
    }
}

impl Extend<Subscription> for SubscriptionSet {
    fn extend<I: IntoIterator<Item = Subscription>>(&mut self, iter: I) {
        self.subscriptions.extend(iter);
    }
}
