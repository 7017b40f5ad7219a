//! # Reference-counted item manager.
//!
//! [`RefCountedManager`] wraps any [`ItemManager`] so that overlapping owners
//! can request the same item. Items are compared with a caller-supplied
//! [`Equality`], e.g. [`equals`](crate::equals).
//!
//! ```text
//! add([a, b]):   forward [x for x in [a, b] if count(x) == 0]; count(a) += 1; count(b) += 1
//! remove([a]):   count(a) -= 1; count(a) == 0 ? forward [a] : skip
//! ```
//!
//! ## Rules
//! - The counter is seeded from `inner.items()` at construction.
//! - Items the decorator has never counted are not forwarded on remove.
//! - A failed forward does not stop the batch: every item is released and the
//!   first error is returned.
//! - `items()` passes through to the wrapped manager.

use crate::util::{Equality, ObjectRefCounter, RefCount};

use super::item::ItemManager;

/// [`ItemManager`] decorator that installs on 0→1 and uninstalls on 1→0.
pub struct RefCountedManager<T, M> {
    inner: M,
    counter: ObjectRefCounter<T>,
}

impl<T: Clone, M: ItemManager<T>> RefCountedManager<T, M> {
    /// Wraps `inner`, counting one owner per item it already manages.
    pub fn new(inner: M, equals: Equality<T>) -> Self {
        let mut counter = ObjectRefCounter::new(equals);
        for item in inner.items() {
            counter.add(&item);
        }
        Self { inner, counter }
    }

    /// Current number of owners of `item`.
    pub fn count(&self, item: &T) -> usize {
        self.counter.count(item)
    }

    /// The wrapped manager.
    pub fn inner(&self) -> &M {
        &self.inner
    }

    /// Mutable access to the wrapped manager, bypassing the counter.
    pub(crate) fn inner_mut(&mut self) -> &mut M {
        &mut self.inner
    }
}

impl<T: Clone, M: ItemManager<T>> ItemManager<T> for RefCountedManager<T, M> {
    type Error = M::Error;

    fn items(&self) -> Vec<T> {
        self.inner.items()
    }

    fn add(&mut self, items: &[T]) {
        if items.is_empty() {
            return;
        }
        let fresh: Vec<T> = items
            .iter()
            .filter(|item| self.counter.count(*item) == 0)
            .cloned()
            .collect();
        if !fresh.is_empty() {
            self.inner.add(&fresh);
        }
        for item in items {
            self.counter.add(item);
        }
        tracing::trace!(requested = items.len(), installed = fresh.len(), "items acquired");
    }

    fn remove(&mut self, items: &[T]) -> Result<(), Self::Error> {
        let mut first_err = None;
        for item in items {
            if self.counter.count(item) == 0 {
                continue;
            }
            self.counter.remove(item);
            if self.counter.count(item) == 0 {
                tracing::trace!("last owner released item");
                if let Err(e) = self.inner.remove(std::slice::from_ref(item)) {
                    first_err.get_or_insert(e);
                }
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::testing::MockScheduler;
    use crate::effects::{equals, EffectDescriptor, EffectFn, EffectManager, EffectRef};
    use crate::error::EffectError;
    use crate::events::Bus;
    use serde_json::{json, Value};
    use tokio_util::sync::CancellationToken;

    /// Plain list manager recording forwarded batches.
    #[derive(Default)]
    struct ListManager {
        items: Vec<u32>,
        adds: Vec<Vec<u32>>,
        removes: Vec<Vec<u32>>,
    }

    impl ItemManager<u32> for ListManager {
        type Error = std::convert::Infallible;

        fn items(&self) -> Vec<u32> {
            self.items.clone()
        }

        fn add(&mut self, items: &[u32]) {
            self.adds.push(items.to_vec());
            for i in items {
                if !self.items.contains(i) {
                    self.items.push(*i);
                }
            }
        }

        fn remove(&mut self, items: &[u32]) -> Result<(), Self::Error> {
            self.removes.push(items.to_vec());
            self.items.retain(|i| !items.contains(i));
            Ok(())
        }
    }

    fn same(a: &u32, b: &u32) -> bool {
        a == b
    }

    #[test]
    fn forwards_only_zero_count_items() {
        let mut rc = RefCountedManager::new(ListManager::default(), same);

        rc.add(&[1, 2]);
        rc.add(&[2, 3]);
        assert_eq!(rc.inner().adds, vec![vec![1, 2], vec![3]]);
        assert_eq!(rc.count(&2), 2);

        rc.remove(&[2]).unwrap();
        assert!(rc.inner().removes.is_empty());
        rc.remove(&[2, 1]).unwrap();
        assert_eq!(rc.inner().removes, vec![vec![2], vec![1]]);
        assert_eq!(rc.items(), vec![3]);
    }

    #[test]
    fn seeds_from_existing_items() {
        let inner = ListManager {
            items: vec![7],
            ..ListManager::default()
        };
        let mut rc = RefCountedManager::new(inner, same);
        assert_eq!(rc.count(&7), 1);

        rc.add(&[7]);
        assert!(rc.inner().adds.is_empty());

        rc.remove(&[7]).unwrap();
        rc.remove(&[7]).unwrap();
        rc.remove(&[7, 8]).unwrap();
        assert_eq!(rc.inner().removes, vec![vec![7]]);
    }

    fn routine(name: &'static str) -> EffectRef {
        EffectFn::arc(name, |ctx: CancellationToken, _arg: Option<Value>| async move {
            ctx.cancelled().await;
            Ok::<_, EffectError>(())
        })
    }

    #[test]
    fn shared_effect_starts_once_and_cancels_once() {
        let sched = MockScheduler::default();
        let mut rc = RefCountedManager::new(EffectManager::new(sched.clone(), Bus::new(16)), equals);
        let poll = routine("poll");

        // three owners, two of them build equal descriptors independently
        rc.add(&[EffectDescriptor::with_argument(poll.clone(), json!({"every": 5}))]);
        rc.add(&[EffectDescriptor::with_argument(poll.clone(), json!({"every": 5}))]);
        rc.add(&[
            EffectDescriptor::with_argument(poll.clone(), json!({"every": 5})),
            EffectDescriptor::with_argument(poll.clone(), json!({"every": 9})),
        ]);
        assert_eq!(sched.started(), 2);

        let five = EffectDescriptor::with_argument(poll.clone(), json!({"every": 5}));
        rc.remove(&[five.clone()]).unwrap();
        rc.remove(&[five.clone()]).unwrap();
        assert!(sched.cancelled().is_empty());

        rc.remove(&[five.clone()]).unwrap();
        assert_eq!(sched.cancelled(), vec!["poll".to_string()]);
        assert_eq!(rc.count(&five), 0);

        rc.remove(&[five]).unwrap();
        assert_eq!(sched.cancelled().len(), 1);
        assert_eq!(rc.items().len(), 1);
    }

    #[test]
    fn cancel_failure_reaches_the_caller() {
        let sched = MockScheduler {
            reject_cancel: true,
            ..MockScheduler::default()
        };
        let mut rc = RefCountedManager::new(EffectManager::new(sched, Bus::new(16)), equals);
        let d = EffectDescriptor::new(routine("leaky"));

        rc.add(&[d.clone()]);
        let err = rc.remove(&[d]).unwrap_err();
        assert!(matches!(err, EffectError::CancelRejected { .. }));
    }

    #[test]
    fn failed_release_does_not_strand_the_rest_of_the_batch() {
        let sched = MockScheduler {
            reject_named: Some("first"),
            ..MockScheduler::default()
        };
        let mut rc = RefCountedManager::new(EffectManager::new(sched.clone(), Bus::new(16)), equals);
        let first = EffectDescriptor::new(routine("first"));
        let second = EffectDescriptor::new(routine("second"));

        rc.add(&[first.clone(), second.clone()]);
        assert!(rc.remove(&[first.clone(), second.clone()]).is_err());

        assert_eq!(rc.count(&first), 0);
        assert_eq!(rc.count(&second), 0);
        assert_eq!(sched.cancelled(), vec!["second".to_string()]);
        assert!(rc.items().is_empty());
    }
}
