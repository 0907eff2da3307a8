//! Derived streams over the change bus
//!
//! Every stream subscribes to the bus before its first read, then emits the
//! current state followed by one item per relevant change. A change that
//! lands between the subscription and the first read is therefore seen
//! twice rather than missed.
//!
//! Streams hold the orchestrator weakly. Once every [`Stowage`] clone is
//! dropped they drain and end.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Weak};

use futures_util::stream::{self, BoxStream, StreamExt};

use super::errors::StowageResult;
use super::lookup::Lookup;
use super::stowage::{Inner, StoredValue, Stowage};
use crate::bus::KeyChanges;
use crate::codec::Codec;

/// What woke a stream up
enum Trigger {
    /// First poll after subscribing
    Initial,
    /// A change to this key
    Changed(String),
}

struct Watch<C> {
    inner: Weak<Inner<C>>,
    changes: KeyChanges,
    started: bool,
}

impl<C: Codec> Watch<C> {
    fn new(stowage: &Stowage<C>) -> Self {
        Self {
            changes: stowage.inner.bus.subscribe(),
            inner: Arc::downgrade(&stowage.inner),
            started: false,
        }
    }

    /// Wait for the next trigger whose key passes `filter`. `None` once the
    /// orchestrator is gone.
    async fn next(&mut self, filter: impl Fn(&str) -> bool) -> Option<(Trigger, Arc<Inner<C>>)> {
        let trigger = if self.started {
            loop {
                let changed = self.changes.recv().await?;
                if filter(changed.as_str()) {
                    break Trigger::Changed(changed);
                }
            }
        } else {
            self.started = true;
            Trigger::Initial
        };
        Some((trigger, self.inner.upgrade()?))
    }
}

impl<C: Codec> Stowage<C> {
    /// Current value of `key`, then its value after every change to it
    ///
    /// Read failures are yielded as items; the stream continues after them.
    pub fn stream<T: StoredValue>(
        &self,
        key: impl Into<String>,
    ) -> BoxStream<'static, StowageResult<Lookup<T>>> {
        let key = key.into();
        stream::unfold(Watch::new(self), move |mut watch| {
            let key = key.clone();
            async move {
                let (_, inner) = watch.next(|changed| changed == key).await?;
                let item = inner
                    .spawn(move |inner| inner.get_blocking::<T>(&key).map(Lookup::from))
                    .await;
                Some((item, watch))
            }
        })
        .boxed()
    }

    /// Every entry that reads as a `T`, then each key again whenever it
    /// changes
    ///
    /// A change emits [`Lookup::Absent`] when the key no longer has an
    /// entry, so removals reach the subscriber. Changed entries of other
    /// types and read failures produce no item.
    pub fn stream_entries<T: StoredValue>(&self) -> BoxStream<'static, (String, Lookup<T>)> {
        let state = (Watch::new(self), VecDeque::<(String, Lookup<T>)>::new());
        stream::unfold(state, |(mut watch, mut pending)| async move {
            loop {
                if let Some(entry) = pending.pop_front() {
                    return Some((entry, (watch, pending)));
                }

                let (trigger, inner) = watch.next(|_| true).await?;
                match trigger {
                    Trigger::Initial => {
                        if let Ok(entries) = inner.spawn(|inner| inner.get_all_blocking::<T>()).await {
                            pending.extend(
                                entries
                                    .into_iter()
                                    .map(|(key, value)| (key, Lookup::Present(value))),
                            );
                        }
                    }
                    Trigger::Changed(key) => {
                        let read = {
                            let key = key.clone();
                            inner.spawn(move |inner| {
                                let read = inner.get_blocking::<T>(&key);
                                if let Err(e) = &read {
                                    inner.skip_entry(&key, e);
                                }
                                read
                            })
                        };
                        if let Ok(value) = read.await {
                            pending.push_back((key, Lookup::from(value)));
                        }
                    }
                }
            }
        })
        .boxed()
    }

    /// Every entry that reads as a `T`, emitted as a whole map now and again
    /// after every change to any key
    pub fn watch_all<T: StoredValue>(&self) -> BoxStream<'static, StowageResult<BTreeMap<String, T>>> {
        stream::unfold(Watch::new(self), |mut watch| async move {
            let (_, inner) = watch.next(|_| true).await?;
            let item = inner.spawn(|inner| inner.get_all_blocking::<T>()).await;
            Some((item, watch))
        })
        .boxed()
    }
}
