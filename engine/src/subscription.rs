use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use host::{FetcherResponse, Request};

use crate::error::RouterError;
use crate::router::ResultsTable;

pub type SubscriptionId = u32;

/// `url [+ env_suffix]` as a real composite key (a REDESIGN FLAGS note in
/// the source spec calls out the alternative — string concatenation — as
/// the thing to avoid), rather than the two fields glued together by the
/// caller each time they need to compare fingerprints.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    url: String,
    env_suffix: Option<String>,
}

impl Fingerprint {
    pub fn new(url: impl Into<String>, env_suffix: Option<String>) -> Self {
        Self { url: url.into(), env_suffix }
    }

    pub fn from_request(req: &Request) -> Self { Self::new(req.url.clone(), req.env_suffix.clone()) }

    pub fn from_fetcher_response(fr: &FetcherResponse) -> Self {
        Self::new(fr.url.clone(), fr.env_suffix.clone())
    }

    fn as_display(&self) -> String {
        match &self.env_suffix {
            Some(suffix) => format!("{}:{}", self.url, suffix),
            None => self.url.clone(),
        }
    }
}

type DeliverFn = Rc<dyn Fn(&mut ResultsTable, &str) -> Result<bool, RouterError>>;

struct SubscriptionEntry {
    id: SubscriptionId,
    deliver: DeliverFn,
}

/// One strategy's subscription table (spec.md §4.D + part of §4.C).
/// Insertion order is preserved in `order` (a `Vec`, not a
/// `HashMap`-only table) so identifier assignment stays deterministic
/// without needing an indexed-map crate outside this workspace's
/// dependency set.
#[derive(Default)]
pub struct Subscriptions {
    order: Vec<Fingerprint>,
    index: HashMap<Fingerprint, SubscriptionEntry>,
    next_id: SubscriptionId,
}

impl Subscriptions {
    /// Idempotent: a fingerprint already registered returns its existing
    /// id without creating a second entry.
    pub fn register<T>(
        &mut self,
        fingerprint: Fingerprint,
        parse: impl Fn(&str) -> anyhow::Result<T> + 'static,
    ) -> SubscriptionId
    where
        T: PartialEq + 'static,
    {
        if let Some(existing) = self.index.get(&fingerprint) {
            return existing.id;
        }
        self.next_id += 1;
        let id = self.next_id;
        let display = fingerprint.as_display();
        let deliver: DeliverFn = Rc::new(move |results, payload| {
            let parsed = parse(payload).map_err(|source| RouterError::ParseFailure {
                fingerprint: display.clone(),
                source,
            })?;
            let changed = match results.get::<T>(id) {
                Some(old) if *old == parsed => false,
                _ => {
                    results.set(id, parsed);
                    true
                }
            };
            Ok(changed)
        });
        self.order.push(fingerprint.clone());
        self.index.insert(fingerprint, SubscriptionEntry { id, deliver });
        id
    }

    pub fn contains(&self, fingerprint: &Fingerprint) -> bool { self.index.contains_key(fingerprint) }

    pub fn deliver(&self, fingerprint: &Fingerprint, results: &mut ResultsTable, payload: &str) -> Option<Result<bool, RouterError>> {
        self.index.get(fingerprint).map(|entry| (entry.deliver)(results, payload))
    }

    pub fn id_of(&self, fingerprint: &Fingerprint) -> Option<SubscriptionId> {
        self.index.get(fingerprint).map(|e| e.id)
    }

    pub fn ids(&self) -> impl Iterator<Item = SubscriptionId> + '_ {
        self.order.iter().map(|fp| self.index[fp].id)
    }

    pub fn fingerprints(&self) -> HashSet<Fingerprint> { self.order.iter().cloned().collect() }
}

/// Typed handle to one subscription's last-parsed value, returned from
/// `StrategyCtx::register` and consulted from inside the `on` callback via
/// [`Extractor::get`].
pub struct Extractor<T> {
    id: SubscriptionId,
    _marker: std::marker::PhantomData<T>,
}

impl<T> Clone for Extractor<T> {
    fn clone(&self) -> Self { Self { id: self.id, _marker: std::marker::PhantomData } }
}

impl<T: 'static> Extractor<T> {
    pub(crate) fn new(id: SubscriptionId) -> Self { Self { id, _marker: std::marker::PhantomData } }

    pub fn id(&self) -> SubscriptionId { self.id }

    pub fn get(&self, results: &ResultsTable) -> Option<Rc<T>> { results.get::<T>(self.id) }
}
