use std::collections::BTreeSet;
use std::time::Duration;

use tokio::sync::watch;

use joblens_common::FilterCriteria;

use crate::debounce::Debouncer;

/// Raw filter input plus its stabilized counterpart.
///
/// The three text fields debounce independently — a title keystroke never
/// delays a company update that has already quieted. Category preferences
/// apply immediately: they change by toggle, not by keystroke. The stabilized
/// snapshot is the only thing the query builder ever sees.
pub struct FilterState {
    title: Debouncer<String>,
    company: Debouncer<String>,
    search: Debouncer<String>,
    categories: watch::Sender<BTreeSet<String>>,
}

impl FilterState {
    pub fn new(debounce: Duration) -> Self {
        let (categories, _) = watch::channel(BTreeSet::new());
        Self {
            title: Debouncer::new(String::new(), debounce),
            company: Debouncer::new(String::new(), debounce),
            search: Debouncer::new(String::new(), debounce),
            categories,
        }
    }

    pub fn set_title(&self, value: impl Into<String>) {
        self.title.observe(value.into());
    }

    pub fn set_company(&self, value: impl Into<String>) {
        self.company.observe(value.into());
    }

    pub fn set_search(&self, value: impl Into<String>) {
        self.search.observe(value.into());
    }

    pub fn set_categories(&self, categories: BTreeSet<String>) {
        self.categories.send_replace(categories);
    }

    /// Current stabilized snapshot.
    pub fn stabilized(&self) -> FilterCriteria {
        FilterCriteria {
            title: self.title.stabilized(),
            company: self.company.stabilized(),
            search: self.search.stabilized(),
            categories: self.categories.borrow().clone(),
        }
    }

    pub fn subscribe(&self) -> FilterWatcher {
        FilterWatcher {
            title: self.title.subscribe(),
            company: self.company.subscribe(),
            search: self.search.subscribe(),
            categories: self.categories.subscribe(),
        }
    }
}

/// Receiving end of the stabilized filters, held by the driver loop.
pub struct FilterWatcher {
    title: watch::Receiver<String>,
    company: watch::Receiver<String>,
    search: watch::Receiver<String>,
    categories: watch::Receiver<BTreeSet<String>>,
}

impl FilterWatcher {
    /// Wait for any stabilized field to update and return the full snapshot.
    /// Returns `None` once the owning `FilterState` is gone — the signal for
    /// the driver loop to wind down.
    pub async fn changed(&mut self) -> Option<FilterCriteria> {
        tokio::select! {
            r = self.title.changed() => r.ok()?,
            r = self.company.changed() => r.ok()?,
            r = self.search.changed() => r.ok()?,
            r = self.categories.changed() => r.ok()?,
        }
        Some(self.snapshot())
    }

    pub fn snapshot(&self) -> FilterCriteria {
        FilterCriteria {
            title: self.title.borrow().clone(),
            company: self.company.borrow().clone(),
            search: self.search.borrow().clone(),
            categories: self.categories.borrow().clone(),
        }
    }
}
