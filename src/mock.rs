//! Test doubles for the collaborator contracts, the id source and the clock.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::clients::{AccountLookup, CatalogLookup, CollaboratorError};
use crate::models::{Account, Product};
use crate::utils::{Clock, IdGenerator};

#[derive(Default)]
pub struct MockAccounts {
    accounts: HashMap<String, Account>,
    failure: Option<CollaboratorError>,
    calls: AtomicUsize,
}

impl MockAccounts {
    pub fn with_account(mut self, id: &str) -> Self {
        self.accounts.insert(
            id.to_string(),
            Account {
                id: id.to_string(),
                name: format!("account {id}"),
            },
        );
        self
    }

    pub fn failing(mut self, err: CollaboratorError) -> Self {
        self.failure = Some(err);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AccountLookup for MockAccounts {
    async fn get_account(&self, id: &str) -> Result<Account, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        self.accounts
            .get(id)
            .cloned()
            .ok_or_else(|| CollaboratorError::NotFound(id.to_string()))
    }
}

/// Catalog that counts batch calls and records the ids of each call.
#[derive(Default)]
pub struct MockCatalog {
    products: Vec<Product>,
    failure: Option<CollaboratorError>,
    ignore_filter: bool,
    requests: Mutex<Vec<BTreeSet<String>>>,
}

impl MockCatalog {
    pub fn with_product(mut self, id: &str, price: f64) -> Self {
        self.products.push(Product {
            id: id.to_string(),
            name: format!("{id} name"),
            description: format!("{id} description"),
            price,
        });
        self
    }

    /// Return the whole catalog regardless of the requested ids.
    pub fn ignoring_filter(mut self) -> Self {
        self.ignore_filter = true;
        self
    }

    pub fn failing(mut self, err: CollaboratorError) -> Self {
        self.failure = Some(err);
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<BTreeSet<String>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogLookup for MockCatalog {
    async fn get_products(&self, ids: &BTreeSet<String>) -> Result<Vec<Product>, CollaboratorError> {
        self.requests.lock().unwrap().push(ids.clone());

        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        Ok(self
            .products
            .iter()
            .filter(|p| self.ignore_filter || ids.contains(&p.id))
            .cloned()
            .collect())
    }
}

/// Hands out `O1`, `O2`, ... in order.
#[derive(Default)]
pub struct SequentialIds {
    next: AtomicUsize,
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        format!("O{}", self.next.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

pub struct FixedClock(pub DateTime<Utc>);

impl Default for FixedClock {
    fn default() -> Self {
        Self(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
