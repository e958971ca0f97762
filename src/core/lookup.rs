//! Product catalog lookup.
//!
//! The [`ProductCatalog`] trait is the seam between the cart and the outside
//! world. [`OpenFoodFacts`] is the default catalog; [`OfflineCatalog`] fails
//! every request so rows wait for a manual price. [`LookupWorkers`] runs
//! catalog requests off the session thread and posts the answers back.

use crate::core::cart::LookupResult;
use crate::core::config::LookupConfig;
use crate::core::error::{BarcoError, Result};
use crate::core::state::Product;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub trait ProductCatalog: Send + Sync {
    /// `Ok(None)` means the catalog answered but does not know the barcode
    fn lookup(&self, barcode: &str) -> Result<Option<Product>>;
}

/// Open Food Facts v0 product API
pub struct OpenFoodFacts {
    client: reqwest::blocking::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ProductResponse {
    #[serde(default)]
    status: i64,
    product: Option<ProductFields>,
}

#[derive(Debug, Deserialize)]
struct ProductFields {
    product_name: Option<String>,
    image_url: Option<String>,
    stores_mrp: Option<serde_json::Value>,
}

impl OpenFoodFacts {
    pub fn new(config: &LookupConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn product_url(&self, barcode: &str) -> String {
        format!("{}/api/v0/product/{barcode}.json", self.base_url)
    }
}

impl ProductCatalog for OpenFoodFacts {
    fn lookup(&self, barcode: &str) -> Result<Option<Product>> {
        let url = self.product_url(barcode);
        log::debug!("GET {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| BarcoError::lookup_failed(barcode, e.to_string()))?;

        // The API answers unknown barcodes with 404 and a status 0 body
        let status = response.status();
        if !status.is_success() && status != reqwest::StatusCode::NOT_FOUND {
            return Err(BarcoError::lookup_failed(
                barcode,
                format!("catalog returned HTTP {status}"),
            ));
        }

        let body = response
            .text()
            .map_err(|e| BarcoError::lookup_failed(barcode, e.to_string()))?;
        parse_product_response(barcode, &body)
    }
}

/// Decode an Open Food Facts product body
pub fn parse_product_response(barcode: &str, body: &str) -> Result<Option<Product>> {
    let response: ProductResponse = serde_json::from_str(body)
        .map_err(|e| BarcoError::lookup_failed(barcode, format!("malformed response: {e}")))?;

    if response.status != 1 {
        return Ok(None);
    }

    let fields = response.product.ok_or_else(|| {
        BarcoError::lookup_failed(barcode, "response has status 1 but no product")
    })?;

    Ok(Some(Product {
        name: fields.product_name,
        image_url: fields.image_url,
        price: fields.stores_mrp.as_ref().and_then(parse_catalog_price),
    }))
}

fn parse_catalog_price(value: &serde_json::Value) -> Option<Decimal> {
    let price = match value {
        serde_json::Value::Number(number) => Decimal::from_str(&number.to_string()).ok(),
        serde_json::Value::String(text) => Decimal::from_str(text.trim()).ok(),
        _ => None,
    }?;
    (!price.is_sign_negative()).then_some(price)
}

/// Catalog used with `--offline`: every lookup fails
pub struct OfflineCatalog;

impl ProductCatalog for OfflineCatalog {
    fn lookup(&self, barcode: &str) -> Result<Option<Product>> {
        Err(BarcoError::lookup_failed(barcode, "lookups disabled (offline)"))
    }
}

/// A finished lookup, ready to hand to the cart
#[derive(Debug, Clone, PartialEq)]
pub struct LookupCompletion {
    pub barcode: String,
    pub result: LookupResult,
}

/// Fixed pool of threads running catalog lookups
///
/// Barcodes arrive through the [`Sender`] returned by [`LookupWorkers::spawn`]
/// (which is also the cart's dispatcher). Results are mapped with `wrap` and
/// sent to `results`. Dropping every request sender stops the pool once the
/// queued lookups are done; results for a finished session are dropped.
pub struct LookupWorkers {
    handles: Vec<JoinHandle<()>>,
}

impl LookupWorkers {
    pub fn spawn<E, F>(
        catalog: Arc<dyn ProductCatalog>,
        workers: usize,
        results: Sender<E>,
        wrap: F,
    ) -> (Self, Sender<String>)
    where
        E: Send + 'static,
        F: Fn(LookupCompletion) -> E + Send + Sync + 'static,
    {
        let (requests, queue) = channel::<String>();
        let queue = Arc::new(Mutex::new(queue));
        let wrap = Arc::new(wrap);

        let handles = (0..workers.max(1))
            .map(|n| {
                let catalog = Arc::clone(&catalog);
                let queue = Arc::clone(&queue);
                let results = results.clone();
                let wrap = Arc::clone(&wrap);
                thread::Builder::new()
                    .name(format!("lookup-{n}"))
                    .spawn(move || run_worker(catalog.as_ref(), &queue, |completion| {
                        results.send(wrap(completion)).is_ok()
                    }))
            })
            .filter_map(|spawned| match spawned {
                Ok(handle) => Some(handle),
                Err(e) => {
                    log::warn!("Could not start lookup worker: {e}");
                    None
                }
            })
            .collect();

        (Self { handles }, requests)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

fn run_worker(
    catalog: &dyn ProductCatalog,
    queue: &Mutex<Receiver<String>>,
    mut deliver: impl FnMut(LookupCompletion) -> bool,
) {
    loop {
        let next = match queue.lock() {
            Ok(receiver) => receiver.recv(),
            Err(_) => return,
        };
        let Ok(barcode) = next else {
            return;
        };

        let result = LookupResult::from(catalog.lookup(&barcode));
        if !deliver(LookupCompletion { barcode, result }) {
            log::debug!("Session ended, dropping lookup result");
            return;
        }
    }
}

/// One-shot blocking lookup for the `lookup` command
pub fn lookup_once(catalog: &dyn ProductCatalog, barcode: &str) -> Result<Product> {
    catalog
        .lookup(barcode)?
        .ok_or_else(|| BarcoError::product_not_found(barcode))
}
