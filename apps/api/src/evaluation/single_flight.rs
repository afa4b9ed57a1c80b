//! Single-flight gate: identical concurrent requests share one pipeline run.
//!
//! The first caller for a key runs the work; callers arriving while it is in
//! flight await the same result. The key is released as soon as the flight
//! lands, so a later identical request runs fresh. If the running caller is
//! dropped mid-flight, a waiting caller takes over the work; if nobody is
//! waiting, the abandoned key is released with it.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OnceCell;
use tracing::debug;

use crate::errors::AppError;

type Flight<T> = Arc<OnceCell<Result<T, AppError>>>;

struct Entry<T> {
    flight: Flight<T>,
    /// Callers currently awaiting this flight, leader included.
    waiters: usize,
}

pub struct SingleFlight<T> {
    pipeline: &'static str,
    flights: Mutex<HashMap<String, Entry<T>>>,
}

impl<T: Clone + Send + Sync> SingleFlight<T> {
    pub fn new(pipeline: &'static str) -> Self {
        Self {
            pipeline,
            flights: Mutex::new(HashMap::new()),
        }
    }

    pub async fn run<F, Fut>(&self, key: String, work: F) -> Result<T, AppError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        let flight = {
            let mut flights = self.flights.lock().unwrap_or_else(PoisonError::into_inner);
            match flights.get_mut(&key) {
                Some(entry) => {
                    debug!(
                        "Joining in-flight {} request {}",
                        self.pipeline,
                        short_key(&key)
                    );
                    entry.waiters += 1;
                    entry.flight.clone()
                }
                None => {
                    let flight: Flight<T> = Arc::new(OnceCell::new());
                    flights.insert(
                        key.clone(),
                        Entry {
                            flight: flight.clone(),
                            waiters: 1,
                        },
                    );
                    flight
                }
            }
        };

        let guard = FlightGuard {
            gate: self,
            key,
            flight: flight.clone(),
        };
        let result = flight.get_or_init(work).await.clone();
        drop(guard);
        result
    }

    #[cfg(test)]
    pub fn in_flight(&self) -> usize {
        self.flights
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

fn short_key(key: &str) -> &str {
    key.get(..12).unwrap_or(key)
}

/// Drops one caller's hold on a flight, whether it landed or the caller was
/// cancelled mid-await. The key goes once the flight has landed or nobody is
/// left waiting on it.
struct FlightGuard<'a, T> {
    gate: &'a SingleFlight<T>,
    key: String,
    flight: Flight<T>,
}

impl<T> Drop for FlightGuard<'_, T> {
    fn drop(&mut self) {
        let mut flights = self
            .gate
            .flights
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let Some(entry) = flights.get_mut(&self.key) else {
            return;
        };
        if !Arc::ptr_eq(&entry.flight, &self.flight) {
            return;
        }

        entry.waiters = entry.waiters.saturating_sub(1);
        if self.flight.initialized() {
            flights.remove(&self.key);
        } else if entry.waiters == 0 {
            debug!(
                "Releasing abandoned {} request {}",
                self.gate.pipeline,
                short_key(&self.key)
            );
            flights.remove(&self.key);
        }
    }
}
