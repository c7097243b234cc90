//! Per-key de-duplication of concurrent async work.

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

struct Flight<T> {
    id: u64,
    future: Shared<BoxFuture<'static, T>>,
    waiters: usize,
}

type FlightMap<K, T> = Arc<Mutex<HashMap<K, Flight<T>>>>;

/// Concurrent `run` calls for the same key share a single execution of the
/// work and all receive a clone of its output.
///
/// Nothing is memoized: the entry for a key is released as soon as its work
/// completes, so the next call starts a new execution. Callers may be dropped
/// at any point; the work keeps running while at least one caller is still
/// attached and is abandoned once none is left.
pub struct SingleFlight<K, T>
where
    K: Eq + Hash,
    T: Clone,
{
    in_flight: FlightMap<K, T>,
    next_id: AtomicU64,
}

impl<K, T> Default for SingleFlight<K, T>
where
    K: Eq + Hash,
    T: Clone,
{
    fn default() -> Self {
        Self {
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(0),
        }
    }
}

impl<K, T> SingleFlight<K, T>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn run<F, Fut>(&self, key: K, work: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        let (future, _waiter) = {
            let mut in_flight = self.in_flight.lock();
            let flight = in_flight.entry(key.clone()).or_insert_with(|| {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                let map = Arc::clone(&self.in_flight);
                let finished_key = key.clone();
                let work = work();

                let future = async move {
                    let output = work.await;
                    remove_flight(&map, &finished_key, id);
                    output
                }
                .boxed()
                .shared();

                Flight {
                    id,
                    future,
                    waiters: 0,
                }
            });

            flight.waiters += 1;
            let waiter = Waiter {
                in_flight: &self.in_flight,
                key,
                id: flight.id,
            };
            (flight.future.clone(), waiter)
        };

        future.await
    }

    /// Number of keys with work currently in progress.
    #[must_use]
    pub fn len(&self) -> usize {
        self.in_flight.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.in_flight.lock().is_empty()
    }
}

fn remove_flight<K: Eq + Hash, T>(map: &Mutex<HashMap<K, Flight<T>>>, key: &K, id: u64) {
    let mut in_flight = map.lock();
    if in_flight.get(key).is_some_and(|flight| flight.id == id) {
        in_flight.remove(key);
    }
}

/// Detaches one caller from a flight; the last caller out releases the key.
struct Waiter<'a, K, T>
where
    K: Eq + Hash,
{
    in_flight: &'a Mutex<HashMap<K, Flight<T>>>,
    key: K,
    id: u64,
}

impl<K, T> Drop for Waiter<'_, K, T>
where
    K: Eq + Hash,
{
    fn drop(&mut self) {
        let mut in_flight = self.in_flight.lock();
        let abandoned = match in_flight.get_mut(&self.key) {
            Some(flight) if flight.id == self.id => {
                flight.waiters = flight.waiters.saturating_sub(1);
                flight.waiters == 0
            }
            _ => false,
        };

        if abandoned {
            in_flight.remove(&self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    #[tokio::test]
    async fn concurrent_callers_share_one_run() {
        let flights = SingleFlight::<String, usize>::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Notify::new());

        let runs = (0..5).map(|_| {
            let calls = calls.clone();
            let gate = gate.clone();
            flights.run("seattle".to_string(), move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                gate.notified().await;
                42
            })
        });

        let (results, ()) = tokio::join!(futures::future::join_all(runs), async {
            tokio::task::yield_now().await;
            gate.notify_one();
        });

        assert_eq!(results, vec![42; 5]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(flights.is_empty());
    }

    #[tokio::test]
    async fn different_keys_run_independently() {
        let flights = SingleFlight::<&'static str, &'static str>::new();

        let (a, b) = tokio::join!(
            flights.run("a", || async { "first" }),
            flights.run("b", || async { "second" })
        );

        assert_eq!((a, b), ("first", "second"));
    }

    #[tokio::test]
    async fn completed_work_is_not_memoized() {
        let flights = SingleFlight::<u8, usize>::new();
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let calls = calls.clone();
            flights
                .run(1, move || async move { calls.fetch_add(1, Ordering::SeqCst) })
                .await;
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(flights.len(), 0);
    }

    #[tokio::test]
    async fn dropped_leader_releases_key() {
        let flights = SingleFlight::<u8, ()>::new();

        let outcome = tokio::time::timeout(
            Duration::from_millis(20),
            flights.run(7, || futures::future::pending()),
        )
        .await;

        assert!(outcome.is_err());
        assert!(flights.is_empty());
    }

    #[tokio::test]
    async fn aborted_leader_keeps_flight_for_followers() {
        let flights = Arc::new(SingleFlight::<u8, usize>::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let spawn_caller = |flights: Arc<SingleFlight<u8, usize>>, calls: Arc<AtomicUsize>| {
            tokio::spawn(async move {
                flights
                    .run(1, move || async move {
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        calls.fetch_add(1, Ordering::SeqCst) + 1
                    })
                    .await
            })
        };

        let leader = spawn_caller(flights.clone(), calls.clone());
        tokio::time::sleep(Duration::from_millis(10)).await;
        let follower = spawn_caller(flights.clone(), calls.clone());
        tokio::time::sleep(Duration::from_millis(10)).await;

        leader.abort();
        assert!(leader.await.unwrap_err().is_cancelled());
        assert_eq!(flights.len(), 1);

        let late = flights
            .run(1, || async { 99 })
            .await;

        assert_eq!(late, 1);
        assert_eq!(follower.await.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(flights.is_empty());
    }
}
