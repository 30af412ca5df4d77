//! # Network Discovery
//!
//! Finds the live hosts of a range and attaches what the local system knows about
//! them (hostname, MAC address, vendor).
//!
//! [`discover`] is the bounded fan-out over the address iterator. [`DiscoveryService`]
//! wraps it with the enrichment collaborators.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};
use vigil_common::config::ScanConfig;
use vigil_common::network::host::Host;
use vigil_common::network::range::IpRange;

use crate::liveness::{HybridProbe, LivenessProbe, SystemPing};
use crate::neighbors::{ArpCache, NeighborTable};
use crate::resolver::{DnsPtrResolver, HostnameResolver};
use crate::vendors::{MacOuiRepo, VendorRepository};

/// Receives the running number of live hosts, once per host found.
pub type HostCallback = Box<dyn Fn(usize) + Send + Sync>;

const LOOKUP_TIMEOUT: Duration = Duration::from_secs(1);

/// Probes every address of `range` with at most `concurrency` probes in flight.
///
/// A permit is taken before a task is spawned, so the cap bounds spawned work and not
/// only running work. Every task is awaited before returning. Result order follows
/// completion, not the range.
pub async fn discover(
    range: &IpRange,
    probe: Arc<dyn LivenessProbe>,
    concurrency: usize,
    on_host_found: Option<HostCallback>,
) -> Vec<Host> {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let hosts: Arc<Mutex<Vec<Host>>> = Arc::new(Mutex::new(Vec::new()));
    let found = Arc::new(AtomicUsize::new(0));
    let callback: Option<Arc<dyn Fn(usize) + Send + Sync>> = on_host_found.map(Arc::from);
    let mut tasks: JoinSet<()> = JoinSet::new();

    for ip in range.iter() {
        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            break;
        };

        let probe = probe.clone();
        let hosts = hosts.clone();
        let found = found.clone();
        let callback = callback.clone();

        tasks.spawn(async move {
            let _permit = permit;
            let verdict = probe.probe(ip).await;
            if !verdict.alive {
                return;
            }

            let host = Host::new(ip).with_latency(verdict.latency);
            hosts
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(host);

            let count = found.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(cb) = &callback {
                cb(count);
            }
        });

        // keep the set small on large ranges
        while let Some(result) = tasks.try_join_next() {
            log_join_error(result);
        }
    }

    while let Some(result) = tasks.join_next().await {
        log_join_error(result);
    }

    let mut guard = hosts.lock().unwrap_or_else(PoisonError::into_inner);
    std::mem::take(&mut *guard)
}

fn log_join_error(result: Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        warn!("Discovery worker failed: {e}");
    }
}

/// Discovery followed by enrichment.
///
/// The collaborators are trait objects so tests and other front ends can swap in
/// their own sources.
pub struct DiscoveryService {
    probe: Arc<dyn LivenessProbe>,
    concurrency: usize,
    resolver: Option<Arc<dyn HostnameResolver>>,
    neighbors: Arc<dyn NeighborTable>,
    vendor_repo: Box<dyn VendorRepository>,
}

impl DiscoveryService {
    pub fn new(
        probe: Arc<dyn LivenessProbe>,
        concurrency: usize,
        neighbors: Arc<dyn NeighborTable>,
        vendor_repo: Box<dyn VendorRepository>,
    ) -> Self {
        Self {
            probe,
            concurrency,
            resolver: None,
            neighbors,
            vendor_repo,
        }
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn HostnameResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// The production wiring: TCP/ping liveness, the ARP cache, the bundled OUI
    /// database and, unless disabled, PTR lookups against the system resolver.
    pub fn from_config(cfg: &ScanConfig) -> Self {
        let probe = HybridProbe::new(
            cfg.liveness_port,
            cfg.liveness_timeout,
            Box::new(SystemPing::new(cfg.echo_timeout)),
        );
        let service = Self::new(
            Arc::new(probe),
            cfg.discovery_concurrency,
            Arc::new(ArpCache::new(LOOKUP_TIMEOUT)),
            Box::new(MacOuiRepo),
        );

        if cfg.no_dns {
            service
        } else {
            service.with_resolver(Arc::new(DnsPtrResolver::from_system(LOOKUP_TIMEOUT)))
        }
    }

    /// Finds the live hosts of `range` and enriches them.
    pub async fn perform_discovery(
        &self,
        range: &IpRange,
        on_host_found: Option<HostCallback>,
    ) -> Vec<Host> {
        let hosts = discover(range, self.probe.clone(), self.concurrency, on_host_found).await;
        debug!("{} live host(s), enriching", hosts.len());

        let mut hosts = self.enrich_network_details(hosts).await;
        self.enrich_vendors(&mut hosts);
        hosts
    }

    /// MAC and hostname lookups, all hosts at once under the discovery cap.
    async fn enrich_network_details(&self, hosts: Vec<Host>) -> Vec<Host> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency.max(1)));
        let mut tasks: JoinSet<Host> = JoinSet::new();

        for mut host in hosts {
            let Ok(permit) = semaphore.clone().acquire_owned().await else {
                break;
            };
            let neighbors = self.neighbors.clone();
            let resolver = self.resolver.clone();

            tasks.spawn(async move {
                let _permit = permit;
                host.mac = neighbors.lookup(host.ip).await;
                if let Some(resolver) = resolver {
                    host.hostname = resolver.resolve(host.ip).await;
                }
                host
            });
        }

        let mut enriched = Vec::with_capacity(tasks.len());
        while let Some(result) = tasks.join_next().await {
            match result {
                Ok(host) => enriched.push(host),
                Err(e) => warn!("Enrichment worker failed: {e}"),
            }
        }
        enriched
    }

    fn enrich_vendors(&self, hosts: &mut [Host]) {
        for host in hosts.iter_mut() {
            if let Some(mac) = host.mac {
                host.vendor = self.vendor_repo.get_vendor(mac);
            }
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
