// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Background execution of drift-simulation requests.
//!
//! The UI thread never blocks on the network: requests run on a tokio
//! runtime and completions come back over a channel drained once per frame
//! by [`SimulationRunner::poll`].
//!
//! Every request carries a monotonically increasing sequence number and
//! supersedes the ones before it. `poll` discards completions whose sequence
//! is not the latest issued, so a slow early response can never overwrite a
//! newer one.

use std::sync::mpsc::{channel, Receiver, Sender};

use drift_client::{DriftClient, DriftError, DriftPrediction, LatLon, SimulateRequest};
use log::{debug, info, warn};

struct Completed {
    seq: u64,
    result: Result<DriftPrediction, DriftError>,
}

/// Issues simulation requests and tracks the in-flight state.
pub struct SimulationRunner {
    runtime: tokio::runtime::Runtime,
    client: DriftClient,
    outcome_tx: Sender<Completed>,
    outcome_rx: Receiver<Completed>,
    next_seq: u64,
    latest_seq: Option<u64>,
    in_flight: bool,
}

impl std::fmt::Debug for SimulationRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationRunner")
            .field("latest_seq", &self.latest_seq)
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

impl SimulationRunner {
    pub fn new(client: DriftClient) -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;
        let (outcome_tx, outcome_rx) = channel();

        Ok(Self {
            runtime,
            client,
            outcome_tx,
            outcome_rx,
            next_seq: 0,
            latest_seq: None,
            in_flight: false,
        })
    }

    /// Whether the latest issued request has not completed yet. Drives the
    /// blocking "Running simulation..." overlay.
    #[must_use]
    pub fn is_simulating(&self) -> bool {
        self.in_flight
    }

    /// Issue a simulation request seeded with `seed`, superseding any
    /// request still in flight.
    pub fn request(&mut self, seed: LatLon, ctx: &egui::Context) {
        self.next_seq += 1;
        let seq = self.next_seq;
        self.latest_seq = Some(seq);
        self.in_flight = true;

        info!(
            "Issuing simulation request {seq} for ({:.5}, {:.5})",
            seed.lat, seed.lon
        );

        let client = self.client.clone();
        let tx = self.outcome_tx.clone();
        let ctx = ctx.clone();

        self.runtime.spawn(async move {
            let result = client.simulate(&SimulateRequest::for_target(seed)).await;
            if tx.send(Completed { seq, result }).is_ok() {
                ctx.request_repaint();
            }
        });
    }

    /// Drain completed requests. Returns the result of the latest issued
    /// request if it completed since the last call; superseded completions
    /// are discarded.
    pub fn poll(&mut self) -> Option<Result<DriftPrediction, DriftError>> {
        while let Ok(done) = self.outcome_rx.try_recv() {
            if Some(done.seq) != self.latest_seq {
                debug!("Discarding superseded simulation result (request {})", done.seq);
                continue;
            }
            self.in_flight = false;
            return Some(done.result);
        }
        None
    }

    /// Probe the backend health endpoint once, logging the outcome.
    pub fn probe_health(&self) {
        let client = self.client.clone();
        self.runtime.spawn(async move {
            match client.health().await {
                Ok(()) => info!("Simulation backend reachable at {}", client.base_url()),
                Err(e) => warn!(
                    "Simulation backend not reachable at {}: {e}",
                    client.base_url()
                ),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drift_client::ClientConfig;
    use std::time::{Duration, Instant};

    fn runner() -> SimulationRunner {
        // TEST-NET-1 address: connect attempts fail fast, nothing listens
        let client = DriftClient::new(ClientConfig {
            base_url: "http://192.0.2.1:9".to_string(),
            timeout: Duration::from_millis(200),
        })
        .unwrap();
        SimulationRunner::new(client).unwrap()
    }

    fn poll_until_complete(runner: &mut SimulationRunner) -> Result<DriftPrediction, DriftError> {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if let Some(result) = runner.poll() {
                return result;
            }
            assert!(Instant::now() < deadline, "simulation never completed");
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn test_failed_request_clears_in_flight_flag() {
        let mut runner = runner();
        let ctx = egui::Context::default();

        assert!(!runner.is_simulating());
        runner.request(LatLon::new(47.0, -2.0), &ctx);
        assert!(runner.is_simulating());

        let result = poll_until_complete(&mut runner);
        assert!(matches!(result, Err(DriftError::Network(_))));
        assert!(!runner.is_simulating());
    }

    #[test]
    fn test_superseded_results_are_discarded() {
        let mut runner = runner();

        // Two requests issued; only the latest sequence may be applied
        runner.next_seq = 2;
        runner.latest_seq = Some(2);
        runner.in_flight = true;

        let stale = DriftPrediction {
            target_track: vec![LatLon::new(1.0, 1.0)],
            boat_track: vec![],
            drone_track: vec![],
            sigma_history: vec![0.1],
        };
        runner
            .outcome_tx
            .send(Completed {
                seq: 1,
                result: Ok(stale),
            })
            .unwrap();
        runner
            .outcome_tx
            .send(Completed {
                seq: 2,
                result: Err(DriftError::Network("boom".to_string())),
            })
            .unwrap();

        // The stale success is skipped; the latest result comes through
        let result = runner.poll().unwrap();
        assert!(matches!(result, Err(DriftError::Network(_))));
        assert!(!runner.is_simulating());
        assert!(runner.poll().is_none());
    }
}
