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

//! Client library for the Seahawk drift-prediction simulation service.
//!
//! The service takes a last-known position of a person or vessel in the water
//! and predicts how the target drifts over time, along with the paths of a
//! rescue boat and a search drone and a per-step positional uncertainty
//! (sigma). This crate provides the layers needed to talk to it:
//!
//! - **Geo layer**: the [`LatLon`] coordinate value type and [`GeoBounds`]
//!   bounding boxes, shared with map code
//! - **Protocol layer**: request/response wire types and shape validation
//!   into a [`DriftPrediction`]
//! - **Client layer**: async HTTP client with a request timeout and a
//!   startup health probe
//!
//! # Quick Start
//!
//! ```no_run
//! use drift_client::{ClientConfig, DriftClient, LatLon, SimulateRequest};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), drift_client::DriftError> {
//!     let client = DriftClient::new(ClientConfig::default())?;
//!     let seed = LatLon::new(47.2736, -2.2139);
//!     let prediction = client.simulate(&SimulateRequest::for_target(seed)).await?;
//!     println!("{} drift steps predicted", prediction.steps());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod geo;
pub mod protocol;

pub use client::{ClientConfig, DriftClient, DriftError};
pub use geo::{GeoBounds, LatLon};
pub use protocol::{DriftPrediction, SimulateRequest};
