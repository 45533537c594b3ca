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

//! Operator message feed.
//!
//! Bounded log of mission messages shown in the communications pane. System
//! notices (mission lifecycle, simulation failures) land here alongside
//! operator and pilot traffic.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;

/// Keep this many messages before dropping the oldest.
const MAX_MESSAGES: usize = 50;

/// Notice appended when a simulation request fails for any reason.
pub const SIMULATION_FAILED_NOTICE: &str =
    "Simulation failed. Make sure the backend server is running.";

/// Who a message is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Operator,
    Pilot,
    System,
}

impl MessageKind {
    /// Sender label shown in the feed.
    #[must_use]
    pub const fn sender(self) -> &'static str {
        match self {
            Self::Operator => "You",
            Self::Pilot => "Pilot",
            Self::System => "System",
        }
    }
}

/// A single feed entry.
#[derive(Debug, Clone)]
pub struct Message {
    pub kind: MessageKind,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Timestamp label in the feed's `HH:MM` format.
    #[must_use]
    pub fn time_label(&self) -> String {
        self.timestamp.format("%H:%M").to_string()
    }
}

/// Bounded, append-only message feed.
#[derive(Debug)]
pub struct MessageFeed {
    messages: VecDeque<Message>,
}

impl Default for MessageFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageFeed {
    /// A fresh feed, seeded with the mission start traffic.
    #[must_use]
    pub fn new() -> Self {
        let mut feed = Self {
            messages: VecDeque::with_capacity(MAX_MESSAGES),
        };
        feed.push(MessageKind::System, "Mission initialized");
        feed.push(MessageKind::Pilot, "Drone en route to search area");
        feed.push(MessageKind::Operator, "Copy that. Visibility conditions?");
        feed.push(MessageKind::Pilot, "Clear skies, 15 km visibility");
        feed.push(MessageKind::System, "Drone on station");
        feed
    }

    /// Append a message, evicting the oldest past the feed bound.
    pub fn push(&mut self, kind: MessageKind, text: impl Into<String>) {
        if self.messages.len() == MAX_MESSAGES {
            self.messages.pop_front();
        }
        self.messages.push_back(Message {
            kind,
            text: text.into(),
            timestamp: Utc::now(),
        });
    }

    /// Append a system notice.
    pub fn push_system(&mut self, text: impl Into<String>) {
        self.push(MessageKind::System, text);
    }

    /// Messages in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    #[allow(dead_code)]
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[allow(dead_code)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
