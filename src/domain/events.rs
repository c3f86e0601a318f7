//! Domain events for the application.
//!
//! Scan progress is published on the event bus so that any consumer (the SSE
//! endpoint, the foreground CLI) can follow a running scan.

use serde::Serialize;

/// Events sent to connected clients via SSE (Server-Sent Events).
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum ScanEvent {
    ScanStarted {
        shows: usize,
    },
    ScanFinished {
        matches: usize,
        shows_scanned: usize,
        stopped: bool,
    },
    StopRequested,

    ShowStarted {
        show: String,
    },
    ShowFinished {
        show: String,
        acquired: usize,
    },

    EpisodeChecking {
        show: String,
        season: u32,
        episode: u32,
    },
    EpisodeNotFound {
        show: String,
        season: u32,
        episode: u32,
    },

    MatchFound {
        show: String,
        title: String,
        season: u32,
        episode: u32,
        batch: bool,
        acquired: Vec<[u32; 2]>,
    },

    Error {
        message: String,
    },
    Info {
        message: String,
    },
}
