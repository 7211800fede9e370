//! Upload/result state machine.
//!
//! ```text
//! Idle      ──select──▶ Selected
//! Selected  ──submit──▶ Uploading
//! Uploading ──ok──────▶ Succeeded
//! Uploading ──error───▶ Failed (keeps the candidate)
//! Failed    ──submit──▶ Uploading
//! any state but Uploading ──select──▶ Selected, ──reset──▶ Idle
//! ```
//!
//! One request may be in flight per machine. The submit guard is the only
//! concurrency control; transports never queue. Nothing but a completion or
//! teardown leaves Uploading. A failed submission keeps its candidate so it
//! can be resubmitted without selecting it again.

use tracing::{debug, info, warn};

use super::normalize::{normalize, DisplayModel};
use super::report::AnalysisReport;
use super::transport::{AnalysisTransport, TransportError};
use super::validator::{validate, CandidateFile, UploadCandidate, ValidationError};

/// User-visible state of an upload widget.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum UiState {
    #[default]
    Idle,
    Selected(UploadCandidate),
    Uploading(UploadCandidate),
    Succeeded(DisplayModel),
    /// Human-readable failure message, plus the file that can be resubmitted.
    Failed {
        message: String,
        candidate: UploadCandidate,
    },
}

impl UiState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Selected(_) => "selected",
            Self::Uploading(_) => "uploading",
            Self::Succeeded(_) => "succeeded",
            Self::Failed { .. } => "failed",
        }
    }
}

/// Proof that a submission was started.
///
/// Carries the generation it was issued in; a completion whose generation
/// is stale (reset, reselect, teardown) is dropped.
#[derive(Debug)]
pub struct SubmitTicket {
    generation: u64,
    candidate: UploadCandidate,
}

impl SubmitTicket {
    pub fn candidate(&self) -> &UploadCandidate {
        &self.candidate
    }
}

/// Drives validator -> transport -> normalizer for one mounted widget.
#[derive(Debug)]
pub struct UploadMachine {
    state: UiState,
    /// Last validation failure, shown inline while the machine stays usable.
    inline_error: Option<ValidationError>,
    generation: u64,
    mounted: bool,
}

impl Default for UploadMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadMachine {
    pub fn new() -> Self {
        Self {
            state: UiState::Idle,
            inline_error: None,
            generation: 0,
            mounted: true,
        }
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn inline_error(&self) -> Option<&ValidationError> {
        self.inline_error.as_ref()
    }

    pub fn is_uploading(&self) -> bool {
        matches!(self.state, UiState::Uploading(_))
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Message to show inline, if any.
    pub fn error_message(&self) -> Option<String> {
        if let Some(ref err) = self.inline_error {
            return Some(err.to_string());
        }
        match self.state {
            UiState::Failed { ref message, .. } => Some(message.clone()),
            _ => None,
        }
    }

    /// Select a file, replacing any held candidate, report, or failure.
    ///
    /// On validation failure the machine returns to Idle and the file is not
    /// retained. Returns `Ok(false)` when the selection was ignored because a
    /// request is in flight or the machine was torn down.
    pub fn select(&mut self, file: CandidateFile) -> Result<bool, ValidationError> {
        if !self.mounted {
            debug!("Ignoring selection of {} after teardown", file.name);
            return Ok(false);
        }
        if self.is_uploading() {
            debug!(
                "Ignoring selection of {} while an upload is in flight",
                file.name
            );
            return Ok(false);
        }

        self.generation += 1;
        match validate(file) {
            Ok(candidate) => {
                debug!("Selected {} for upload", candidate.name());
                self.state = UiState::Selected(candidate);
                self.inline_error = None;
                Ok(true)
            }
            Err(err) => {
                info!("Rejected selection: {}", err);
                self.state = UiState::Idle;
                self.inline_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Start a submission: Selected or Failed -> Uploading.
    ///
    /// Returns `None` (and changes nothing) when no candidate is held, a
    /// request is already in flight, or the machine was torn down.
    pub fn begin_submit(&mut self) -> Option<SubmitTicket> {
        if !self.mounted {
            return None;
        }

        let candidate = match self.state {
            UiState::Selected(ref candidate) | UiState::Failed { ref candidate, .. } => {
                candidate.clone()
            }
            ref other => {
                debug!("Submit ignored in state {}", other.name());
                return None;
            }
        };

        self.generation += 1;
        self.inline_error = None;
        self.state = UiState::Uploading(candidate.clone());
        Some(SubmitTicket {
            generation: self.generation,
            candidate,
        })
    }

    /// Apply a transport outcome for a previously issued ticket.
    ///
    /// Returns `false` if the result was discarded because the machine was
    /// torn down after the ticket was issued, or the ticket is not the
    /// outstanding one.
    pub fn complete(
        &mut self,
        ticket: SubmitTicket,
        result: Result<AnalysisReport, TransportError>,
    ) -> bool {
        if !self.mounted || ticket.generation != self.generation || !self.is_uploading() {
            debug!(
                "Discarding stale analysis result for {}",
                ticket.candidate.name()
            );
            return false;
        }

        let candidate = ticket.candidate;
        self.state = match result {
            Ok(report) => match normalize(report) {
                Ok(mut model) => {
                    if model.filename.is_none() {
                        model.filename = Some(candidate.name().to_string());
                    }
                    info!(
                        "Analysis of {} succeeded: {} parameters, {} abnormal",
                        candidate.name(),
                        model.total_parameters,
                        model.abnormal_parameters
                    );
                    UiState::Succeeded(model)
                }
                Err(err) => {
                    warn!("Analysis of {} unusable: {}", candidate.name(), err);
                    UiState::Failed {
                        message: err.to_string(),
                        candidate,
                    }
                }
            },
            Err(err) => UiState::Failed {
                message: format!("Upload failed: {}", err),
                candidate,
            },
        };
        true
    }

    /// Submit the held candidate and wait for the outcome.
    ///
    /// Returns `false` if the submit guard refused to start a request.
    pub async fn submit(&mut self, transport: &dyn AnalysisTransport) -> bool {
        let Some(ticket) = self.begin_submit() else {
            return false;
        };
        let result = transport.submit(ticket.candidate().clone()).await;
        self.complete(ticket, result)
    }

    /// Drop any held candidate, report, or error and return to Idle.
    ///
    /// Returns `false` and changes nothing while a request is in flight.
    pub fn reset(&mut self) -> bool {
        if self.is_uploading() {
            debug!("Reset ignored while an upload is in flight");
            return false;
        }
        self.clear();
        true
    }

    /// Unmount. An in-flight result is discarded and the machine is inert.
    pub fn teardown(&mut self) {
        self.clear();
        self.mounted = false;
    }

    fn clear(&mut self) {
        self.generation += 1;
        self.state = UiState::Idle;
        self.inline_error = None;
    }
}
