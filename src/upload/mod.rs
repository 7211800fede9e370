//! Medical report upload pipeline.
//!
//! A selected file goes through [`validator`], is posted by a
//! [`transport`], and the response is turned into a [`DisplayModel`] by
//! [`normalize`]. [`state::UploadMachine`] ties the steps together behind
//! the states a user sees.

pub mod normalize;
pub mod report;
pub mod state;
pub mod transport;
pub mod validator;

pub use normalize::{
    normalize, Confidence, DisplayCategory, DisplayModel, DisplayParameter, NormalizationError,
    Severity,
};
pub use report::{AnalysisReport, RawParameter, ReportSummary};
pub use state::{SubmitTicket, UiState, UploadMachine};
pub use transport::{
    AnalysisTransport, HttpTransport, TransportConfig, TransportError, TransportErrorKind,
};
pub use validator::{validate, CandidateFile, ReadError, UploadCandidate, ValidationError};
