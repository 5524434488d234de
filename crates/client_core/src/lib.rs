//! Form controller for validated bulk background requests.
//!
//! The pieces, leaf first: [`validation`] checks raw field input, [`form`]
//! keeps the fields and their verdicts, [`progress`] tallies the worker's
//! `image_saved` notifications, [`view`] decides which presentation is
//! active and [`controller`] ties them together around a single in-flight
//! request. [`driver`] runs a controller on one task and publishes a new
//! [`Snapshot`] after every change.

pub mod config;
pub mod controller;
pub mod driver;
pub mod form;
pub mod progress;
pub mod validation;
pub mod view;
pub mod worker;

pub use config::{ControllerConfig, DisplayResolution};
pub use controller::{FormController, Snapshot, SubmitDecision, SubmitOutcome};
pub use driver::{spawn_controller, ControllerError, ControllerHandle};
pub use form::{Field, Form, FormError};
pub use progress::{ProgressBridge, ProgressState};
pub use validation::{Limits, ValidationError};
pub use view::{View, ViewState};
pub use worker::{BackgroundFetcher, BackgroundWorker, ItemEventSource, MissingBackgroundWorker};
