//! Data types shared by the sequencer, the tracker and their drivers.

mod collaborator;
mod known_step;
mod notification;
mod purchase;
mod run_log;
mod run_phase;
mod run_state;
mod step_definition;
mod step_event;
mod step_status;
mod tracked_step;

pub use collaborator::{Collaborator, Merchant};
pub use known_step::{KnownStep, NotificationKind, display_label, humanize};
pub use notification::{ConnectionState, ResultEntry, SequencerEvent, TrackerNotification};
pub use purchase::{Product, PurchaseSummary, products_from_payload};
pub use run_log::{RUN_LOG_VERSION, RunLog};
pub use run_phase::{Control, RunPhase, Transition};
pub use run_state::{Progress, RunState};
pub use step_definition::StepDefinition;
pub use step_event::{STEP_UPDATE_EVENT, StepEvent, StepUpdate};
pub use step_status::StepStatus;
pub use tracked_step::TrackedStep;
