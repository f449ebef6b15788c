//! Business services composing the store, audit behaviour and external
//! clients. One service per aggregate; the transport layer owns routing and
//! request validation, these own the invariants.

pub mod enrollment;
pub mod identifier;
pub mod identifier_type;
pub mod patient;
pub mod program;

pub use enrollment::{CompletionCommand, EnrollCommand, EnrollmentService};
pub use identifier::{AssignIdentifierCommand, IdentifierService, PreferenceUpdate};
pub use identifier_type::{IdentifierTypeCommand, IdentifierTypeService};
pub use patient::{HydratedPatient, PatientService, RegisterPatientCommand};
pub use program::{ProgramCommand, ProgramService};
