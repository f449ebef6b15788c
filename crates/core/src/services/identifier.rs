//! Patient identifier assignment and preference enforcement.
//!
//! Guards the invariant that a (patient, type) pair has at most one
//! non-voided identifier with `preferred = true`. The store backs this with
//! its own uniqueness constraint, so even a racing pair of requests ends in
//! a `Conflict` rather than two preferred identifiers.

use std::sync::Arc;

use crate::audit::AuditTrail;
use crate::error::{CdrError, CdrResult};
use crate::model::PatientIdentifier;
use crate::principal::Principal;
use crate::store::{IdentifierStore, IdentifierTypeStore, PatientStore};

/// Command to assign a new identifier to a patient.
#[derive(Clone, Debug)]
pub struct AssignIdentifierCommand {
    pub patient_id: i64,
    pub identifier_type_id: i32,
    pub identifier: String,
    pub preferred: bool,
    pub location_id: i32,
}

/// Mutable fields of an existing identifier. The value itself is immutable
/// after creation for audit integrity.
#[derive(Clone, Debug)]
pub struct PreferenceUpdate {
    pub preferred: bool,
    pub location_id: Option<i32>,
}

/// Service enforcing identifier preference rules.
pub struct IdentifierService {
    identifiers: Arc<dyn IdentifierStore>,
    identifier_types: Arc<dyn IdentifierTypeStore>,
    patients: Arc<dyn PatientStore>,
}

impl IdentifierService {
    pub fn new(
        identifiers: Arc<dyn IdentifierStore>,
        identifier_types: Arc<dyn IdentifierTypeStore>,
        patients: Arc<dyn PatientStore>,
    ) -> Self {
        Self {
            identifiers,
            identifier_types,
            patients,
        }
    }

    /// Assigns an identifier to a patient.
    ///
    /// Resolves the patient and identifier type first, failing fast if
    /// either is missing. A preferred assignment clears the preferred flag
    /// on every other non-voided identifier of the same (patient, type)
    /// pair before inserting.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the patient or identifier type does not exist.
    /// - `Validation` if the identifier value is empty.
    /// - `Conflict` if the value is already in use.
    pub fn assign(
        &self,
        actor: Principal,
        cmd: AssignIdentifierCommand,
    ) -> CdrResult<PatientIdentifier> {
        if cmd.identifier.trim().is_empty() {
            return Err(CdrError::Validation(
                "identifier value must not be empty".into(),
            ));
        }

        self.patients
            .find_patient(cmd.patient_id, false)?
            .ok_or_else(|| CdrError::not_found("Patient", "Id", cmd.patient_id))?;

        self.identifier_types
            .find_identifier_type(cmd.identifier_type_id)?
            .ok_or_else(|| {
                CdrError::not_found("Patient Identifier Type", "Id", cmd.identifier_type_id)
            })?;

        if cmd.preferred {
            self.identifiers
                .reset_preferred(cmd.patient_id, cmd.identifier_type_id, actor.person_id)?;
        }

        let identifier = PatientIdentifier {
            patient_identifier_id: 0,
            patient_id: cmd.patient_id,
            identifier_type_id: cmd.identifier_type_id,
            identifier: cmd.identifier,
            preferred: cmd.preferred,
            location_id: cmd.location_id,
            audit: AuditTrail::created(actor),
        };
        let saved = self.identifiers.insert_identifier(identifier)?;
        tracing::info!(
            patient_id = saved.patient_id,
            identifier_id = saved.patient_identifier_id,
            preferred = saved.preferred,
            "assigned patient identifier"
        );
        Ok(saved)
    }

    /// Changes the preference flag and optionally the location of an
    /// existing identifier.
    ///
    /// Un-preferring is a one-way ratchet: while a preferred identifier
    /// exists for the (patient, type) pair, setting `preferred = false` is
    /// rejected. Preference ends only by assigning a different preferred
    /// identifier or by voiding the current one.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the identifier does not exist.
    /// - `Conflict` if the identifier is voided, or on the un-prefer
    ///   ratchet above.
    pub fn change_preference(
        &self,
        actor: Principal,
        identifier_id: i64,
        update: PreferenceUpdate,
    ) -> CdrResult<PatientIdentifier> {
        let mut identifier = self
            .identifiers
            .find_identifier(identifier_id)?
            .ok_or_else(|| CdrError::not_found("Patient Identifier", "Id", identifier_id))?;

        if identifier.audit.voided {
            return Err(CdrError::Conflict(format!(
                "identifier {identifier_id} is voided"
            )));
        }

        if !update.preferred {
            let current = self
                .identifiers
                .find_preferred_identifier(identifier.patient_id, identifier.identifier_type_id)?;
            if current.is_some() {
                return Err(CdrError::Conflict(
                    "Preferred Patient Identifier can not be unset".into(),
                ));
            }
        } else if !identifier.preferred {
            self.identifiers.reset_preferred(
                identifier.patient_id,
                identifier.identifier_type_id,
                actor.person_id,
            )?;
        }

        identifier.preferred = update.preferred;
        if let Some(location_id) = update.location_id {
            identifier.location_id = location_id;
        }
        identifier.audit.touch(actor);
        self.identifiers.update_identifier(identifier)
    }

    /// Voids an identifier. Preference is not re-balanced among siblings:
    /// voiding the preferred identifier leaves the pair with none until a
    /// new preferred one is assigned.
    pub fn retire(&self, actor: Principal, identifier_id: i64, reason: &str) -> CdrResult<()> {
        let mut identifier = self
            .identifiers
            .find_identifier(identifier_id)?
            .ok_or_else(|| CdrError::not_found("Patient Identifier", "Id", identifier_id))?;

        identifier.audit.void_record(actor, reason)?;
        self.identifiers.update_identifier(identifier)?;
        tracing::info!(identifier_id, "voided patient identifier");
        Ok(())
    }

    /// The single preferred identifier of the pair, if any. A double match
    /// in the store surfaces as an `Integrity` error.
    pub fn find_preferred(
        &self,
        patient_id: i64,
        type_id: i32,
    ) -> CdrResult<Option<PatientIdentifier>> {
        self.identifiers.find_preferred_identifier(patient_id, type_id)
    }
}
