//! Program enrollment registration.
//!
//! Guards the invariant that at most one enrollment row ever exists per
//! (patient, program) pair. The check applies regardless of completion or
//! void status: re-enrollment after completion is not modeled.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::audit::AuditTrail;
use crate::error::{CdrError, CdrResult};
use crate::model::PatientProgram;
use crate::principal::Principal;
use crate::store::{EnrollmentStore, PatientStore, ProgramStore};

/// Command to enroll a patient in a program.
#[derive(Clone, Debug)]
pub struct EnrollCommand {
    pub patient_id: i64,
    pub program_id: i32,
    pub date_enrolled: NaiveDate,
    pub location_id: i32,
}

/// Completion details for an existing enrollment. Enrollment date and
/// location are not touched by completion.
#[derive(Clone, Debug)]
pub struct CompletionCommand {
    pub date_completed: NaiveDate,
    pub outcome_concept_id: Option<i32>,
    pub outcome_comment: Option<String>,
}

/// Service governing enrollment uniqueness and completion transitions.
pub struct EnrollmentService {
    enrollments: Arc<dyn EnrollmentStore>,
    patients: Arc<dyn PatientStore>,
    programs: Arc<dyn ProgramStore>,
}

impl EnrollmentService {
    pub fn new(
        enrollments: Arc<dyn EnrollmentStore>,
        patients: Arc<dyn PatientStore>,
        programs: Arc<dyn ProgramStore>,
    ) -> Self {
        Self {
            enrollments,
            patients,
            programs,
        }
    }

    /// Enrolls a patient in a program.
    ///
    /// # Errors
    ///
    /// - `Conflict` if a (patient, program) row already exists, whatever
    ///   its completion or void status.
    /// - `NotFound` if the patient or program does not exist.
    pub fn enroll(&self, actor: Principal, cmd: EnrollCommand) -> CdrResult<PatientProgram> {
        if self
            .enrollments
            .find_enrollment_by_patient_and_program(cmd.patient_id, cmd.program_id)?
            .is_some()
        {
            return Err(CdrError::Conflict(
                "Patient already enrolled in program".into(),
            ));
        }

        self.patients
            .find_patient(cmd.patient_id, false)?
            .ok_or_else(|| CdrError::not_found("Patient", "Id", cmd.patient_id))?;

        self.programs
            .find_program(cmd.program_id)?
            .ok_or_else(|| CdrError::not_found("Program", "Id", cmd.program_id))?;

        let enrollment = PatientProgram {
            patient_program_id: 0,
            patient_id: cmd.patient_id,
            program_id: cmd.program_id,
            location_id: cmd.location_id,
            date_enrolled: cmd.date_enrolled,
            date_completed: None,
            outcome_concept_id: None,
            outcome_comment: None,
            audit: AuditTrail::created(actor),
        };
        let saved = self.enrollments.insert_enrollment(enrollment)?;
        tracing::info!(
            patient_id = saved.patient_id,
            program_id = saved.program_id,
            "enrolled patient in program"
        );
        Ok(saved)
    }

    /// Records completion on an existing enrollment, updating only the
    /// completion fields.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the patient or the enrollment does not exist.
    pub fn record_completion(
        &self,
        actor: Principal,
        patient_id: i64,
        program_id: i32,
        cmd: CompletionCommand,
    ) -> CdrResult<PatientProgram> {
        self.patients
            .find_patient(patient_id, false)?
            .ok_or_else(|| CdrError::not_found("Patient", "Id", patient_id))?;

        let mut enrollment = self
            .enrollments
            .find_enrollment_by_patient_and_program(patient_id, program_id)?
            .ok_or_else(|| CdrError::not_found("Patient Enrollment", "Program Id", program_id))?;

        enrollment.date_completed = Some(cmd.date_completed);
        enrollment.outcome_concept_id = cmd.outcome_concept_id;
        enrollment.outcome_comment = cmd.outcome_comment;
        enrollment.audit.touch(actor);
        self.enrollments.update_enrollment(enrollment)
    }

    /// Voids the enrollment of a patient in a program. The voided row
    /// still counts against the one-row-per-pair rule, so the patient can
    /// not be re-enrolled afterwards.
    pub fn retire_for_patient(
        &self,
        actor: Principal,
        patient_id: i64,
        program_id: i32,
        reason: &str,
    ) -> CdrResult<()> {
        let enrollment = self
            .enrollments
            .find_enrollment_by_patient_and_program(patient_id, program_id)?
            .ok_or_else(|| CdrError::not_found("Patient Enrollment", "Program Id", program_id))?;
        self.retire(actor, enrollment.patient_program_id, reason)
    }

    /// Voids an enrollment.
    pub fn retire(&self, actor: Principal, enrollment_id: i64, reason: &str) -> CdrResult<()> {
        let mut enrollment = self
            .enrollments
            .find_enrollment(enrollment_id)?
            .ok_or_else(|| CdrError::not_found("Patient Enrollment", "Id", enrollment_id))?;

        enrollment.audit.void_record(actor, reason)?;
        self.enrollments.update_enrollment(enrollment)?;
        tracing::info!(enrollment_id, "voided program enrollment");
        Ok(())
    }

    /// Non-voided enrollments of a patient.
    pub fn list_for_patient(&self, patient_id: i64) -> CdrResult<Vec<PatientProgram>> {
        self.enrollments.list_enrollments_for_patient(patient_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditTrail;
    use crate::model::{Patient, Program};
    use crate::store::MemoryStore;

    const ACTOR: Principal = Principal { person_id: 1 };

    struct Fixture {
        service: EnrollmentService,
        program_id: i32,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        store
            .insert_patient(Patient {
                patient_id: 1,
                allergies: None,
                audit: AuditTrail::created(ACTOR),
            })
            .unwrap();
        let program = store
            .insert_program(Program {
                program_id: 0,
                name: "HIV Care".into(),
                program_code: "HIV".into(),
                description: None,
                active: true,
                audit: AuditTrail::created(ACTOR),
            })
            .unwrap();
        Fixture {
            service: EnrollmentService::new(store.clone(), store.clone(), store),
            program_id: program.program_id,
        }
    }

    fn enroll_cmd(program_id: i32) -> EnrollCommand {
        EnrollCommand {
            patient_id: 1,
            program_id,
            date_enrolled: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            location_id: 1,
        }
    }

    #[test]
    fn enroll_then_re_enroll_is_a_conflict() {
        let fx = fixture();
        fx.service.enroll(ACTOR, enroll_cmd(fx.program_id)).unwrap();

        let result = fx.service.enroll(ACTOR, enroll_cmd(fx.program_id));

        assert!(matches!(result, Err(CdrError::Conflict(_))));
    }

    #[test]
    fn re_enrollment_fails_even_after_completion() {
        let fx = fixture();
        fx.service.enroll(ACTOR, enroll_cmd(fx.program_id)).unwrap();
        fx.service
            .record_completion(
                ACTOR,
                1,
                fx.program_id,
                CompletionCommand {
                    date_completed: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                    outcome_concept_id: Some(5),
                    outcome_comment: None,
                },
            )
            .unwrap();

        let result = fx.service.enroll(ACTOR, enroll_cmd(fx.program_id));

        assert!(matches!(result, Err(CdrError::Conflict(_))));
    }

    #[test]
    fn enroll_rejects_unknown_patient_and_program() {
        let fx = fixture();

        let bad_patient = fx.service.enroll(
            ACTOR,
            EnrollCommand {
                patient_id: 99,
                ..enroll_cmd(fx.program_id)
            },
        );
        assert!(matches!(
            bad_patient,
            Err(CdrError::NotFound { entity: "Patient", .. })
        ));

        let bad_program = fx.service.enroll(ACTOR, enroll_cmd(99));
        assert!(matches!(
            bad_program,
            Err(CdrError::NotFound { entity: "Program", .. })
        ));
    }

    #[test]
    fn completion_updates_only_completion_fields() {
        let fx = fixture();
        let enrolled = fx.service.enroll(ACTOR, enroll_cmd(fx.program_id)).unwrap();

        let completed = fx
            .service
            .record_completion(
                ACTOR,
                1,
                fx.program_id,
                CompletionCommand {
                    date_completed: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                    outcome_concept_id: Some(5),
                    outcome_comment: Some("graduated".into()),
                },
            )
            .unwrap();

        assert_eq!(completed.date_enrolled, enrolled.date_enrolled);
        assert_eq!(completed.location_id, enrolled.location_id);
        assert_eq!(
            completed.date_completed,
            Some(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
        );
        assert_eq!(completed.outcome_concept_id, Some(5));
        assert_eq!(completed.outcome_comment.as_deref(), Some("graduated"));
        assert_eq!(completed.audit.created_at, enrolled.audit.created_at);
        assert!(completed.audit.last_modified_by.is_some());
    }

    #[test]
    fn completion_of_missing_enrollment_is_not_found() {
        let fx = fixture();

        let result = fx.service.record_completion(
            ACTOR,
            1,
            fx.program_id,
            CompletionCommand {
                date_completed: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                outcome_concept_id: None,
                outcome_comment: None,
            },
        );

        assert!(matches!(
            result,
            Err(CdrError::NotFound {
                entity: "Patient Enrollment",
                ..
            })
        ));
    }

    #[test]
    fn retire_for_patient_resolves_the_pair() {
        let fx = fixture();
        fx.service.enroll(ACTOR, enroll_cmd(fx.program_id)).unwrap();

        fx.service
            .retire_for_patient(ACTOR, 1, fx.program_id, "enrolled by mistake")
            .unwrap();

        assert!(fx.service.list_for_patient(1).unwrap().is_empty());

        let missing = fx.service.retire_for_patient(ACTOR, 1, 99, "no such enrollment");
        assert!(matches!(
            missing,
            Err(CdrError::NotFound {
                entity: "Patient Enrollment",
                ..
            })
        ));
    }

    #[test]
    fn voided_enrollment_leaves_default_listing() {
        let fx = fixture();
        let enrolled = fx.service.enroll(ACTOR, enroll_cmd(fx.program_id)).unwrap();

        fx.service
            .retire(ACTOR, enrolled.patient_program_id, "enrolled by mistake")
            .unwrap();

        assert!(fx.service.list_for_patient(1).unwrap().is_empty());
    }
}
