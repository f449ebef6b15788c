//! In-memory store implementation.
//!
//! All tables live behind a single `RwLock`, so each trait method runs as
//! one critical section: the transaction boundary for this backend. The
//! uniqueness constraints from the trait contract are re-checked under the
//! write lock, which is what turns an application-level race into a
//! `Conflict` instead of two preferred identifiers or two enrollments.

use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::error::{CdrError, CdrResult};
use crate::model::{Patient, PatientIdentifier, PatientIdentifierType, PatientProgram, Program};
use crate::store::{
    EnrollmentStore, IdentifierStore, IdentifierTypeStore, PatientStore, ProgramStore,
};

#[derive(Default)]
struct Tables {
    patients: BTreeMap<i64, Patient>,
    identifiers: BTreeMap<i64, PatientIdentifier>,
    identifier_types: BTreeMap<i32, PatientIdentifierType>,
    programs: BTreeMap<i32, Program>,
    enrollments: BTreeMap<i64, PatientProgram>,
    next_identifier_id: i64,
    next_identifier_type_id: i32,
    next_program_id: i32,
    next_enrollment_id: i64,
}

/// Single-process store backing all repository traits.
///
/// Row ids (except the externally assigned patient id) are allocated by the
/// store; pass `0` on insert and read the id off the returned record.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> CdrResult<std::sync::RwLockReadGuard<'_, Tables>> {
        self.inner
            .read()
            .map_err(|_| CdrError::Storage("store lock poisoned".into()))
    }

    fn write(&self) -> CdrResult<std::sync::RwLockWriteGuard<'_, Tables>> {
        self.inner
            .write()
            .map_err(|_| CdrError::Storage("store lock poisoned".into()))
    }
}

fn check_preferred_unique(
    tables: &Tables,
    candidate: &PatientIdentifier,
) -> CdrResult<()> {
    if !candidate.preferred || candidate.audit.voided {
        return Ok(());
    }
    let clash = tables.identifiers.values().any(|existing| {
        existing.patient_identifier_id != candidate.patient_identifier_id
            && existing.patient_id == candidate.patient_id
            && existing.identifier_type_id == candidate.identifier_type_id
            && existing.preferred
            && !existing.audit.voided
    });
    if clash {
        return Err(CdrError::Conflict(format!(
            "a preferred identifier of type {} already exists for patient {}",
            candidate.identifier_type_id, candidate.patient_id
        )));
    }
    Ok(())
}

impl PatientStore for MemoryStore {
    fn insert_patient(&self, patient: Patient) -> CdrResult<Patient> {
        let mut tables = self.write()?;
        if tables.patients.contains_key(&patient.patient_id) {
            return Err(CdrError::Conflict(format!(
                "patient {} already exists",
                patient.patient_id
            )));
        }
        tables.patients.insert(patient.patient_id, patient.clone());
        Ok(patient)
    }

    fn find_patient(&self, patient_id: i64, include_voided: bool) -> CdrResult<Option<Patient>> {
        let tables = self.read()?;
        Ok(tables
            .patients
            .get(&patient_id)
            .filter(|p| include_voided || !p.audit.voided)
            .cloned())
    }

    fn update_patient(&self, patient: Patient) -> CdrResult<Patient> {
        let mut tables = self.write()?;
        if !tables.patients.contains_key(&patient.patient_id) {
            return Err(CdrError::not_found("Patient", "Id", patient.patient_id));
        }
        tables.patients.insert(patient.patient_id, patient.clone());
        Ok(patient)
    }

    fn list_active_patients(&self) -> CdrResult<Vec<Patient>> {
        let tables = self.read()?;
        Ok(tables
            .patients
            .values()
            .filter(|p| !p.audit.voided)
            .cloned()
            .collect())
    }

    fn list_all_patients(&self) -> CdrResult<Vec<Patient>> {
        let tables = self.read()?;
        Ok(tables.patients.values().cloned().collect())
    }

    fn find_patients_by_program(&self, program_id: i32) -> CdrResult<Vec<Patient>> {
        let tables = self.read()?;
        let enrolled: Vec<i64> = tables
            .enrollments
            .values()
            .filter(|e| e.program_id == program_id && !e.audit.voided)
            .map(|e| e.patient_id)
            .collect();
        Ok(tables
            .patients
            .values()
            .filter(|p| !p.audit.voided && enrolled.contains(&p.patient_id))
            .cloned()
            .collect())
    }

    fn find_patients_by_program_and_status(
        &self,
        program_id: i32,
        active: bool,
    ) -> CdrResult<Vec<Patient>> {
        let tables = self.read()?;
        let matches_status = tables
            .programs
            .get(&program_id)
            .map(|program| program.active == active)
            .unwrap_or(false);
        if !matches_status {
            return Ok(Vec::new());
        }
        drop(tables);
        self.find_patients_by_program(program_id)
    }

    fn find_patients_by_identifier_type(&self, type_id: i32) -> CdrResult<Vec<Patient>> {
        let tables = self.read()?;
        let carriers: Vec<i64> = tables
            .identifiers
            .values()
            .filter(|i| i.identifier_type_id == type_id && !i.audit.voided)
            .map(|i| i.patient_id)
            .collect();
        Ok(tables
            .patients
            .values()
            .filter(|p| !p.audit.voided && carriers.contains(&p.patient_id))
            .cloned()
            .collect())
    }
}

impl IdentifierStore for MemoryStore {
    fn insert_identifier(&self, mut identifier: PatientIdentifier) -> CdrResult<PatientIdentifier> {
        let mut tables = self.write()?;
        if tables
            .identifiers
            .values()
            .any(|existing| existing.identifier == identifier.identifier)
        {
            return Err(CdrError::Conflict(format!(
                "identifier value {} is already in use",
                identifier.identifier
            )));
        }
        check_preferred_unique(&tables, &identifier)?;
        tables.next_identifier_id += 1;
        identifier.patient_identifier_id = tables.next_identifier_id;
        tables
            .identifiers
            .insert(identifier.patient_identifier_id, identifier.clone());
        Ok(identifier)
    }

    fn find_identifier(&self, identifier_id: i64) -> CdrResult<Option<PatientIdentifier>> {
        let tables = self.read()?;
        Ok(tables.identifiers.get(&identifier_id).cloned())
    }

    fn find_identifier_by_value(&self, value: &str) -> CdrResult<Option<PatientIdentifier>> {
        let tables = self.read()?;
        Ok(tables
            .identifiers
            .values()
            .find(|i| i.identifier == value && !i.audit.voided)
            .cloned())
    }

    fn find_preferred_identifier(
        &self,
        patient_id: i64,
        type_id: i32,
    ) -> CdrResult<Option<PatientIdentifier>> {
        let tables = self.read()?;
        let mut matches = tables.identifiers.values().filter(|i| {
            i.patient_id == patient_id
                && i.identifier_type_id == type_id
                && i.preferred
                && !i.audit.voided
        });
        let first = matches.next().cloned();
        if matches.next().is_some() {
            return Err(CdrError::Integrity(format!(
                "patient {patient_id} has multiple preferred identifiers of type {type_id}"
            )));
        }
        Ok(first)
    }

    fn reset_preferred(&self, patient_id: i64, type_id: i32, modified_by: i64) -> CdrResult<usize> {
        let mut tables = self.write()?;
        let now = chrono::Utc::now();
        let mut cleared = 0;
        for identifier in tables.identifiers.values_mut() {
            if identifier.patient_id == patient_id
                && identifier.identifier_type_id == type_id
                && identifier.preferred
                && !identifier.audit.voided
            {
                identifier.preferred = false;
                identifier.audit.last_modified_by = Some(modified_by);
                identifier.audit.last_modified_at = Some(now);
                cleared += 1;
            }
        }
        Ok(cleared)
    }

    fn update_identifier(&self, identifier: PatientIdentifier) -> CdrResult<PatientIdentifier> {
        let mut tables = self.write()?;
        if !tables
            .identifiers
            .contains_key(&identifier.patient_identifier_id)
        {
            return Err(CdrError::not_found(
                "Patient Identifier",
                "Id",
                identifier.patient_identifier_id,
            ));
        }
        check_preferred_unique(&tables, &identifier)?;
        tables
            .identifiers
            .insert(identifier.patient_identifier_id, identifier.clone());
        Ok(identifier)
    }

    fn list_identifiers_for_patient(&self, patient_id: i64) -> CdrResult<Vec<PatientIdentifier>> {
        let tables = self.read()?;
        Ok(tables
            .identifiers
            .values()
            .filter(|i| i.patient_id == patient_id && !i.audit.voided)
            .cloned()
            .collect())
    }
}

impl IdentifierTypeStore for MemoryStore {
    fn insert_identifier_type(
        &self,
        mut identifier_type: PatientIdentifierType,
    ) -> CdrResult<PatientIdentifierType> {
        let mut tables = self.write()?;
        if tables
            .identifier_types
            .values()
            .any(|existing| existing.name == identifier_type.name)
        {
            return Err(CdrError::Conflict(format!(
                "identifier type named {} already exists",
                identifier_type.name
            )));
        }
        tables.next_identifier_type_id += 1;
        identifier_type.patient_identifier_type_id = tables.next_identifier_type_id;
        tables.identifier_types.insert(
            identifier_type.patient_identifier_type_id,
            identifier_type.clone(),
        );
        Ok(identifier_type)
    }

    fn find_identifier_type(&self, type_id: i32) -> CdrResult<Option<PatientIdentifierType>> {
        let tables = self.read()?;
        Ok(tables.identifier_types.get(&type_id).cloned())
    }

    fn update_identifier_type(
        &self,
        identifier_type: PatientIdentifierType,
    ) -> CdrResult<PatientIdentifierType> {
        let mut tables = self.write()?;
        if !tables
            .identifier_types
            .contains_key(&identifier_type.patient_identifier_type_id)
        {
            return Err(CdrError::not_found(
                "Patient Identifier Type",
                "Id",
                identifier_type.patient_identifier_type_id,
            ));
        }
        tables.identifier_types.insert(
            identifier_type.patient_identifier_type_id,
            identifier_type.clone(),
        );
        Ok(identifier_type)
    }

    fn list_identifier_types(&self) -> CdrResult<Vec<PatientIdentifierType>> {
        let tables = self.read()?;
        Ok(tables
            .identifier_types
            .values()
            .filter(|t| !t.audit.voided)
            .cloned()
            .collect())
    }
}

impl ProgramStore for MemoryStore {
    fn insert_program(&self, mut program: Program) -> CdrResult<Program> {
        let mut tables = self.write()?;
        if tables
            .programs
            .values()
            .any(|existing| existing.name == program.name)
        {
            return Err(CdrError::Conflict(format!(
                "program named {} already exists",
                program.name
            )));
        }
        if tables
            .programs
            .values()
            .any(|existing| existing.program_code == program.program_code)
        {
            return Err(CdrError::Conflict(format!(
                "program code {} already exists",
                program.program_code
            )));
        }
        tables.next_program_id += 1;
        program.program_id = tables.next_program_id;
        tables.programs.insert(program.program_id, program.clone());
        Ok(program)
    }

    fn find_program(&self, program_id: i32) -> CdrResult<Option<Program>> {
        let tables = self.read()?;
        Ok(tables.programs.get(&program_id).cloned())
    }

    fn update_program(&self, program: Program) -> CdrResult<Program> {
        let mut tables = self.write()?;
        if !tables.programs.contains_key(&program.program_id) {
            return Err(CdrError::not_found("Program", "Id", program.program_id));
        }
        let clash = tables.programs.values().any(|existing| {
            existing.program_id != program.program_id
                && (existing.name == program.name || existing.program_code == program.program_code)
        });
        if clash {
            return Err(CdrError::Conflict(format!(
                "program name {} or code {} already in use",
                program.name, program.program_code
            )));
        }
        tables.programs.insert(program.program_id, program.clone());
        Ok(program)
    }

    fn list_programs(&self) -> CdrResult<Vec<Program>> {
        let tables = self.read()?;
        Ok(tables
            .programs
            .values()
            .filter(|p| !p.audit.voided)
            .cloned()
            .collect())
    }
}

impl EnrollmentStore for MemoryStore {
    fn insert_enrollment(&self, mut enrollment: PatientProgram) -> CdrResult<PatientProgram> {
        let mut tables = self.write()?;
        // One row per (patient, program), voided or not: re-enrollment is
        // not modeled.
        let exists = tables.enrollments.values().any(|existing| {
            existing.patient_id == enrollment.patient_id
                && existing.program_id == enrollment.program_id
        });
        if exists {
            return Err(CdrError::Conflict(
                "Patient already enrolled in program".into(),
            ));
        }
        tables.next_enrollment_id += 1;
        enrollment.patient_program_id = tables.next_enrollment_id;
        tables
            .enrollments
            .insert(enrollment.patient_program_id, enrollment.clone());
        Ok(enrollment)
    }

    fn find_enrollment(&self, enrollment_id: i64) -> CdrResult<Option<PatientProgram>> {
        let tables = self.read()?;
        Ok(tables.enrollments.get(&enrollment_id).cloned())
    }

    fn find_enrollment_by_patient_and_program(
        &self,
        patient_id: i64,
        program_id: i32,
    ) -> CdrResult<Option<PatientProgram>> {
        let tables = self.read()?;
        Ok(tables
            .enrollments
            .values()
            .find(|e| e.patient_id == patient_id && e.program_id == program_id)
            .cloned())
    }

    fn update_enrollment(&self, enrollment: PatientProgram) -> CdrResult<PatientProgram> {
        let mut tables = self.write()?;
        if !tables
            .enrollments
            .contains_key(&enrollment.patient_program_id)
        {
            return Err(CdrError::not_found(
                "Patient Enrollment",
                "Id",
                enrollment.patient_program_id,
            ));
        }
        tables
            .enrollments
            .insert(enrollment.patient_program_id, enrollment.clone());
        Ok(enrollment)
    }

    fn list_enrollments_for_patient(&self, patient_id: i64) -> CdrResult<Vec<PatientProgram>> {
        let tables = self.read()?;
        Ok(tables
            .enrollments
            .values()
            .filter(|e| e.patient_id == patient_id && !e.audit.voided)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditTrail;
    use crate::principal::Principal;
    use chrono::NaiveDate;

    const ACTOR: Principal = Principal { person_id: 1 };

    fn patient(id: i64) -> Patient {
        Patient {
            patient_id: id,
            allergies: None,
            audit: AuditTrail::created(ACTOR),
        }
    }

    fn identifier(patient_id: i64, type_id: i32, value: &str, preferred: bool) -> PatientIdentifier {
        PatientIdentifier {
            patient_identifier_id: 0,
            patient_id,
            identifier_type_id: type_id,
            identifier: value.to_string(),
            preferred,
            location_id: 1,
            audit: AuditTrail::created(ACTOR),
        }
    }

    fn enrollment(patient_id: i64, program_id: i32) -> PatientProgram {
        PatientProgram {
            patient_program_id: 0,
            patient_id,
            program_id,
            location_id: 1,
            date_enrolled: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            date_completed: None,
            outcome_concept_id: None,
            outcome_comment: None,
            audit: AuditTrail::created(ACTOR),
        }
    }

    #[test]
    fn insert_identifier_assigns_sequential_ids() {
        let store = MemoryStore::new();
        let a = store.insert_identifier(identifier(1, 1, "A-1", false)).unwrap();
        let b = store.insert_identifier(identifier(1, 1, "A-2", false)).unwrap();
        assert_eq!(a.patient_identifier_id, 1);
        assert_eq!(b.patient_identifier_id, 2);
    }

    #[test]
    fn insert_identifier_rejects_duplicate_value() {
        let store = MemoryStore::new();
        store.insert_identifier(identifier(1, 1, "MRN-1", false)).unwrap();

        let result = store.insert_identifier(identifier(2, 1, "MRN-1", false));

        assert!(matches!(result, Err(CdrError::Conflict(_))));
    }

    #[test]
    fn insert_identifier_rejects_second_preferred_for_same_pair() {
        let store = MemoryStore::new();
        store.insert_identifier(identifier(1, 1, "MRN-1", true)).unwrap();

        let result = store.insert_identifier(identifier(1, 1, "MRN-2", true));

        assert!(matches!(result, Err(CdrError::Conflict(_))));
    }

    #[test]
    fn preferred_constraint_is_scoped_to_the_pair() {
        let store = MemoryStore::new();
        store.insert_identifier(identifier(1, 1, "MRN-1", true)).unwrap();

        // Different type and different patient both stay insertable.
        store.insert_identifier(identifier(1, 2, "NID-1", true)).unwrap();
        store.insert_identifier(identifier(2, 1, "MRN-2", true)).unwrap();
    }

    #[test]
    fn find_preferred_reports_integrity_violation() {
        let store = MemoryStore::new();
        // Forge a corrupt state by bypassing the constraint via direct lock
        // access: two preferred rows for one pair.
        {
            let mut tables = store.inner.write().unwrap();
            for (id, value) in [(10, "X-1"), (11, "X-2")] {
                let mut row = identifier(1, 1, value, true);
                row.patient_identifier_id = id;
                tables.identifiers.insert(id, row);
            }
        }

        let result = store.find_preferred_identifier(1, 1);

        assert!(matches!(result, Err(CdrError::Integrity(_))));
    }

    #[test]
    fn reset_preferred_clears_and_stamps_modified() {
        let store = MemoryStore::new();
        let kept = store.insert_identifier(identifier(1, 1, "MRN-1", true)).unwrap();

        let cleared = store.reset_preferred(1, 1, 9).unwrap();

        assert_eq!(cleared, 1);
        let row = store.find_identifier(kept.patient_identifier_id).unwrap().unwrap();
        assert!(!row.preferred);
        assert_eq!(row.audit.last_modified_by, Some(9));
    }

    #[test]
    fn insert_enrollment_rejects_duplicate_pair_even_when_voided() {
        let store = MemoryStore::new();
        let mut first = enrollment(1, 10);
        first.audit.void_record(ACTOR, "entered in error").unwrap();
        store.insert_enrollment(first).unwrap();

        let result = store.insert_enrollment(enrollment(1, 10));

        assert!(matches!(result, Err(CdrError::Conflict(_))));
    }

    #[test]
    fn voided_patient_hidden_from_default_lookup() {
        let store = MemoryStore::new();
        let mut p = patient(1);
        p.audit.void_record(ACTOR, "duplicate record").unwrap();
        store.insert_patient(p).unwrap();

        assert!(store.find_patient(1, false).unwrap().is_none());
        assert!(store.find_patient(1, true).unwrap().is_some());
    }

    #[test]
    fn program_status_filter_uses_program_active_flag() {
        let store = MemoryStore::new();
        store.insert_patient(patient(1)).unwrap();
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
        store.insert_enrollment(enrollment(1, program.program_id)).unwrap();

        let active = store
            .find_patients_by_program_and_status(program.program_id, true)
            .unwrap();
        let inactive = store
            .find_patients_by_program_and_status(program.program_id, false)
            .unwrap();

        assert_eq!(active.len(), 1);
        assert!(inactive.is_empty());
    }
}
