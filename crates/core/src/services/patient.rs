//! Patient directory: aggregate-level patient operations.
//!
//! Composes the store, audit behaviour and the external demographic
//! service. Creating a patient is deliberately decoupled from creating its
//! Person record: the patient id is expected to already correspond to a
//! Person id assigned by the demographic service.
//!
//! Failure policy for the demographic service is asymmetric and
//! deliberate: reads degrade to an empty demographic portion, while the
//! void path aborts when the external void fails, leaving the local record
//! untouched.

use std::sync::Arc;

use std::collections::BTreeSet;

use crate::audit::AuditTrail;
use crate::clients::{DemographicClient, LocationRecord, MetadataClient, PersonRecord};
use crate::error::{CdrError, CdrResult};
use crate::model::{Patient, PatientIdentifier, PatientProgram};
use crate::principal::Principal;
use crate::store::{EnrollmentStore, IdentifierStore, PatientStore};

/// Command to register a patient.
#[derive(Clone, Debug)]
pub struct RegisterPatientCommand {
    /// Person id assigned by the demographic service.
    pub patient_id: i64,
    pub allergies: Option<String>,
}

/// A patient merged with its externally owned demographic record and its
/// related rows. `person` is `None` when the demographic service is
/// unavailable or has no record.
#[derive(Clone, Debug)]
pub struct HydratedPatient {
    pub patient: Patient,
    pub person: Option<PersonRecord>,
    pub identifiers: Vec<PatientIdentifier>,
    pub enrollments: Vec<PatientProgram>,
    /// Locations referenced by the identifiers/enrollments above, as far
    /// as the metadata service could resolve them.
    pub locations: Vec<LocationRecord>,
}

/// The patient directory service.
pub struct PatientService {
    patients: Arc<dyn PatientStore>,
    identifiers: Arc<dyn IdentifierStore>,
    enrollments: Arc<dyn EnrollmentStore>,
    demographics: Arc<dyn DemographicClient>,
    metadata: Arc<dyn MetadataClient>,
}

impl PatientService {
    pub fn new(
        patients: Arc<dyn PatientStore>,
        identifiers: Arc<dyn IdentifierStore>,
        enrollments: Arc<dyn EnrollmentStore>,
        demographics: Arc<dyn DemographicClient>,
        metadata: Arc<dyn MetadataClient>,
    ) -> Self {
        Self {
            patients,
            identifiers,
            enrollments,
            demographics,
            metadata,
        }
    }

    /// Registers a patient with the locally owned clinical fields.
    ///
    /// # Errors
    ///
    /// - `Validation` if the patient id is not positive.
    /// - `Conflict` if the id is already registered.
    pub fn register(&self, actor: Principal, cmd: RegisterPatientCommand) -> CdrResult<Patient> {
        if cmd.patient_id <= 0 {
            return Err(CdrError::Validation(
                "patient_id must be a positive person id".into(),
            ));
        }
        let patient = Patient {
            patient_id: cmd.patient_id,
            allergies: cmd.allergies,
            audit: AuditTrail::created(actor),
        };
        let saved = self.patients.insert_patient(patient)?;
        tracing::info!(patient_id = saved.patient_id, "registered patient");
        Ok(saved)
    }

    /// Updates the patient's clinical note. Only `allergies` is mutable.
    pub fn update(
        &self,
        actor: Principal,
        patient_id: i64,
        allergies: Option<String>,
    ) -> CdrResult<Patient> {
        let mut patient = self
            .patients
            .find_patient(patient_id, false)?
            .ok_or_else(|| CdrError::not_found("Patient", "Id", patient_id))?;

        patient.allergies = allergies;
        patient.audit.touch(actor);
        self.patients.update_patient(patient)
    }

    /// Voids a patient.
    ///
    /// The external Person void runs first; if it fails the whole
    /// operation aborts with `Upstream` and the local record is left
    /// unvoided. Only then is the local record voided.
    pub async fn retire(&self, actor: Principal, patient_id: i64, reason: &str) -> CdrResult<()> {
        if reason.trim().is_empty() {
            return Err(CdrError::Validation("void reason must not be empty".into()));
        }

        tracing::info!(patient_id, "voiding person record");
        self.demographics.delete_person(patient_id, reason).await?;

        let mut patient = self
            .patients
            .find_patient(patient_id, false)?
            .ok_or_else(|| CdrError::not_found("Patient", "Id", patient_id))?;
        patient.audit.void_record(actor, reason)?;
        self.patients.update_patient(patient)?;
        tracing::info!(patient_id, "voided patient");
        Ok(())
    }

    /// Fetches one patient, hydrated with demographic data and related
    /// rows.
    pub async fn get(&self, patient_id: i64) -> CdrResult<HydratedPatient> {
        let patient = self
            .patients
            .find_patient(patient_id, false)?
            .ok_or_else(|| CdrError::not_found("Patient", "Id", patient_id))?;
        self.hydrate(patient).await
    }

    /// Merges a patient with its Person record, identifiers and
    /// enrollments. A demographic fetch failure degrades to `person: None`
    /// and is never an error.
    pub async fn hydrate(&self, patient: Patient) -> CdrResult<HydratedPatient> {
        let person = match self.demographics.get_person(patient.patient_id, false).await {
            Ok(person) => person,
            Err(err) => {
                tracing::warn!(
                    patient_id = patient.patient_id,
                    error = %err,
                    "demographic fetch failed, returning patient without person data"
                );
                None
            }
        };
        let identifiers = self.identifiers.list_identifiers_for_patient(patient.patient_id)?;
        let enrollments = self.enrollments.list_enrollments_for_patient(patient.patient_id)?;

        let location_ids: BTreeSet<i32> = identifiers
            .iter()
            .map(|i| i.location_id)
            .chain(enrollments.iter().map(|e| e.location_id))
            .collect();
        let mut locations = Vec::new();
        for location_id in location_ids {
            match self.metadata.get_location(location_id).await {
                Ok(Some(location)) => locations.push(location),
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(location_id, error = %err, "location lookup failed, skipping");
                }
            }
        }

        Ok(HydratedPatient {
            patient,
            person,
            identifiers,
            enrollments,
            locations,
        })
    }

    /// Finds the patient carrying a non-voided identifier with this value.
    pub fn find_by_identifier(&self, value: &str) -> CdrResult<Patient> {
        let identifier = self
            .identifiers
            .find_identifier_by_value(value)?
            .ok_or_else(|| CdrError::not_found("Patient", "Identifier", value))?;
        self.patients
            .find_patient(identifier.patient_id, false)?
            .ok_or_else(|| CdrError::not_found("Patient", "Identifier", value))
    }

    pub fn list_active(&self) -> CdrResult<Vec<Patient>> {
        self.patients.list_active_patients()
    }

    /// All patients, voided ones included.
    pub fn list_including_voided(&self) -> CdrResult<Vec<Patient>> {
        self.patients.list_all_patients()
    }

    pub fn list_by_program(&self, program_id: i32) -> CdrResult<Vec<Patient>> {
        self.patients.find_patients_by_program(program_id)
    }

    pub fn list_by_program_and_status(
        &self,
        program_id: i32,
        active: bool,
    ) -> CdrResult<Vec<Patient>> {
        self.patients
            .find_patients_by_program_and_status(program_id, active)
    }

    pub fn list_by_identifier_type(&self, type_id: i32) -> CdrResult<Vec<Patient>> {
        self.patients.find_patients_by_identifier_type(type_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const ACTOR: Principal = Principal { person_id: 1 };

    /// Demographic fake with a switchable failure mode.
    struct FakeDemographics {
        fail: bool,
        person: Option<PersonRecord>,
        deletes: AtomicUsize,
    }

    impl FakeDemographics {
        fn healthy(person: Option<PersonRecord>) -> Self {
            Self {
                fail: false,
                person,
                deletes: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                person: None,
                deletes: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl DemographicClient for FakeDemographics {
        async fn get_person(
            &self,
            _person_id: i64,
            _include_voided: bool,
        ) -> CdrResult<Option<PersonRecord>> {
            if self.fail {
                return Err(CdrError::Upstream("demographic service down".into()));
            }
            Ok(self.person.clone())
        }

        async fn add_person(&self, person: PersonRecord) -> CdrResult<PersonRecord> {
            if self.fail {
                return Err(CdrError::Upstream("demographic service down".into()));
            }
            Ok(person)
        }

        async fn delete_person(&self, _person_id: i64, _reason: &str) -> CdrResult<()> {
            if self.fail {
                return Err(CdrError::Upstream("demographic service down".into()));
            }
            self.deletes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Metadata fake that resolves every id, or fails, or knows nothing.
    struct FakeMetadata {
        fail: bool,
    }

    #[async_trait]
    impl MetadataClient for FakeMetadata {
        async fn get_location(&self, location_id: i32) -> CdrResult<Option<LocationRecord>> {
            if self.fail {
                return Err(CdrError::Upstream("metadata service down".into()));
            }
            Ok(Some(LocationRecord {
                location_id,
                name: format!("Clinic {location_id}"),
            }))
        }
    }

    fn service_with(demographics: Arc<FakeDemographics>) -> (PatientService, Arc<MemoryStore>) {
        service_with_metadata(demographics, Arc::new(FakeMetadata { fail: false }))
    }

    fn service_with_metadata(
        demographics: Arc<FakeDemographics>,
        metadata: Arc<FakeMetadata>,
    ) -> (PatientService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let service = PatientService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            demographics,
            metadata,
        );
        (service, store)
    }

    #[test]
    fn register_rejects_non_positive_id() {
        let (service, _) = service_with(Arc::new(FakeDemographics::healthy(None)));

        let result = service.register(
            ACTOR,
            RegisterPatientCommand {
                patient_id: 0,
                allergies: None,
            },
        );

        assert!(matches!(result, Err(CdrError::Validation(_))));
    }

    #[test]
    fn register_then_fetch_round_trips_business_fields() {
        let (service, store) = service_with(Arc::new(FakeDemographics::healthy(None)));

        let created = service
            .register(
                ACTOR,
                RegisterPatientCommand {
                    patient_id: 1,
                    allergies: Some("penicillin".into()),
                },
            )
            .unwrap();

        let fetched = store.find_patient(1, false).unwrap().unwrap();
        assert_eq!(fetched.allergies.as_deref(), Some("penicillin"));
        assert_eq!(fetched.audit.created_by, 1);
        assert_eq!(fetched.audit.uuid, created.audit.uuid);
    }

    #[test]
    fn update_keeps_creation_fields_stable() {
        let (service, _) = service_with(Arc::new(FakeDemographics::healthy(None)));
        let created = service
            .register(
                ACTOR,
                RegisterPatientCommand {
                    patient_id: 1,
                    allergies: None,
                },
            )
            .unwrap();

        let updated = service
            .update(Principal::new(2), 1, Some("latex".into()))
            .unwrap();

        assert_eq!(updated.audit.created_by, created.audit.created_by);
        assert_eq!(updated.audit.created_at, created.audit.created_at);
        assert_eq!(updated.audit.last_modified_by, Some(2));
        assert_eq!(updated.allergies.as_deref(), Some("latex"));
    }

    #[tokio::test]
    async fn hydrate_attaches_person_when_available() {
        let person = PersonRecord {
            person_id: 1,
            first_name: Some("Ada".into()),
            ..Default::default()
        };
        let (service, _) = service_with(Arc::new(FakeDemographics::healthy(Some(person))));
        service
            .register(
                ACTOR,
                RegisterPatientCommand {
                    patient_id: 1,
                    allergies: None,
                },
            )
            .unwrap();

        let hydrated = service.get(1).await.unwrap();

        assert_eq!(
            hydrated.person.unwrap().first_name.as_deref(),
            Some("Ada")
        );
    }

    #[tokio::test]
    async fn hydrate_degrades_to_empty_person_on_upstream_failure() {
        let (service, _) = service_with(Arc::new(FakeDemographics::failing()));
        service
            .register(
                ACTOR,
                RegisterPatientCommand {
                    patient_id: 1,
                    allergies: None,
                },
            )
            .unwrap();

        let hydrated = service.get(1).await.unwrap();

        assert!(hydrated.person.is_none());
        assert_eq!(hydrated.patient.patient_id, 1);
    }

    #[tokio::test]
    async fn hydrate_resolves_referenced_locations_and_tolerates_metadata_failure() {
        for metadata_fails in [false, true] {
            let (service, store) = service_with_metadata(
                Arc::new(FakeDemographics::healthy(None)),
                Arc::new(FakeMetadata {
                    fail: metadata_fails,
                }),
            );
            service
                .register(
                    ACTOR,
                    RegisterPatientCommand {
                        patient_id: 1,
                        allergies: None,
                    },
                )
                .unwrap();
            store
                .insert_identifier(crate::model::PatientIdentifier {
                    patient_identifier_id: 0,
                    patient_id: 1,
                    identifier_type_id: 1,
                    identifier: "12345".into(),
                    preferred: true,
                    location_id: 3,
                    audit: AuditTrail::created(ACTOR),
                })
                .unwrap();

            let hydrated = service.get(1).await.unwrap();

            if metadata_fails {
                assert!(hydrated.locations.is_empty());
            } else {
                assert_eq!(hydrated.locations.len(), 1);
                assert_eq!(hydrated.locations[0].name, "Clinic 3");
            }
        }
    }

    #[tokio::test]
    async fn retire_aborts_before_local_void_when_upstream_fails() {
        let (service, store) = service_with(Arc::new(FakeDemographics::failing()));
        service
            .register(
                ACTOR,
                RegisterPatientCommand {
                    patient_id: 1,
                    allergies: None,
                },
            )
            .unwrap();

        let result = service.retire(ACTOR, 1, "duplicate record").await;

        assert!(matches!(result, Err(CdrError::Upstream(_))));
        let patient = store.find_patient(1, false).unwrap();
        assert!(patient.is_some_and(|p| !p.audit.voided));
    }

    #[tokio::test]
    async fn retire_voids_locally_after_external_void() {
        let demographics = Arc::new(FakeDemographics::healthy(None));
        let (service, store) = service_with(demographics.clone());
        service
            .register(
                ACTOR,
                RegisterPatientCommand {
                    patient_id: 1,
                    allergies: None,
                },
            )
            .unwrap();

        service.retire(ACTOR, 1, "duplicate record").await.unwrap();

        assert_eq!(demographics.deletes.load(Ordering::SeqCst), 1);
        assert!(service.list_active().unwrap().is_empty());
        let all = service.list_including_voided().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].audit.void_reason.as_deref(), Some("duplicate record"));
    }

    #[tokio::test]
    async fn retire_with_empty_reason_never_reaches_upstream() {
        let demographics = Arc::new(FakeDemographics::healthy(None));
        let (service, _) = service_with(demographics.clone());
        service
            .register(
                ACTOR,
                RegisterPatientCommand {
                    patient_id: 1,
                    allergies: None,
                },
            )
            .unwrap();

        let result = service.retire(ACTOR, 1, "  ").await;

        assert!(matches!(result, Err(CdrError::Validation(_))));
        assert_eq!(demographics.deletes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn find_by_identifier_ignores_voided_identifiers() {
        let (service, store) = service_with(Arc::new(FakeDemographics::healthy(None)));
        service
            .register(
                ACTOR,
                RegisterPatientCommand {
                    patient_id: 1,
                    allergies: None,
                },
            )
            .unwrap();
        let mut identifier = crate::model::PatientIdentifier {
            patient_identifier_id: 0,
            patient_id: 1,
            identifier_type_id: 1,
            identifier: "12345".into(),
            preferred: true,
            location_id: 1,
            audit: AuditTrail::created(ACTOR),
        };
        identifier.audit.void_record(ACTOR, "typo").unwrap();
        store.insert_identifier(identifier).unwrap();

        let result = service.find_by_identifier("12345");

        assert!(matches!(result, Err(CdrError::NotFound { .. })));
    }
}
