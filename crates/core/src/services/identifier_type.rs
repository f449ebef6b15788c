//! Identifier type catalog: CRUD + void over identifier schemas.

use std::sync::Arc;

use crate::audit::AuditTrail;
use crate::error::{CdrError, CdrResult};
use crate::model::PatientIdentifierType;
use crate::principal::Principal;
use crate::store::IdentifierTypeStore;

/// Create/update payload for an identifier type. The name is fixed at
/// creation; updates cover the descriptive and validation fields.
#[derive(Clone, Debug)]
pub struct IdentifierTypeCommand {
    pub name: String,
    pub description: Option<String>,
    pub format: Option<String>,
    pub required: bool,
    pub is_unique: bool,
    pub format_hint: Option<String>,
    pub validator: Option<String>,
}

pub struct IdentifierTypeService {
    identifier_types: Arc<dyn IdentifierTypeStore>,
}

impl IdentifierTypeService {
    pub fn new(identifier_types: Arc<dyn IdentifierTypeStore>) -> Self {
        Self { identifier_types }
    }

    pub fn create(
        &self,
        actor: Principal,
        cmd: IdentifierTypeCommand,
    ) -> CdrResult<PatientIdentifierType> {
        if cmd.name.trim().is_empty() {
            return Err(CdrError::Validation(
                "identifier type name is required".into(),
            ));
        }
        let identifier_type = PatientIdentifierType {
            patient_identifier_type_id: 0,
            name: cmd.name,
            description: cmd.description,
            format: cmd.format,
            required: cmd.required,
            is_unique: cmd.is_unique,
            format_hint: cmd.format_hint,
            validator: cmd.validator,
            audit: AuditTrail::created(actor),
        };
        let saved = self.identifier_types.insert_identifier_type(identifier_type)?;
        tracing::info!(
            type_id = saved.patient_identifier_type_id,
            name = %saved.name,
            "created identifier type"
        );
        Ok(saved)
    }

    pub fn update(
        &self,
        actor: Principal,
        type_id: i32,
        cmd: IdentifierTypeCommand,
    ) -> CdrResult<PatientIdentifierType> {
        let mut identifier_type = self
            .identifier_types
            .find_identifier_type(type_id)?
            .ok_or_else(|| CdrError::not_found("Patient Identifier Type", "Id", type_id))?;

        identifier_type.description = cmd.description;
        identifier_type.format = cmd.format;
        identifier_type.required = cmd.required;
        identifier_type.is_unique = cmd.is_unique;
        identifier_type.format_hint = cmd.format_hint;
        identifier_type.validator = cmd.validator;
        identifier_type.audit.touch(actor);
        self.identifier_types.update_identifier_type(identifier_type)
    }

    pub fn get(&self, type_id: i32) -> CdrResult<PatientIdentifierType> {
        self.identifier_types
            .find_identifier_type(type_id)?
            .ok_or_else(|| CdrError::not_found("Patient Identifier Type", "Id", type_id))
    }

    /// Non-voided identifier types.
    pub fn list(&self) -> CdrResult<Vec<PatientIdentifierType>> {
        self.identifier_types.list_identifier_types()
    }

    pub fn retire(&self, actor: Principal, type_id: i32, reason: &str) -> CdrResult<()> {
        let mut identifier_type = self
            .identifier_types
            .find_identifier_type(type_id)?
            .ok_or_else(|| CdrError::not_found("Patient Identifier Type", "Id", type_id))?;

        identifier_type.audit.void_record(actor, reason)?;
        self.identifier_types.update_identifier_type(identifier_type)?;
        tracing::info!(type_id, "voided identifier type");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    const ACTOR: Principal = Principal { person_id: 1 };

    fn service() -> IdentifierTypeService {
        IdentifierTypeService::new(Arc::new(MemoryStore::new()))
    }

    fn cmd(name: &str) -> IdentifierTypeCommand {
        IdentifierTypeCommand {
            name: name.into(),
            description: None,
            format: None,
            required: false,
            is_unique: true,
            format_hint: None,
            validator: None,
        }
    }

    #[test]
    fn create_requires_a_name() {
        let result = service().create(ACTOR, cmd("  "));
        assert!(matches!(result, Err(CdrError::Validation(_))));
    }

    #[test]
    fn duplicate_name_is_a_conflict() {
        let service = service();
        service.create(ACTOR, cmd("MRN")).unwrap();

        assert!(matches!(
            service.create(ACTOR, cmd("MRN")),
            Err(CdrError::Conflict(_))
        ));
    }

    #[test]
    fn update_does_not_change_the_name() {
        let service = service();
        let created = service.create(ACTOR, cmd("MRN")).unwrap();

        let updated = service
            .update(
                ACTOR,
                created.patient_identifier_type_id,
                IdentifierTypeCommand {
                    description: Some("medical record number".into()),
                    ..cmd("renamed")
                },
            )
            .unwrap();

        assert_eq!(updated.name, "MRN");
        assert_eq!(
            updated.description.as_deref(),
            Some("medical record number")
        );
    }

    #[test]
    fn voided_type_leaves_listing() {
        let service = service();
        let created = service.create(ACTOR, cmd("MRN")).unwrap();

        service
            .retire(ACTOR, created.patient_identifier_type_id, "superseded")
            .unwrap();

        assert!(service.list().unwrap().is_empty());
    }
}
