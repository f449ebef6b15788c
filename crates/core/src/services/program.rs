//! Program catalog: CRUD + void over care program definitions.
//!
//! No cross-entity invariant here beyond name/code uniqueness, which the
//! store enforces.

use std::sync::Arc;

use crate::audit::AuditTrail;
use crate::error::{CdrError, CdrResult};
use crate::model::Program;
use crate::principal::Principal;
use crate::store::ProgramStore;

/// Create/update payload for a program.
#[derive(Clone, Debug)]
pub struct ProgramCommand {
    pub name: String,
    pub program_code: String,
    pub description: Option<String>,
    pub active: bool,
}

pub struct ProgramService {
    programs: Arc<dyn ProgramStore>,
}

impl ProgramService {
    pub fn new(programs: Arc<dyn ProgramStore>) -> Self {
        Self { programs }
    }

    /// Creates a program. Name and code are required.
    pub fn create(&self, actor: Principal, cmd: ProgramCommand) -> CdrResult<Program> {
        validate(&cmd)?;
        let program = Program {
            program_id: 0,
            name: cmd.name,
            program_code: cmd.program_code,
            description: cmd.description,
            active: cmd.active,
            audit: AuditTrail::created(actor),
        };
        let saved = self.programs.insert_program(program)?;
        tracing::info!(program_id = saved.program_id, name = %saved.name, "created program");
        Ok(saved)
    }

    pub fn update(&self, actor: Principal, program_id: i32, cmd: ProgramCommand) -> CdrResult<Program> {
        validate(&cmd)?;
        let mut program = self
            .programs
            .find_program(program_id)?
            .ok_or_else(|| CdrError::not_found("Program", "Id", program_id))?;

        program.name = cmd.name;
        program.program_code = cmd.program_code;
        program.description = cmd.description;
        program.active = cmd.active;
        program.audit.touch(actor);
        self.programs.update_program(program)
    }

    pub fn get(&self, program_id: i32) -> CdrResult<Program> {
        self.programs
            .find_program(program_id)?
            .ok_or_else(|| CdrError::not_found("Program", "Id", program_id))
    }

    /// Non-voided programs.
    pub fn list(&self) -> CdrResult<Vec<Program>> {
        self.programs.list_programs()
    }

    pub fn retire(&self, actor: Principal, program_id: i32, reason: &str) -> CdrResult<()> {
        let mut program = self
            .programs
            .find_program(program_id)?
            .ok_or_else(|| CdrError::not_found("Program", "Id", program_id))?;

        program.audit.void_record(actor, reason)?;
        self.programs.update_program(program)?;
        tracing::info!(program_id, "voided program");
        Ok(())
    }
}

fn validate(cmd: &ProgramCommand) -> CdrResult<()> {
    if cmd.name.trim().is_empty() {
        return Err(CdrError::Validation("program name is required".into()));
    }
    if cmd.program_code.trim().is_empty() {
        return Err(CdrError::Validation("program code is required".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    const ACTOR: Principal = Principal { person_id: 1 };

    fn service() -> ProgramService {
        ProgramService::new(Arc::new(MemoryStore::new()))
    }

    fn cmd(name: &str, code: &str) -> ProgramCommand {
        ProgramCommand {
            name: name.into(),
            program_code: code.into(),
            description: None,
            active: true,
        }
    }

    #[test]
    fn create_requires_name_and_code() {
        let service = service();

        assert!(matches!(
            service.create(ACTOR, cmd("", "TB")),
            Err(CdrError::Validation(_))
        ));
        assert!(matches!(
            service.create(ACTOR, cmd("TB Care", " ")),
            Err(CdrError::Validation(_))
        ));
    }

    #[test]
    fn duplicate_name_is_a_conflict() {
        let service = service();
        service.create(ACTOR, cmd("TB Care", "TB")).unwrap();

        let result = service.create(ACTOR, cmd("TB Care", "TB2"));

        assert!(matches!(result, Err(CdrError::Conflict(_))));
    }

    #[test]
    fn create_then_get_round_trips() {
        let service = service();
        let created = service.create(ACTOR, cmd("TB Care", "TB")).unwrap();

        let fetched = service.get(created.program_id).unwrap();

        assert_eq!(fetched.name, "TB Care");
        assert_eq!(fetched.program_code, "TB");
        assert_eq!(fetched.audit.uuid, created.audit.uuid);
    }

    #[test]
    fn update_stamps_modifier() {
        let service = service();
        let created = service.create(ACTOR, cmd("TB Care", "TB")).unwrap();

        let updated = service
            .update(
                Principal::new(2),
                created.program_id,
                ProgramCommand {
                    description: Some("tuberculosis care".into()),
                    active: false,
                    ..cmd("TB Care", "TB")
                },
            )
            .unwrap();

        assert!(!updated.active);
        assert_eq!(updated.audit.last_modified_by, Some(2));
        assert_eq!(updated.audit.created_by, 1);
    }

    #[test]
    fn voided_program_leaves_listing() {
        let service = service();
        let created = service.create(ACTOR, cmd("TB Care", "TB")).unwrap();

        service
            .retire(ACTOR, created.program_id, "retired program")
            .unwrap();

        assert!(service.list().unwrap().is_empty());
        // Still reachable directly, with the void reason recorded.
        let voided = service.get(created.program_id).unwrap();
        assert_eq!(voided.audit.void_reason.as_deref(), Some("retired program"));
    }
}
