//! Audit trail shared by every persisted entity.
//!
//! Creation, modification and voiding each stamp their own fields; no code
//! path may change persisted state without going through one of these
//! operations. Voiding is logical deletion: the record keeps its data and
//! gains voider/time/reason, it is never physically removed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CdrError, CdrResult};
use crate::principal::Principal;

/// Creation/modification/void metadata embedded in every domain entity.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AuditTrail {
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub last_modified_by: Option<i64>,
    pub last_modified_at: Option<DateTime<Utc>>,
    pub voided: bool,
    pub voided_by: Option<i64>,
    pub voided_at: Option<DateTime<Utc>>,
    pub void_reason: Option<String>,
    /// Globally unique trace id, fixed at creation.
    pub uuid: Uuid,
}

impl AuditTrail {
    /// Stamps a fresh trail for a newly created record: creator and creation
    /// time set, a new trace id, all void fields empty.
    pub fn created(actor: Principal) -> Self {
        Self {
            created_by: actor.person_id,
            created_at: Utc::now(),
            last_modified_by: None,
            last_modified_at: None,
            voided: false,
            voided_by: None,
            voided_at: None,
            void_reason: None,
            uuid: Uuid::new_v4(),
        }
    }

    /// Stamps the last-modified fields. Creation fields are untouched.
    pub fn touch(&mut self, actor: Principal) {
        self.last_modified_by = Some(actor.person_id);
        self.last_modified_at = Some(Utc::now());
    }

    /// Voids the record: requires a non-empty reason, stamps voider and
    /// time, and changes nothing else. Voiding an already-voided record is
    /// a no-op so the first void's audit fields are never overwritten.
    pub fn void_record(&mut self, actor: Principal, reason: &str) -> CdrResult<()> {
        if reason.trim().is_empty() {
            return Err(CdrError::Validation("void reason must not be empty".into()));
        }
        if self.voided {
            return Ok(());
        }
        self.voided = true;
        self.voided_by = Some(actor.person_id);
        self.voided_at = Some(Utc::now());
        self.void_reason = Some(reason.to_string());
        Ok(())
    }
}
