//! Session - The signed-in user, passed explicitly into submit requests.
//!
//! The portal keeps the signed-in user as a JSON blob next to the bearer
//! token. [`SessionContext::from_json`] reads that blob; nothing in the
//! crate looks the session up on its own.
//!
//! # Example
//!
//! ```ignore
//! use vault_pin_tui::session::{Role, SessionContext};
//!
//! let session = SessionContext::from_json(r#"{"_id": "d-17", "name": "Dr. Rao"}"#)?
//!     .with_role(Role::Doctor)
//!     .with_token("eyJhbGci...");
//!
//! assert_eq!(session.bearer_header().as_deref(), Some("Bearer eyJhbGci..."));
//! ```

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Patient,
    Doctor,
    Admin,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorInfo {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub specialization: String,
}

/// Authenticated user context attached to every submit.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredSession")]
pub struct SessionContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    pub role: Role,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_phone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor: Option<DoctorInfo>,
}

/// Stored user blob. The user id may arrive as `user_id`, `id` or `_id`,
/// sometimes several at once; they are taken in that order.
#[derive(Deserialize)]
struct StoredSession {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    role: Role,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "_id")]
    mongo_id: Option<String>,
    #[serde(default, alias = "phone")]
    patient_phone: Option<String>,
    #[serde(default)]
    doctor: Option<DoctorInfo>,
}

impl From<StoredSession> for SessionContext {
    fn from(stored: StoredSession) -> Self {
        Self {
            token: stored.token,
            role: stored.role,
            user_id: stored.user_id.or(stored.id).or(stored.mongo_id),
            patient_phone: stored.patient_phone,
            doctor: stored.doctor,
        }
    }
}

impl SessionContext {
    /// Parse a stored user blob.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn with_doctor(mut self, doctor: DoctorInfo) -> Self {
        self.role = Role::Doctor;
        self.doctor = Some(doctor);
        self
    }

    /// `Authorization` header value, when signed in.
    pub fn bearer_header(&self) -> Option<String> {
        self.token.as_ref().map(|token| format!("Bearer {token}"))
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}
