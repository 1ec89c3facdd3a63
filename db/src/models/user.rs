use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub profile_picture: Option<String>,
    /// Cost per hour in GBP.
    pub cost: Option<BigDecimal>,
    pub subject_ids: Vec<i32>,
    pub subject_level_ids: Vec<i32>,
    pub qts_certificate: Option<String>,
    pub dbs_certificate: Option<String>,
    pub documents_approved: bool,
    pub referee1_name: String,
    pub referee1_email: String,
    pub referee2_name: String,
    pub referee2_email: String,
    pub references_approved: bool,
    pub id_check_completed: bool,
    pub is_staff: bool,
    pub is_active: bool,
    pub is_superuser: bool,
    pub date_joined: NaiveDateTime,
}

impl User {
    /// A tutor is listable once every vetting step has passed and the
    /// tutoring details are filled in.
    pub fn is_profile_complete(&self) -> bool {
        if !self.documents_approved {
            return false;
        }
        if !self.references_approved {
            return false;
        }
        if !self.id_check_completed {
            return false;
        }
        if !self.has_cost() {
            return false;
        }
        if self.subject_ids.is_empty() {
            return false;
        }
        if self.subject_level_ids.is_empty() {
            return false;
        }
        true
    }

    /// Zero counts as unset.
    pub fn has_cost(&self) -> bool {
        self.cost
            .as_ref()
            .is_some_and(|cost| *cost != BigDecimal::from(0))
    }
}

/// Administrator-owned flags shown next to a tutor's profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VerificationStatus {
    pub documents_approved: bool,
    pub references_approved: bool,
    pub id_check_completed: bool,
    pub profile_complete: bool,
}

impl VerificationStatus {
    pub fn of(user: &User) -> Self {
        VerificationStatus {
            documents_approved: user.documents_approved,
            references_approved: user.references_approved,
            id_check_completed: user.id_check_completed,
            profile_complete: user.is_profile_complete(),
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct AuthCredentials {
    pub user_id: Uuid,
    pub password_hash: String,
}
