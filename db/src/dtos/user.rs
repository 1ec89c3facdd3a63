use bigdecimal::BigDecimal;
use chrono::NaiveDate;

pub struct UserCreateRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub password_hash: String,
    pub is_staff: bool,
    pub is_superuser: bool,
}

/// Partial update produced by the profile form.
///
/// `None` leaves a column untouched. Approval flags have no slot here, so the
/// self-service path cannot write them.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProfileChanges {
    pub profile_picture: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<Option<NaiveDate>>,
    pub cost: Option<Option<BigDecimal>>,
    pub subject_ids: Option<Vec<i32>>,
    pub subject_level_ids: Option<Vec<i32>>,
    pub qts_certificate: Option<String>,
    pub dbs_certificate: Option<String>,
    pub referee1_name: Option<String>,
    pub referee1_email: Option<String>,
    pub referee2_name: Option<String>,
    pub referee2_email: Option<String>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        *self == ProfileChanges::default()
    }

    /// True when any column on `users` itself changes, as opposed to only
    /// the subject associations.
    pub fn touches_columns(&self) -> bool {
        self.profile_picture.is_some()
            || self.first_name.is_some()
            || self.last_name.is_some()
            || self.date_of_birth.is_some()
            || self.cost.is_some()
            || self.qts_certificate.is_some()
            || self.dbs_certificate.is_some()
            || self.referee1_name.is_some()
            || self.referee1_email.is_some()
            || self.referee2_name.is_some()
            || self.referee2_email.is_some()
    }
}

/// Administrator review of a tutor. Only flags that are present change.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
pub struct VerificationUpdate {
    pub documents_approved: Option<bool>,
    pub references_approved: Option<bool>,
    pub id_check_completed: Option<bool>,
}

impl VerificationUpdate {
    pub fn is_empty(&self) -> bool {
        *self == VerificationUpdate::default()
    }
}

/// Admin list filters. Every filter is optional; `search` matches email and
/// names case-insensitively.
#[derive(Debug, Default, Clone, serde::Deserialize)]
pub struct UserFilter {
    pub search: Option<String>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
    pub is_active: Option<bool>,
    pub documents_approved: Option<bool>,
    pub references_approved: Option<bool>,
    pub id_check_completed: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_only_changes_skip_column_update() {
        let changes = ProfileChanges {
            subject_ids: Some(vec![1, 2]),
            ..Default::default()
        };
        assert!(!changes.is_empty());
        assert!(!changes.touches_columns());
    }

    #[test]
    fn clearing_cost_counts_as_change() {
        let changes = ProfileChanges {
            cost: Some(None),
            ..Default::default()
        };
        assert!(changes.touches_columns());
        assert!(ProfileChanges::default().is_empty());
    }
}
