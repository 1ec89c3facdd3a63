use std::{collections::BTreeSet, fmt, str::FromStr};

use db::models::user::User;
use serde::Serialize;

/// Fields a tutor may submit on the profile edit form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileField {
    ProfilePicture,
    FirstName,
    LastName,
    DateOfBirth,
    Cost,
    Subjects,
    SubjectLevels,
    QtsCertificate,
    DbsCertificate,
    Referee1Name,
    Referee1Email,
    Referee2Name,
    Referee2Email,
}

/// How a field is entered and rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Email,
    Date,
    Decimal,
    MultiSelect,
    Image,
    File,
}

impl ProfileField {
    pub const ALL: [ProfileField; 13] = [
        ProfileField::ProfilePicture,
        ProfileField::FirstName,
        ProfileField::LastName,
        ProfileField::DateOfBirth,
        ProfileField::Cost,
        ProfileField::Subjects,
        ProfileField::SubjectLevels,
        ProfileField::QtsCertificate,
        ProfileField::DbsCertificate,
        ProfileField::Referee1Name,
        ProfileField::Referee1Email,
        ProfileField::Referee2Name,
        ProfileField::Referee2Email,
    ];

    pub const CERTIFICATES: [ProfileField; 2] =
        [ProfileField::QtsCertificate, ProfileField::DbsCertificate];

    pub const REFEREES: [ProfileField; 4] = [
        ProfileField::Referee1Name,
        ProfileField::Referee1Email,
        ProfileField::Referee2Name,
        ProfileField::Referee2Email,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileField::ProfilePicture => "profile_picture",
            ProfileField::FirstName => "first_name",
            ProfileField::LastName => "last_name",
            ProfileField::DateOfBirth => "date_of_birth",
            ProfileField::Cost => "cost",
            ProfileField::Subjects => "subjects",
            ProfileField::SubjectLevels => "subject_levels",
            ProfileField::QtsCertificate => "qts_certificate",
            ProfileField::DbsCertificate => "dbs_certificate",
            ProfileField::Referee1Name => "referee1_name",
            ProfileField::Referee1Email => "referee1_email",
            ProfileField::Referee2Name => "referee2_name",
            ProfileField::Referee2Email => "referee2_email",
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            ProfileField::ProfilePicture => FieldKind::Image,
            ProfileField::FirstName
            | ProfileField::LastName
            | ProfileField::Referee1Name
            | ProfileField::Referee2Name => FieldKind::Text,
            ProfileField::Referee1Email | ProfileField::Referee2Email => FieldKind::Email,
            ProfileField::DateOfBirth => FieldKind::Date,
            ProfileField::Cost => FieldKind::Decimal,
            ProfileField::Subjects | ProfileField::SubjectLevels => FieldKind::MultiSelect,
            ProfileField::QtsCertificate | ProfileField::DbsCertificate => FieldKind::File,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProfileField::ProfilePicture => "Profile picture",
            ProfileField::FirstName => "First name",
            ProfileField::LastName => "Last name",
            ProfileField::DateOfBirth => "Date of birth",
            ProfileField::Cost => "Cost per hour (£)",
            ProfileField::Subjects => "Subjects",
            ProfileField::SubjectLevels => "Subject levels",
            ProfileField::QtsCertificate => "QTS certificate",
            ProfileField::DbsCertificate => "DBS certificate",
            ProfileField::Referee1Name => "Referee 1 name",
            ProfileField::Referee1Email => "Referee 1 email",
            ProfileField::Referee2Name => "Referee 2 name",
            ProfileField::Referee2Email => "Referee 2 email",
        }
    }

    /// Maximum character length for text inputs.
    pub fn max_length(&self) -> Option<usize> {
        match self {
            ProfileField::FirstName | ProfileField::LastName => Some(150),
            ProfileField::Referee1Name
            | ProfileField::Referee1Email
            | ProfileField::Referee2Name
            | ProfileField::Referee2Email => Some(200),
            _ => None,
        }
    }
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileField {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProfileField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or(())
    }
}

/// The approval flags that lock parts of the profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApprovalState {
    pub documents_approved: bool,
    pub references_approved: bool,
}

impl ApprovalState {
    pub fn of(user: &User) -> Self {
        ApprovalState {
            documents_approved: user.documents_approved,
            references_approved: user.references_approved,
        }
    }
}

/// Fields a request may modify given the tutor's current approvals.
///
/// Approved certificates and approved references drop out of the set
/// entirely; the referee fields always leave together.
pub fn editable_fields(state: ApprovalState) -> BTreeSet<ProfileField> {
    let mut fields: BTreeSet<ProfileField> = ProfileField::ALL.into_iter().collect();
    if state.documents_approved {
        for field in ProfileField::CERTIFICATES {
            fields.remove(&field);
        }
    }
    if state.references_approved {
        for field in ProfileField::REFEREES {
            fields.remove(&field);
        }
    }
    fields
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn names_round_trip() {
        for field in ProfileField::ALL {
            assert_eq!(field.as_str().parse::<ProfileField>(), Ok(field));
        }
        assert!("documents_approved".parse::<ProfileField>().is_err());
    }

    #[rstest]
    #[case(false, false, 13)]
    #[case(true, false, 11)]
    #[case(false, true, 9)]
    #[case(true, true, 7)]
    fn approvals_shrink_the_set(
        #[case] documents_approved: bool,
        #[case] references_approved: bool,
        #[case] expected: usize,
    ) {
        let fields = editable_fields(ApprovalState {
            documents_approved,
            references_approved,
        });
        assert_eq!(fields.len(), expected);

        for field in ProfileField::CERTIFICATES {
            assert_eq!(fields.contains(&field), !documents_approved);
        }
        for field in ProfileField::REFEREES {
            assert_eq!(fields.contains(&field), !references_approved);
        }
    }

    #[test]
    fn personal_and_tutoring_fields_are_always_editable() {
        let locked = editable_fields(ApprovalState {
            documents_approved: true,
            references_approved: true,
        });
        for field in [
            ProfileField::ProfilePicture,
            ProfileField::FirstName,
            ProfileField::LastName,
            ProfileField::DateOfBirth,
            ProfileField::Cost,
            ProfileField::Subjects,
            ProfileField::SubjectLevels,
        ] {
            assert!(locked.contains(&field), "{field} should stay editable");
        }
    }
}
