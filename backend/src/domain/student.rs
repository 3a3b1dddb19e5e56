//! Student accounts, registration input and profile changes.
//!
//! A student is identified internally by a numeric [`StudentId`] and
//! externally by a roll number (the `student_id` field on the wire). Roll
//! number, email and phone are each unique across all accounts.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use zeroize::Zeroizing;

use super::validation::required_text;
use super::{Error, PasswordDigest, ValidationError};

/// Database identifier of a student account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(i64);

impl StudentId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Raw identifier value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stored student account. Never carries password material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    /// Database identifier.
    pub id: StudentId,
    /// Institution roll number, unique.
    pub roll_number: String,
    /// Display name.
    pub name: String,
    /// Lower-cased email address, unique.
    pub email: String,
    /// Phone number, unique.
    pub phone: String,
    /// Emergency contact number.
    pub emergency_contact: String,
    /// Hostel room assignment.
    pub hostel_room: String,
    /// Blood group as entered at registration.
    pub blood_group: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last profile change timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Account fields that must be unique across students.
///
/// Variants are declared in conflict-reporting priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UniqueStudentField {
    /// Roll number (`student_id` on the wire).
    RollNumber,
    /// Email address.
    Email,
    /// Phone number.
    Phone,
}

impl UniqueStudentField {
    /// Wire name of the field.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RollNumber => "student_id",
            Self::Email => "email",
            Self::Phone => "phone",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::RollNumber => "student id",
            Self::Email => "email",
            Self::Phone => "phone number",
        }
    }

    /// Domain error reported when the field is already taken.
    ///
    /// # Examples
    /// ```
    /// use campus_portal::domain::{ErrorCode, UniqueStudentField};
    ///
    /// let err = UniqueStudentField::Email.conflict_error();
    /// assert_eq!(err.code(), ErrorCode::Conflict);
    /// assert_eq!(err.field(), Some("email"));
    /// ```
    #[must_use]
    pub fn conflict_error(self) -> Error {
        Error::conflict(format!("{} already registered", self.label())).with_details(json!({
            "field": self.as_str(),
            "code": format!("duplicate_{}", self.as_str()),
        }))
    }
}

impl fmt::Display for UniqueStudentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values probed for uniqueness before a write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UniquenessProbe {
    /// Roll number to probe, if any.
    pub roll_number: Option<String>,
    /// Email to probe, if any.
    pub email: Option<String>,
    /// Phone to probe, if any.
    pub phone: Option<String>,
}

impl UniquenessProbe {
    /// Return `true` when there is nothing to probe.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roll_number.is_none() && self.email.is_none() && self.phone.is_none()
    }

    /// Whether `student` collides with any probed value.
    #[must_use]
    pub fn matches(&self, student: &Student) -> bool {
        self.colliding_fields(student).next().is_some()
    }

    /// First colliding field across `existing`, in priority order.
    ///
    /// `ignore` excludes the account being updated from the comparison.
    #[must_use]
    pub fn first_conflict(
        &self,
        existing: &[Student],
        ignore: Option<StudentId>,
    ) -> Option<UniqueStudentField> {
        existing
            .iter()
            .filter(|student| Some(student.id) != ignore)
            .flat_map(|student| self.colliding_fields(student))
            .min()
    }

    fn colliding_fields<'a>(
        &'a self,
        student: &'a Student,
    ) -> impl Iterator<Item = UniqueStudentField> + 'a {
        let roll = self
            .roll_number
            .as_deref()
            .filter(|value| *value == student.roll_number)
            .map(|_| UniqueStudentField::RollNumber);
        let email = self
            .email
            .as_deref()
            .filter(|value| *value == student.email)
            .map(|_| UniqueStudentField::Email);
        let phone = self
            .phone
            .as_deref()
            .filter(|value| *value == student.phone)
            .map(|_| UniqueStudentField::Phone);
        roll.into_iter().chain(email).chain(phone)
    }
}

/// Raw, unvalidated registration input.
#[derive(Debug, Clone, Default)]
pub struct StudentDraft {
    /// Roll number.
    pub student_id: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Email address.
    pub email: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// Plaintext password.
    pub password: Option<Zeroizing<String>>,
    /// Emergency contact number.
    pub emergency_contact: Option<String>,
    /// Hostel room.
    pub hostel_room: Option<String>,
    /// Blood group.
    pub blood_group: Option<String>,
}

/// Validated registration input.
///
/// ## Invariants
/// - every text field is trimmed and non-empty;
/// - `email` is lower-cased and contains `@`;
/// - the password is kept verbatim and zeroised on drop.
#[derive(Clone)]
pub struct StudentRegistration {
    roll_number: String,
    name: String,
    email: String,
    phone: String,
    password: Zeroizing<String>,
    emergency_contact: String,
    hostel_room: String,
    blood_group: String,
}

impl fmt::Debug for StudentRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StudentRegistration")
            .field("roll_number", &self.roll_number)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("password", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl StudentRegistration {
    /// Validate a draft, reporting the first missing or invalid field.
    ///
    /// Fields are checked in the order `student_id`, `name`, `email`, `phone`,
    /// `password`, `emergency_contact`, `hostel_room`, `blood_group`.
    pub fn try_from_draft(draft: StudentDraft) -> Result<Self, ValidationError> {
        let roll_number = required_text("student_id", draft.student_id.as_deref())?;
        let name = required_text("name", draft.name.as_deref())?;
        let email = normalise_email(required_text("email", draft.email.as_deref())?)?;
        let phone = required_text("phone", draft.phone.as_deref())?;
        let password = match draft.password {
            Some(password) if !password.is_empty() => password,
            _ => return Err(ValidationError::missing("password")),
        };
        let emergency_contact =
            required_text("emergency_contact", draft.emergency_contact.as_deref())?;
        let hostel_room = required_text("hostel_room", draft.hostel_room.as_deref())?;
        let blood_group = required_text("blood_group", draft.blood_group.as_deref())?;

        Ok(Self {
            roll_number,
            name,
            email,
            phone,
            password,
            emergency_contact,
            hostel_room,
            blood_group,
        })
    }

    /// Roll number.
    #[must_use]
    pub fn roll_number(&self) -> &str {
        &self.roll_number
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Normalised email.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Phone number.
    #[must_use]
    pub fn phone(&self) -> &str {
        &self.phone
    }

    /// Plaintext password, for hashing only.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Emergency contact.
    #[must_use]
    pub fn emergency_contact(&self) -> &str {
        &self.emergency_contact
    }

    /// Hostel room.
    #[must_use]
    pub fn hostel_room(&self) -> &str {
        &self.hostel_room
    }

    /// Blood group.
    #[must_use]
    pub fn blood_group(&self) -> &str {
        &self.blood_group
    }

    /// Probe covering all three unique fields.
    #[must_use]
    pub fn uniqueness_probe(&self) -> UniquenessProbe {
        UniquenessProbe {
            roll_number: Some(self.roll_number.clone()),
            email: Some(self.email.clone()),
            phone: Some(self.phone.clone()),
        }
    }
}

/// Account ready to be stored, with its password already hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    /// Roll number.
    pub roll_number: String,
    /// Display name.
    pub name: String,
    /// Normalised email.
    pub email: String,
    /// Phone number.
    pub phone: String,
    /// Password hash.
    pub digest: PasswordDigest,
    /// Emergency contact.
    pub emergency_contact: String,
    /// Hostel room.
    pub hostel_room: String,
    /// Blood group.
    pub blood_group: String,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

impl NewStudent {
    /// Combine a validated registration with its password hash.
    #[must_use]
    pub fn from_registration(
        registration: &StudentRegistration,
        digest: PasswordDigest,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            roll_number: registration.roll_number.clone(),
            name: registration.name.clone(),
            email: registration.email.clone(),
            phone: registration.phone.clone(),
            digest,
            emergency_contact: registration.emergency_contact.clone(),
            hostel_room: registration.hostel_room.clone(),
            blood_group: registration.blood_group.clone(),
            created_at,
        }
    }
}

/// Raw, unvalidated profile update. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProfileDraft {
    /// New display name.
    pub name: Option<String>,
    /// New email address.
    pub email: Option<String>,
    /// New phone number.
    pub phone: Option<String>,
    /// New emergency contact.
    pub emergency_contact: Option<String>,
    /// New hostel room.
    pub hostel_room: Option<String>,
    /// New blood group.
    pub blood_group: Option<String>,
}

/// Validated profile changes with at least one field set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    /// New display name.
    pub name: Option<String>,
    /// New email address, lower-cased.
    pub email: Option<String>,
    /// New phone number.
    pub phone: Option<String>,
    /// New emergency contact.
    pub emergency_contact: Option<String>,
    /// New hostel room.
    pub hostel_room: Option<String>,
    /// New blood group.
    pub blood_group: Option<String>,
}

impl ProfileChanges {
    /// Validate a draft. Supplied fields must not be blank.
    pub fn try_from_draft(draft: ProfileDraft) -> Result<Self, ValidationError> {
        fn present(
            field: &'static str,
            value: Option<String>,
        ) -> Result<Option<String>, ValidationError> {
            value
                .map(|text| required_text(field, Some(&text)))
                .transpose()
        }

        let changes = Self {
            name: present("name", draft.name)?,
            email: present("email", draft.email)?
                .map(normalise_email)
                .transpose()?,
            phone: present("phone", draft.phone)?,
            emergency_contact: present("emergency_contact", draft.emergency_contact)?,
            hostel_room: present("hostel_room", draft.hostel_room)?,
            blood_group: present("blood_group", draft.blood_group)?,
        };

        if changes == Self::default() {
            return Err(ValidationError::invalid(
                "profile",
                "must change at least one field",
            ));
        }
        Ok(changes)
    }

    /// Probe covering the unique fields being changed.
    #[must_use]
    pub fn uniqueness_probe(&self) -> UniquenessProbe {
        UniquenessProbe {
            roll_number: None,
            email: self.email.clone(),
            phone: self.phone.clone(),
        }
    }

    /// Apply the changes to an in-memory copy of a student.
    pub fn apply_to(&self, student: &mut Student, updated_at: DateTime<Utc>) {
        let assign = |target: &mut String, value: &Option<String>| {
            if let Some(value) = value {
                target.clone_from(value);
            }
        };
        assign(&mut student.name, &self.name);
        assign(&mut student.email, &self.email);
        assign(&mut student.phone, &self.phone);
        assign(&mut student.emergency_contact, &self.emergency_contact);
        assign(&mut student.hostel_room, &self.hostel_room);
        assign(&mut student.blood_group, &self.blood_group);
        student.updated_at = updated_at;
    }
}

fn normalise_email(email: String) -> Result<String, ValidationError> {
    let email = email.to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(ValidationError::invalid("email", "must be an email address")),
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    #[fixture]
    fn draft() -> StudentDraft {
        StudentDraft {
            student_id: Some(" 21CS001 ".to_owned()),
            name: Some("Asha Rao".to_owned()),
            email: Some("Asha@Example.edu".to_owned()),
            phone: Some("9999999999".to_owned()),
            password: Some(Zeroizing::new("s3cret pass".to_owned())),
            emergency_contact: Some("8888888888".to_owned()),
            hostel_room: Some("A-101".to_owned()),
            blood_group: Some("O+".to_owned()),
        }
    }

    fn student(id: i64, roll: &str, email: &str, phone: &str) -> Student {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).single().expect("valid time");
        Student {
            id: StudentId::new(id),
            roll_number: roll.to_owned(),
            name: "Someone".to_owned(),
            email: email.to_owned(),
            phone: phone.to_owned(),
            emergency_contact: "1".to_owned(),
            hostel_room: "B-2".to_owned(),
            blood_group: "A+".to_owned(),
            created_at: at,
            updated_at: at,
        }
    }

    #[rstest]
    fn registration_normalises_fields(draft: StudentDraft) {
        let registration = StudentRegistration::try_from_draft(draft).expect("valid draft");
        assert_eq!(registration.roll_number(), "21CS001");
        assert_eq!(registration.email(), "asha@example.edu");
        assert_eq!(registration.password(), "s3cret pass");
    }

    #[rstest]
    #[case::roll(|d: &mut StudentDraft| d.student_id = None, "student_id")]
    #[case::name(|d: &mut StudentDraft| d.name = Some("  ".to_owned()), "name")]
    #[case::password(|d: &mut StudentDraft| d.password = None, "password")]
    #[case::blood(|d: &mut StudentDraft| d.blood_group = None, "blood_group")]
    fn registration_reports_missing_field(
        mut draft: StudentDraft,
        #[case] mutate: fn(&mut StudentDraft),
        #[case] field: &str,
    ) {
        mutate(&mut draft);
        let err = StudentRegistration::try_from_draft(draft).expect_err("must fail");
        assert_eq!(err.field(), field);
    }

    #[rstest]
    fn registration_reports_first_missing_field_in_order(mut draft: StudentDraft) {
        draft.phone = None;
        draft.hostel_room = None;
        let err = StudentRegistration::try_from_draft(draft).expect_err("must fail");
        assert_eq!(err, ValidationError::missing("phone"));
    }

    #[rstest]
    fn registration_rejects_malformed_email(mut draft: StudentDraft) {
        draft.email = Some("not-an-email".to_owned());
        let err = StudentRegistration::try_from_draft(draft).expect_err("must fail");
        assert_eq!(err.field(), "email");
    }

    #[rstest]
    fn first_conflict_prefers_roll_number(draft: StudentDraft) {
        let registration = StudentRegistration::try_from_draft(draft).expect("valid draft");
        let existing = vec![
            student(1, "OTHER", "asha@example.edu", "1"),
            student(2, "21CS001", "x@example.edu", "2"),
        ];
        let conflict = registration
            .uniqueness_probe()
            .first_conflict(&existing, None);
        assert_eq!(conflict, Some(UniqueStudentField::RollNumber));
    }

    #[rstest]
    fn first_conflict_prefers_email_over_phone(draft: StudentDraft) {
        let registration = StudentRegistration::try_from_draft(draft).expect("valid draft");
        let existing = vec![
            student(1, "A", "z@example.edu", "9999999999"),
            student(2, "B", "asha@example.edu", "3"),
        ];
        let conflict = registration
            .uniqueness_probe()
            .first_conflict(&existing, None);
        assert_eq!(conflict, Some(UniqueStudentField::Email));
    }

    #[test]
    fn first_conflict_ignores_the_updated_account() {
        let changes = ProfileChanges {
            phone: Some("42".to_owned()),
            ..ProfileChanges::default()
        };
        let existing = vec![student(7, "A", "a@example.edu", "42")];
        let probe = changes.uniqueness_probe();
        assert_eq!(probe.first_conflict(&existing, Some(StudentId::new(7))), None);
        assert_eq!(
            probe.first_conflict(&existing, Some(StudentId::new(8))),
            Some(UniqueStudentField::Phone)
        );
    }

    #[test]
    fn profile_changes_require_one_field() {
        let err = ProfileChanges::try_from_draft(ProfileDraft::default()).expect_err("empty");
        assert_eq!(err.field(), "profile");
    }

    #[test]
    fn profile_changes_reject_blank_values() {
        let draft = ProfileDraft {
            hostel_room: Some("   ".to_owned()),
            ..ProfileDraft::default()
        };
        let err = ProfileChanges::try_from_draft(draft).expect_err("blank");
        assert_eq!(err, ValidationError::missing("hostel_room"));
    }

    #[test]
    fn profile_changes_apply_only_supplied_fields() {
        let mut target = student(1, "A", "a@example.edu", "1");
        let draft = ProfileDraft {
            email: Some("New@Example.edu".to_owned()),
            hostel_room: Some("C-3".to_owned()),
            ..ProfileDraft::default()
        };
        let changes = ProfileChanges::try_from_draft(draft).expect("valid");
        let later = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).single().expect("valid time");
        changes.apply_to(&mut target, later);
        assert_eq!(target.email, "new@example.edu");
        assert_eq!(target.hostel_room, "C-3");
        assert_eq!(target.name, "Someone");
        assert_eq!(target.updated_at, later);
    }

    #[test]
    fn conflict_error_carries_field_code() {
        let err = UniqueStudentField::RollNumber.conflict_error();
        assert_eq!(err.field(), Some("student_id"));
        assert_eq!(
            err.details().and_then(|d| d.get("code")).and_then(|c| c.as_str()),
            Some("duplicate_student_id")
        );
    }
}
