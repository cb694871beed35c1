use uuid::Uuid;

use crate::engine::lifecycle::OrderDraft;
use crate::error::AppError;

/// Accumulated per-field findings, reported together as one validation error
/// in the form "field - problem; field - problem".
#[derive(Debug, Default)]
pub struct Findings {
    items: Vec<String>,
}

impl Findings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reject(&mut self, field: &str, message: &str) {
        self.items.push(format!("{field} - {message}"));
    }

    pub fn into_result(self) -> Result<(), AppError> {
        if self.items.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.items.join("; ")))
        }
    }
}

pub fn check_name(findings: &mut Findings, name: &str) {
    let length = name.trim().chars().count();
    if !(2..=50).contains(&length) {
        findings.reject("name", "should be between 2 and 50 characters");
    }
}

pub fn check_address(findings: &mut Findings, field: &str, address: &str) {
    let length = address.trim().chars().count();
    if !(2..=100).contains(&length) {
        findings.reject(field, "should be between 2 and 100 characters");
    }
}

/// "+7" followed by exactly ten digits.
pub fn check_phone_number(findings: &mut Findings, phone_number: &str) {
    let valid = phone_number
        .strip_prefix("+7")
        .is_some_and(|digits| digits.len() == 10 && digits.chars().all(|c| c.is_ascii_digit()));
    if !valid {
        findings.reject("phone_number", "must match the format +7XXXXXXXXXX");
    }
}

pub fn check_email(findings: &mut Findings, email: &str) {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    };
    if !valid {
        findings.reject("email", "should be a valid email address");
    }
}

pub fn check_inn(findings: &mut Findings, inn: &str) {
    if inn.len() != 12 || !inn.chars().all(|c| c.is_ascii_digit()) {
        findings.reject("inn", "should consist of exactly 12 digits");
    }
}

/// At least 8 characters with a digit, a lowercase and an uppercase letter.
pub fn check_password(findings: &mut Findings, password: &str) {
    let long_enough = password.chars().count() >= 8;
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());

    if !(long_enough && has_digit && has_lower && has_upper) {
        findings.reject(
            "password",
            "should contain at least one number, one lowercase and one uppercase letter, and be at least 8 characters long",
        );
    }
}

pub fn check_passwords_match(findings: &mut Findings, password: &str, confirm_password: &str) {
    if password != confirm_password {
        findings.reject("confirm_password", "passwords do not match");
    }
}

/// Rejects the field when another row already holds the value. `current`
/// excludes the row being edited from conflicting with itself.
pub fn check_unique(
    findings: &mut Findings,
    field: &str,
    message: &str,
    existing: Option<Uuid>,
    current: Option<Uuid>,
) {
    if let Some(owner) = existing {
        if current != Some(owner) {
            findings.reject(field, message);
        }
    }
}

pub fn order_draft(draft: &OrderDraft) -> Result<(), AppError> {
    let mut findings = Findings::new();
    check_address(&mut findings, "sender_address", &draft.sender_address);
    check_address(&mut findings, "delivery_address", &draft.delivery_address);
    findings.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_finding(run: impl FnOnce(&mut Findings)) -> Option<String> {
        let mut findings = Findings::new();
        run(&mut findings);
        match findings.into_result() {
            Ok(()) => None,
            Err(AppError::Validation(msg)) => Some(msg),
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn phone_number_format() {
        assert!(single_finding(|f| check_phone_number(f, "+79991234567")).is_none());
        assert!(single_finding(|f| check_phone_number(f, "+7999123456")).is_some());
        assert!(single_finding(|f| check_phone_number(f, "+89991234567")).is_some());
        assert!(single_finding(|f| check_phone_number(f, "+7999123456a")).is_some());
    }

    #[test]
    fn inn_is_twelve_digits() {
        assert!(single_finding(|f| check_inn(f, "123412341234")).is_none());
        assert!(single_finding(|f| check_inn(f, "12341234123")).is_some());
        assert!(single_finding(|f| check_inn(f, "12341234123x")).is_some());
    }

    #[test]
    fn password_policy() {
        assert!(single_finding(|f| check_password(f, "100100100Gt")).is_none());
        assert!(single_finding(|f| check_password(f, "short1A")).is_some());
        assert!(single_finding(|f| check_password(f, "alllowercase1")).is_some());
        assert!(single_finding(|f| check_password(f, "NODIGITSHERE")).is_some());
    }

    #[test]
    fn email_shape() {
        assert!(single_finding(|f| check_email(f, "user@example.com")).is_none());
        assert!(single_finding(|f| check_email(f, "user.example.com")).is_some());
        assert!(single_finding(|f| check_email(f, "@example.com")).is_some());
    }

    #[test]
    fn uniqueness_excludes_the_row_being_edited() {
        let row = Uuid::new_v4();

        assert!(single_finding(|f| {
            check_unique(f, "email", "already taken", Some(row), Some(row))
        })
        .is_none());
        assert!(single_finding(|f| {
            check_unique(f, "email", "already taken", Some(row), None)
        })
        .is_some());
        assert!(
            single_finding(|f| { check_unique(f, "email", "already taken", None, None) }).is_none()
        );
    }

    #[test]
    fn findings_join_with_semicolons() {
        let mut findings = Findings::new();
        check_phone_number(&mut findings, "bad");
        check_inn(&mut findings, "bad");

        let message = match findings.into_result() {
            Err(AppError::Validation(msg)) => msg,
            other => panic!("unexpected: {other:?}"),
        };
        assert!(message.contains("phone_number - "));
        assert!(message.contains("; inn - "));
    }
}
