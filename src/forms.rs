//! Form validation: raw submitted fields in, typed values or per-field
//! errors out. Nothing here touches the database; uniqueness checks stay
//! in the handlers.

use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::entities::diary_entry::Mood;

/// Field name -> message, ordered for stable rendering.
pub type FieldErrors = BTreeMap<String, String>;

fn field(name: &str) -> String {
    name.to_string()
}

fn value<'a>(fields: &'a HashMap<String, String>, name: &str) -> &'a str {
    fields.get(name).map(String::as_str).unwrap_or("").trim()
}

pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username is required".to_string());
    }
    if username.len() < 3 {
        return Err("Username must be at least 3 characters long".to_string());
    }
    if username.len() > 32 {
        return Err("Username must be at most 32 characters long".to_string());
    }

    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = USERNAME_REGEX
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("Failed to compile username regex"));

    if !regex.is_match(username) {
        return Err("Username can only contain letters, numbers, and underscores".to_string());
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }
    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }
    if password.len() < 8 {
        return Err("Password must be at least 8 characters long".to_string());
    }
    if password.len() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err("Password must contain at least one letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain at least one digit".to_string());
    }
    Ok(())
}

/// Registration form. Username uniqueness is checked by the handler
/// against the users table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterForm {
    pub fn parse(fields: &HashMap<String, String>) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();

        let username = value(fields, "username");
        if let Err(msg) = validate_username(username) {
            errors.insert(field("username"), msg);
        }

        let email = value(fields, "email");
        if let Err(msg) = validate_email(email) {
            errors.insert(field("email"), msg);
        }

        let password = fields.get("password").map(String::as_str).unwrap_or("");
        if let Err(msg) = validate_password(password) {
            errors.insert(field("password"), msg);
        }

        let confirm = fields
            .get("password_confirm")
            .map(String::as_str)
            .unwrap_or("");
        if password != confirm {
            errors.insert(field("password_confirm"), "Passwords do not match".to_string());
        }

        if errors.is_empty() {
            Ok(RegisterForm {
                username: username.to_string(),
                email: email.to_string(),
                password: password.to_string(),
            })
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn parse(fields: &HashMap<String, String>) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();

        let username = value(fields, "username");
        if username.is_empty() {
            errors.insert(field("username"), "Username is required".to_string());
        }

        let password = fields.get("password").map(String::as_str).unwrap_or("");
        if password.is_empty() {
            errors.insert(field("password"), "Password is required".to_string());
        }

        if errors.is_empty() {
            Ok(LoginForm {
                username: username.to_string(),
                password: password.to_string(),
            })
        } else {
            Err(errors)
        }
    }
}

/// Create/edit form for a diary entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryForm {
    pub title: String,
    pub content: String,
    pub mood: Option<Mood>,
    pub tags: String,
    pub is_favorite: bool,
}

impl EntryForm {
    pub fn parse(fields: &HashMap<String, String>) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();

        let title = value(fields, "title");
        if title.chars().count() > 200 {
            errors.insert(field("title"), "Title must be at most 200 characters".to_string());
        }

        let content = value(fields, "content");
        if content.is_empty() {
            errors.insert(field("content"), "Content is required".to_string());
        }

        let mood = match value(fields, "mood") {
            "" => None,
            raw => match Mood::parse(raw) {
                Some(m) => Some(m),
                None => {
                    errors.insert(field("mood"), "Unknown mood".to_string());
                    None
                }
            },
        };

        let tags = value(fields, "tags");
        if tags.chars().count() > 255 {
            errors.insert(field("tags"), "Tags must be at most 255 characters".to_string());
        }

        let is_favorite = checkbox(fields, "is_favorite");

        if errors.is_empty() {
            Ok(EntryForm {
                title: title.to_string(),
                content: content.to_string(),
                mood,
                tags: tags.to_string(),
                is_favorite,
            })
        } else {
            Err(errors)
        }
    }
}

/// Edit form for the user profile. The avatar file travels separately in
/// the multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileForm {
    pub bio: String,
    pub birth_date: Option<NaiveDate>,
}

impl ProfileForm {
    pub fn parse(fields: &HashMap<String, String>) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();

        let bio = value(fields, "bio");
        if bio.chars().count() > 500 {
            errors.insert(field("bio"), "Bio must be at most 500 characters".to_string());
        }

        let birth_date = match value(fields, "birth_date") {
            "" => None,
            raw => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                Ok(d) => Some(d),
                Err(_) => {
                    errors.insert(field("birth_date"), "Enter a valid date (YYYY-MM-DD)".to_string());
                    None
                }
            },
        };

        if errors.is_empty() {
            Ok(ProfileForm {
                bio: bio.to_string(),
                birth_date,
            })
        } else {
            Err(errors)
        }
    }
}

/// HTML checkboxes submit "on" when ticked and nothing otherwise.
fn checkbox(fields: &HashMap<String, String>, name: &str) -> bool {
    matches!(
        fields.get(name).map(String::as_str),
        Some("on") | Some("true") | Some("1")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn register_accepts_valid_input() {
        let form = RegisterForm::parse(&fields(&[
            ("username", "ann"),
            ("email", "ann@x.com"),
            ("password", "Str0ngPass!"),
            ("password_confirm", "Str0ngPass!"),
        ]))
        .unwrap();
        assert_eq!(form.username, "ann");
        assert_eq!(form.email, "ann@x.com");
    }

    #[test]
    fn register_rejects_mismatched_passwords() {
        let errors = RegisterForm::parse(&fields(&[
            ("username", "ann"),
            ("email", "ann@x.com"),
            ("password", "Str0ngPass!"),
            ("password_confirm", "Str0ngPass"),
        ]))
        .unwrap_err();
        assert!(errors.contains_key("password_confirm"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn register_collects_all_field_errors() {
        let errors = RegisterForm::parse(&fields(&[
            ("username", ""),
            ("email", "not-an-email"),
            ("password", "short"),
            ("password_confirm", "other"),
        ]))
        .unwrap_err();
        assert!(errors.contains_key("username"));
        assert!(errors.contains_key("email"));
        assert!(errors.contains_key("password"));
        assert!(errors.contains_key("password_confirm"));
    }

    #[test]
    fn password_policy_requires_letter_and_digit() {
        assert!(validate_password("12345678").is_err());
        assert!(validate_password("abcdefgh").is_err());
        assert!(validate_password("abcdef12").is_ok());
        assert!(validate_password("Str0ngPass!").is_ok());
    }

    #[test]
    fn entry_requires_content_but_not_title() {
        let form = EntryForm::parse(&fields(&[
            ("title", ""),
            ("content", "Day one"),
            ("mood", "happy"),
            ("tags", "work,win"),
        ]))
        .unwrap();
        assert_eq!(form.title, "");
        assert_eq!(form.content, "Day one");
        assert_eq!(form.mood, Some(Mood::Happy));
        assert!(!form.is_favorite);

        let errors = EntryForm::parse(&fields(&[("content", "")])).unwrap_err();
        assert!(errors.contains_key("content"));
    }

    #[test]
    fn entry_rejects_unknown_mood_and_keeps_empty_as_none() {
        let errors =
            EntryForm::parse(&fields(&[("content", "x"), ("mood", "furious")])).unwrap_err();
        assert!(errors.contains_key("mood"));

        let form = EntryForm::parse(&fields(&[("content", "x"), ("mood", "")])).unwrap();
        assert_eq!(form.mood, None);
    }

    #[test]
    fn entry_checkbox_defaults_to_false() {
        let form = EntryForm::parse(&fields(&[("content", "x")])).unwrap();
        assert!(!form.is_favorite);

        let form =
            EntryForm::parse(&fields(&[("content", "x"), ("is_favorite", "on")])).unwrap();
        assert!(form.is_favorite);
    }

    #[test]
    fn profile_parses_optional_birth_date() {
        let form = ProfileForm::parse(&fields(&[("bio", "hi"), ("birth_date", "1990-05-01")]))
            .unwrap();
        assert_eq!(form.birth_date, Some(NaiveDate::from_ymd_opt(1990, 5, 1).unwrap()));

        let form = ProfileForm::parse(&fields(&[("bio", "hi")])).unwrap();
        assert_eq!(form.birth_date, None);

        let errors =
            ProfileForm::parse(&fields(&[("birth_date", "01.05.1990")])).unwrap_err();
        assert!(errors.contains_key("birth_date"));
    }

    #[test]
    fn profile_rejects_overlong_bio() {
        let long_bio = "x".repeat(501);
        let errors = ProfileForm::parse(&fields(&[("bio", &long_bio)])).unwrap_err();
        assert!(errors.contains_key("bio"));
    }
}
