//! Input validation for registrations and new articles.
//!
//! Only shape is checked here. Uniqueness is the store's concern.

use crate::article::NewArticle;
use crate::error::ValidationError;
use crate::slug::derive_slug;

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Blank(field))
    } else {
        Ok(())
    }
}

/// Check that `email` has exactly one `@` with something on both sides.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ValidationError::InvalidEmail(email.to_string())),
    }
}

/// Validate the fields of a registration request.
pub fn validate_registration(
    username: &str,
    email: &str,
    password: &str,
) -> Result<(), ValidationError> {
    require("username", username)?;
    require("email", email)?;
    require("password", password)?;
    validate_email(email)
}

/// Validate a new article, including that its title produces a slug.
pub fn validate_new_article(article: &NewArticle) -> Result<(), ValidationError> {
    require("title", &article.title)?;
    require("description", &article.description)?;
    require("body", &article.body)?;

    if derive_slug(&article.title).as_str().is_empty() {
        return Err(ValidationError::UnsluggableTitle(article.title.clone()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str) -> NewArticle {
        NewArticle {
            title: title.into(),
            description: "d".into(),
            body: "b".into(),
            tag_list: vec![],
        }
    }

    #[test]
    fn test_registration_ok() {
        assert!(validate_registration("alice", "alice@x.com", "secret").is_ok());
    }

    #[test]
    fn test_registration_blank_fields() {
        assert_eq!(
            validate_registration(" ", "alice@x.com", "secret"),
            Err(ValidationError::Blank("username"))
        );
        assert_eq!(
            validate_registration("alice", "alice@x.com", ""),
            Err(ValidationError::Blank("password"))
        );
    }

    #[test]
    fn test_registration_bad_email() {
        for email in ["alice", "@x.com", "alice@", "a@b@c"] {
            assert!(matches!(
                validate_registration("alice", email, "secret"),
                Err(ValidationError::InvalidEmail(_))
            ));
        }
    }

    #[test]
    fn test_article_title_must_slug() {
        assert!(validate_new_article(&article("Hello World")).is_ok());
        assert!(matches!(
            validate_new_article(&article("!!!")),
            Err(ValidationError::UnsluggableTitle(_))
        ));
    }
}
