//! Sign-in flow with real scrypt hashing.

use inkwell::store::{MemoryStore, Store};
use inkwell::{Blog, BlogConfig, BlogError, LoginRequest, NewUser, ScryptCredentials, UserChanges};

fn blog() -> Blog<MemoryStore, ScryptCredentials> {
    let config = BlogConfig {
        token_secret: "integration-secret".into(),
        ..BlogConfig::default()
    };
    Blog::new(MemoryStore::new(), ScryptCredentials, config)
}

#[tokio::test]
async fn register_login_and_change_password() {
    let blog = blog();
    let session = blog
        .register(NewUser {
            username: "jake".into(),
            email: "jake@jake.jake".into(),
            password: "jakejake".into(),
        })
        .await
        .unwrap();

    let stored = blog.store().password_hash(&session.user.email).unwrap();
    assert!(stored.starts_with("$scrypt$"));

    let login = |password: &str| LoginRequest {
        email: "jake@jake.jake".into(),
        password: password.into(),
    };
    blog.login(login("jakejake")).await.unwrap();
    assert!(matches!(
        blog.login(login("wrong")).await,
        Err(BlogError::InvalidCredential)
    ));

    blog.update_user(
        &session.user.email,
        UserChanges {
            password: Some("newpass".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    blog.login(login("newpass")).await.unwrap();
    assert!(matches!(
        blog.login(login("jakejake")).await,
        Err(BlogError::InvalidCredential)
    ));
}

#[tokio::test]
async fn tokens_from_another_secret_are_rejected() {
    let blog = blog();
    let session = blog
        .register(NewUser {
            username: "jake".into(),
            email: "jake@jake.jake".into(),
            password: "jakejake".into(),
        })
        .await
        .unwrap();

    let other = Blog::new(MemoryStore::new(), ScryptCredentials, BlogConfig::default());
    assert!(matches!(
        other.authenticate(&session.token),
        Err(BlogError::InvalidToken)
    ));
    assert_eq!(blog.authenticate(&session.token).unwrap(), session.user.email);
}
