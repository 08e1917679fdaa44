mod common;

use assert_matches::assert_matches;
use common::TestApp;
use tienda360_api::auth::{AuthError, LoginRequest, RegisterRequest};

#[tokio::test]
async fn registro_y_login_emiten_tokens_validos() {
    let app = TestApp::new().await;

    let registro = app
        .auth
        .register(RegisterRequest {
            email: "Dueno@Tienda.com".to_string(),
            password: "clave-larga-123".to_string(),
            nombre: "Almacén Don José".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(registro.token_type, "Bearer");
    // email is normalized on the way in
    assert_eq!(registro.email, "dueno@tienda.com");

    let claims = app.auth.validate_token(&registro.access_token).unwrap();
    assert_eq!(claims.sub, registro.uid);

    let login = app
        .auth
        .login(LoginRequest {
            email: "dueno@tienda.com".to_string(),
            password: "clave-larga-123".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(login.uid, registro.uid);
}

#[tokio::test]
async fn email_duplicado_es_rechazado() {
    let app = TestApp::new().await;
    app.registrar_tenant("unico@test.com").await;

    let err = app
        .auth
        .register(RegisterRequest {
            email: "unico@test.com".to_string(),
            password: "otra-clave-123".to_string(),
            nombre: "Otra tienda".to_string(),
        })
        .await
        .unwrap_err();
    assert_matches!(err, AuthError::EmailTaken);
}

#[tokio::test]
async fn credenciales_incorrectas_fallan() {
    let app = TestApp::new().await;
    app.registrar_tenant("clave@test.com").await;

    let err = app
        .auth
        .login(LoginRequest {
            email: "clave@test.com".to_string(),
            password: "clave-equivocada".to_string(),
        })
        .await
        .unwrap_err();
    assert_matches!(err, AuthError::WrongCredentials);

    let err = app
        .auth
        .login(LoginRequest {
            email: "nadie@test.com".to_string(),
            password: "da-igual-la-clave".to_string(),
        })
        .await
        .unwrap_err();
    assert_matches!(err, AuthError::WrongCredentials);
}

#[tokio::test]
async fn token_adulterado_es_invalido() {
    let app = TestApp::new().await;
    let registro = app
        .auth
        .register(RegisterRequest {
            email: "token@test.com".to_string(),
            password: "clave-larga-123".to_string(),
            nombre: "Tienda".to_string(),
        })
        .await
        .unwrap();

    let mut token = registro.access_token;
    token.push('x');
    assert!(app.auth.validate_token(&token).is_err());
}
