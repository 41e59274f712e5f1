use sea_orm::Database;

use engine::{AuthConfig, DentistNew, Engine, EngineError, PatientNew, PatientPatch, Role};
use migration::MigratorTrait;

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder()
        .database(db)
        .auth(AuthConfig {
            jwt_secret: "test-secret".to_string(),
            token_ttl_secs: 3600,
            bcrypt_cost: 4,
        })
        .build()
        .await
        .unwrap()
}

#[tokio::test]
async fn register_then_login() {
    let engine = engine_with_db().await;

    let (user, token) = engine
        .register("Ana Admin", " Ana@Clinica.com ", "secret123", None)
        .await
        .unwrap();
    assert_eq!(user.email, "ana@clinica.com");
    assert_eq!(user.role, Role::Funcionaria);

    let claims = engine.verify_token(&token).unwrap();
    assert_eq!(claims.id, user.id);
    assert_eq!(claims.email, "ana@clinica.com");
    assert_eq!(claims.role, Role::Funcionaria);

    let (logged, token) = engine.login("ANA@clinica.com", "secret123").await.unwrap();
    assert_eq!(logged.id, user.id);
    assert_eq!(engine.verify_token(&token).unwrap().id, user.id);

    let profile = engine.profile(user.id).await.unwrap();
    assert_eq!(profile, user);
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let engine = engine_with_db().await;
    engine
        .register("Ana Admin", "ana@clinica.com", "secret123", Some(Role::Admin))
        .await
        .unwrap();
    let err = engine
        .register("Other Ana", "ANA@clinica.com", "secret456", None)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("email".to_string()));
    assert_eq!(engine.user_count().await.unwrap(), 1);
}

#[tokio::test]
async fn login_failures_look_the_same() {
    let engine = engine_with_db().await;
    engine
        .register("Ana Admin", "ana@clinica.com", "secret123", None)
        .await
        .unwrap();

    let unknown = engine
        .login("nobody@clinica.com", "secret123")
        .await
        .unwrap_err();
    let wrong = engine
        .login("ana@clinica.com", "wrong-password")
        .await
        .unwrap_err();
    assert_eq!(unknown, EngineError::InvalidCredentials);
    assert_eq!(wrong, EngineError::InvalidCredentials);
    assert_eq!(unknown.to_string(), wrong.to_string());
}

#[tokio::test]
async fn profile_of_missing_user_is_not_found() {
    let engine = engine_with_db().await;
    assert_eq!(
        engine.profile(42).await.unwrap_err(),
        EngineError::KeyNotFound("user".to_string())
    );
}

#[tokio::test]
async fn builder_requires_a_secret() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    let err = Engine::builder().database(db).build().await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[tokio::test]
async fn duplicate_cro_is_rejected() {
    let engine = engine_with_db().await;
    let dentist = DentistNew {
        name: "Dr. Paulo".to_string(),
        cro: "SP-1".to_string(),
        ..DentistNew::default()
    };
    let created = engine.new_dentist(&dentist).await.unwrap();
    assert!(created.active);
    assert_eq!(
        engine.new_dentist(&dentist).await.unwrap_err(),
        EngineError::ExistingKey("cro".to_string())
    );

    let other = engine
        .new_dentist(&DentistNew {
            name: "Dra. Lucia".to_string(),
            cro: "SP-2".to_string(),
            active: Some(false),
            ..DentistNew::default()
        })
        .await
        .unwrap();
    assert_eq!(
        engine
            .update_dentist(other.id, &dentist)
            .await
            .unwrap_err(),
        EngineError::ExistingKey("cro".to_string())
    );

    let active: Vec<_> = engine
        .active_dentists()
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.cro)
        .collect();
    assert_eq!(active, vec!["SP-1".to_string()]);
}

#[tokio::test]
async fn patient_update_keeps_or_clears_contacts() {
    let engine = engine_with_db().await;
    let patient = engine
        .new_patient(&PatientNew {
            name: "Maria Silva".to_string(),
            phone: Some("11999990000".to_string()),
            email: Some("maria@example.com".to_string()),
        })
        .await
        .unwrap();

    let renamed = engine
        .update_patient(
            patient.id,
            &PatientPatch {
                name: Some("Maria S. Silva".to_string()),
                ..PatientPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Maria S. Silva");
    assert_eq!(renamed.phone.as_deref(), Some("11999990000"));
    assert_eq!(renamed.email.as_deref(), Some("maria@example.com"));

    let cleared = engine
        .update_patient(
            patient.id,
            &PatientPatch {
                phone: Some(None),
                email: Some(Some("  ".to_string())),
                ..PatientPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.phone, None);
    assert_eq!(cleared.email, None);
    assert_eq!(cleared.name, "Maria S. Silva");

    assert_eq!(
        engine
            .update_patient(999, &PatientPatch::default())
            .await
            .unwrap_err(),
        EngineError::KeyNotFound("patient".to_string())
    );
}
