use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    AuthConfig, BudgetItemDraft, BudgetNew, BudgetPatch, BudgetStatus, DentistNew, Engine,
    EngineError, Money, PatientNew, Role,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection, i32) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .auth(AuthConfig {
            jwt_secret: "test-secret".to_string(),
            bcrypt_cost: 4,
            ..AuthConfig::default()
        })
        .build()
        .await
        .unwrap();
    let user = engine
        .create_user("Ana Admin", "ana@clinica.com", "secret123", Role::Admin)
        .await
        .unwrap();
    (engine, db, user.id)
}

async fn new_patient(engine: &Engine, name: &str) -> i32 {
    engine
        .new_patient(&PatientNew {
            name: name.to_string(),
            phone: Some("11 99999-0000".to_string()),
            email: None,
        })
        .await
        .unwrap()
        .id
}

async fn new_dentist(engine: &Engine, cro: &str) -> i32 {
    engine
        .new_dentist(&DentistNew {
            name: "Dr. Paulo".to_string(),
            cro: cro.to_string(),
            specialty: Some("Ortodontia".to_string()),
            ..DentistNew::default()
        })
        .await
        .unwrap()
        .id
}

fn item(description: &str, cents: i64, quantity: i64) -> BudgetItemDraft {
    BudgetItemDraft::new(description, Money::new(cents), quantity)
}

async fn count_rows(db: &DatabaseConnection, sql: &str) -> i64 {
    let row = db
        .query_one(Statement::from_string(db.get_database_backend(), sql))
        .await
        .unwrap()
        .unwrap();
    row.try_get_by_index::<i64>(0).unwrap()
}

#[tokio::test]
async fn new_budget_computes_totals_and_hydrates() {
    let (engine, _db, user_id) = engine_with_db().await;
    let patient_id = new_patient(&engine, "Maria Silva").await;
    let dentist_id = new_dentist(&engine, "SP-1234").await;

    let budget = engine
        .new_budget(
            user_id,
            &BudgetNew {
                patient_id,
                dentist_id: Some(dentist_id),
                items: vec![item("Cleaning", 100_00, 1)],
                notes: Some("  first visit ".to_string()),
                discount: Money::new(10_00),
            },
        )
        .await
        .unwrap();

    assert_eq!(budget.total, Money::new(100_00));
    assert_eq!(budget.final_total, Money::new(90_00));
    assert_eq!(budget.status, BudgetStatus::Negotiating);
    assert_eq!(budget.notes.as_deref(), Some("first visit"));
    assert_eq!(budget.patient.as_ref().unwrap().name, "Maria Silva");
    assert_eq!(budget.dentist.as_ref().unwrap().cro, "SP-1234");
    assert_eq!(budget.user.as_ref().unwrap().id, user_id);
    assert_eq!(budget.items.len(), 1);
    assert_eq!(budget.items[0].total, Money::new(100_00));
}

#[tokio::test]
async fn decimal_prices_do_not_drift() {
    let (engine, _db, user_id) = engine_with_db().await;
    let patient_id = new_patient(&engine, "Maria Silva").await;

    let budget = engine
        .new_budget(
            user_id,
            &BudgetNew {
                patient_id,
                items: vec![item("Resin", 10_10, 3)],
                ..BudgetNew::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(budget.items[0].total, Money::new(30_30));
    assert_eq!(budget.total, Money::new(30_30));
    assert_eq!(budget.final_total, Money::new(30_30));
}

#[tokio::test]
async fn new_budget_requires_existing_patient_and_dentist() {
    let (engine, db, user_id) = engine_with_db().await;

    let err = engine
        .new_budget(
            user_id,
            &BudgetNew {
                patient_id: 999,
                items: vec![item("Cleaning", 100, 1)],
                ..BudgetNew::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("patient".to_string()));

    let patient_id = new_patient(&engine, "Maria Silva").await;
    let err = engine
        .new_budget(
            user_id,
            &BudgetNew {
                patient_id,
                dentist_id: Some(42),
                items: vec![item("Cleaning", 100, 1)],
                ..BudgetNew::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("dentist".to_string()));
    assert_eq!(count_rows(&db, "SELECT COUNT(*) FROM budgets").await, 0);
}

#[tokio::test]
async fn new_budget_rejects_empty_items() {
    let (engine, _db, user_id) = engine_with_db().await;
    let patient_id = new_patient(&engine, "Maria Silva").await;

    let err = engine
        .new_budget(
            user_id,
            &BudgetNew {
                patient_id,
                ..BudgetNew::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[tokio::test]
async fn replacing_items_recomputes_and_keeps_discount() {
    let (engine, db, user_id) = engine_with_db().await;
    let patient_id = new_patient(&engine, "Maria Silva").await;
    let budget = engine
        .new_budget(
            user_id,
            &BudgetNew {
                patient_id,
                items: vec![item("Cleaning", 100_00, 1), item("X-ray", 50_00, 1)],
                discount: Money::new(20_00),
                ..BudgetNew::default()
            },
        )
        .await
        .unwrap();

    let updated = engine
        .update_budget(
            budget.id,
            &BudgetPatch {
                items: Some(vec![item("Implant", 1500_00, 2)]),
                ..BudgetPatch::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.items.len(), 1);
    assert_eq!(updated.items[0].description, "Implant");
    assert_eq!(updated.total, Money::new(3000_00));
    assert_eq!(updated.discount, Money::new(20_00));
    assert_eq!(updated.final_total, Money::new(2980_00));
    assert_eq!(
        count_rows(&db, "SELECT COUNT(*) FROM budget_items").await,
        1
    );
}

#[tokio::test]
async fn failed_item_replacement_keeps_previous_items() {
    let (engine, db, user_id) = engine_with_db().await;
    let patient_id = new_patient(&engine, "Maria Silva").await;
    let budget = engine
        .new_budget(
            user_id,
            &BudgetNew {
                patient_id,
                items: vec![item("Cleaning", 100_00, 1), item("X-ray", 50_00, 1)],
                ..BudgetNew::default()
            },
        )
        .await
        .unwrap();

    let err = engine
        .update_budget(
            budget.id,
            &BudgetPatch {
                dentist_id: Some(Some(404)),
                items: Some(vec![item("Implant", 1500_00, 1)]),
                ..BudgetPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("dentist".to_string()));

    let err = engine
        .update_budget(
            budget.id,
            &BudgetPatch {
                items: Some(vec![item("Implant", i64::MAX, 2)]),
                ..BudgetPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let reloaded = engine.budget(budget.id).await.unwrap();
    assert_eq!(reloaded.items.len(), 2);
    assert_eq!(reloaded.total, Money::new(150_00));
    assert_eq!(
        count_rows(&db, "SELECT COUNT(*) FROM budget_items").await,
        2
    );
}

#[tokio::test]
async fn metadata_update_recomputes_from_stored_items() {
    let (engine, _db, user_id) = engine_with_db().await;
    let patient_id = new_patient(&engine, "Maria Silva").await;
    let dentist_id = new_dentist(&engine, "SP-1").await;
    let budget = engine
        .new_budget(
            user_id,
            &BudgetNew {
                patient_id,
                dentist_id: Some(dentist_id),
                items: vec![item("Cleaning", 100_00, 2)],
                notes: Some("note".to_string()),
                ..BudgetNew::default()
            },
        )
        .await
        .unwrap();

    let updated = engine
        .update_budget(
            budget.id,
            &BudgetPatch {
                discount: Some(Money::new(25_50)),
                status: Some(BudgetStatus::Accepted),
                notes: Some(None),
                ..BudgetPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.total, Money::new(200_00));
    assert_eq!(updated.final_total, Money::new(174_50));
    assert_eq!(updated.status, BudgetStatus::Accepted);
    assert_eq!(updated.notes, None);
    // Absent dentist keeps the assignment.
    assert_eq!(updated.dentist_id, Some(dentist_id));

    let cleared = engine
        .update_budget(
            budget.id,
            &BudgetPatch {
                dentist_id: Some(None),
                ..BudgetPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.dentist_id, None);
    assert!(cleared.dentist.is_none());
    assert_eq!(cleared.final_total, Money::new(174_50));
}

#[tokio::test]
async fn discount_above_total_gives_negative_final_total() {
    let (engine, _db, user_id) = engine_with_db().await;
    let patient_id = new_patient(&engine, "Maria Silva").await;
    let budget = engine
        .new_budget(
            user_id,
            &BudgetNew {
                patient_id,
                items: vec![item("Cleaning", 50_00, 1)],
                discount: Money::new(80_00),
                ..BudgetNew::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(budget.final_total, Money::new(-30_00));
}

#[tokio::test]
async fn any_status_can_follow_any_other() {
    let (engine, _db, user_id) = engine_with_db().await;
    let patient_id = new_patient(&engine, "Maria Silva").await;
    let budget = engine
        .new_budget(
            user_id,
            &BudgetNew {
                patient_id,
                items: vec![item("Cleaning", 100, 1)],
                ..BudgetNew::default()
            },
        )
        .await
        .unwrap();

    for status in [
        BudgetStatus::Accepted,
        BudgetStatus::Rejected,
        BudgetStatus::Negotiating,
        BudgetStatus::Rejected,
        BudgetStatus::Accepted,
    ] {
        let updated = engine.set_budget_status(budget.id, status).await.unwrap();
        assert_eq!(updated.status, status);
    }

    let err = engine
        .set_budget_status(999, BudgetStatus::Accepted)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("budget".to_string()));
}

#[tokio::test]
async fn delete_budget_removes_items() {
    let (engine, db, user_id) = engine_with_db().await;
    let patient_id = new_patient(&engine, "Maria Silva").await;
    let budget = engine
        .new_budget(
            user_id,
            &BudgetNew {
                patient_id,
                items: vec![item("Cleaning", 100, 1), item("X-ray", 200, 3)],
                ..BudgetNew::default()
            },
        )
        .await
        .unwrap();

    engine.delete_budget(budget.id).await.unwrap();
    assert_eq!(
        count_rows(&db, "SELECT COUNT(*) FROM budget_items").await,
        0
    );
    assert_eq!(
        engine.budget(budget.id).await.unwrap_err(),
        EngineError::KeyNotFound("budget".to_string())
    );
    assert_eq!(
        engine.delete_budget(budget.id).await.unwrap_err(),
        EngineError::KeyNotFound("budget".to_string())
    );
}

#[tokio::test]
async fn lists_are_newest_first_and_filter_by_patient() {
    let (engine, _db, user_id) = engine_with_db().await;
    let maria = new_patient(&engine, "Maria Silva").await;
    let joao = new_patient(&engine, "Joao Souza").await;

    let mut ids = Vec::new();
    for patient_id in [maria, joao, maria] {
        let budget = engine
            .new_budget(
                user_id,
                &BudgetNew {
                    patient_id,
                    items: vec![item("Cleaning", 100, 1)],
                    ..BudgetNew::default()
                },
            )
            .await
            .unwrap();
        ids.push(budget.id);
    }

    let all: Vec<i32> = engine.budgets().await.unwrap().iter().map(|b| b.id).collect();
    assert_eq!(all, vec![ids[2], ids[1], ids[0]]);

    let marias: Vec<i32> = engine
        .budgets_for_patient(maria)
        .await
        .unwrap()
        .iter()
        .map(|b| b.id)
        .collect();
    assert_eq!(marias, vec![ids[2], ids[0]]);
    assert!(engine.budgets_for_patient(999).await.unwrap().is_empty());
}

#[tokio::test]
async fn patient_with_budgets_cannot_be_deleted() {
    let (engine, _db, user_id) = engine_with_db().await;
    let patient_id = new_patient(&engine, "Maria Silva").await;
    let budget = engine
        .new_budget(
            user_id,
            &BudgetNew {
                patient_id,
                items: vec![item("Cleaning", 100, 1)],
                ..BudgetNew::default()
            },
        )
        .await
        .unwrap();

    let overview = engine.patients().await.unwrap();
    assert_eq!(overview[0].budget_count, 1);
    let detail = engine.patient(patient_id).await.unwrap();
    assert_eq!(detail.budgets.len(), 1);

    assert_eq!(
        engine.delete_patient(patient_id).await.unwrap_err(),
        EngineError::InUse("patient".to_string())
    );
    engine.delete_budget(budget.id).await.unwrap();
    engine.delete_patient(patient_id).await.unwrap();
    assert_eq!(
        engine.patient(patient_id).await.unwrap_err(),
        EngineError::KeyNotFound("patient".to_string())
    );
}

#[tokio::test]
async fn deleting_a_dentist_unassigns_its_budgets() {
    let (engine, _db, user_id) = engine_with_db().await;
    let patient_id = new_patient(&engine, "Maria Silva").await;
    let dentist_id = new_dentist(&engine, "SP-77").await;
    let budget = engine
        .new_budget(
            user_id,
            &BudgetNew {
                patient_id,
                dentist_id: Some(dentist_id),
                items: vec![item("Cleaning", 100, 1)],
                ..BudgetNew::default()
            },
        )
        .await
        .unwrap();

    engine.delete_dentist(dentist_id).await.unwrap();
    let reloaded = engine.budget(budget.id).await.unwrap();
    assert_eq!(reloaded.dentist_id, None);
    assert!(reloaded.dentist.is_none());
}
