use chrono::NaiveDate;
use roadwatch_database::{
    Database, DatabaseConfig, DatabaseError, DbResult, Driver, Offense, RowAccess, SpeedCamera,
    SqlFileExecutor, SqlValue, Violation, ViolationQueries,
};
use roadwatch_database::sqlx::any::AnyPoolOptions;
use tempfile::TempDir;

const SQLITE_SCHEMA: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/sql/sqlite/schema.sql");
const SEED_DATA: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/sql/data.sql");

async fn setup_with_pool(pool_size: u32) -> (TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let url = format!(
        "sqlite://{}?mode=rwc",
        dir.path().join("roadwatch.db").display()
    );
    let config = DatabaseConfig::with_url(url)
        .with_pool_size(pool_size)
        .with_acquire_timeout(2);
    let db = Database::new(&config).await.unwrap();

    SqlFileExecutor::new(db.clone())
        .execute_sql_file(SQLITE_SCHEMA)
        .await
        .unwrap();

    (dir, db)
}

async fn setup() -> (TempDir, Database) {
    setup_with_pool(2).await
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[tokio::test]
async fn test_insert_and_find_by_id_for_every_record() {
    let (_dir, db) = setup().await;
    let repos = db.repositories();

    let driver = Driver::new("Jon", "Smith", "ABC123");
    let driver_id = repos.drivers().insert(&driver).await.unwrap().unwrap();
    let found = repos.drivers().find_by_id(driver_id).await.unwrap().unwrap();
    assert_eq!(found.id, Some(driver_id));
    assert_eq!(Driver { id: None, ..found }, driver);

    let offense = Offense::new("Test", 2, 200);
    let offense_id = repos.offenses().insert(&offense).await.unwrap().unwrap();
    let found = repos.offenses().find_by_id(offense_id).await.unwrap().unwrap();
    assert_eq!(Offense { id: None, ..found }, offense);

    let camera = SpeedCamera::new("Warsaw", 50);
    let camera_id = repos.speed_cameras().insert(&camera).await.unwrap().unwrap();
    let found = repos.speed_cameras().find_by_id(camera_id).await.unwrap().unwrap();
    assert_eq!(SpeedCamera { id: None, ..found }, camera);

    let violation = Violation::new(date("2025-10-14"), driver_id, camera_id, offense_id);
    let violation_id = repos.violations().insert(&violation).await.unwrap().unwrap();
    let found = repos.violations().find_by_id(violation_id).await.unwrap().unwrap();
    assert_eq!(found.id, Some(violation_id));
    assert_eq!(Violation { id: None, ..found }, violation);
}

#[tokio::test]
async fn test_find_by_id_unknown_is_none() {
    let (_dir, db) = setup().await;
    assert!(db.repositories().drivers().find_by_id(42).await.unwrap().is_none());
}

#[tokio::test]
async fn test_find_all_on_empty_table() {
    let (_dir, db) = setup().await;
    assert!(db.repositories().speed_cameras().find_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_insert_many_and_find_all() {
    let (_dir, db) = setup().await;
    let cameras = db.repositories().speed_cameras();

    cameras
        .insert_many(&[SpeedCamera::new("Warsaw", 50), SpeedCamera::new("Krakow", 70)])
        .await
        .unwrap();

    let all = cameras.find_all().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].location, "Warsaw");
    assert_eq!(all[1].allowed_speed, 70);
    assert!(all.iter().all(|c| c.id.is_some()));
}

#[tokio::test]
async fn test_insert_many_empty_is_noop() {
    let (_dir, db) = setup().await;
    let drivers = db.repositories().drivers();
    drivers.insert(&Driver::new("Jon", "Smith", "ABC123")).await.unwrap();

    drivers.insert_many(&[]).await.unwrap();

    assert_eq!(drivers.find_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_insert_many_empty_does_not_touch_pool() {
    let (_dir, db) = setup_with_pool(1).await;
    let _held = db.acquire().await.unwrap();

    // The only connection is checked out; any store access would time out.
    db.repositories().drivers().insert_many(&[]).await.unwrap();
}

#[tokio::test]
async fn test_update_replaces_every_field() {
    let (_dir, db) = setup().await;
    let drivers = db.repositories().drivers();
    let id = drivers
        .insert(&Driver::new("Jon", "Smith", "ABC123"))
        .await
        .unwrap()
        .unwrap();

    let replacement = Driver::new("Bob", "Doe", "XYZ123");
    drivers.update(id, &replacement).await.unwrap();

    let found = drivers.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(found.first_name, "Bob");
    assert_eq!(found.last_name, "Doe");
    assert_eq!(found.registration_number, "XYZ123");
}

#[tokio::test]
async fn test_delete_then_find_is_none() {
    let (_dir, db) = setup().await;
    let drivers = db.repositories().drivers();
    let id = drivers
        .insert(&Driver::new("Jon", "Smith", "ABC123"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(drivers.delete(id).await.unwrap(), id);
    assert!(drivers.find_by_id(id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_echoes_id_of_missing_row() {
    let (_dir, db) = setup().await;
    assert_eq!(db.repositories().offenses().delete(999).await.unwrap(), 999);
}

#[tokio::test]
async fn test_values_are_bound_not_interpolated() {
    let (_dir, db) = setup().await;
    let drivers = db.repositories().drivers();
    let tricky = Driver::new("O'Brien", "Smith'); DROP TABLE drivers; --", "ABC123");

    let id = drivers.insert(&tricky).await.unwrap().unwrap();

    let found = drivers.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(found.first_name, "O'Brien");
    assert_eq!(found.last_name, tricky.last_name);
}

#[tokio::test]
async fn test_failed_unit_of_work_rolls_back_and_releases_connection() {
    let (_dir, db) = setup_with_pool(1).await;
    let drivers = db.repositories().drivers();

    let in_tx = drivers.clone();
    let result: DbResult<()> = db
        .transaction(move |conn| {
            Box::pin(async move {
                in_tx
                    .insert_on(Some(&mut *conn), &Driver::new("Jon", "Smith", "ABC123"))
                    .await?;
                // duplicate registration number violates the UNIQUE constraint
                in_tx
                    .insert_on(Some(&mut *conn), &Driver::new("Bob", "Doe", "ABC123"))
                    .await?;
                Ok::<_, DatabaseError>(())
            })
        })
        .await;

    assert!(matches!(result, Err(DatabaseError::Query(_))));
    assert!(drivers.find_all().await.unwrap().is_empty());
    assert!(db.acquire().await.is_ok());
}

#[tokio::test]
async fn test_external_connection_is_not_committed() {
    let (_dir, db) = setup().await;
    let drivers = db.repositories().drivers();

    let mut tx = db.pool().begin().await.unwrap();
    drivers
        .insert_on(Some(&mut *tx), &Driver::new("Jon", "Smith", "ABC123"))
        .await
        .unwrap();
    assert_eq!(drivers.find_all_on(Some(&mut *tx)).await.unwrap().len(), 1);
    tx.rollback().await.unwrap();

    assert!(drivers.find_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_exhausted_pool_is_a_connection_error() {
    let (_dir, db) = setup_with_pool(1).await;
    let held = db.acquire().await.unwrap();

    let err = db.repositories().drivers().find_all().await.unwrap_err();
    assert!(err.is_connection());

    drop(held);
    assert!(db.repositories().drivers().find_all().await.is_ok());
}

#[tokio::test]
async fn test_script_stops_at_first_failing_statement() {
    let (_dir, db) = setup().await;
    let script = "CREATE TABLE t1 (id INTEGER); NOT VALID SQL; CREATE TABLE t2 (id INTEGER);";

    let err = SqlFileExecutor::new(db.clone())
        .execute_sql_script(script)
        .await
        .unwrap_err();
    match err {
        DatabaseError::Script { statement, .. } => assert_eq!(statement, "NOT VALID SQL"),
        other => panic!("unexpected error: {other}"),
    }

    let tables = db
        .repositories()
        .drivers()
        .execute_query(
            "SELECT name FROM sqlite_master WHERE name IN ('t1', 't2')",
            Vec::new(),
        )
        .await
        .unwrap();
    assert!(tables.is_empty());
}

#[tokio::test]
async fn test_driver_offense_detail_scenario() {
    let (_dir, db) = setup().await;
    let repos = db.repositories();

    let driver_id = repos
        .drivers()
        .insert(&Driver::new("Jon", "Smith", "ABC123"))
        .await
        .unwrap()
        .unwrap();
    let offense_id = repos
        .offenses()
        .insert(&Offense::new("Test", 2, 200))
        .await
        .unwrap()
        .unwrap();
    let camera_id = repos
        .speed_cameras()
        .insert(&SpeedCamera::new("Warsaw", 50))
        .await
        .unwrap()
        .unwrap();
    repos
        .violations()
        .insert(&Violation::new(date("2025-10-14"), driver_id, camera_id, offense_id))
        .await
        .unwrap();

    let rows = repos.violations().driver_offense_detail("ABC123").await.unwrap();
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.get_string("first_name").unwrap(), "Jon");
    assert_eq!(row.get_string("description").unwrap(), "Test");
    assert_eq!(row.get_i64("penalty_points").unwrap(), 2);
    assert_eq!(row.get_i64("fine_amount").unwrap(), 200);
    assert_eq!(row.get_i64("total_points").unwrap(), 2);
    assert_eq!(row.get_i64("total_amount").unwrap(), 200);

    assert!(repos
        .violations()
        .driver_offense_detail("NOPE000")
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_camera_popularity_includes_idle_cameras() {
    let (_dir, db) = setup().await;
    db.repositories()
        .speed_cameras()
        .insert(&SpeedCamera::new("Warsaw", 50))
        .await
        .unwrap();

    let rows = db.repositories().violations().camera_popularity().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("location"), Some(&SqlValue::Text("Warsaw".into())));
    assert_eq!(rows[0].get("total_count"), Some(&SqlValue::Int(0)));
}

async fn seed_two_drivers(db: &Database) {
    let repos = db.repositories();
    repos
        .drivers()
        .insert_many(&[
            Driver::new("Jon", "Smith", "ABC123"),
            Driver::new("Bob", "Doe", "XYZ123"),
        ])
        .await
        .unwrap();
    repos
        .offenses()
        .insert_many(&[
            Offense::new("Minor", 2, 200),
            Offense::new("Major", 4, 100),
            Offense::new("Medium", 3, 300),
        ])
        .await
        .unwrap();
    repos
        .speed_cameras()
        .insert(&SpeedCamera::new("Warsaw", 50))
        .await
        .unwrap();

    // Bob: 3 points, Jon: 2 + 4 + 3 = 9 points
    repos
        .violations()
        .insert_many(&[
            Violation::new(date("2025-01-01"), 2, 1, 3),
            Violation::new(date("2025-01-02"), 1, 1, 1),
            Violation::new(date("2025-01-03"), 1, 1, 2),
            Violation::new(date("2025-01-04"), 1, 1, 3),
        ])
        .await
        .unwrap();
}

#[tokio::test]
async fn test_driver_points_ranking_is_descending() {
    let (_dir, db) = setup().await;
    seed_two_drivers(&db).await;

    let rows = db.repositories().violations().driver_points_ranking().await.unwrap();
    let totals: Vec<i64> = rows
        .iter()
        .map(|r| r.get_i64("total_points").unwrap())
        .collect();
    assert_eq!(totals, vec![9, 3]);
    assert_eq!(rows[0].get_string("first_name").unwrap(), "Jon");
}

#[tokio::test]
async fn test_running_totals_are_per_driver() {
    let (_dir, db) = setup().await;
    seed_two_drivers(&db).await;

    let rows = db
        .repositories()
        .violations()
        .driver_offense_detail("ABC123")
        .await
        .unwrap();
    assert_eq!(rows.len(), 3);
    for row in &rows {
        assert_eq!(row.get_i64("total_points").unwrap(), 9);
        assert_eq!(row.get_i64("total_amount").unwrap(), 600);
    }
}

#[tokio::test]
async fn test_summary_statistics() {
    let (_dir, db) = setup().await;
    let repos = db.repositories();
    repos
        .drivers()
        .insert(&Driver::new("Jon", "Smith", "ABC123"))
        .await
        .unwrap();
    repos
        .speed_cameras()
        .insert(&SpeedCamera::new("Warsaw", 50))
        .await
        .unwrap();
    repos
        .offenses()
        .insert_many(&[
            Offense::new("A", 2, 200),
            Offense::new("B", 4, 100),
            Offense::new("C", 3, 300),
        ])
        .await
        .unwrap();
    repos
        .violations()
        .insert_many(&[
            Violation::new(date("2025-10-14"), 1, 1, 1),
            Violation::new(date("2025-10-15"), 1, 1, 2),
            Violation::new(date("2025-10-16"), 1, 1, 3),
        ])
        .await
        .unwrap();

    let rows = repos.violations().summary_statistics().await.unwrap();
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.get_i64("total_drivers").unwrap(), 3);
    assert_eq!(row.get_i64("total_offenses").unwrap(), 3);
    assert_eq!(row.get_i64("total_points").unwrap(), 9);
    assert_eq!(row.opt_f64("average_points").unwrap(), Some(3.0));
    assert_eq!(row.get_i64("total_fine_amount").unwrap(), 600);
    assert_eq!(row.get_i64("max_fine_amount").unwrap(), 300);
    assert_eq!(row.get_i64("min_fine_amount").unwrap(), 100);
}

#[tokio::test]
async fn test_seed_data_ranking() {
    let (_dir, db) = setup().await;
    let executed = SqlFileExecutor::new(db.clone())
        .execute_sql_file(SEED_DATA)
        .await
        .unwrap();
    assert_eq!(executed, 4);

    let rows = db.repositories().violations().driver_points_ranking().await.unwrap();
    let ranking: Vec<(String, i64)> = rows
        .iter()
        .map(|r| {
            (
                r.get_string("last_name").unwrap(),
                r.get_i64("total_points").unwrap(),
            )
        })
        .collect();
    assert_eq!(
        ranking,
        vec![
            ("Wisniewski".to_string(), 8),
            ("Kowalski".to_string(), 7),
            ("Nowak".to_string(), 1),
        ]
    );
}

#[tokio::test]
async fn test_insert_returns_each_generated_id() {
    let (_dir, db) = setup().await;
    let cameras = db.repositories().speed_cameras();

    let first = cameras.insert(&SpeedCamera::new("Warsaw", 50)).await.unwrap();
    let second = cameras.insert(&SpeedCamera::new("Krakow", 70)).await.unwrap();
    assert_eq!(first, Some(1));
    assert_eq!(second, Some(2));

    let mut tx = db.pool().begin().await.unwrap();
    let third = cameras
        .insert_on(Some(&mut *tx), &SpeedCamera::new("Gdansk", 90))
        .await
        .unwrap();
    tx.commit().await.unwrap();
    assert_eq!(third, Some(3));

    let found = cameras.find_by_id(3).await.unwrap().unwrap();
    assert_eq!(found.location, "Gdansk");
}

#[tokio::test]
async fn test_summary_statistics_over_empty_store() {
    let (_dir, db) = setup().await;

    let rows = db.repositories().violations().summary_statistics().await.unwrap();
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.get_i64("total_drivers").unwrap(), 0);
    assert_eq!(row.get_i64("total_offenses").unwrap(), 0);
    assert_eq!(row.opt_i64("total_points").unwrap(), None);
    assert_eq!(row.opt_f64("average_points").unwrap(), None);
    assert_eq!(row.opt_i64("max_fine_amount").unwrap(), None);
    assert_eq!(row.value("min_fine_amount").unwrap(), &SqlValue::Null);
}

#[tokio::test]
async fn test_rejected_commit_is_a_query_error() {
    let (_dir, db) = setup_with_pool(1).await;
    let violations = db.repositories().violations();

    let in_tx = violations.clone();
    let result: DbResult<()> = db
        .transaction(move |conn| {
            Box::pin(async move {
                // foreign keys are only checked at COMMIT
                roadwatch_database::sqlx::query("PRAGMA defer_foreign_keys = ON")
                    .execute(&mut *conn)
                    .await?;
                in_tx
                    .insert_on(
                        Some(&mut *conn),
                        &Violation::new(date("2025-10-14"), 99, 99, 99),
                    )
                    .await?;
                Ok::<_, DatabaseError>(())
            })
        })
        .await;

    assert!(matches!(result, Err(DatabaseError::Query(_))));
    assert!(violations.find_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_database_from_existing_pool() {
    let (dir, _db) = setup().await;
    roadwatch_database::sqlx::any::install_default_drivers();
    let url = format!(
        "sqlite://{}?mode=rwc",
        dir.path().join("roadwatch.db").display()
    );
    let pool = AnyPoolOptions::new()
        .max_connections(1)
        .connect(&url)
        .await
        .unwrap();

    let db = Database::from_pool(pool);
    let drivers = db.repositories().drivers();
    let id = drivers
        .insert(&Driver::new("Jon", "Smith", "ABC123"))
        .await
        .unwrap()
        .unwrap();
    assert!(drivers.find_by_id(id).await.unwrap().is_some());
}
