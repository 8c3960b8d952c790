mod common;

use migration::{count_applied_migrations, migrate, MigrationCommand};
use turntally::{connect_db, DbKind};

#[tokio::test]
async fn up_down_fresh_on_sqlite_memory() {
    let db = connect_db(DbKind::SqliteMemory).await.unwrap();

    migrate(&db, MigrationCommand::Up).await.unwrap();
    assert_eq!(count_applied_migrations(&db).await.unwrap(), 1);

    // a second `up` is a no-op
    migrate(&db, MigrationCommand::Up).await.unwrap();
    migrate(&db, MigrationCommand::Status).await.unwrap();
    assert_eq!(count_applied_migrations(&db).await.unwrap(), 1);

    migrate(&db, MigrationCommand::Down).await.unwrap();
    assert_eq!(count_applied_migrations(&db).await.unwrap(), 0);

    migrate(&db, MigrationCommand::Fresh).await.unwrap();
    assert_eq!(count_applied_migrations(&db).await.unwrap(), 1);
}
