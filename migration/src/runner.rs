use colored::*;
use sea_orm_migration::prelude::*;
use std::time::Instant;

pub async fn run_all_migrations(url: &str) {
    let db = sea_orm::Database::connect(url)
        .await
        .expect("DB connection failed");
    let schema_manager = SchemaManager::new(&db);

    let migrations = <migration::Migrator as MigratorTrait>::migrations();
    let total = migrations.len();
    println!("Running {total} migration(s)...");

    for (index, migration) in migrations.into_iter().enumerate() {
        let start = Instant::now();
        let label = format!("[{}/{}] {}", index + 1, total, migration.name().bold());

        match migration.up(&schema_manager).await {
            Ok(()) => {
                let time_str = format!("({:.2?})", start.elapsed()).dimmed();
                println!("{label} {} {time_str}", "done".green());
            }
            Err(e) => {
                println!("{label} {}: {e}", "failed".red());
                std::process::exit(1);
            }
        }
    }
}
