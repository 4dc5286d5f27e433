use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use sqlx::postgres::PgConnectOptions;
use sqlx::postgres::PgPoolOptions;
use sqlx::Connection;
use sqlx::Executor;
use sqlx::PgConnection;
use sqlx::PgPool;

static DATABASE_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Throwaway database with migrations applied, one per test.
pub struct TestDb {
    pub pool: PgPool,
    pub db_name: String,
    admin_url: String,
}

impl TestDb {
    /// Create a fresh database on the server named by `DATABASE_URL`.
    ///
    /// Returns `None` when `DATABASE_URL` is unset so the suite still runs on
    /// machines without PostgreSQL. Any failure once a server is configured panics.
    pub async fn new() -> Option<Self> {
        let Ok(admin_url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set, skipping PostgreSQL repository test");
            return None;
        };

        let db_name = format!(
            "test_library_service_{}_{}_{}",
            std::process::id(),
            chrono::Utc::now().timestamp_micros(),
            DATABASE_COUNTER.fetch_add(1, Ordering::SeqCst)
        );

        let mut conn = PgConnection::connect(&admin_url)
            .await
            .expect("Failed to connect to Postgres");
        conn.execute(format!(r#"CREATE DATABASE "{}";"#, db_name).as_str())
            .await
            .expect("Failed to create test database");

        let options = admin_url
            .parse::<PgConnectOptions>()
            .expect("Failed to parse DATABASE_URL")
            .database(&db_name);

        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect_with(options)
            .await
            .expect("Failed to connect to test database");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        Some(Self {
            pool,
            db_name,
            admin_url,
        })
    }

    /// Close the pool and drop the database.
    pub async fn drop_database(self) {
        self.pool.close().await;

        if let Ok(mut conn) = PgConnection::connect(&self.admin_url).await {
            let _ = conn
                .execute(format!(r#"DROP DATABASE IF EXISTS "{}";"#, self.db_name).as_str())
                .await;
        }
    }
}
