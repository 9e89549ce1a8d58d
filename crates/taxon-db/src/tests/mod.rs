//! Database integration tests.
//!
//! These run against a real Postgres (see `test_fixtures`) whenever
//! `DATABASE_URL` is set, and skip themselves otherwise, so a plain
//! `cargo test` passes with or without a provisioned database.

macro_rules! skip_without_database {
    () => {
        if std::env::var("DATABASE_URL").is_err() {
            eprintln!("DATABASE_URL is not set; skipping database test");
            return;
        }
    };
}

pub(crate) use skip_without_database;

mod taxonomy_tests;
