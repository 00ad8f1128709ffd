use std::time::Duration;

use anyhow::{Context, Result};
use diesel::{
    PgConnection,
    r2d2::{ConnectionManager, Pool},
};

pub type PgPoolSquad = Pool<ConnectionManager<PgConnection>>;

const CONNECTION_TIMEOUT: Duration = Duration::from_secs(10);

pub fn establish_connection(database_url: &str) -> Result<PgPoolSquad> {
    build_pool(database_url, CONNECTION_TIMEOUT)
}

fn build_pool(database_url: &str, connection_timeout: Duration) -> Result<PgPoolSquad> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);

    Pool::builder()
        .connection_timeout(connection_timeout)
        .test_on_check_out(true)
        .build(manager)
        .context("failed to open the transactions connection pool")
}
