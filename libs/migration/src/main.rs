//! Schema CLI for the user store.
//!
//! ```text
//! DATABASE_URL=sqlite://vebuser.db?mode=rwc cargo run -p migration -- up
//! DATABASE_URL=sqlite://vebuser.db?mode=rwc cargo run -p migration -- status
//! ```

use migration::Migrator;
use sea_orm_migration::cli;

#[tokio::main]
async fn main() {
    cli::run_cli(Migrator).await;
}
