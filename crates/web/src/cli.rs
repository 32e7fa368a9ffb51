use anyhow::Result;
use common::db::Database;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Serve,
    /// Create the staking tables in the configured database (local development).
    InitSchema,
}

pub fn parse_args<I>(mut args: I) -> std::result::Result<Command, String>
where
    I: Iterator<Item = String>,
{
    // Drop argv[0].
    let _ = args.next();

    let Some(cmd) = args.next() else {
        return Ok(Command::Serve);
    };

    match cmd.as_str() {
        "serve" => Ok(Command::Serve),
        "init-schema" => Ok(Command::InitSchema),
        other => Err(format!(
            "unknown command: {other} (usage: queens-dashboard [serve|init-schema])"
        )),
    }
}

pub fn init_schema(db_path: &str) -> Result<()> {
    let db = Database::open(db_path)?;
    db.run_migrations()?;
    tracing::info!(path = %db_path, "staking schema ready");
    Ok(())
}
