use creed_migrate::{Error, Result};

fn table_name() -> &'static str {
    "users"
}

pub fn up() -> Result<()> {
    Ok(())
}

pub fn down() -> Result<()> {
    Err(Error::from(format!("cannot drop columns from {}", table_name())))
}
