use creed_migrate::Result;

pub fn description() -> &'static str {
    "create users table"
}

pub fn up() -> Result<()> {
    Ok(())
}

pub fn down() -> Result<()> {
    Ok(())
}
