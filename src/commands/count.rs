use crate::cache::Cache;
use crate::home::{Home, HomePath};
use anyhow::Result;

pub fn execute(home: &Home) -> Result<()> {
    let cache = Cache::open(&home.path(HomePath::Cache))?;
    println!("{}", cache.count()?);
    Ok(())
}
