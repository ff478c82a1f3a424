use std::path::Path;

use bellhome_core::{Result, remove_data_files};

pub fn run(dir: &str) -> Result<()> {
    let removed = remove_data_files(Path::new(dir))?;
    println!("Removed {removed} data file(s) from {dir}");
    Ok(())
}
