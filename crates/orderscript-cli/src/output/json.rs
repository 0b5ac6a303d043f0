use orderscript_core::error::ImportError;
use serde::Serialize;

pub fn print<T: Serialize + ?Sized>(value: &T) -> Result<(), ImportError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
