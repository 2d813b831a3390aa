use autoclicker_core::error::Result;
use serde_json::json;

pub fn run(dry_run: bool) -> Result<()> {
    let mut port = super::input_port(dry_run);
    let point = port.pointer_position()?;
    println!("{}", json!({ "x": point.x, "y": point.y }));
    Ok(())
}
