use serde_json::{json, Value};

use super::command::Command;
use crate::model::entry::CatalogItem;
use crate::sidebar::Sidebar;

pub fn handle(sidebar: &mut Sidebar, cmd: Command, payload: &Value) -> Result<Value, String> {
    match cmd {
        Command::SidebarSelect => {
            let entry_val = payload.get("entry").cloned().unwrap_or(Value::Null);
            if entry_val.is_null() {
                sidebar.set_selected_item(None);
            } else {
                let item: CatalogItem = serde_json::from_value(entry_val)
                    .map_err(|e| format!("invalid payload.entry: {e}"))?;
                sidebar.set_selected_item(Some(&item));
            }
        }

        Command::SidebarSelectMultiple => sidebar.set_multiple_selection(),

        Command::SidebarClear => sidebar.set_selected_item(None),

        Command::SidebarUpperHeight => {
            let panel_height = int_field(payload, "panel_height")?;
            let upper_height = int_field(payload, "upper_height")?;
            sidebar.set_upper_height(panel_height, upper_height);
        }

        Command::SidebarState => {}

        _ => return Err("unknown command".into()),
    }

    Ok(json!({ "sidebar": sidebar.snapshot() }))
}

fn int_field(payload: &Value, key: &str) -> Result<i32, String> {
    payload
        .get(key)
        .and_then(|v| v.as_i64())
        .and_then(|v| i32::try_from(v).ok())
        .ok_or_else(|| format!("payload.{key} must be an integer"))
}
