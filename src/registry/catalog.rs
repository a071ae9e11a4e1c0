use indexmap::IndexMap;
use serde::Serialize;

use super::CommandKind;

/// A catalog entry: metadata plus the usage line advertised to the model.
#[derive(Debug, Clone, Serialize)]
pub struct CommandEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub arity: usize,
    pub is_async: bool,
    pub usage: String,
}

/// Every command keyed by name, in registration order.
pub fn command_catalog() -> IndexMap<&'static str, CommandEntry> {
    CommandKind::all()
        .iter()
        .map(|kind| {
            let info = kind.info();
            let entry = CommandEntry {
                name: info.name,
                description: info.description,
                arity: info.arity,
                is_async: info.is_async,
                usage: kind.usage(),
            };
            (info.name, entry)
        })
        .collect()
}

/// `{setting, pay_upi, ...}` for error messages.
pub fn known_commands() -> String {
    let names: Vec<String> = CommandKind::all()
        .iter()
        .map(|kind| kind.name().to_string())
        .collect();
    crate::util::format_choices(&names)
}

/// Human-readable command list: usage line, then description.
pub fn render_usage() -> String {
    let entries = command_catalog();
    let width = entries.values().map(|e| e.usage.len()).max().unwrap_or(0);
    entries
        .values()
        .map(|e| format!("{:width$}  {}", e.usage, e.description))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn catalog_preserves_registration_order() {
        let catalog = command_catalog();
        let names: Vec<&str> = catalog.keys().copied().collect();
        assert_eq!(names.first().copied(), Some("setting"));
        assert_eq!(names.last().copied(), Some("book_cab"));
        assert_eq!(catalog.len(), CommandKind::all().len());
        assert_eq!(catalog.get("pay_qr").map(|e| e.arity), Some(2));
    }

    #[test]
    fn catalog_serializes_as_ordered_object() {
        let json = serde_json::to_string(&command_catalog()).unwrap();
        let setting = json.find("\"setting\":").unwrap();
        let book_cab = json.find("\"book_cab\":").unwrap();
        assert!(setting < book_cab);
    }

    #[test]
    fn known_commands_is_brace_list() {
        let known = known_commands();
        assert!(known.starts_with("{setting, pay_upi"));
        assert!(known.ends_with("book_cab}"));
    }

    #[test]
    fn render_usage_has_line_per_command() {
        assert_eq!(render_usage().lines().count(), CommandKind::all().len());
    }
}
