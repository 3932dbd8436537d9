use serde::Serialize;
use serde_json::{Map, Value};

use crate::cli::OutputFormat;
use crate::ui;

pub mod table;

/// Render a serializable response to a string in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Table => render_table(&serde_json::to_value(value)?),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

/// Print a serializable response in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

fn options() -> table::TableOptions {
    let prefs = ui::prefs();
    table::TableOptions {
        max_width: prefs.term_width,
        color: prefs.table_color,
    }
}

/// Arrays become one table. Objects become a key/value table of their
/// scalar fields, followed by one titled section per list or nested object
/// field, so reports like `status` read as several small tables.
fn render_table(value: &Value) -> anyhow::Result<String> {
    match value {
        Value::Array(items) => Ok(render_rows(items)),
        Value::Object(map) if is_agent_key(map) => Ok(value_to_cell(value)),
        Value::Object(map) => Ok(render_object(map)),
        scalar => Ok(table::render_entity_table(
            &["value"],
            &[vec![value_to_cell(scalar)]],
            options(),
        )),
    }
}

fn render_object(map: &Map<String, Value>) -> String {
    let mut scalars = Vec::new();
    let mut sections = Vec::new();
    for (key, value) in map {
        match value {
            Value::Array(items) => {
                sections.push(format!("{key} ({})\n{}", items.len(), render_rows(items)));
            }
            Value::Object(inner) if !is_agent_key(inner) => {
                sections.push(format!("{key}\n{}", render_object(inner)));
            }
            other => scalars.push(vec![key.clone(), value_to_cell(other)]),
        }
    }

    let mut blocks = Vec::with_capacity(sections.len() + 1);
    if !scalars.is_empty() {
        blocks.push(table::render_entity_table(&["key", "value"], &scalars, options()));
    }
    blocks.extend(sections);
    blocks.join("\n\n")
}

fn render_rows(items: &[Value]) -> String {
    if items.is_empty() {
        return String::from("(none)");
    }

    let records: Vec<&Map<String, Value>> = items
        .iter()
        .filter_map(Value::as_object)
        .filter(|map| !is_agent_key(map))
        .collect();
    if records.len() != items.len() {
        let rows: Vec<Vec<String>> = items.iter().map(|item| vec![value_to_cell(item)]).collect();
        return table::render_entity_table(&["value"], &rows, options());
    }

    // serde_json maps iterate in key order, so columns come out sorted.
    let mut headers: Vec<&str> = Vec::new();
    for map in &records {
        for key in map.keys() {
            if !headers.contains(&key.as_str()) {
                headers.push(key);
            }
        }
    }

    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|map| {
            headers
                .iter()
                .map(|header| map.get(*header).map_or_else(|| "-".to_string(), value_to_cell))
                .collect()
        })
        .collect();
    table::render_entity_table(&headers, &rows, options())
}

/// `{"module_name": .., "agent_name": ..}` prints as `module::agent`.
fn is_agent_key(map: &Map<String, Value>) -> bool {
    map.len() == 2
        && map.get("module_name").is_some_and(Value::is_string)
        && map.get("agent_name").is_some_and(Value::is_string)
}

fn value_to_cell(value: &Value) -> String {
    match value {
        Value::Null => String::from("-"),
        Value::Bool(v) => v.to_string(),
        Value::Number(n) if n.is_f64() => n
            .as_f64()
            .map_or_else(|| n.to_string(), |price| format!("{price:.2}")),
        Value::Number(n) => n.to_string(),
        Value::String(v) => v.clone(),
        Value::Object(map) if is_agent_key(map) => format!(
            "{}::{}",
            map["module_name"].as_str().unwrap_or_default(),
            map["agent_name"].as_str().unwrap_or_default()
        ),
        Value::Array(items) => items.iter().map(value_to_cell).collect::<Vec<_>>().join(", "),
        Value::Object(_) => {
            serde_json::to_string(value).unwrap_or_else(|_| String::from("<invalid-json>"))
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde::Serialize;
    use vestry_core::enums::EntitlementKind;
    use vestry_core::ids::AgentKey;
    use vestry_core::responses::SubscribeReport;

    use super::render;
    use crate::cli::OutputFormat;

    #[derive(Serialize)]
    struct Example {
        id: &'static str,
        price: f64,
    }

    #[test]
    fn json_render_is_valid_json() {
        let value = Example { id: "x", price: 7.5 };
        let out = render(&value, OutputFormat::Json).expect("json render should work");
        let parsed: serde_json::Value = serde_json::from_str(&out).expect("json should parse");
        assert_eq!(parsed["id"], "x");
        assert_eq!(parsed["price"], 7.5);
    }

    #[test]
    fn raw_render_is_single_line_json() {
        let value = Example { id: "x", price: 7.5 };
        let out = render(&value, OutputFormat::Raw).expect("raw render should work");
        assert!(!out.contains('\n'));
    }

    #[test]
    fn table_formats_prices_with_two_decimals() {
        let rows = vec![
            Example { id: "b", price: 5.0 },
            Example { id: "a", price: 12.25 },
        ];
        let out = render(&rows, OutputFormat::Table).expect("table render should work");
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with("id"));
        assert!(lines[2].ends_with("5.00"));
        assert!(lines[3].ends_with("12.25"));
    }

    #[test]
    fn report_lists_become_sections() {
        let mut report = SubscribeReport::new(EntitlementKind::Module);
        report.created = vec!["A".into()];
        report.agents_added = vec![AgentKey::new("A", "a1")];

        let out = render(&report, OutputFormat::Table).expect("table render should work");
        assert!(out.contains("kind"));
        assert!(out.contains("created (1)"));
        assert!(out.contains("skipped (0)\n(none)"));
        assert!(out.contains("A::a1"));
    }

    #[test]
    fn empty_array_renders_placeholder() {
        let rows: Vec<Example> = Vec::new();
        let out = render(&rows, OutputFormat::Table).expect("table render should work");
        assert_eq!(out, "(none)");
    }
}
