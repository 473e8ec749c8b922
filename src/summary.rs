//! HTML rendering of the per-device usage table served at `/`.

use crate::reading_store::DeviceSummary;

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html>
    <head>
        <style>
        table, th, td {
            border: 1.5px solid black;
            border-collapse: collapse;
            height:50px;
            width:200px;
            text-align:center
        }
        </style>
        <meta charset="utf-8">
        <title>Energy Usage Details By Device Id</title>
    </head>
    <body>
        <table style='margin-left:auto;margin-right:auto;'>
            <tr>
                <th>Device ID</th>
                <th>Energy Usage</th>
            </tr>
"#;

const PAGE_TAIL: &str = r#"        </table>
    </body>
</html>
"#;

/// Render the full summary page, one table row per device in the given order.
/// Rows whose total exceeded the threshold get a red background.
pub fn render_html(rows: &[DeviceSummary]) -> String {
    let mut page = String::from(PAGE_HEAD);

    for row in rows {
        let readings = row
            .readings
            .iter()
            .map(i64::to_string)
            .collect::<Vec<_>>()
            .join(", ");

        let open = if row.exceeded {
            "<tr style='background-color:red;'>"
        } else {
            "<tr>"
        };

        page.push_str(&format!(
            "            {open}<td>{}</td><td>{readings}</td></tr>\n",
            escape_html(&row.device_id)
        ));
    }

    page.push_str(PAGE_TAIL);
    page
}

fn escape_html(v: &str) -> String {
    v.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(device_id: &str, readings: &[i64]) -> DeviceSummary {
        let total: i128 = readings.iter().map(|&v| i128::from(v)).sum();
        DeviceSummary {
            device_id: device_id.to_owned(),
            readings: readings.to_vec(),
            total,
            exceeded: total > crate::reading_store::USAGE_THRESHOLD,
        }
    }

    #[test]
    fn empty_summary_renders_header_only() {
        let html = render_html(&[]);
        assert!(html.contains("<th>Device ID</th>"));
        assert!(html.contains("<th>Energy Usage</th>"));
        assert!(!html.contains("<td>"));
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn readings_are_comma_separated() {
        let html = render_html(&[row("dev1", &[600, 300, -3])]);
        assert!(html.contains("<tr><td>dev1</td><td>600, 300, -3</td></tr>"));

        let html = render_html(&[row("dev2", &[600, 500, -3])]);
        assert!(html.contains("<tr style='background-color:red;'><td>dev2</td><td>600, 500, -3</td></tr>"));
    }

    #[test]
    fn exceeded_rows_are_red() {
        let html = render_html(&[row("hot", &[600, 500]), row("edge", &[1000])]);
        assert!(html.contains("<tr style='background-color:red;'><td>hot</td>"));
        assert!(html.contains("<tr><td>edge</td><td>1000</td></tr>"));
    }

    #[test]
    fn rows_follow_input_order() {
        let html = render_html(&[row("b", &[1]), row("a", &[2])]);
        let b = html.find("<td>b</td>").unwrap();
        let a = html.find("<td>a</td>").unwrap();
        assert!(b < a);
    }

    #[test]
    fn device_ids_are_escaped() {
        let html = render_html(&[row("<script>&'\"", &[1])]);
        assert!(html.contains("<td>&lt;script&gt;&amp;&#39;&quot;</td>"));
        assert!(!html.contains("<script>"));
    }
}
