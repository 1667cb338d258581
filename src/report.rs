//! HTML report rendering.
//!
//! Concatenates every experiment's per-plateau table and renders four
//! grouped bar charts (one per uncertainty-carrying metric) with plotly.js
//! loaded from CDN. Pure string assembly; the numbers are embedded as JSON.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::models::{ExperimentMeta, ProcessedData};

struct Chart {
    div_id: &'static str,
    title: &'static str,
    y_axis: &'static str,
    value_key: &'static str,
    error_key: &'static str,
}

const CHARTS: [Chart; 4] = [
    Chart {
        div_id: "stack-resistance",
        title: "Stack resistance",
        y_axis: "Stack resistance / Ω",
        value_key: "stackResistance",
        error_key: "stackResistanceError",
    },
    Chart {
        div_id: "current-efficiency",
        title: "Current efficiency",
        y_axis: "Current efficiency / %",
        value_key: "currentEfficiency",
        error_key: "currentEfficiencyError",
    },
    Chart {
        div_id: "power-consumption",
        title: "Power consumption",
        y_axis: "Power consumption / kWh t<sup>-1</sup> CO<sub>2</sub>",
        value_key: "powerConsumption",
        error_key: "powerConsumptionError",
    },
    Chart {
        div_id: "co2-flux",
        title: "CO<sub>2</sub> flux",
        y_axis: "CO<sub>2</sub> flux / mg m<sup>-2</sup> s<sup>-1</sup>",
        value_key: "fluxCO2",
        error_key: "fluxCO2Error",
    },
];

/// Render the report and write it to `path`.
pub fn write_html(experiments: &[ExperimentMeta], path: &Path) -> Result<()> {
    let html = render_html(experiments)?;
    fs::write(path, html)
        .with_context(|| format!("failed to write report to {}", path.display()))
}

/// Build the full report page from the aggregated per-plateau table.
pub fn render_html(experiments: &[ExperimentMeta]) -> Result<String> {
    let mut aggregated = ProcessedData::default();
    for experiment in experiments {
        aggregated.extend_from(&experiment.processed);
    }
    let data = serde_json::to_string(&aggregated).context("failed to serialize processed data")?;

    let mut page = String::from(
        r#"<!DOCTYPE html>
<html>
<head>
  <title>ED results</title>
  <script src="https://cdn.plot.ly/plotly-2.35.0.min.js"></script>
  <style>
    .graph-column {
      width: 45%;
      float: left;
      padding: 5px 12px 0px 0px;
    }
  </style>
</head>
<body>
  <div class="graph-row">
"#,
    );

    for (i, chart) in CHARTS.iter().enumerate() {
        page.push_str(&format!(
            "    <div class=\"graph-column\"><div id=\"{}\"></div></div>\n",
            chart.div_id
        ));
        if i % 2 == 1 && i + 1 < CHARTS.len() {
            page.push_str("  </div>\n  <div class=\"graph-row\">\n");
        }
    }
    page.push_str("  </div>\n  <script>\n");
    page.push_str(&format!("    const data = {data};\n"));
    page.push_str(
        r#"    function groupedBars(divId, valueKey, errorKey, title, yTitle) {
      const labels = [...new Set(data.label)];
      const traces = labels.map((label) => {
        const rows = data.label
          .map((l, i) => i)
          .filter((i) => data.label[i] === label);
        return {
          type: "bar",
          name: label,
          x: rows.map((i) => data.currentDensityCategorical[i]),
          y: rows.map((i) => data[valueKey][i]),
          error_y: { type: "data", array: rows.map((i) => data[errorKey][i]) },
        };
      });
      Plotly.newPlot(divId, traces, {
        barmode: "group",
        title: { text: title },
        legend: { title: { text: "Amine" } },
        xaxis: { title: { text: "Current density / A m<sup>-2</sup>" }, type: "category" },
        yaxis: { title: { text: yTitle } },
      });
    }
"#,
    );
    for chart in &CHARTS {
        page.push_str(&format!(
            "    groupedBars(\"{}\", \"{}\", \"{}\", \"{}\", \"{}\");\n",
            chart.div_id, chart.value_key, chart.error_key, chart.title, chart.y_axis
        ));
    }
    page.push_str("  </script>\n</body>\n</html>\n");

    Ok(page)
}
