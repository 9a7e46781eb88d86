//! Standalone HTML pages around a Plotly figure.

use orderlens_common::Result;
use orderlens_config::OutputConfig;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::figure::Figure;

/// Writes one self-contained page per figure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlWriter {
    plotlyjs_cdn: String,
    display_mode_bar: bool,
}

impl HtmlWriter {
    pub fn new(plotlyjs_cdn: impl Into<String>, display_mode_bar: bool) -> Self {
        Self {
            plotlyjs_cdn: plotlyjs_cdn.into(),
            display_mode_bar,
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(config.plotlyjs_cdn.clone(), config.display_mode_bar)
    }

    /// Renders the page markup.
    pub fn render(&self, title: &str, figure: &Figure) -> Result<String> {
        let payload = json!({
            "data": figure.data,
            "layout": figure.layout,
            "frames": figure.frames,
            "config": {
                "displayModeBar": self.display_mode_bar,
                "responsive": true,
            },
        });
        let script = escape_script(&serde_json::to_string(&payload)?);

        Ok(format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<script src="{cdn}" charset="utf-8"></script>
<style>html, body {{ margin: 0; height: 100%; }} #chart {{ width: 100%; height: 100%; }}</style>
</head>
<body>
<div id="chart"></div>
<script>
Plotly.newPlot("chart", {script});
</script>
</body>
</html>
"#,
            title = escape_text(title),
            cdn = escape_text(&self.plotlyjs_cdn),
        ))
    }

    /// Renders and writes `<directory>/<file_name>`, creating the directory.
    pub fn write(
        &self,
        directory: &Path,
        file_name: &str,
        title: &str,
        figure: &Figure,
    ) -> Result<PathBuf> {
        fs::create_dir_all(directory)?;
        let path = directory.join(file_name);
        let page = self.render(title, figure)?;
        fs::write(&path, page)?;
        debug!(path = %path.display(), "Wrote report page");
        Ok(path)
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Keeps embedded JSON from closing the surrounding script element.
fn escape_script(json: &str) -> String {
    json.replace("</", "<\\/").replace("<!--", "<\\!--")
}
