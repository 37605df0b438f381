//! HTML rendering for the calculator form.
//!
//! The submitted field values are echoed back exactly as received (only
//! HTML-escaped) so the user can see and correct their input. Error
//! rendering uses the per-kind user message, never subprocess output.

use ceiling_common::{AltitudeUnit, CeilingError, CeilingForm, FormDefaults};
use ceiling_engine::CalculationResult;

/// What to show next to the form.
pub enum Outcome<'a> {
    /// First render, nothing computed yet.
    Blank,
    Result(&'a CalculationResult),
    Error(&'a CeilingError),
}

/// Field values to pre-fill, either display defaults or the submitted
/// strings verbatim.
pub struct FormView {
    pub da: String,
    pub lat: String,
    pub lon: String,
    pub unit: String,
}

impl FormView {
    pub fn from_defaults(defaults: &FormDefaults) -> Self {
        Self {
            da: defaults.da.clone(),
            lat: defaults.lat.clone(),
            lon: defaults.lon.clone(),
            unit: defaults.unit.label().to_string(),
        }
    }

    pub fn from_submission(form: &CeilingForm) -> Self {
        Self {
            da: form.da.clone(),
            lat: form.lat.clone(),
            lon: form.lon.clone(),
            unit: form.unit.clone().unwrap_or_default(),
        }
    }
}

/// Render the full page.
pub fn render_page(view: &FormView, outcome: Outcome<'_>) -> String {
    let result_cell = match outcome {
        Outcome::Blank => String::new(),
        Outcome::Result(result) => format!(
            "<span class=\"result\">{} {}</span>",
            escape_html(&result.altitude.to_string()),
            result.unit.label()
        ),
        Outcome::Error(err) => format!(
            "<span class=\"error\">{}</span>",
            escape_html(&err.user_message())
        ),
    };

    format!(
        r#"<html>
<head>
<title>Effective Service Ceiling Calculator</title>
</head>
<body>
<p>Note: this calculator only works with latitudes and longitudes within the contiguous United States and some nearby regions.</p>
<form method="POST" action="/">
<table>
<tr>
<td>Density altitude:</td><td><input type="text" name="da" value="{da}" /></td>
</tr><tr>
<td>Latitude:</td><td><input type="text" name="lat" value="{lat}" /></td>
</tr><tr>
<td>Longitude:</td><td><input type="text" name="lon" value="{lon}" /></td>
</tr><tr>
<td>Unit:</td><td><select name="unit">{unit_options}</select></td>
</tr><tr>
<td><input type="submit" name="submit" value="Calculate MSL altitude" /></td><td>{result_cell}</td>
</tr>
</table>
</form>
</body>
</html>
"#,
        da = escape_html(&view.da),
        lat = escape_html(&view.lat),
        lon = escape_html(&view.lon),
        unit_options = unit_options(&view.unit),
        result_cell = result_cell,
    )
}

fn unit_options(selected: &str) -> String {
    [
        AltitudeUnit::Feet,
        AltitudeUnit::Meters,
        AltitudeUnit::Kilometers,
    ]
    .iter()
    .map(|unit| {
        let marker = if unit.label() == selected {
            " selected"
        } else {
            ""
        };
        format!(
            "<option value=\"{label}\"{marker}>{label}</option>",
            label = unit.label(),
            marker = marker
        )
    })
    .collect()
}

/// Minimal HTML entity escape for text and attribute values.
fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
