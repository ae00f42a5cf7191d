use async_trait::async_trait;

use super::{AssetLoader, LoadStatus};
use crate::asset::{AssetData, AssetError, AssetRecord, LoadContext};
use crate::config::ExportOptions;
use crate::utils::color::{parse_hex_color, rgb_to_hsl};

/// Bare numbers are pixel values.
fn css_length(value: &str) -> String {
    let value = value.trim();
    if value.parse::<f64>().is_ok() {
        format!("{value}px")
    } else {
        value.to_string()
    }
}

/// Custom properties for layout widths and the accent color.
pub fn variables_css(options: &ExportOptions) -> Result<String, AssetError> {
    let document_width = match options.style.document_width.trim() {
        "" => "40em",
        width => width,
    };
    let line = format!("min({}, calc(100vw - 2em))", css_length(document_width));
    let sidebar = css_length(&options.sidebar.width);

    let mut css = format!(
        ":root body {{\n\
         \t--line-width: {line};\n\
         \t--line-width-adaptive: {line};\n\
         \t--file-line-width: {line};\n\
         \t--sidebar-width: min({sidebar}, 80vw);\n"
    );

    if let Some(accent) = &options.style.accent_color {
        let rgb = parse_hex_color(accent).ok_or_else(|| AssetError::MalformedColor(accent.clone()))?;
        let (h, s, l) = rgb_to_hsl(rgb);
        css.push_str(&format!(
            "\t--accent-h: {h:.0};\n\t--accent-s: {s:.0}%;\n\t--accent-l: {l:.0}%;\n"
        ));
    }
    css.push_str("}\n");
    Ok(css)
}

/// `global-variable-styles.css`, derived from the export options.
#[derive(Debug, Clone, Copy, Default)]
pub struct VariablesSource;

#[async_trait]
impl AssetLoader for VariablesSource {
    async fn load(
        &mut self,
        record: &mut AssetRecord,
        ctx: &LoadContext,
    ) -> Result<LoadStatus, AssetError> {
        record.data = AssetData::Text(variables_css(&ctx.options)?);
        Ok(LoadStatus::Changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widths() {
        let mut options = ExportOptions::default();
        options.style.document_width = "700".into();
        options.sidebar.width = "20em".into();
        let css = variables_css(&options).unwrap();
        assert!(css.starts_with(":root body {\n"));
        assert!(css.contains("--line-width: min(700px, calc(100vw - 2em));"));
        assert!(css.contains("--file-line-width: min(700px, calc(100vw - 2em));"));
        assert!(css.contains("--sidebar-width: min(20em, 80vw);"));
        assert!(!css.contains("--accent-h"));
    }

    #[test]
    fn test_accent() {
        let mut options = ExportOptions::default();
        options.style.accent_color = Some("#ff0000".into());
        let css = variables_css(&options).unwrap();
        assert!(css.contains("--accent-h: 0;"));
        assert!(css.contains("--accent-s: 100%;"));
        assert!(css.contains("--accent-l: 50%;"));

        options.style.accent_color = Some("teal".into());
        assert!(matches!(
            variables_css(&options),
            Err(AssetError::MalformedColor(color)) if color == "teal"
        ));
    }
}
