//! Translation of raw toolchain diagnostics into uniform error details.

use jv_model::{ErrorDetail, RawDiagnostic};

/// Package raw diagnostics uniformly so nothing downstream depends on the
/// toolchain's diagnostic shape. Pure; page-line remapping is the caller's
/// job.
pub fn error_details(file_name: &str, raw: &[RawDiagnostic]) -> Vec<ErrorDetail> {
    raw.iter()
        .map(|d| ErrorDetail::new(file_name, d.message.clone(), d.line))
        .collect()
}

/// Render one error detail against the generated source for terminal
/// output: location header plus the offending source line.
pub fn render_error_detail(source: &str, detail: &ErrorDetail) -> String {
    let mut out = format!(
        "{}:{}: error: {}",
        detail.file_name, detail.line, detail.message
    );
    if detail.line > 0 {
        if let Some(line_text) = source.lines().nth(detail.line as usize - 1) {
            out.push('\n');
            out.push_str("  | ");
            out.push_str(line_text);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn details_keep_order_and_lines() {
        let raw = vec![
            RawDiagnostic::new("';' expected", 3),
            RawDiagnostic::new("cannot find symbol", 7),
        ];
        let details = error_details("index_jsp.java", &raw);
        assert_eq!(details.len(), 2);
        assert_eq!(details[0].file_name, "index_jsp.java");
        assert_eq!(details[0].line, 3);
        assert_eq!(details[1].message, "cannot find symbol");
        assert_eq!(details[1].line, 7);
    }

    #[test]
    fn render_includes_the_source_line() {
        let source = "line one\nline two\nline three\n";
        let detail = ErrorDetail::new("X.java", "bad", 2);
        let rendered = render_error_detail(source, &detail);
        assert!(rendered.contains("X.java:2: error: bad"));
        assert!(rendered.contains("line two"));
    }

    #[test]
    fn render_without_position_omits_the_excerpt() {
        let detail = ErrorDetail::new("X.java", "bad", 0);
        let rendered = render_error_detail("src", &detail);
        assert_eq!(rendered, "X.java:0: error: bad");
    }
}
