use serde::{Deserialize, Serialize};

/// `analyzeResult` payload of a finished Document Intelligence operation.
/// Only the fields needed to rebuild the text in reading order are kept.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResult {
    #[serde(default)]
    pub pages: Vec<Page>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    #[serde(default)]
    pub page_number: u32,
    #[serde(default)]
    pub lines: Vec<Line>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Line {
    pub content: String,
}

impl AnalyzeResult {
    /// Build a result from plain page/line strings (used by test doubles).
    pub fn from_pages<P, L>(pages: P) -> Self
    where
        P: IntoIterator<Item = L>,
        L: IntoIterator,
        L::Item: Into<String>,
    {
        let pages = pages
            .into_iter()
            .enumerate()
            .map(|(i, lines)| Page {
                page_number: i as u32 + 1,
                lines: lines
                    .into_iter()
                    .map(|content| Line { content: content.into() })
                    .collect(),
            })
            .collect();

        Self { pages }
    }

    /// Page order, then line order within a page. Each line is trimmed,
    /// blank lines are dropped, the rest are joined by single spaces.
    pub fn text(&self) -> String {
        self.pages
            .iter()
            .flat_map(|page| page.lines.iter())
            .map(|line| line.content.trim())
            .filter(|content| !content.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_lines_with_single_spaces() {
        let result = AnalyzeResult::from_pages([[" Hello", "World"]]);
        assert_eq!(result.text(), "Hello World");
    }

    #[test]
    fn keeps_page_then_line_order() {
        let result = AnalyzeResult::from_pages(vec![
            vec!["Torque table", "M8: 25 Nm"],
            vec!["", "M10: 49 Nm  "],
            vec![],
            vec!["End"],
        ]);
        assert_eq!(result.text(), "Torque table M8: 25 Nm M10: 49 Nm End");
    }

    #[test]
    fn parses_service_payload() {
        let json = r#"{
            "apiVersion": "2023-07-31",
            "modelId": "prebuilt-read",
            "content": "Hello\nWorld",
            "pages": [
                {"pageNumber": 1, "angle": 0, "lines": [
                    {"content": "Hello", "polygon": [0, 0, 1, 1]},
                    {"content": "World", "polygon": [0, 1, 1, 2]}
                ]},
                {"pageNumber": 2}
            ]
        }"#;

        let result: AnalyzeResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.pages.len(), 2);
        assert_eq!(result.pages[1].page_number, 2);
        assert!(result.pages[1].lines.is_empty());
        assert_eq!(result.text(), "Hello World");
    }

    #[test]
    fn empty_document_gives_empty_text() {
        assert_eq!(AnalyzeResult::default().text(), "");
    }
}
