//! Tagged-union messages between a host (editor, webview, pipe) and the session
//! registry.
//!
//! Every message is a JSON object whose `"type"` field selects the variant, e.g.
//! `{"type":"find_related_lines","id":"src/app.js","line":12}`.

use crate::analysis::CodeAnalysisResult;
use crate::document::{PLAIN_TEXT, Selection};
use crate::session::{DocumentSummary, HistoryEntry, OpenOutcome, SessionRegistry};
use serde::{Deserialize, Serialize};

/// Requests a host can send
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    OpenDocument {
        id: String,
        text: String,
        #[serde(default = "default_language_id")]
        language_id: String,
    },
    CloseDocument {
        id: String,
    },
    FindRelatedLines {
        id: String,
        line: usize,
    },
    AnalyzeSelection {
        id: String,
        selection: Selection,
        #[serde(default)]
        include_prompt: bool,
    },
    ListDocuments,
    History {
        id: String,
    },
}

/// Responses, one per request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    Opened {
        id: String,
        outcome: OpenOutcome,
    },
    Closed {
        id: String,
        was_open: bool,
    },
    RelatedLines {
        id: String,
        line: usize,
        related_lines: Vec<usize>,
    },
    Analysis {
        id: String,
        result: CodeAnalysisResult,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        prompt: Option<String>,
    },
    Documents {
        documents: Vec<DocumentSummary>,
    },
    History {
        id: String,
        entries: Vec<HistoryEntry>,
    },
    Error {
        message: String,
    },
}

fn default_language_id() -> String {
    PLAIN_TEXT.to_string()
}

impl Response {
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error {
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error { .. })
    }
}

impl SessionRegistry {
    /// Dispatch one request. Failures become [`Response::Error`].
    pub fn handle(&mut self, request: Request) -> Response {
        match request {
            Request::OpenDocument {
                id,
                text,
                language_id,
            } => match self.open(id.clone(), &text, &language_id) {
                Ok(outcome) => Response::Opened { id, outcome },
                Err(e) => Response::error(e.to_string()),
            },
            Request::CloseDocument { id } => {
                let was_open = self.close(&id);
                Response::Closed { id, was_open }
            }
            Request::FindRelatedLines { id, line } => match self.find_related_lines(&id, line) {
                Ok(related_lines) => Response::RelatedLines {
                    id,
                    line,
                    related_lines,
                },
                Err(e) => Response::error(e.to_user_string()),
            },
            Request::AnalyzeSelection {
                id,
                selection,
                include_prompt,
            } => {
                let analysis = self.analyze_selection(&id, selection).and_then(|result| {
                    let prompt = if include_prompt {
                        Some(self.prompt_for(&id, &result)?)
                    } else {
                        None
                    };
                    Ok((result, prompt))
                });

                match analysis {
                    Ok((result, prompt)) => Response::Analysis { id, result, prompt },
                    Err(e) => Response::error(e.to_user_string()),
                }
            }
            Request::ListDocuments => Response::Documents {
                documents: self.list(),
            },
            Request::History { id } => match self.history(&id) {
                Ok(entries) => Response::History { id, entries },
                Err(e) => Response::error(e.to_string()),
            },
        }
    }

    /// Dispatch one JSON-encoded request, for line-oriented transports.
    pub fn handle_json(&mut self, line: &str) -> Response {
        match serde_json::from_str::<Request>(line) {
            Ok(request) => {
                tracing::debug!("Handling request: {:?}", request);
                self.handle(request)
            }
            Err(e) => Response::error(format!("Invalid request: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn open(registry: &mut SessionRegistry) {
        let response = registry.handle(Request::OpenDocument {
            id: "a.js".to_string(),
            text: "const x = 5;\nlet y = 10;\nconsole.log(x + y);".to_string(),
            language_id: "javascript".to_string(),
        });
        assert_eq!(
            response,
            Response::Opened {
                id: "a.js".to_string(),
                outcome: OpenOutcome::Opened
            }
        );
    }

    #[test]
    fn test_request_wire_format() {
        let request: Request =
            serde_json::from_value(json!({"type": "find_related_lines", "id": "a.js", "line": 3}))
                .unwrap();
        assert_eq!(
            request,
            Request::FindRelatedLines {
                id: "a.js".to_string(),
                line: 3
            }
        );

        let request: Request = serde_json::from_value(json!({"type": "list_documents"})).unwrap();
        assert_eq!(request, Request::ListDocuments);
    }

    #[test]
    fn test_open_defaults_to_plaintext() {
        let request: Request =
            serde_json::from_value(json!({"type": "open_document", "id": "n", "text": "x"}))
                .unwrap();
        assert!(matches!(
            request,
            Request::OpenDocument { ref language_id, .. } if language_id == "plaintext"
        ));
    }

    #[test]
    fn test_unknown_type_rejected() {
        let result = serde_json::from_value::<Request>(json!({"type": "format_document"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_related_lines_response() {
        let mut registry = SessionRegistry::default();
        open(&mut registry);

        let response = registry.handle(Request::FindRelatedLines {
            id: "a.js".to_string(),
            line: 2,
        });
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["type"], "related_lines");
        assert_eq!(value["related_lines"], json!([0, 1, 2]));
    }

    #[test]
    fn test_analysis_with_prompt() {
        let mut registry = SessionRegistry::default();
        open(&mut registry);

        let response = registry.handle(Request::AnalyzeSelection {
            id: "a.js".to_string(),
            selection: Selection::line(2),
            include_prompt: true,
        });
        match response {
            Response::Analysis { result, prompt, .. } => {
                assert_eq!(result.related_lines, vec![0, 1, 2]);
                assert!(prompt.unwrap().starts_with("Language: javascript"));
            }
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[test]
    fn test_errors_become_error_responses() {
        let mut registry = SessionRegistry::default();

        let response = registry.handle(Request::History {
            id: "nope.js".to_string(),
        });
        assert_eq!(response, Response::error("Document 'nope.js' is not open"));

        open(&mut registry);
        let response = registry.handle(Request::AnalyzeSelection {
            id: "a.js".to_string(),
            selection: Selection::line(9),
            include_prompt: false,
        });
        assert!(response.is_error());
    }

    #[test]
    fn test_out_of_range_line_is_an_error_response() {
        let mut registry = SessionRegistry::default();
        open(&mut registry);

        let response = registry.handle(Request::FindRelatedLines {
            id: "a.js".to_string(),
            line: 99,
        });
        assert_eq!(
            response,
            Response::error("Document error: Line 99 is out of range (document has 3 lines)")
        );

        let history = registry.handle(Request::History {
            id: "a.js".to_string(),
        });
        assert!(matches!(history, Response::History { ref entries, .. } if entries.is_empty()));
    }

    #[test]
    fn test_close_and_list() {
        let mut registry = SessionRegistry::default();
        open(&mut registry);

        let listing = registry.handle(Request::ListDocuments);
        assert!(matches!(listing, Response::Documents { ref documents } if documents.len() == 1));

        assert_eq!(
            registry.handle(Request::CloseDocument {
                id: "a.js".to_string()
            }),
            Response::Closed {
                id: "a.js".to_string(),
                was_open: true
            }
        );
        assert_eq!(
            registry.handle(Request::ListDocuments),
            Response::Documents { documents: vec![] }
        );
    }

    #[test]
    fn test_handle_json() {
        let mut registry = SessionRegistry::default();

        let response = registry.handle_json("{not json");
        assert!(matches!(response, Response::Error { ref message } if message.starts_with("Invalid request")));

        let response = registry.handle_json(r#"{"type":"close_document","id":"x"}"#);
        assert_eq!(
            response,
            Response::Closed {
                id: "x".to_string(),
                was_open: false
            }
        );
    }
}
