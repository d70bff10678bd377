//! Inspection report rendering.
//!
//! Produces either the human-readable section layout or a single JSON
//! document for a decoded token and its verdict.

use serde_json::{Map, Value, json};

use crate::core::decoder::Token;
use crate::core::validator::Verdict;
use crate::display::json_printer::render_json;
use crate::error::replace_control_chars;

/// Which token sections to include in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sections {
    pub header: bool,
    pub payload: bool,
    pub signature: bool,
}

impl Default for Sections {
    fn default() -> Self {
        Self {
            header: true,
            payload: true,
            signature: true,
        }
    }
}

/// Render the human-readable report.
pub fn render_human(token: &Token, verdict: &Verdict, sections: Sections, use_color: bool) -> String {
    let mut blocks = Vec::new();

    if sections.header {
        let header = Value::Object(token.header.clone());
        blocks.push(format!("--- Header ---\n{}", render_json(&header, use_color)));
    }
    if sections.payload {
        let payload = Value::Object(token.payload.clone());
        blocks.push(format!("--- Payload ---\n{}", render_json(&payload, use_color)));
    }
    if sections.signature {
        let signature = replace_control_chars(&token.signature);
        blocks.push(format!("--- Signature ---\n{signature}"));
    }
    blocks.push(format!("Verification: {}", describe_verdict(verdict)));

    let mut report = blocks.join("\n\n");
    report.push('\n');
    report
}

/// Render the machine-readable report.
pub fn render_machine(token: &Token, verdict: &Verdict, sections: Sections) -> Value {
    let mut report = Map::new();

    if sections.header {
        report.insert("header".to_string(), Value::Object(token.header.clone()));
    }
    if sections.payload {
        report.insert("payload".to_string(), Value::Object(token.payload.clone()));
    }
    if sections.signature {
        report.insert("signature".to_string(), Value::String(token.signature.clone()));
    }

    let verification = match verdict {
        Verdict::Valid { claims } => json!({"status": verdict.status(), "claims": claims}),
        Verdict::Invalid { reason } => json!({"status": verdict.status(), "reason": reason}),
        Verdict::Unverifiable => json!({"status": verdict.status()}),
    };
    report.insert("verification".to_string(), verification);

    Value::Object(report)
}

fn describe_verdict(verdict: &Verdict) -> String {
    match verdict {
        Verdict::Valid { .. } => "valid".to_string(),
        Verdict::Invalid { reason } => format!("invalid ({reason})"),
        Verdict::Unverifiable => "unverifiable (no key file given)".to_string(),
    }
}
