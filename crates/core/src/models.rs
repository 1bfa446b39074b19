use serde::{Deserialize, Serialize};
use std::fmt;

/// Classified purpose of a user message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    /// Question about the public website (programmes, campuses, admissions...).
    Web,
    /// Question about internal regulations and policies.
    Doc,
    /// Administrative request to be recorded.
    Action,
    None,
}

impl Intent {
    pub const ALL: [Intent; 4] = [Intent::Web, Intent::Doc, Intent::Action, Intent::None];

    pub fn label(self) -> &'static str {
        match self {
            Intent::Web => "web",
            Intent::Doc => "doc",
            Intent::Action => "action",
            Intent::None => "none",
        }
    }

    /// Maps raw model output to an intent. Only an exact label (after trimming
    /// and lowercasing) is accepted; anything else is `None`.
    pub fn parse_label(raw: &str) -> Intent {
        match raw.trim().to_lowercase().as_str() {
            "web" => Intent::Web,
            "doc" => Intent::Doc,
            "action" => Intent::Action,
            _ => Intent::None,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which topic index (and answer wording) a question is served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Site,
    Regulation,
}

impl Domain {
    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Site => "site",
            Domain::Regulation => "regulation",
        }
    }
}

impl std::str::FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "site" | "web" => Ok(Domain::Site),
            "regulation" | "reglement" | "doc" => Ok(Domain::Regulation),
            other => Err(format!("unknown index '{other}' (expected site or regulation)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub text: String,
    /// Page URL or document name the chunk was cut from.
    pub source_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredChunk {
    pub chunk: DocumentChunk,
    pub score: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterReply {
    pub intent: Intent,
    pub answer: String,
    /// Parsed request fields, set on the recording path only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<ActionSummary>,
}

/// Fields the model was asked to extract. The date is whatever the model
/// wrote and is only shown to the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSummary {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub action: Option<String>,
    pub date: Option<String>,
}

impl ActionSummary {
    /// Lenient line parser for `Label : value`. Unknown lines are ignored and
    /// placeholder values (`...`, empty) count as missing.
    pub fn parse(text: &str) -> Self {
        let mut summary = ActionSummary::default();
        for line in text.lines() {
            let Some((label, value)) = line.split_once(':') else {
                continue;
            };
            let label = label
                .trim()
                .trim_start_matches(['-', '*'])
                .trim()
                .trim_matches('*')
                .to_lowercase();
            let value = value.trim();
            if value.is_empty() || value.chars().all(|c| c == '.' || c == '…') {
                continue;
            }
            let slot = match label.as_str() {
                "prénom" | "prenom" => &mut summary.first_name,
                "nom" => &mut summary.last_name,
                "action demandée" | "action demandee" | "action" => &mut summary.action,
                "date" => &mut summary.date,
                _ => continue,
            };
            slot.get_or_insert_with(|| value.to_string());
        }
        summary
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub question: String,
    pub answer: String,
    pub intent: Intent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_label_is_case_and_whitespace_insensitive() {
        assert_eq!(Intent::parse_label("web"), Intent::Web);
        assert_eq!(Intent::parse_label("  DOC \n"), Intent::Doc);
        assert_eq!(Intent::parse_label("\tAction"), Intent::Action);
        assert_eq!(Intent::parse_label("none"), Intent::None);
    }

    #[test]
    fn parse_label_rejects_anything_else() {
        for raw in ["", "web.", "\"web\"", "web, doc", "La réponse est web", "websites"] {
            assert_eq!(Intent::parse_label(raw), Intent::None, "{raw:?}");
        }
    }

    #[test]
    fn labels_round_trip() {
        for intent in Intent::ALL {
            assert_eq!(Intent::parse_label(intent.label()), intent);
        }
    }

    #[test]
    fn domain_from_str() {
        assert_eq!("site".parse::<Domain>().unwrap(), Domain::Site);
        assert_eq!("Regulation".parse::<Domain>().unwrap(), Domain::Regulation);
        assert!("campus".parse::<Domain>().is_err());
    }

    #[test]
    fn parses_labelled_lines() {
        let summary = ActionSummary::parse(
            "Prénom : Jean\nNom : Dupont\nAction demandée : Inscription en informatique\nDate : 02/09/2024",
        );
        assert_eq!(summary.first_name.as_deref(), Some("Jean"));
        assert_eq!(summary.last_name.as_deref(), Some("Dupont"));
        assert_eq!(
            summary.action.as_deref(),
            Some("Inscription en informatique")
        );
        assert_eq!(summary.date.as_deref(), Some("02/09/2024"));
    }

    #[test]
    fn placeholders_and_markdown_are_tolerated() {
        let summary = ActionSummary::parse(
            "**Prénom** : ...\n- Nom :\n* Action demandée : Attestation\nbruit",
        );
        assert_eq!(summary.first_name, None);
        assert_eq!(summary.last_name, None);
        assert_eq!(summary.action.as_deref(), Some("Attestation"));
    }
}
