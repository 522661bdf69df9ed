use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::error::{LectureError, Result};

/// Longest accepted topic, counted in characters after trimming.
pub const MAX_TOPIC_CHARS: usize = 200;

/// Requested level of detail for the generated lecture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    Concise,
    #[default]
    Standard,
    Expanded,
}

impl OutputMode {
    pub const ALL: [OutputMode; 3] = [OutputMode::Concise, OutputMode::Standard, OutputMode::Expanded];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputMode::Concise => "concise",
            OutputMode::Standard => "standard",
            OutputMode::Expanded => "expanded",
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputMode {
    type Err = LectureError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        OutputMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                LectureError::Validation(format!(
                    "Unknown output mode '{}'. Expected one of: concise, standard, expanded",
                    wanted
                ))
            })
    }
}

/// A validated lecture request. Only constructible through [`LectureRequest::new`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LectureRequest {
    topic: String,
    subtopics: Vec<String>,
    output_mode: OutputMode,
}

impl LectureRequest {
    /// Validate raw caller input.
    ///
    /// The topic is trimmed and must be non-empty and at most
    /// [`MAX_TOPIC_CHARS`] characters. Subtopics are split on commas with
    /// blank entries dropped. A missing or blank mode means
    /// [`OutputMode::Standard`].
    pub fn new(topic: Option<&str>, subtopics: Option<&str>, output_mode: Option<&str>) -> Result<Self> {
        let topic = topic.map(str::trim).unwrap_or_default();
        if topic.is_empty() {
            return Err(LectureError::Validation("Topic is required".to_string()));
        }
        if topic.chars().count() > MAX_TOPIC_CHARS {
            return Err(LectureError::Validation(format!(
                "Topic too long. Maximum {} characters.",
                MAX_TOPIC_CHARS
            )));
        }

        let output_mode = match output_mode.map(str::trim) {
            Some(mode) if !mode.is_empty() => mode.parse()?,
            _ => OutputMode::default(),
        };

        let subtopics = subtopics
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            topic: topic.to_string(),
            subtopics,
            output_mode,
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn subtopics(&self) -> &[String] {
        &self.subtopics
    }

    pub fn output_mode(&self) -> OutputMode {
        self.output_mode
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudienceLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl AudienceLevel {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Some(AudienceLevel::Beginner),
            "intermediate" => Some(AudienceLevel::Intermediate),
            "advanced" => Some(AudienceLevel::Advanced),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AudienceLevel::Beginner => "Beginner",
            AudienceLevel::Intermediate => "Intermediate",
            AudienceLevel::Advanced => "Advanced",
        }
    }
}

// The model is asked for the shape below but nothing guarantees it. Every
// field goes through `Value` first, so a field of the wrong type becomes its
// default instead of failing the whole document.

/// Any value that does not fit `T` (including `null`) becomes `T::default()`.
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Keeps the list items that fit `T` and drops the rest.
fn lenient_list<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

/// A list of strings; a bare string counts as a one-item list.
fn lenient_strings<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => vec![s],
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LectureDocument {
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub introduction: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub big_topic: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub identified_subtopics: Vec<IdentifiedSubtopic>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub lectures: Vec<Lecture>,
    #[serde(default, deserialize_with = "lenient")]
    pub final_integrated_summary: Option<FinalSummary>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub terminology_and_concepts: Vec<Terminology>,
    #[serde(default, deserialize_with = "lenient")]
    pub output_mode: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentifiedSubtopic {
    #[serde(default, deserialize_with = "lenient")]
    pub subtopic_title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub subtopic_role: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Lecture {
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub estimated_study_time: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub audience_level: Option<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub learning_objectives: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub definition_and_purpose: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub lecture_content: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub molecular_structures_and_processes: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub visual_aid_suggestions: Vec<VisualAid>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub examples_and_applications: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub common_misconceptions: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub student_activities: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub key_terms: Vec<KeyTerm>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub summary: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub quick_check_quiz: Option<Quiz>,
}

impl Lecture {
    pub fn audience(&self) -> Option<AudienceLevel> {
        self.audience_level.as_deref().and_then(AudienceLevel::parse)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VisualAid {
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub ascii_diagram: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyTerm {
    #[serde(default, deserialize_with = "lenient")]
    pub term: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub definition: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub role: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    #[serde(default, deserialize_with = "lenient_list")]
    pub questions: Vec<QuizQuestion>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    #[serde(default, deserialize_with = "lenient")]
    pub question: Option<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub choices: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub answer: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub explanation: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FinalSummary {
    #[serde(default, deserialize_with = "lenient_strings")]
    pub summary_points: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub study_plan_and_resources: Option<StudyPlan>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StudyPlan {
    #[serde(default, deserialize_with = "lenient_strings")]
    pub textbooks: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub review_articles: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub online_tools_or_simulations: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Terminology {
    #[serde(default, deserialize_with = "lenient")]
    pub term: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub definition: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub function_or_role: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub visual_analogy: Option<String>,
}
