use crate::types::{LectureRequest, OutputMode};

/// Shown in place of the subtopic list when the caller supplied none.
pub const NO_SUBTOPICS: &str = "none";

static LECTURE_SCHEMA: &str = r#"{
  "title": "string",
  "introduction": "string",
  "big_topic": "string",
  "identified_subtopics": [
    {
      "subtopic_title": "string",
      "subtopic_role": "string"
    }
  ],
  "lectures": [
    {
      "title": "string",
      "estimated_study_time": "string (e.g. '45 minutes')",
      "audience_level": "Beginner | Intermediate | Advanced",
      "learning_objectives": ["string", "string", "string"],
      "definition_and_purpose": "string (plain text, no Markdown)",
      "lecture_content": "string (clear, structured explanation in plain text)",
      "molecular_structures_and_processes": "string (plain text)",
      "examples_and_applications": ["string", "string"],
      "common_misconceptions": ["string", "string"],
      "student_activities": ["string", "string"],
      "key_terms": [
        {
          "term": "string",
          "definition": "string",
          "role": "string"
        }
      ],
      "summary": ["string", "string"],
      "quick_check_quiz": {
        "questions": [
          {
            "question": "string",
            "choices": ["string", "string", "string", "string"],
            "answer": "string",
            "explanation": "string"
          }
        ]
      }
    }
  ],
  "final_integrated_summary": {
    "summary_points": ["string", "string"],
    "study_plan_and_resources": {
      "textbooks": ["string"],
      "review_articles": ["string"],
      "online_tools_or_simulations": ["string"]
    }
  },
  "terminology_and_concepts": [
    {
      "term": "string",
      "definition": "string",
      "function_or_role": "string",
      "visual_analogy": "string (optional)"
    }
  ],
  "output_mode": "concise" | "standard" | "expanded"
}"#;

fn mode_guidance(mode: OutputMode) -> &'static str {
    match mode {
        OutputMode::Concise => "Keep each lecture to roughly a one-page summary per subtopic.",
        OutputMode::Standard => "Follow the default structure above at a moderate level of detail.",
        OutputMode::Expanded => {
            "Add detailed technical notes, suggested readings, and problem sets with answers."
        }
    }
}

/// Subtopics joined for the prompt, or [`NO_SUBTOPICS`].
pub fn subtopics_line(request: &LectureRequest) -> String {
    if request.subtopics().is_empty() {
        NO_SUBTOPICS.to_string()
    } else {
        request.subtopics().join(", ")
    }
}

/// Build the single instruction sent to the text-generation service.
pub fn build_lecture_prompt(request: &LectureRequest) -> String {
    let topic = request.topic();
    let mode = request.output_mode();
    let subtopics = subtopics_line(request);

    let subtopic_logic = if request.subtopics().is_empty() {
        format!(
            r#"1. Identify **2-3 essential subtopics** within {topic} and fill them under "identified_subtopics".
2. Create one lecture object per subtopic in "lectures" following the schema above."#
        )
    } else {
        format!(
            r#"1. Use exactly these subtopics, in this order, for "identified_subtopics": {subtopics}.
2. Create one lecture object per listed subtopic in "lectures" following the schema above."#
        )
    };

    format!(
        r#"
Role:
You are a highly experienced Cell & Molecular Biology professor at a top-tier university.

Goal:
Generate a clear, beginner-friendly lecture and study guide about **{topic}** for students with no prior biology background.
The response must be a single, fully valid JSON object that exactly follows the schema below.

Requested subtopics: {subtopics}
Output mode: {mode}

JSON Output Requirements:
- Return only valid JSON (no Markdown fences, no explanations, no extra text before or after).
- Use double quotes for all strings.
- Escape any internal quotes properly.
- Do not include trailing commas or comments.
- Every field shown in the schema must appear, even if empty arrays or strings are used.

Simplified JSON Schema:
{schema}

Generation Logic:
{subtopic_logic}
3. Ensure all fields are filled with realistic, informative content.
4. The "final_integrated_summary" must connect the subtopics and provide a short study plan.
5. The "terminology_and_concepts" list should include 3-6 key biological terms with definitions and functions.
6. The "output_mode" field must be set to "{mode}".

Output Mode:
{guidance}

Tone and Style:
- Accessible for complete beginners.
- Clear, scientifically accurate, and engaging.
- Avoid Markdown or HTML formatting; use plain text and lists within strings only if natural.

Final Instruction:
Return only the JSON object that conforms to the schema above. No explanations, no additional commentary, and no code fences.
"#,
        schema = LECTURE_SCHEMA,
        guidance = mode_guidance(mode),
    )
}
