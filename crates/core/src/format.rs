use crate::{
    normalize::LectureResponse,
    types::{FinalSummary, Lecture, LectureDocument, Quiz},
};

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn push_bullets(output: &mut String, heading: &str, items: &[String]) {
    let items: Vec<&str> = items.iter().map(|s| s.trim()).filter(|s| !s.is_empty()).collect();
    if items.is_empty() {
        return;
    }
    output.push_str(&format!("{}\n\n", heading));
    for item in items {
        output.push_str(&format!("• {}\n", item));
    }
    output.push('\n');
}

fn push_section(output: &mut String, heading: &str, body: &Option<String>) {
    if let Some(body) = non_empty(body) {
        output.push_str(&format!("{}\n\n{}\n\n", heading, body));
    }
}

fn format_quiz(output: &mut String, quiz: &Quiz) {
    if quiz.questions.is_empty() {
        return;
    }
    output.push_str("#### Quick Check Quiz\n\n");
    for (i, q) in quiz.questions.iter().enumerate() {
        output.push_str(&format!("{}. {}\n", i + 1, non_empty(&q.question).unwrap_or("(missing question)")));
        for (letter, choice) in ('A'..='Z').zip(&q.choices) {
            output.push_str(&format!("   {}) {}\n", letter, choice));
        }
        if let Some(answer) = non_empty(&q.answer) {
            output.push_str(&format!("   **Answer:** {}\n", answer));
        }
        if let Some(explanation) = non_empty(&q.explanation) {
            output.push_str(&format!("   _{}_\n", explanation));
        }
        output.push('\n');
    }
}

fn format_lecture(output: &mut String, index: usize, lecture: &Lecture) {
    let title = non_empty(&lecture.title).unwrap_or("Untitled lecture");
    output.push_str(&format!("## Lecture {}: {}\n\n", index + 1, title));

    let mut meta = Vec::new();
    if let Some(time) = non_empty(&lecture.estimated_study_time) {
        meta.push(format!("**Study time:** {}", time));
    }
    // Known levels get a consistent label, anything else is shown as written
    match (lecture.audience(), non_empty(&lecture.audience_level)) {
        (Some(level), _) => meta.push(format!("**Level:** {}", level.label())),
        (None, Some(raw)) => meta.push(format!("**Level:** {}", raw)),
        (None, None) => {}
    }
    if !meta.is_empty() {
        output.push_str(&format!("{}\n\n", meta.join(" | ")));
    }

    push_bullets(output, "### Learning Objectives", &lecture.learning_objectives);
    push_section(output, "### Definition and Purpose", &lecture.definition_and_purpose);
    push_section(output, "### Lecture", &lecture.lecture_content);
    push_section(
        output,
        "### Molecular Structures and Processes",
        &lecture.molecular_structures_and_processes,
    );

    let aids: Vec<_> = lecture
        .visual_aid_suggestions
        .iter()
        .filter(|aid| non_empty(&aid.description).is_some() || non_empty(&aid.ascii_diagram).is_some())
        .collect();
    if !aids.is_empty() {
        output.push_str("### Visual Aids\n\n");
        for aid in aids {
            if let Some(description) = non_empty(&aid.description) {
                output.push_str(&format!("• {}\n", description));
            }
            if let Some(diagram) = non_empty(&aid.ascii_diagram) {
                output.push_str(&format!("\n```\n{}\n```\n", diagram));
            }
        }
        output.push('\n');
    }

    push_bullets(output, "### Examples and Applications", &lecture.examples_and_applications);
    push_bullets(output, "### Common Misconceptions", &lecture.common_misconceptions);
    push_bullets(output, "### Student Activities", &lecture.student_activities);

    let terms: Vec<String> = lecture
        .key_terms
        .iter()
        .filter_map(|t| {
            let term = non_empty(&t.term)?;
            let mut line = format!("**{}**", term);
            if let Some(definition) = non_empty(&t.definition) {
                line.push_str(&format!(": {}", definition));
            }
            if let Some(role) = non_empty(&t.role) {
                line.push_str(&format!(" (role: {})", role));
            }
            Some(line)
        })
        .collect();
    push_bullets(output, "### Key Terms", &terms);

    push_bullets(output, "### Summary", &lecture.summary);

    if let Some(quiz) = &lecture.quick_check_quiz {
        format_quiz(output, quiz);
    }
}

fn format_final_summary(output: &mut String, summary: &FinalSummary) {
    let plan = summary.study_plan_and_resources.as_ref();
    let has_plan = plan.is_some_and(|p| {
        !(p.textbooks.is_empty() && p.review_articles.is_empty() && p.online_tools_or_simulations.is_empty())
    });
    if summary.summary_points.is_empty() && !has_plan {
        return;
    }

    output.push_str("## Integrated Summary\n\n");
    for point in &summary.summary_points {
        output.push_str(&format!("• {}\n", point));
    }
    output.push('\n');

    if let Some(plan) = plan {
        push_bullets(output, "### Textbooks", &plan.textbooks);
        push_bullets(output, "### Review Articles", &plan.review_articles);
        push_bullets(output, "### Online Tools and Simulations", &plan.online_tools_or_simulations);
    }
}

/// Format a lecture document as human-readable markdown. Absent fields are skipped.
pub fn format_lecture_readable(doc: &LectureDocument) -> String {
    let mut output = String::new();

    output.push_str(&format!("# {}\n\n", non_empty(&doc.title).unwrap_or("Lecture")));

    let mut meta = Vec::new();
    if let Some(topic) = non_empty(&doc.big_topic) {
        meta.push(format!("**Topic:** {}", topic));
    }
    if let Some(mode) = non_empty(&doc.output_mode) {
        meta.push(format!("**Mode:** {}", mode));
    }
    if !meta.is_empty() {
        output.push_str(&format!("{}\n\n", meta.join(" | ")));
    }

    if let Some(intro) = non_empty(&doc.introduction) {
        output.push_str(&format!("{}\n\n", intro));
    }

    let subtopics: Vec<String> = doc
        .identified_subtopics
        .iter()
        .filter_map(|s| {
            let title = non_empty(&s.subtopic_title)?;
            Some(match non_empty(&s.subtopic_role) {
                Some(role) => format!("**{}**: {}", title, role),
                None => format!("**{}**", title),
            })
        })
        .collect();
    push_bullets(&mut output, "## Subtopics", &subtopics);

    for (i, lecture) in doc.lectures.iter().enumerate() {
        format_lecture(&mut output, i, lecture);
    }

    if let Some(summary) = &doc.final_integrated_summary {
        format_final_summary(&mut output, summary);
    }

    let glossary: Vec<String> = doc
        .terminology_and_concepts
        .iter()
        .filter_map(|t| {
            let term = non_empty(&t.term)?;
            let mut line = format!("**{}**", term);
            if let Some(definition) = non_empty(&t.definition) {
                line.push_str(&format!(": {}", definition));
            }
            if let Some(role) = non_empty(&t.function_or_role) {
                line.push_str(&format!(" Function: {}", role));
            }
            if let Some(analogy) = non_empty(&t.visual_analogy) {
                line.push_str(&format!(" Analogy: {}", analogy));
            }
            Some(line)
        })
        .collect();
    push_bullets(&mut output, "## Terminology and Concepts", &glossary);

    output
}

/// Format any normalized response: the lecture markdown, the raw text behind
/// a warning for fallbacks, or pretty JSON for documents of an unexpected shape.
pub fn format_response_readable(response: &LectureResponse) -> String {
    match response {
        LectureResponse::Fallback { raw_output, warning } => format!(
            "> **Warning:** {}. The model returned text that could not be parsed; try again.\n\n{}\n",
            warning, raw_output
        ),
        LectureResponse::Document(value) => match response.document() {
            Some(doc) => format_lecture_readable(&doc),
            None => format!(
                "```json\n{}\n```\n",
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            ),
        },
    }
}
