use crate::evaluation::{OREO_PARTS, OUTPUT_FIELDS, OutputFieldKind, ReflectionInput};

const TUTOR_PREAMBLE: &str = concat!(
    "You are a precise and insightful writing tutor for the student club ",
    "\"Na-Phil-Sa\" (My Transcription Club)."
);

const STRICTNESS_RULES: &str = concat!(
    "Grade STRICTLY. Mark a part TRUE only when it is explicitly present in the student's own words. ",
    "If a part is weak, vague, only implied, or missing, mark it FALSE. ",
    "Do not give the benefit of the doubt."
);

/// Renders the evaluation request for one reflection.
///
/// The student's text is embedded untouched; nothing is trimmed or shortened.
pub fn build_evaluation_prompt(input: &ReflectionInput) -> String {
    let mut sections = Vec::with_capacity(6);

    sections.push(TUTOR_PREAMBLE.to_string());
    sections.push(format!(
        concat!(
            "Student Info: {}\n",
            "Most Impressive Phrase: \"{}\"\n",
            "Student's Transcription & Reflection:\n",
            "\"{}\""
        ),
        input.student_info, input.impressive_phrase, input.content
    ));
    sections.push(
        "TASK: Analyze the student's writing based on the OREO principle. Be STRICT in your evaluation."
            .to_string(),
    );
    sections.push(rubric_section());
    sections.push(STRICTNESS_RULES.to_string());
    sections.push(output_section());

    sections.join("\n\n")
}

fn rubric_section() -> String {
    let lines = OREO_PARTS
        .iter()
        .map(|part| format!("{} ({}): {}", part.letter, part.name, part.question))
        .collect::<Vec<_>>();
    format!("The OREO principle stands for:\n{}", lines.join("\n"))
}

fn output_section() -> String {
    let lines = OUTPUT_FIELDS
        .iter()
        .enumerate()
        .map(|(index, field)| {
            let mut line = format!("{}. {}: {}.", index + 1, field.name, field.description);
            if field.kind == OutputFieldKind::Rubric {
                let keys = OREO_PARTS
                    .iter()
                    .map(|part| part.key)
                    .collect::<Vec<_>>()
                    .join(", ");
                line.push_str(&format!(" Use boolean keys: {keys}."));
            }
            line
        })
        .collect::<Vec<_>>();
    format!(
        "Return a single JSON object with exactly these {} fields:\n{}",
        OUTPUT_FIELDS.len(),
        lines.join("\n")
    )
}
