use crate::services::generator::BatchRequest;

/// Builds the user prompt for one generation batch.
pub fn quiz_batch_prompt(request: &BatchRequest) -> String {
    let target_language = request.language.display_name();

    let custom_instructions = if request.custom_instructions.trim().is_empty() {
        String::new()
    } else {
        format!(
            "USER CUSTOM REQUIREMENTS: \"{}\". Strictly follow these instructions.",
            request.custom_instructions.trim()
        )
    };

    let avoid_topics = if request.avoid_topics.is_empty() {
        String::new()
    } else {
        format!(
            "Avoid repeating these topics or questions: {}.",
            request.avoid_topics.join(", ")
        )
    };

    format!(
        "Create a quiz batch with exactly {count} questions based on: \"{text}\".
Target Difficulty: {difficulty}.
Target Language: {language}.
{custom}
{avoid}

REQUIREMENTS:
1. Mix question types: some should be 'single' (1 correct answer) and some 'multiple' (2 or more correct answers).
2. Each question MUST have exactly 4 options.
3. All generated content MUST be in {language}.
4. Ensure questions are high quality and strictly relevant to the text.
5. FORMATTING:
   - STRICTLY use LaTeX for ALL mathematical expressions (e.g., $E=mc^2$, $\\sqrt{{x}}$, $\\frac{{a}}{{b}}$).
   - Wrap ALL inline math in '$' delimiters (e.g. $x^2$).
   - Wrap ALL block math in '$$' delimiters (e.g. $$ \\sum_{{i=1}}^n i $$).
   - DO NOT use Unicode equivalents for complex math (avoid ², ³, ½, √, etc. in favor of LaTeX commands).
   - Escape any dollar signs meant for currency (e.g., \\$100).
   - When writing chemical formulas, also use LaTeX (e.g., $H_2O$).",
        count = request.requested_count,
        text = request.source_text,
        difficulty = request.difficulty,
        language = target_language,
        custom = custom_instructions,
        avoid = avoid_topics,
    )
}
