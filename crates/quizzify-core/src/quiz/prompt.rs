use std::fmt::Write;

use quizzify_memory::ScoredChunk;

const QUESTION_TEMPLATE: &str = "\
You are a subject matter expert on the topic: {topic}

Follow the instructions to create a quiz question:
1. Generate a question based on the topic provided and context as key \"question\"
2. Provide 4 multiple choice answers to the question as a list of key-value pairs \"choices\"
3. Provide the correct answer for the question from the list of answers as key \"answer\"
4. Provide an explanation as to why the answer is correct as key \"explanation\"

You must respond as a JSON object with the following structure:
{
    \"question\": \"<question>\",
    \"choices\": [
        {\"key\": \"A\", \"value\": \"<choice>\"},
        {\"key\": \"B\", \"value\": \"<choice>\"},
        {\"key\": \"C\", \"value\": \"<choice>\"},
        {\"key\": \"D\", \"value\": \"<choice>\"}
    ],
    \"answer\": \"<answer key from choices list>\",
    \"explanation\": \"<explanation as to why the answer is correct>\"
}

Context:
{context}
";

/// Render the question prompt for `topic` with the retrieved chunks as context.
#[must_use]
pub fn build_prompt(topic: &str, context: &[ScoredChunk]) -> String {
    let context = format_context(context);
    let mut out = String::with_capacity(QUESTION_TEMPLATE.len() + topic.len() + context.len());
    let mut rest = QUESTION_TEMPLATE;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        if let Some(after) = tail.strip_prefix("{topic}") {
            out.push_str(topic);
            rest = after;
        } else if let Some(after) = tail.strip_prefix("{context}") {
            out.push_str(&context);
            rest = after;
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

fn format_context(context: &[ScoredChunk]) -> String {
    if context.is_empty() {
        return "(no relevant passages found)".into();
    }
    let mut out = String::new();
    for scored in context {
        let meta = &scored.chunk.metadata;
        let _ = writeln!(
            out,
            "[{} p.{}]\n{}\n",
            meta.source,
            meta.page_number,
            scored.chunk.text.trim()
        );
    }
    out.truncate(out.trim_end().len());
    out
}
