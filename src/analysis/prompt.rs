//! Prompt construction for topic analyses.

/// Default character budget for project content in a prompt.
pub const DEFAULT_CONTENT_BUDGET: usize = 15_000;

/// Return the longest prefix of `text` holding at most `budget` characters.
pub fn truncate_chars(text: &str, budget: usize) -> &str {
    match text.char_indices().nth(budget) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Build the analysis prompt for one topic.
///
/// `content` is inserted verbatim; callers truncate it first.
pub fn build_prompt(topic: &str, content: &str) -> String {
    format!(
        "You are a software engineering expert. Analyze the following project content with a focus on **{topic}**.\n\
         \n\
         --- START OF PROJECT CONTENT ---\n\
         {content}\n\
         --- END OF PROJECT CONTENT ---\n\
         \n\
         Respond with concise, structured insights on the topic and code examples.\n"
    )
}
