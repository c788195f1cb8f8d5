pub const SYSTEM_PROMPT: &str = "You are an AI assistant that helps update manufacturing manuals. \
Rewrite the documents you are given so they are accurate, clear and consistent, \
keeping the technical content intact.";

pub fn build_update_prompt(document_text: &str) -> String {
    format!(
        "Update the following manufacturing document with any necessary changes:\n\n{}",
        document_text
    )
}
