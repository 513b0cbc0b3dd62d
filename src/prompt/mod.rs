use crate::wire::{Conversation, Message};

pub const SYSTEM_PROMPT: &str =
    "You are an assistant that helps the user create and improve a web page in HTML, CSS, and JavaScript.";

/// Conversation every fresh page starts from.
pub fn starting_conversation() -> Conversation {
    let mut convo = Conversation::new();
    convo.push(Message::system(SYSTEM_PROMPT));
    convo
}

pub fn user_prompt_create(user_input: &str) -> String {
    format!(
        "Create an HTML web page with accompanying CSS and JavaScript in a single HTML-file. \
         Use suitable JS packages (linked from a CDN) where ever applicable. \
         Generate this content from: {user_input}"
    )
}

pub fn user_prompt_modify(user_input: &str) -> String {
    format!(
        "Modify the previous website to accommodate the following:\n\n{user_input}\n\n \
         Note that you should recreate the HTML, CSS, and JavaScript code from scratch in its entirety. \
         The new code should be self-contained in a single HTML-file."
    )
}

/// Build the conversation to submit for one generation cycle.
///
/// With `reset` the prior history is dropped and a new page is requested;
/// otherwise `prior` is copied as-is and a full-rewrite request is appended.
/// `prior` itself is never touched.
pub fn build_conversation(reset: bool, user_input: &str, prior: &Conversation) -> Conversation {
    if reset {
        let mut convo = starting_conversation();
        convo.push(Message::user(user_prompt_create(user_input)));
        convo
    } else {
        let mut convo = prior.clone();
        convo.push(Message::user(user_prompt_modify(user_input)));
        convo
    }
}
