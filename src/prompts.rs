//! Prompt texts used by the gateway endpoints.

/// Rule-described triage prompt. The model is instructed to answer with one
/// of the three labels only; anything else is treated as indeterminate.
pub const CLASSIFICATION_PROMPT: &str = r#"
You are a virtual IT support assistant specialized in triaging support tickets.

Your goal is to read the *description* of a support ticket and decide whether it is:

- **Incident**: an unexpected interruption or degradation of an IT service.
- **Service Request**: the user is asking for something new (account creation, access, software installation, configuration change) with no failure or error involved.

Important rules:
- Classify as **Incident** whenever there is any error, failure, slowness, outage or loss of functionality.
- Classify as **Service Request** when the request involves creation, access, installation or a configuration change, with no reported error.
- If it is not possible to decide clearly, classify as **Indeterminate**.

Your answer must be **exactly one of the three options**: `Incident`, `Service Request` or `Indeterminate`.

Ticket description:
{description}
"#;

/// Per-row evaluation prompt for uploaded chatbot transcripts.
pub const EVALUATION_PROMPT: &str = r#"
You are evaluating a support chatbot. Answer the user's question as the bot would,
using only the conversation so far and the document excerpts.

### Conversation history: ###
"{chat_history}"

### Document excerpts: ###
" {context} "

### Question you must answer: ###
```{question}```

Assistant:"#;
