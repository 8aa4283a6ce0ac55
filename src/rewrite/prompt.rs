use crate::model::{FileSnapshot, MARKER_LINE, REQUIRED_HEADER};
use crate::remote::ChatMessage;

const SYSTEM: &str = "You clean up short Python exploit scripts. Keep the behavior identical, \
make the code easier to read, and add brief comments where they help. Do not add error \
handling or restructure the script into functions.";

pub fn rewrite_messages(file: &FileSnapshot) -> Vec<ChatMessage> {
    let user = format!(
        "Rewrite the script `{name}` so it is cleaner and lightly commented, with the same behavior.\n\n\
The file must start with exactly these lines, unchanged:\n\
```python\n{header}```\n\n\
Only change code below the line `{marker}`. Everything above that line stays as it is.\n\n\
Reply with the full file in a single ```python code block.\n\n\
Current file:\n\
```python\n{content}\n```",
        name = file.name,
        header = REQUIRED_HEADER,
        marker = MARKER_LINE.trim_start_matches("# ").trim(),
        content = file.content,
    );
    vec![ChatMessage::system(SYSTEM), ChatMessage::user(user)]
}
