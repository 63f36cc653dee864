//! Search-chan. There is no search backend behind this tool: it answers with
//! canned results so the agent loop can be exercised end to end.

use tracing::info;

use crate::ToolResult;

pub(crate) fn run(query: &str) -> ToolResult {
    info!("Search-chan searching for '{query}'");

    let results = [
        format!(
            "Search result 1 about {query}: This is a simulated result showing information about {query}."
        ),
        format!("Search result 2 about {query}: Another simulated result with details on {query}."),
        format!("Search result 3 about {query}: More information and insights about {query}."),
    ]
    .iter()
    .map(|r| format!("• {r}"))
    .collect::<Vec<_>>()
    .join("\n");

    ToolResult::success(format!(
        "Kyaa~! Search-chan found some interesting results about '{query}'! ✨\n\n{results}\n\nHehe! Hope this helps, Master! 🌟"
    ))
}
