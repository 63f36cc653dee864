//! Memo-chan. Acknowledges reminders; nothing is scheduled anywhere.

use tracing::info;

use crate::ToolResult;

pub(crate) fn run(task_description: &str, time_or_date: &str) -> ToolResult {
    info!("Memo-chan noting '{task_description}' for {time_or_date}");

    ToolResult::success(format!(
        "Kyaa~! Memo-chan has successfully noted it down! ✨\n\n📝 Task: {task_description}\n⏰ When: {time_or_date}\n\n\
         Luna will definitely remind you about this! Well... Memo-chan doesn't sync with a calendar yet, \
         so this Luna hopes you'll remember too! Hehe! 🌸💖"
    ))
}
