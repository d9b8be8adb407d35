use crate::error::AppResult;
use tokio::process::Command;

/// Count running processes whose command name is exactly `name`.
/// The current process is included in the count.
pub async fn count_running_copies(name: &str) -> AppResult<usize> {
    let output = Command::new("/bin/ps")
        .args(["-c", "-o", "command="])
        .output()
        .await?;

    Ok(count_matching(&String::from_utf8_lossy(&output.stdout), name))
}

/// Count lines of `ps` output equal to `name` once surrounding whitespace is removed
pub fn count_matching(ps_output: &str, name: &str) -> usize {
    ps_output
        .lines()
        .filter(|line| line.trim() == name)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_matching() {
        let output = "launchd\n  eventual\nBetterTouchTool\neventual\neventual-helper\n";
        assert_eq!(count_matching(output, "eventual"), 2);
        assert_eq!(count_matching(output, "BetterTouchTool"), 1);
        assert_eq!(count_matching("", "eventual"), 0);
    }
}
