//! `history`: list snapshot commits.

use anyhow::Result;

use jswatch::GitHistory;

use super::ConfigOverrides;

pub async fn run(overrides: &ConfigOverrides, limit: usize, json: bool) -> Result<()> {
    let cfg = overrides.resolve()?;
    let git = GitHistory::new(&cfg.repo_dir);
    let commits = git.log(limit).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "commits": commits,
                "total": commits.len(),
            }))?
        );
    } else if commits.is_empty() {
        println!("  No snapshots recorded in {}.", cfg.repo_dir.display());
    } else {
        for c in &commits {
            let short = c.hash.get(..8).unwrap_or(c.hash.as_str());
            println!("  {short}  {}  {}", c.date.format("%Y-%m-%d %H:%M:%S"), c.message);
        }
    }

    Ok(())
}
