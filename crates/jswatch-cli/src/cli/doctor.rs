//! Environment readiness check.

use anyhow::Result;

use jswatch::history::git::git_available;

use super::ConfigOverrides;

/// Check git availability, the repository and the output directory.
pub async fn run(overrides: &ConfigOverrides) -> Result<()> {
    let cfg = overrides.resolve()?;

    println!("jswatch Doctor");
    println!("==============");
    println!();
    println!("Target:     {}", cfg.base_url);
    println!("Daily at:   {}", cfg.daily_at.format("%H:%M"));
    println!();

    let git_ok = git_available();
    if git_ok {
        println!("[OK] git found on PATH");
    } else {
        println!("[!!] git NOT found. Snapshots will be written but not committed.");
    }

    if cfg.repo_dir.join(".git").exists() {
        println!("[OK] Repository: {}", cfg.repo_dir.display());
    } else {
        println!(
            "[??] No repository in {} yet (created on first run)",
            cfg.repo_dir.display()
        );
    }

    let writable = std::fs::create_dir_all(&cfg.output_dir)
        .and_then(|()| tempfile_probe(&cfg.output_dir))
        .is_ok();
    if writable {
        println!("[OK] Output directory {} is writable", cfg.output_dir.display());
    } else {
        println!(
            "[!!] Output directory {} is not writable",
            cfg.output_dir.display()
        );
    }

    println!();
    if git_ok && writable {
        println!("Status: READY");
    } else {
        println!("Status: NOT READY");
    }

    Ok(())
}

fn tempfile_probe(dir: &std::path::Path) -> std::io::Result<()> {
    let probe = dir.join(format!(".jswatch-probe-{}", std::process::id()));
    std::fs::write(&probe, b"")?;
    std::fs::remove_file(&probe)
}
